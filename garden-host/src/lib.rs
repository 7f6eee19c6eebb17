//! # garden-host: Runtime Host for the Emotional Garden
//!
//! `garden-core` is a pure simulation that never sleeps. This crate gives
//! it a clock: a tokio task that owns the [`Garden`](garden_core::Garden),
//! advances it every frame and turns UI input into core calls.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │          console / renderer / UI         │
//! │   ┌──────────┐            ┌───────────┐  │
//! │   │  hooks   │            │ snapshots │  │
//! │   └────┬─────┘            └─────▲─────┘  │
//! │        │ ControlEvent           │ watch  │
//! │        ▼                        │        │
//! │   ┌─────────────────────────────┴─────┐  │
//! │   │        host (driver task)         │  │
//! │   │   ┌───────────────────────────┐   │  │
//! │   │   │        garden-core        │   │  │
//! │   │   └───────────────────────────┘   │  │
//! │   └───────────────────────────────────┘  │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: host settings layered over the garden config, frame budget
//! - `events`: control events and their outcomes
//! - `hooks`: console line parsing
//! - `host`: the driver task and its handle
//! - `telemetry`: tracing subscriber setup

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod events;
pub mod hooks;
pub mod host;
pub mod telemetry;

pub use config::{HostConfig, HostSettings};
pub use events::{ControlEvent, Outcome};
pub use host::{GardenHost, HostError, HostHandle};
