//! # Garden Core Library
//!
//! Simulation core of an emotional garden: visitors type how they feel, and
//! a small world of plants, weather and sky answers.
//!
//! A submission flows through the crate like this:
//!
//! - **Classifier**: keyword scoring into one of six [`EmotionKind`]s
//! - **Memory**: a bounded log of what was said, behind a key-value backend
//! - **Energy**: slow positive/negative pressure fed by the current emotion
//! - **Plants**: an arena of entities that grow, wilt, spawn and despawn
//! - **Environment**: a day/night cycle with manual overrides
//! - **Scenario**: pure transitions that return timed effects
//!
//! [`Garden`] owns all of it and threads one simulation clock through every
//! tick. The core never sleeps and never spawns threads; hosts call
//! [`Garden::advance`] and forward user actions.
//!
//! ## Performance Contract
//!
//! - Classification: < 20μs for a typical sentence
//! - Frame tick (100 plants): < 10μs
//! - Submission end to end, in-memory backend: < 200μs

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classifier;
pub mod config;
pub mod energy;
pub mod environment;
pub mod error;
pub mod garden;
pub mod memory;
pub mod plants;
pub mod random;
pub mod scenario;
pub mod schedule;
pub mod storage;
pub mod types;

pub use classifier::{classify, EmotionVerdict};
pub use config::GardenConfig;
pub use error::GardenError;
pub use garden::{Garden, GardenSnapshot, Submission};
pub use memory::{MemoryRecord, MemoryStore};
pub use plants::{PlantEntity, PlantPopulation, PopulationDiff};
pub use random::{GardenRng, RandomSource};
pub use scenario::{GardenTool, ScenarioState, SubmissionBranch};
pub use storage::{InMemoryBackend, KeyValueBackend, SqliteBackend};
pub use types::*;
