//! The driver task.
//!
//! One tokio task owns the [`Garden`]. It advances simulation time on a
//! fixed frame interval, applies control events in arrival order, publishes
//! a snapshot after every frame and event, and forwards plant diffs to any
//! renderer listening. Nothing else touches the garden, so the core needs
//! no locking.
//!
//! | Step             | When                         |
//! |------------------|------------------------------|
//! | Catch up         | Before every event and frame |
//! | Apply event      | On each control event        |
//! | Publish snapshot | After every event and frame  |
//! | Forward diffs    | After every event and frame  |

use std::time::Instant as WallInstant;

use garden_core::garden::GardenSnapshot;
use garden_core::{Garden, PopulationDiff};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{FrameBudget, HostSettings};
use crate::events::{ControlEvent, Outcome};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures talking to the driver task.
#[derive(Debug, Error)]
pub enum HostError {
    /// The driver task has stopped and no longer accepts events.
    #[error("garden host has stopped")]
    Closed,

    /// The driver task panicked or was cancelled.
    #[error("garden host task failed: {0}")]
    Join(#[from] JoinError),
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

struct Envelope {
    event: ControlEvent,
    reply: oneshot::Sender<Outcome>,
}

/// Client side of a running host.
pub struct HostHandle {
    events: mpsc::Sender<Envelope>,
    snapshots: watch::Receiver<GardenSnapshot>,
    diffs: broadcast::Sender<PopulationDiff>,
    task: JoinHandle<Garden>,
}

impl HostHandle {
    /// Send an event and wait for the garden's answer.
    ///
    /// # Errors
    /// Returns [`HostError::Closed`] once the host has shut down.
    pub async fn send(&self, event: ControlEvent) -> Result<Outcome, HostError> {
        let (reply, answer) = oneshot::channel();
        self.events
            .send(Envelope { event, reply })
            .await
            .map_err(|_| HostError::Closed)?;
        answer.await.map_err(|_| HostError::Closed)
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> GardenSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that wakes on every new snapshot.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<GardenSnapshot> {
        self.snapshots.clone()
    }

    /// Subscribe to plant spawn/despawn diffs from now on.
    #[must_use]
    pub fn subscribe_diffs(&self) -> broadcast::Receiver<PopulationDiff> {
        self.diffs.subscribe()
    }

    /// Stop the garden and take it back from the driver task.
    ///
    /// # Errors
    /// Returns [`HostError::Join`] if the driver task panicked.
    pub async fn shutdown(self) -> Result<Garden, HostError> {
        // A closed channel means the task is already on its way out.
        let _ = self.send(ControlEvent::Shutdown).await;
        drop(self.events);
        Ok(self.task.await?)
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Spawns and runs the driver task.
pub struct GardenHost {
    garden: Garden,
    settings: HostSettings,
    snapshots: watch::Sender<GardenSnapshot>,
    diffs: broadcast::Sender<PopulationDiff>,
    budget: FrameBudget,
    last_advance: Instant,
}

impl GardenHost {
    /// Move `garden` into a new driver task on the current runtime.
    ///
    /// Plants that already exist reach renderers through the first
    /// snapshot; the diff stream only carries later changes.
    #[must_use]
    pub fn spawn(mut garden: Garden, settings: &HostSettings) -> HostHandle {
        garden.drain_diffs();
        let (events, inbox) = mpsc::channel(settings.channel_capacity.max(1));
        let (snapshots, snapshot_rx) = watch::channel(garden.snapshot());
        let (diffs, _) = broadcast::channel(settings.diff_capacity.max(1));

        let host = Self {
            garden,
            settings: settings.clone(),
            snapshots,
            diffs: diffs.clone(),
            budget: FrameBudget::new(settings.frame_budget_us),
            last_advance: Instant::now(),
        };
        let task = tokio::spawn(host.run(inbox));

        HostHandle {
            events,
            snapshots: snapshot_rx,
            diffs,
            task,
        }
    }

    async fn run(mut self, mut inbox: mpsc::Receiver<Envelope>) -> Garden {
        let mut frames = tokio::time::interval(self.settings.frame_interval());
        frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            frame_ms = self.settings.frame_interval_ms,
            scenario = %self.garden.scenario(),
            "garden host started"
        );

        loop {
            tokio::select! {
                biased;
                envelope = inbox.recv() => {
                    let Some(Envelope { event, reply }) = envelope else {
                        debug!("all handles dropped");
                        self.garden.shutdown();
                        break;
                    };
                    let stop = event == ControlEvent::Shutdown;
                    self.catch_up();
                    let outcome = self.handle(event);
                    self.publish();
                    // The caller may have stopped waiting.
                    let _ = reply.send(outcome);
                    if stop {
                        break;
                    }
                }
                _ = frames.tick() => {
                    self.catch_up();
                    self.publish();
                }
            }
        }

        inbox.close();
        info!(
            frames = self.budget.frames,
            over_budget = self.budget.over_budget,
            worst_us = self.budget.worst_us,
            "garden host stopped"
        );
        self.garden
    }

    /// Advance the garden to the runtime's current instant.
    fn catch_up(&mut self) {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last_advance);
        self.last_advance = now;

        let started = WallInstant::now();
        self.garden.advance(dt);
        if !self.budget.record(started.elapsed()) {
            warn!(
                took_us = self.budget.last_us,
                budget_us = self.budget.budget_us,
                "slow garden frame"
            );
        }
    }

    fn handle(&mut self, event: ControlEvent) -> Outcome {
        debug!(event = event.label(), "control event");
        match event {
            ControlEvent::SubmitText(text) => Outcome::Submitted(self.garden.submit_text(&text)),
            ControlEvent::UseTool(tool) => Outcome::ToolUsed(self.garden.use_tool(tool)),
            ControlEvent::SetTimeOfDay(phase) => {
                self.garden.note_interaction();
                self.garden.set_time_of_day(phase);
                Outcome::Applied
            }
            ControlEvent::SetWeather(weather) => {
                self.garden.note_interaction();
                self.garden.set_weather(weather);
                Outcome::Applied
            }
            ControlEvent::SetWind(wind) => {
                self.garden.note_interaction();
                self.garden.set_wind_intensity(wind);
                Outcome::Applied
            }
            ControlEvent::TriggerLightning => {
                self.garden.note_interaction();
                Outcome::Lightning(self.garden.trigger_lightning())
            }
            ControlEvent::Recall(id) => {
                self.garden.note_interaction();
                match self.garden.recall(id) {
                    Ok(record) => Outcome::Recalled(Some(record)),
                    Err(e) => {
                        warn!(error = %e, "recall failed");
                        Outcome::Recalled(None)
                    }
                }
            }
            ControlEvent::ListMemories => Outcome::Memories(self.garden.memories()),
            ControlEvent::ClearMemories => {
                self.garden.clear_memories();
                Outcome::Applied
            }
            ControlEvent::Interaction => {
                self.garden.note_interaction();
                Outcome::Applied
            }
            ControlEvent::Shutdown => {
                self.garden.shutdown();
                Outcome::Applied
            }
        }
    }

    fn publish(&mut self) {
        for diff in self.garden.drain_diffs() {
            // No subscribers is fine; diffs are only for renderers.
            let _ = self.diffs.send(diff);
        }
        self.snapshots.send_replace(self.garden.snapshot());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
