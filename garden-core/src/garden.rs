//! The garden orchestrator.
//!
//! [`Garden`] is the single owner of every piece of simulation state:
//! energy, plants, scenario, atmosphere, overrides, the displayed message,
//! tool cooldowns and the delayed-effect queue. Hosts drive it with
//! [`Garden::advance`] and feed it user actions; renderers read
//! [`Garden::snapshot`] and drain plant diffs.
//!
//! ## Time
//!
//! All timing is simulation time. `advance(dt)` walks forward through every
//! periodic timer and queued effect that falls inside the step, in due
//! order, then runs one frame:
//!
//! ```text
//!   advance(dt)
//!     ├─ periodic timers   cooldowns (100 ms), inactivity (1 s),
//!     │                    dream roll (10 s), ambient roll (15 s)
//!     ├─ queued effects    spawns, despawns, messages, scenario ends
//!     └─ frame             energy → plants → lightning → expiries
//! ```
//!
//! Energy is always updated before plant targets are recomputed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::classifier::{classify, EmotionVerdict};
use crate::config::GardenConfig;
use crate::energy::EnergyState;
use crate::environment::{EnvironmentCycle, EnvironmentSample, Lightning, Overrides};
use crate::error::{GardenError, Result};
use crate::memory::{MemoryRecord, MemoryStore};
use crate::plants::{PlantEntity, PlantPopulation, PopulationDiff};
use crate::random::RandomSource;
use crate::scenario::{
    self, Arrival, Conditions, Effect, GardenTool, ScenarioState, Scope, SubmissionBranch,
    Transition,
};
use crate::schedule::EffectQueue;
use crate::storage::KeyValueBackend;
use crate::types::{EmotionKind, MemoryId, SimTime, SpecialEvent, TimeOfDay, WeatherKind};

const RECALL_DAMPING: f32 = 0.7;
const DEFAULT_WIND: f32 = 0.5;
const DEFAULT_INTENSITY: f32 = 0.5;

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// The message currently shown to the visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayMessage {
    /// Text to show.
    pub text: String,
    /// When it appeared.
    pub shown_at: SimTime,
    /// When it disappears; `None` means it stays until replaced.
    pub expires_at: Option<SimTime>,
}

/// A running overlay and when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEvent {
    /// Which overlay.
    pub event: SpecialEvent,
    /// When it clears.
    pub until: SimTime,
}

/// Remaining cooldown per tool, in cooldown units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCooldowns {
    /// Watering can.
    pub water: f32,
    /// Shears.
    pub prune: f32,
    /// Wind gust.
    pub chase: f32,
}

impl ToolCooldowns {
    /// Remaining cooldown for `tool`.
    #[must_use]
    pub fn get(&self, tool: GardenTool) -> f32 {
        match tool {
            GardenTool::Water => self.water,
            GardenTool::Prune => self.prune,
            GardenTool::Chase => self.chase,
        }
    }

    /// Whether `tool` can be used.
    #[must_use]
    pub fn is_ready(&self, tool: GardenTool) -> bool {
        self.get(tool) <= 0.0
    }

    fn slot(&mut self, tool: GardenTool) -> &mut f32 {
        match tool {
            GardenTool::Water => &mut self.water,
            GardenTool::Prune => &mut self.prune,
            GardenTool::Chase => &mut self.chase,
        }
    }

    fn step(&mut self, amount: f32) {
        for tool in GardenTool::ALL {
            let slot = self.slot(tool);
            let next = *slot - amount;
            // Snap float residue so a full cooldown takes an exact number of steps.
            *slot = if next < amount * 0.5 { 0.0 } else { next };
        }
    }
}

/// What the particle renderer consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherView {
    /// Effective base weather.
    pub kind: WeatherKind,
    /// Current emotional intensity.
    pub intensity: f32,
    /// Effective wind intensity.
    pub wind_intensity: f32,
    /// Active overlay, if any.
    pub special_event: Option<SpecialEvent>,
}

/// Everything a renderer or UI needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardenSnapshot {
    /// Simulation time of the snapshot.
    pub elapsed: SimTime,
    /// Active scenario.
    pub scenario: ScenarioState,
    /// Current primary emotion.
    pub emotion: EmotionKind,
    /// Sky, lights and wind.
    pub environment: EnvironmentSample,
    /// Particle renderer inputs.
    pub weather: WeatherView,
    /// Manual selections in force.
    pub overrides: Overrides,
    /// Message on screen.
    pub message: Option<DisplayMessage>,
    /// Lightning flash brightness.
    pub lightning: f32,
    /// Energy balance.
    pub energy: EnergyState,
    /// Tool cooldowns.
    pub cooldowns: ToolCooldowns,
    /// Every plant, in insertion order.
    pub plants: Vec<PlantEntity>,
}

/// Result of an accepted text submission.
#[derive(Debug, Clone)]
pub struct Submission {
    /// The classifier's reading.
    pub verdict: EmotionVerdict,
    /// Which response was chosen.
    pub branch: SubmissionBranch,
    /// The stored record.
    pub record: MemoryRecord,
}

// ---------------------------------------------------------------------------
// Periodic timers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Timers {
    cooldown: SimTime,
    inactivity: SimTime,
    dream: SimTime,
    ambient: SimTime,
}

impl Timers {
    fn earliest(&self) -> SimTime {
        self.cooldown
            .min(self.inactivity)
            .min(self.dream)
            .min(self.ambient)
    }
}

// ---------------------------------------------------------------------------
// Garden
// ---------------------------------------------------------------------------

/// The simulation context: owns all state and threads it through ticks.
pub struct Garden {
    config: GardenConfig,
    store: MemoryStore,
    energy: EnergyState,
    plants: PlantPopulation,
    cycle: EnvironmentCycle,
    scenario: ScenarioState,
    scenario_epoch: u64,
    weather: WeatherKind,
    wind: f32,
    overrides: Overrides,
    message: Option<DisplayMessage>,
    special: Option<ActiveEvent>,
    lightning: Lightning,
    idle_secs: u32,
    current_emotion: EmotionKind,
    last_emotion: EmotionKind,
    intensity: f32,
    cooldowns: ToolCooldowns,
    rng: Box<dyn RandomSource + Send>,
    started_at: DateTime<Utc>,
    now: SimTime,
    queue: EffectQueue,
    timers: Timers,
    running: bool,
}

impl std::fmt::Debug for Garden {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Garden")
            .field("now", &self.now)
            .field("scenario", &self.scenario)
            .field("plants", &self.plants.len())
            .field("pending", &self.queue.len())
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl Garden {
    /// Open the garden: seed the plants, pick the opening scenario and
    /// start every periodic timer.
    ///
    /// `started_at` is the wall-clock time at simulation time zero.
    pub fn open(
        config: GardenConfig,
        backend: Arc<dyn KeyValueBackend>,
        mut rng: Box<dyn RandomSource + Send>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let store = MemoryStore::new(backend, config.memory.clone());
        let plants = PlantPopulation::seeded(config.plants.clone(), SimTime::ZERO, rng.as_mut());
        let session = store.session();
        let arrival = Arrival {
            first_ever: store.is_first_ever(),
            away: store.time_since_last_visit(started_at),
        };
        let last_emotion = session.map_or(EmotionKind::Calm, |s| s.last_emotion);
        let timers = Timers {
            cooldown: SimTime::ZERO + Duration::from_millis(config.tools.cooldown_tick_ms.max(1)),
            inactivity: SimTime::ZERO + Duration::from_secs(1),
            dream: SimTime::ZERO + Duration::from_secs(config.events.dream_interval_secs.max(1)),
            ambient: SimTime::ZERO + Duration::from_secs(config.events.ambient_interval_secs.max(1)),
        };

        let mut garden = Self {
            cycle: EnvironmentCycle::new(config.cycle.clone()),
            config,
            store,
            energy: EnergyState::new(),
            plants,
            scenario: ScenarioState::None,
            scenario_epoch: 0,
            weather: WeatherKind::Clear,
            wind: DEFAULT_WIND,
            overrides: Overrides::default(),
            message: None,
            special: None,
            lightning: Lightning::default(),
            idle_secs: 0,
            current_emotion: EmotionKind::Calm,
            last_emotion,
            intensity: DEFAULT_INTENSITY,
            cooldowns: ToolCooldowns::default(),
            rng,
            started_at,
            now: SimTime::ZERO,
            queue: EffectQueue::new(),
            timers,
            running: true,
        };

        let opening = scenario::on_startup(arrival, &garden.config, garden.rng.as_mut());
        garden.apply(opening);
        if !arrival.first_ever {
            garden.store.record_visit(started_at, garden.last_emotion);
        }
        info!(
            scenario = %garden.scenario,
            away_secs = arrival.away.as_secs(),
            plants = garden.plants.len(),
            memories = garden.store.len(),
            "garden opened"
        );
        garden
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Advance simulation time by `dt` and run one frame.
    pub fn advance(&mut self, dt: Duration) {
        if !self.running {
            return;
        }
        let target = self.now + dt;
        loop {
            let due = match self.queue.peek_due() {
                Some(effect_due) => effect_due.min(self.timers.earliest()),
                None => self.timers.earliest(),
            };
            if due > target {
                break;
            }
            self.now = self.now.max(due);
            self.fire_timers();
            self.fire_due_effects();
        }
        self.now = target;
        self.frame();
    }

    fn fire_timers(&mut self) {
        let now = self.now;

        if self.timers.cooldown <= now {
            self.cooldowns.step(self.config.tools.cooldown_step);
            self.timers.cooldown = now + Duration::from_millis(self.config.tools.cooldown_tick_ms.max(1));
        }

        if self.timers.inactivity <= now {
            self.idle_secs = self.idle_secs.saturating_add(1);
            if let Some(t) = scenario::on_inactivity(self.scenario, self.idle_secs, &self.config) {
                debug!(idle_secs = self.idle_secs, "silence settles");
                self.apply(t);
            }
            self.timers.inactivity = now + Duration::from_secs(1);
        }

        if self.timers.dream <= now {
            if let Some(t) = scenario::on_dream_roll(self.scenario, &self.config, self.rng.as_mut()) {
                debug!("dream distortion");
                self.apply(t);
            }
            self.timers.dream = now + Duration::from_secs(self.config.events.dream_interval_secs.max(1));
        }

        if self.timers.ambient <= now {
            let conditions = Conditions {
                phase: self.phase(),
                weather: self.effective_weather(),
                emotion: self.current_emotion,
            };
            if let Some(t) = scenario::on_ambient_roll(conditions, &self.config, self.rng.as_mut()) {
                debug!(?conditions, "ambient event");
                self.apply(t);
            }
            self.timers.ambient = now + Duration::from_secs(self.config.events.ambient_interval_secs.max(1));
        }
    }

    fn fire_due_effects(&mut self) {
        while let Some(queued) = self.queue.pop_due(self.now) {
            if queued.epoch.is_some_and(|epoch| epoch != self.scenario_epoch) {
                trace!(effect = ?queued.effect, "dropping effect from an ended scenario");
                continue;
            }
            self.apply_effect(queued.effect);
        }
    }

    fn frame(&mut self) {
        self.energy.tick(self.now, self.current_emotion, &self.config.energy);
        self.plants.tick(self.now, &self.energy);

        if self.current_emotion.is_heavy()
            && !self.lightning.is_active()
            && self.rng.chance(self.config.events.lightning_probability)
        {
            self.lightning.strike(self.now);
        }
        self.lightning.update(self.now);

        if self
            .message
            .as_ref()
            .and_then(|m| m.expires_at)
            .is_some_and(|until| until <= self.now)
        {
            self.message = None;
        }
        if self.special.is_some_and(|s| s.until <= self.now) {
            self.special = None;
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn enter(&mut self, state: ScenarioState) {
        self.scenario_epoch += 1;
        self.message = None;
        if state != self.scenario {
            debug!(from = %self.scenario, to = %state, "scenario change");
        }
        self.scenario = state;
    }

    fn apply(&mut self, transition: Transition) {
        if let Some(state) = transition.enter {
            self.enter(state);
        }
        for scheduled in transition.effects {
            if scheduled.delay.is_zero() {
                self.apply_effect(scheduled.effect);
            } else {
                let epoch = match scheduled.scope {
                    Scope::Scenario => Some(self.scenario_epoch),
                    Scope::Detached => None,
                };
                self.queue.schedule(self.now + scheduled.delay, epoch, scheduled.effect);
            }
        }
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::SetWeather(kind) => self.weather = kind,
            Effect::SetWind(wind) => self.wind = wind.clamp(0.0, 1.0),
            Effect::ShowMessage { text, duration } => {
                self.message = Some(DisplayMessage {
                    text,
                    shown_at: self.now,
                    expires_at: duration.map(|d| self.now + d),
                });
            }
            Effect::StartSpecialEvent { event, duration } => {
                self.special = Some(ActiveEvent {
                    event,
                    until: self.now + duration,
                });
            }
            Effect::Spawn {
                position,
                color,
                emotion,
            } => {
                self.plants.spawn(position, color, emotion, self.now);
            }
            Effect::Despawn => {
                self.plants.despawn(self.rng.as_mut());
            }
            Effect::EndScenario => {
                debug!(from = %self.scenario, "scenario ended");
                self.scenario = ScenarioState::None;
            }
        }
    }

    /// Reset the inactivity counter; lifts silence immediately.
    pub fn note_interaction(&mut self) {
        self.idle_secs = 0;
        if self.scenario == ScenarioState::Silence {
            self.enter(ScenarioState::None);
        }
    }

    // -----------------------------------------------------------------------
    // User actions
    // -----------------------------------------------------------------------

    /// Classify and react to submitted text.
    ///
    /// Empty or whitespace-only text, and anything submitted after
    /// shutdown, is ignored and returns `None`.
    pub fn submit_text(&mut self, text: &str) -> Option<Submission> {
        if !self.running {
            warn!("submission after shutdown ignored");
            return None;
        }
        let verdict = match classify(text) {
            Ok(verdict) => verdict,
            Err(GardenError::EmptySubmission) => {
                debug!("empty submission ignored");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "classification failed, submission ignored");
                return None;
            }
        };

        self.note_interaction();
        let (branch, transition) = scenario::on_submission(
            self.scenario,
            self.last_emotion,
            &verdict,
            &self.config,
            self.rng.as_mut(),
        );
        info!(
            emotion = %verdict.primary,
            intensity = verdict.intensity,
            ?branch,
            spawns = transition.spawn_count(),
            despawns = transition.despawn_count(),
            "submission"
        );
        self.apply(transition);

        let wall = self.wall_clock();
        let record = self.store.append(text, verdict.clone(), wall, self.rng.as_mut());
        self.current_emotion = verdict.primary;
        self.last_emotion = verdict.primary;
        self.intensity = verdict.intensity;
        self.store.record_visit(wall, verdict.primary);

        Some(Submission {
            verdict,
            branch,
            record,
        })
    }

    /// Use a garden tool. Returns the tool's memory record, or `None` if
    /// the tool is cooling down, the garden is still waiting for its first
    /// feeling, or it has shut down.
    pub fn use_tool(&mut self, tool: GardenTool) -> Option<MemoryRecord> {
        if !self.running || self.scenario == ScenarioState::FirstVisit {
            debug!(%tool, scenario = %self.scenario, "tool unavailable");
            return None;
        }
        if !self.cooldowns.is_ready(tool) {
            debug!(%tool, remaining = self.cooldowns.get(tool), "tool cooling down");
            return None;
        }
        *self.cooldowns.slot(tool) = self.config.tools.cooldown;
        self.note_interaction();

        let transition = scenario::on_tool(tool, &self.config, self.rng.as_mut());
        info!(
            %tool,
            spawns = transition.spawn_count(),
            despawns = transition.despawn_count(),
            "tool used"
        );
        self.apply(transition);

        let wall = self.wall_clock();
        Some(
            self.store
                .append(tool.memory_text(), tool.verdict(), wall, self.rng.as_mut()),
        )
    }

    /// Bring a stored memory back to the surface.
    ///
    /// # Errors
    /// Returns [`GardenError::MemoryNotFound`] if no record has this ID.
    pub fn recall(&mut self, id: MemoryId) -> Result<MemoryRecord> {
        let record = self.store.get(id)?;
        self.current_emotion = record.emotion.primary;
        self.intensity = record.emotion.intensity * RECALL_DAMPING;
        self.apply_effect(Effect::ShowMessage {
            text: format!("you planted: \"{}\" — {}", record.text, record.reflection),
            duration: Some(Duration::from_millis(self.config.scenario.recall_message_ms)),
        });
        debug!(id = %record.id, emotion = %record.emotion.primary, "memory recalled");
        Ok(record)
    }

    /// Pin or release the phase of the day.
    pub fn set_time_of_day(&mut self, phase: Option<TimeOfDay>) {
        self.overrides.time_of_day = phase;
    }

    /// Force or release the base weather.
    pub fn set_weather(&mut self, weather: Option<WeatherKind>) {
        self.overrides.weather = weather;
    }

    /// Force or release the wind intensity.
    pub fn set_wind_intensity(&mut self, wind: Option<f32>) {
        self.overrides.wind_intensity = wind.map(|w| w.clamp(0.0, 1.0));
    }

    /// Strike lightning now, unless a strike is already in progress.
    pub fn trigger_lightning(&mut self) -> bool {
        self.lightning.strike(self.now)
    }

    /// Forget every memory and the session state.
    pub fn clear_memories(&mut self) {
        self.store.clear();
        info!("garden memories cleared");
    }

    /// Stop the garden: every pending effect and periodic timer is dropped.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        let dropped = self.queue.len();
        self.queue.clear();
        self.running = false;
        info!(dropped, "garden shut down");
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Current simulation time.
    #[must_use]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Wall-clock time derived from the start time and simulation time.
    #[must_use]
    pub fn wall_clock(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.now.0).map_or(self.started_at, |d| self.started_at + d)
    }

    /// Whether timers are still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Active scenario.
    #[must_use]
    pub fn scenario(&self) -> ScenarioState {
        self.scenario
    }

    /// Current primary emotion.
    #[must_use]
    pub fn current_emotion(&self) -> EmotionKind {
        self.current_emotion
    }

    /// Current emotional intensity.
    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Seconds since the last interaction.
    #[must_use]
    pub fn idle_secs(&self) -> u32 {
        self.idle_secs
    }

    /// Base weather after overrides.
    #[must_use]
    pub fn effective_weather(&self) -> WeatherKind {
        self.overrides.weather_or(self.weather)
    }

    /// Automatic base weather, ignoring overrides.
    #[must_use]
    pub fn automatic_weather(&self) -> WeatherKind {
        self.weather
    }

    /// Wind intensity after overrides.
    #[must_use]
    pub fn effective_wind(&self) -> f32 {
        self.overrides.wind_or(self.wind)
    }

    /// Phase of the day after overrides.
    #[must_use]
    pub fn phase(&self) -> TimeOfDay {
        self.cycle.phase(self.now.0, self.overrides.time_of_day)
    }

    /// Manual selections in force.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        self.overrides
    }

    /// Message on screen.
    #[must_use]
    pub fn message(&self) -> Option<&DisplayMessage> {
        self.message.as_ref()
    }

    /// Active overlay.
    #[must_use]
    pub fn special_event(&self) -> Option<SpecialEvent> {
        self.special.map(|s| s.event)
    }

    /// Tool cooldowns.
    #[must_use]
    pub fn cooldowns(&self) -> ToolCooldowns {
        self.cooldowns
    }

    /// Energy balance.
    #[must_use]
    pub fn energy(&self) -> EnergyState {
        self.energy
    }

    /// The plant arena.
    #[must_use]
    pub fn plants(&self) -> &PlantPopulation {
        &self.plants
    }

    /// Take the plant diffs accumulated since the last call.
    pub fn drain_diffs(&mut self) -> Vec<PopulationDiff> {
        self.plants.drain_diffs()
    }

    /// Every stored memory, oldest first.
    #[must_use]
    pub fn memories(&self) -> Vec<MemoryRecord> {
        self.store.list_all()
    }

    /// The memory store.
    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Number of effects waiting in the queue.
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.queue.len()
    }

    /// Bundle the current state for renderers.
    #[must_use]
    pub fn snapshot(&self) -> GardenSnapshot {
        let wind_intensity = self.effective_wind();
        GardenSnapshot {
            elapsed: self.now,
            scenario: self.scenario,
            emotion: self.current_emotion,
            environment: self
                .cycle
                .sample(self.now.0, self.overrides.time_of_day, wind_intensity),
            weather: WeatherView {
                kind: self.effective_weather(),
                intensity: self.intensity,
                wind_intensity,
                special_event: self.special_event(),
            },
            overrides: self.overrides,
            message: self.message.clone(),
            lightning: self.lightning.intensity(self.now),
            energy: self.energy,
            cooldowns: self.cooldowns,
            plants: self.plants.iter().cloned().collect(),
        }
    }
}
