//! Scenario state machine: pure transition functions.
//!
//! Every function here takes the relevant slice of garden state plus an
//! event, and returns a [`Transition`]: the scenario to enter (if any) and a
//! list of `(delay, effect)` pairs. Nothing is mutated and nothing sleeps.
//! The orchestrator applies immediate effects, queues the delayed ones, and
//! owns the clock.
//!
//! ## Submission priority
//!
//! ```text
//!   first visit open          → FirstSeed
//!   extreme anger/loneliness  → EmotionalStorm
//!   extreme joy/calm          → SereneBloom
//!   ambiguous                 → Ambiguity
//!   overloaded                → Overloaded
//!   shift from non-calm       → EmotionalShift
//!   otherwise                 → Normal
//! ```
//!
//! Effects marked [`Scope::Scenario`] belong to the scenario being entered
//! and are dropped if another scenario starts before they fire. Messages
//! are always scenario-bound; plant effects are always [`Scope::Detached`].

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classifier::EmotionVerdict;
use crate::config::GardenConfig;
use crate::plants::Palette;
use crate::random::{pick, RandomSource};
use crate::types::{EmotionKind, FieldPosition, Rgb, SpecialEvent, TimeOfDay, WeatherKind};

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// The single active high-level mode of the garden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioState {
    /// Nothing special is happening.
    #[default]
    None,
    /// Brand-new garden waiting for its first feeling.
    FirstVisit,
    /// Back after two days or more.
    Overgrown,
    /// Back after a few hours.
    Returning,
    /// No interaction for a while.
    Silence,
    /// A short random distortion.
    DreamDistortion,
    /// Extreme anger or loneliness.
    EmotionalStorm,
    /// Extreme joy or calm.
    SereneBloom,
    /// Too many words at once.
    Overloaded,
    /// The mood turned away from a non-calm feeling.
    EmotionalShift,
}

impl ScenarioState {
    /// Snake-case name, matching the serialized form.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::FirstVisit => "first_visit",
            Self::Overgrown => "overgrown",
            Self::Returning => "returning",
            Self::Silence => "silence",
            Self::DreamDistortion => "dream_distortion",
            Self::EmotionalStorm => "emotional_storm",
            Self::SereneBloom => "serene_bloom",
            Self::Overloaded => "overloaded",
            Self::EmotionalShift => "emotional_shift",
        }
    }

    /// Dream distortions may only start from these states.
    #[must_use]
    pub fn is_idle(self) -> bool {
        matches!(self, Self::None | Self::Silence)
    }

    /// Silence may only settle over these states.
    #[must_use]
    pub fn admits_silence(self) -> bool {
        matches!(self, Self::None | Self::DreamDistortion)
    }
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// A single side effect for the orchestrator to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Set the automatic base weather.
    SetWeather(WeatherKind),
    /// Set the automatic wind intensity.
    SetWind(f32),
    /// Replace the displayed message. `None` duration means it stays until
    /// replaced.
    ShowMessage {
        /// Text to display.
        text: String,
        /// How long it stays up.
        duration: Option<Duration>,
    },
    /// Start an overlay that clears itself after `duration`.
    StartSpecialEvent {
        /// Which overlay.
        event: SpecialEvent,
        /// How long it lasts.
        duration: Duration,
    },
    /// Plant a newborn.
    Spawn {
        /// Where.
        position: FieldPosition,
        /// Bloom color.
        color: Rgb,
        /// Emotion tag.
        emotion: EmotionKind,
    },
    /// Remove one random plant, subject to the floor.
    Despawn,
    /// Return to [`ScenarioState::None`].
    EndScenario,
}

/// Whether a delayed effect survives a scenario change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// Fires regardless of later scenario changes.
    Detached,
    /// Dropped if a different scenario is entered first.
    Scenario,
}

/// An effect with its delay relative to the triggering event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEffect {
    /// Delay from the event; zero means apply immediately.
    pub delay: Duration,
    /// What to do.
    pub effect: Effect,
    /// Lifetime binding.
    pub scope: Scope,
}

/// The output of every transition function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    /// Scenario to enter. `None` leaves the current scenario in place.
    pub enter: Option<ScenarioState>,
    /// Effects in scheduling order.
    pub effects: Vec<ScheduledEffect>,
}

impl Transition {
    fn entering(state: ScenarioState) -> Self {
        Self {
            enter: Some(state),
            effects: Vec::new(),
        }
    }

    fn now(&mut self, effect: Effect) -> &mut Self {
        self.after(Duration::ZERO, effect)
    }

    fn after(&mut self, delay: Duration, effect: Effect) -> &mut Self {
        self.effects.push(ScheduledEffect {
            delay,
            effect,
            scope: Scope::Detached,
        });
        self
    }

    fn bound_after(&mut self, delay: Duration, effect: Effect) -> &mut Self {
        self.effects.push(ScheduledEffect {
            delay,
            effect,
            scope: Scope::Scenario,
        });
        self
    }

    /// Messages belong to the scenario that queued them, so a delayed one
    /// never lands on top of a newer scenario's message.
    fn message(&mut self, delay: Duration, text: impl Into<String>, duration: Option<Duration>) -> &mut Self {
        self.bound_after(
            delay,
            Effect::ShowMessage {
                text: text.into(),
                duration,
            },
        )
    }

    fn atmosphere(&mut self, weather: WeatherKind, wind: f32) -> &mut Self {
        self.now(Effect::SetWeather(weather)).now(Effect::SetWind(wind))
    }

    /// Number of spawn effects, in any position.
    #[must_use]
    pub fn spawn_count(&self) -> usize {
        self.effects
            .iter()
            .filter(|e| matches!(e.effect, Effect::Spawn { .. }))
            .count()
    }

    /// Number of despawn effects.
    #[must_use]
    pub fn despawn_count(&self) -> usize {
        self.effects
            .iter()
            .filter(|e| matches!(e.effect, Effect::Despawn))
            .count()
    }

    /// The first immediate weather change, if any.
    #[must_use]
    pub fn weather(&self) -> Option<WeatherKind> {
        self.effects.iter().find_map(|e| match e.effect {
            Effect::SetWeather(w) if e.delay.is_zero() => Some(w),
            _ => None,
        })
    }
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// A run of spawns spaced `step` apart, the first at `offset`.
struct SpawnWave {
    count: usize,
    offset: Duration,
    step: Duration,
    palette: Palette,
    emotion: EmotionKind,
}

impl SpawnWave {
    fn queue(self, transition: &mut Transition, half_extent: f32, rng: &mut dyn RandomSource) {
        let mut delay = self.offset;
        for _ in 0..self.count {
            let position = rng.scatter(half_extent);
            let color = self.palette.sample(rng);
            transition.after(
                delay,
                Effect::Spawn {
                    position,
                    color,
                    emotion: self.emotion,
                },
            );
            delay += self.step;
        }
    }
}

fn staggered_despawns(transition: &mut Transition, count: usize, step: Duration) {
    let mut delay = Duration::ZERO;
    for _ in 0..count {
        transition.after(delay, Effect::Despawn);
        delay += step;
    }
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

const GREETINGS: [&str; 3] = [
    "welcome back to your garden...",
    "the flowers remember you...",
    "your feelings await...",
];

/// What the garden knows about the visitor when it opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrival {
    /// No records and no session state exist.
    pub first_ever: bool,
    /// Time since the last recorded visit.
    pub away: Duration,
}

/// Pick the opening scenario.
#[must_use]
pub fn on_startup(arrival: Arrival, config: &GardenConfig, rng: &mut dyn RandomSource) -> Transition {
    let scenario = &config.scenario;
    let display = ms(scenario.absence_display_ms);

    if arrival.first_ever {
        let mut t = Transition::entering(ScenarioState::FirstVisit);
        t.message(Duration::ZERO, "Tell me something you feel.", None);
        return t;
    }

    if arrival.away >= scenario.overgrown_after() {
        let mut t = Transition::entering(ScenarioState::Overgrown);
        t.atmosphere(WeatherKind::Cloudy, 0.8)
            .message(Duration::ZERO, "I grew wild without you.", Some(display))
            .bound_after(display, Effect::EndScenario);
        return t;
    }

    if arrival.away >= scenario.returning_after() {
        let mut t = Transition::entering(ScenarioState::Returning);
        t.now(Effect::SetWeather(WeatherKind::Clear))
            .message(Duration::ZERO, "I remained quiet while you were away.", Some(display))
            .bound_after(display, Effect::EndScenario);
        return t;
    }

    let delay = ms(scenario.greeting_delay_ms);
    let shown_for = ms(scenario.greeting_clear_ms).saturating_sub(delay);
    let mut t = Transition::entering(ScenarioState::None);
    t.message(delay, *pick(rng, &GREETINGS), Some(shown_for));
    t
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// Which response a submission selects, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionBranch {
    /// The first feeling of a brand-new garden.
    FirstSeed,
    /// Extreme anger or loneliness.
    Storm,
    /// Extreme joy or calm.
    Bloom,
    /// Hedged or unsure wording.
    Ambiguity,
    /// More than thirty words.
    Overloaded,
    /// Turned away from a non-calm feeling.
    Shift,
    /// Plain response.
    Normal,
}

/// Choose the branch for a verdict.
#[must_use]
pub fn select_branch(
    current: ScenarioState,
    last_emotion: EmotionKind,
    verdict: &EmotionVerdict,
) -> SubmissionBranch {
    let primary = verdict.primary;
    if current == ScenarioState::FirstVisit {
        SubmissionBranch::FirstSeed
    } else if verdict.is_extreme && primary.is_heavy() {
        SubmissionBranch::Storm
    } else if verdict.is_extreme && primary.is_uplifting() {
        SubmissionBranch::Bloom
    } else if verdict.is_ambiguous {
        SubmissionBranch::Ambiguity
    } else if verdict.is_overloaded {
        SubmissionBranch::Overloaded
    } else if last_emotion != primary && last_emotion != EmotionKind::Calm {
        SubmissionBranch::Shift
    } else {
        SubmissionBranch::Normal
    }
}

/// Flavor lines for the plain response.
#[must_use]
pub fn responses(kind: EmotionKind) -> &'static [&'static str] {
    match kind {
        EmotionKind::Calm => &[
            "a peaceful flower blooms under gentle blue sky...",
            "your calm thoughts settle into the soil like morning dew...",
            "the garden breathes softly, wind whispers through leaves...",
            "tranquility takes root as clouds drift by...",
        ],
        EmotionKind::Anger => &[
            "fierce red blooms emerge as storm clouds gather...",
            "lightning illuminates your rage, rain falls heavy...",
            "hot petals unfold as thunder rolls across the sky...",
            "the garden trembles in the tempest of feeling...",
        ],
        EmotionKind::Nostalgia => &[
            "amber flowers grow as clouds veil the sun...",
            "the past blooms in warm, faded colors at dusk...",
            "golden petals drift like memories in gentle breeze...",
            "the garden holds what time forgot in soft twilight...",
        ],
        EmotionKind::Joy => &[
            "bright flowers dance as sun blazes overhead...",
            "your happiness becomes wild blooms under clear sky...",
            "petals scatter in joyful wind, clouds part for light...",
            "the garden celebrates under the radiant sun...",
        ],
        EmotionKind::Confusion => &[
            "strange purple flowers twist as fog rolls in...",
            "uncertainty blooms while mist obscures the path...",
            "the garden grows curious shapes in dim, foggy light...",
            "mystery takes root as clouds drift low and thick...",
        ],
        EmotionKind::Loneliness => &[
            "a single flower stands as rain begins to fall...",
            "your solitude becomes deep petals under grey sky...",
            "lightning flashes on lone blooms in the drizzle...",
            "the garden sits with you as storm clouds gather...",
        ],
    }
}

/// Plant changes for every branch except storm and bloom.
fn ordinary_growth(transition: &mut Transition, primary: EmotionKind, config: &GardenConfig, rng: &mut dyn RandomSource) {
    if primary.is_uplifting() {
        SpawnWave {
            count: rng.count_between(3, 6),
            offset: Duration::ZERO,
            step: ms(200),
            palette: Palette::Joyful,
            emotion: primary,
        }
        .queue(transition, config.plants.field_half_extent, rng);
    } else if primary.is_heavy() || primary == EmotionKind::Confusion {
        let count = rng.count_between(2, 4);
        staggered_despawns(transition, count, ms(300));
    }
}

/// React to a classified submission.
#[must_use]
pub fn on_submission(
    current: ScenarioState,
    last_emotion: EmotionKind,
    verdict: &EmotionVerdict,
    config: &GardenConfig,
    rng: &mut dyn RandomSource,
) -> (SubmissionBranch, Transition) {
    let scenario = &config.scenario;
    let primary = verdict.primary;
    let short = Some(ms(scenario.short_message_ms));
    let branch = select_branch(current, last_emotion, verdict);

    let t = match branch {
        SubmissionBranch::FirstSeed => {
            let mut t = Transition::entering(ScenarioState::None);
            t.message(Duration::ZERO, "Stillness is your first seed.", short)
                .now(Effect::SetWeather(primary.weather()));
            ordinary_growth(&mut t, primary, config, rng);
            t
        }
        SubmissionBranch::Storm => {
            let length = ms(scenario.extreme_display_ms);
            let mut t = Transition::entering(ScenarioState::EmotionalStorm);
            t.now(Effect::StartSpecialEvent {
                event: SpecialEvent::EmotionalStorm,
                duration: length,
            })
            .atmosphere(WeatherKind::Storm, 1.0)
            .message(
                Duration::ZERO,
                "Your emotions tear through the fabric of stillness.",
                Some(length),
            );
            let count = rng.count_between(5, 10);
            staggered_despawns(&mut t, count, ms(100));
            t.bound_after(length, Effect::EndScenario)
                .bound_after(length, Effect::SetWeather(WeatherKind::Rainy))
                .bound_after(length, Effect::SetWind(0.7));
            t
        }
        SubmissionBranch::Bloom => {
            let length = ms(scenario.extreme_display_ms);
            let mut t = Transition::entering(ScenarioState::SereneBloom);
            t.now(Effect::StartSpecialEvent {
                event: SpecialEvent::SereneBloom,
                duration: length,
            })
            .atmosphere(WeatherKind::Clear, 0.2)
            .message(
                Duration::ZERO,
                "Pure joy blooms like wildflowers in spring.",
                Some(length),
            );
            SpawnWave {
                count: rng.count_between(10, 17),
                offset: Duration::ZERO,
                step: ms(150),
                palette: Palette::Bloom,
                emotion: EmotionKind::Joy,
            }
            .queue(&mut t, config.plants.field_half_extent, rng);
            t.bound_after(length, Effect::EndScenario);
            t
        }
        SubmissionBranch::Ambiguity => {
            let mut t = Transition::entering(ScenarioState::None);
            t.message(Duration::ZERO, "Uncertainty is a feeling, too.", short)
                .atmosphere(WeatherKind::Cloudy, 0.6);
            ordinary_growth(&mut t, primary, config, rng);
            t
        }
        SubmissionBranch::Overloaded => {
            let length = ms(scenario.overloaded_display_ms);
            let mut t = Transition::entering(ScenarioState::Overloaded);
            t.message(Duration::ZERO, "You feel many worlds at once.", Some(length))
                .atmosphere(WeatherKind::Storm, 0.9);
            ordinary_growth(&mut t, primary, config, rng);
            t.bound_after(length, Effect::EndScenario);
            t
        }
        SubmissionBranch::Shift => {
            let mut t = Transition::entering(ScenarioState::EmotionalShift);
            t.message(Duration::ZERO, "Your storm breaks my stillness.", short)
                .now(Effect::SetWeather(primary.weather()));
            ordinary_growth(&mut t, primary, config, rng);
            t.bound_after(ms(scenario.shift_display_ms), Effect::EndScenario);
            t
        }
        SubmissionBranch::Normal => {
            let delay = ms(scenario.response_delay_ms);
            let shown_for = ms(scenario.response_clear_ms).saturating_sub(delay);
            let mut t = Transition::entering(ScenarioState::None);
            t.now(Effect::SetWeather(primary.weather()))
                .message(delay, *pick(rng, responses(primary)), Some(shown_for));
            ordinary_growth(&mut t, primary, config, rng);
            t
        }
    };
    (branch, t)
}

// ---------------------------------------------------------------------------
// Periodic triggers
// ---------------------------------------------------------------------------

/// Silence settles once inactivity passes the threshold.
#[must_use]
pub fn on_inactivity(current: ScenarioState, idle_secs: u32, config: &GardenConfig) -> Option<Transition> {
    if idle_secs <= config.scenario.silence_after_secs || !current.admits_silence() {
        return None;
    }
    let mut t = Transition::entering(ScenarioState::Silence);
    t.message(
        Duration::ZERO,
        "Silence grows its own flowers.",
        Some(ms(config.scenario.short_message_ms)),
    )
    .now(Effect::SetWind(0.2));
    Some(t)
}

/// Roll for a dream distortion.
#[must_use]
pub fn on_dream_roll(
    current: ScenarioState,
    config: &GardenConfig,
    rng: &mut dyn RandomSource,
) -> Option<Transition> {
    if !current.is_idle() || !rng.chance(config.events.dream_probability) {
        return None;
    }
    let length = ms(config.events.dream_duration_ms);
    let mut t = Transition::entering(ScenarioState::DreamDistortion);
    t.message(Duration::ZERO, "Time is not real here.", Some(length))
        .bound_after(length, Effect::EndScenario);
    Some(t)
}

/// What the ambient roll looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conditions {
    /// Effective phase of the day.
    pub phase: TimeOfDay,
    /// Effective base weather.
    pub weather: WeatherKind,
    /// Current primary emotion.
    pub emotion: EmotionKind,
}

/// Roll for an ambient weather overlay. Never changes the scenario.
#[must_use]
pub fn on_ambient_roll(
    conditions: Conditions,
    config: &GardenConfig,
    rng: &mut dyn RandomSource,
) -> Option<Transition> {
    if !rng.chance(config.events.ambient_probability) {
        return None;
    }
    let events = &config.events;
    let (event, text, length) = match conditions.weather {
        WeatherKind::Clear if conditions.phase == TimeOfDay::Night => (
            SpecialEvent::MeteorShower,
            "Stars fall like forgotten wishes.",
            ms(events.meteor_duration_ms),
        ),
        WeatherKind::Clear if conditions.emotion == EmotionKind::Calm => (
            SpecialEvent::Snowfall,
            "Silence crystallizes into snow.",
            ms(events.overlay_duration_ms),
        ),
        WeatherKind::Cloudy | WeatherKind::Rainy => (
            SpecialEvent::BloomingFog,
            "Mist blooms with colors you cannot name.",
            ms(events.overlay_duration_ms),
        ),
        _ => return None,
    };
    let mut t = Transition::default();
    t.now(Effect::StartSpecialEvent {
        event,
        duration: length,
    })
    .message(Duration::ZERO, text, Some(length));
    Some(t)
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// The three hands-on garden tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GardenTool {
    /// Rain down a few calm blooms.
    Water,
    /// Cut back a few plants.
    Prune,
    /// Blow away wilted plants, then regrow.
    Chase,
}

impl GardenTool {
    /// Every tool.
    pub const ALL: [Self; 3] = [Self::Water, Self::Prune, Self::Chase];

    /// Text of the memory record the tool leaves behind.
    #[must_use]
    pub fn memory_text(self) -> &'static str {
        match self {
            Self::Water => "watered the garden",
            Self::Prune => "pruned the overgrowth",
            Self::Chase => "chased away wilted flowers",
        }
    }

    /// Fixed verdict stored with the tool's memory record.
    #[must_use]
    pub fn verdict(self) -> EmotionVerdict {
        match self {
            Self::Water => EmotionVerdict::synthetic(EmotionKind::Calm, 0.6),
            Self::Prune => EmotionVerdict::synthetic(EmotionKind::Calm, 0.5),
            Self::Chase => EmotionVerdict::synthetic(EmotionKind::Nostalgia, 0.5),
        }
    }
}

impl fmt::Display for GardenTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Water => "water",
            Self::Prune => "prune",
            Self::Chase => "chase",
        })
    }
}

/// Effects of using a tool. Tools never change the scenario.
#[must_use]
pub fn on_tool(tool: GardenTool, config: &GardenConfig, rng: &mut dyn RandomSource) -> Transition {
    let half_extent = config.plants.field_half_extent;
    let mut t = Transition::default();
    match tool {
        GardenTool::Water => {
            SpawnWave {
                count: rng.count_between(2, 4),
                offset: Duration::ZERO,
                step: ms(150),
                palette: Palette::Water,
                emotion: EmotionKind::Calm,
            }
            .queue(&mut t, half_extent, rng);
            t.atmosphere(WeatherKind::Rainy, 0.3)
                .message(Duration::ZERO, "The thirst is quenched. New life stirs.", Some(ms(4_000)))
                .after(ms(4_000), Effect::SetWeather(WeatherKind::Clear));
        }
        GardenTool::Prune => {
            let count = rng.count_between(2, 5);
            staggered_despawns(&mut t, count, ms(200));
            t.now(Effect::SetWind(0.7))
                .message(Duration::ZERO, "Order restored. What overgrows must fall.", Some(ms(4_000)))
                .after(ms(4_000), Effect::SetWind(0.5));
        }
        GardenTool::Chase => {
            let removed = rng.count_between(1, 3);
            staggered_despawns(&mut t, removed, ms(100));
            SpawnWave {
                count: rng.count_between(3, 6),
                offset: ms(800),
                step: ms(150),
                palette: Palette::Chase,
                emotion: EmotionKind::Joy,
            }
            .queue(&mut t, half_extent, rng);
            t.now(Effect::SetWind(0.9))
                .message(Duration::ZERO, "The wilted scatter like ash. New blooms rise.", Some(ms(5_000)))
                .after(ms(5_000), Effect::SetWind(0.5));
        }
    }
    t
}
