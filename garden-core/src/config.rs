//! Configuration for the garden simulation.
//!
//! Maps directly to `garden.toml`. Every section and field is optional; the
//! defaults reproduce the tuned behaviour of the garden.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level garden configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GardenConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Memory store capacity and storage keys.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Emotional energy accumulation.
    #[serde(default)]
    pub energy: EnergyConfig,
    /// Plant population tuning.
    #[serde(default)]
    pub plants: PlantConfig,
    /// Day/night cycle.
    #[serde(default)]
    pub cycle: CycleConfig,
    /// Scenario thresholds and display durations.
    #[serde(default)]
    pub scenario: ScenarioConfig,
    /// Random periodic events.
    #[serde(default)]
    pub events: EventConfig,
    /// Garden tool cooldowns.
    #[serde(default)]
    pub tools: ToolConfig,
}

impl GardenConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `GardenError::Config` if the TOML is invalid or a value is
    /// out of range.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| crate::GardenError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    ///
    /// # Errors
    /// Returns `GardenError::Config` naming the first offending field.
    pub fn validate(&self) -> crate::error::Result<()> {
        let absences = [
            ("scenario.returning_after_hours", self.scenario.returning_after_hours),
            ("scenario.overgrown_after_hours", self.scenario.overgrown_after_hours),
        ];
        for (field, value) in absences {
            if !value.is_finite() || value < 0.0 {
                return Err(crate::GardenError::Config(format!(
                    "{field} must be a finite, non-negative number of hours, got {value}"
                )));
            }
        }
        let period = self.cycle.period_secs;
        if !period.is_finite() || period <= 0.0 {
            return Err(crate::GardenError::Config(format!(
                "cycle.period_secs must be positive, got {period}"
            )));
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Hours as a `Duration`. Negative and NaN map to zero, overflow saturates.
fn hours(h: f64) -> Duration {
    if h.is_nan() || h <= 0.0 {
        Duration::ZERO
    } else {
        Duration::try_from_secs_f64(h * 3600.0).unwrap_or(Duration::MAX)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Logging settings, consumed by the host when installing a subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Memory store capacity and backend keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Maximum records kept; oldest are evicted first.
    pub capacity: usize,
    /// Backend key holding the serialized record list.
    pub memories_key: String,
    /// Backend key holding the session state.
    pub session_key: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            memories_key: "garden_memories".to_string(),
            session_key: "garden_state".to_string(),
        }
    }
}

/// Emotional energy model tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Minimum spacing between energy updates, in milliseconds.
    pub tick_interval_ms: u64,
    /// Amount added to the fed side per tick.
    pub gain: f32,
    /// Amount drained from the opposite side per tick.
    pub drain: f32,
    /// Decay applied to both sides for neutral emotions.
    pub neutral_decay: f32,
    /// Upper bound for either side.
    pub ceiling: f32,
}

impl EnergyConfig {
    /// Tick interval as a `Duration`.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        millis(self.tick_interval_ms)
    }
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2_000,
            gain: 0.5,
            drain: 0.3,
            neutral_decay: 0.1,
            ceiling: 10.0,
        }
    }
}

/// Plant population tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    /// Random despawns never shrink the population below this size.
    pub floor: usize,
    /// Length of the newborn glow window, in milliseconds.
    pub newborn_window_ms: u64,
    /// Fraction of the remaining gap closed by `growth_scale` each frame.
    pub approach_rate: f32,
    /// Plants seeded into a brand-new garden.
    pub initial_population: usize,
    /// Plants are scattered in `[-half_extent, half_extent]` on both axes.
    pub field_half_extent: f32,
    /// Energy above which growth or wilting kicks in.
    pub energy_threshold: f32,
    /// Health change per frame while growing or wilting.
    pub health_step: f32,
    /// Health drift per frame while neutral.
    pub health_drift: f32,
}

impl PlantConfig {
    /// Newborn window as a `Duration`.
    #[must_use]
    pub fn newborn_window(&self) -> Duration {
        millis(self.newborn_window_ms)
    }
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            floor: 5,
            newborn_window_ms: 5_000,
            approach_rate: 0.01,
            initial_population: 20,
            field_half_extent: 10.0,
            energy_threshold: 3.0,
            health_step: 0.001,
            health_drift: 0.0005,
        }
    }
}

/// Day/night cycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Full dawn→night period in seconds.
    pub period_secs: f64,
    /// Radius of the sun/moon orbit.
    pub orbit_radius: f32,
    /// Sun height below which stars start to appear.
    pub star_threshold: f32,
    /// Sun height span over which stars fade in fully.
    pub star_fade_span: f32,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            period_secs: 90.0,
            orbit_radius: 40.0,
            star_threshold: -5.0,
            star_fade_span: 10.0,
        }
    }
}

/// Scenario thresholds and display durations (milliseconds unless noted).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Hours away after which the returning greeting plays.
    pub returning_after_hours: f64,
    /// Hours away after which the garden is overgrown.
    pub overgrown_after_hours: f64,
    /// Seconds of inactivity before silence settles in.
    pub silence_after_secs: u32,
    /// How long the overgrown and returning scenarios stay up.
    pub absence_display_ms: u64,
    /// Delay before the ordinary greeting appears.
    pub greeting_delay_ms: u64,
    /// Time from startup until the ordinary greeting is cleared.
    pub greeting_clear_ms: u64,
    /// Storm and bloom scenario length.
    pub extreme_display_ms: u64,
    /// Overloaded scenario length.
    pub overloaded_display_ms: u64,
    /// Emotional shift scenario length.
    pub shift_display_ms: u64,
    /// Message length for shift, ambiguity, first-seed and silence messages.
    pub short_message_ms: u64,
    /// Delay before a normal flavor response is shown.
    pub response_delay_ms: u64,
    /// Time from submission until a normal response is cleared.
    pub response_clear_ms: u64,
    /// Memory recall message length.
    pub recall_message_ms: u64,
}

impl ScenarioConfig {
    /// Duration after which a returning visitor gets a greeting.
    #[must_use]
    pub fn returning_after(&self) -> Duration {
        hours(self.returning_after_hours)
    }

    /// Duration after which the garden is considered overgrown.
    #[must_use]
    pub fn overgrown_after(&self) -> Duration {
        hours(self.overgrown_after_hours)
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            returning_after_hours: 5.0,
            overgrown_after_hours: 48.0,
            silence_after_secs: 60,
            absence_display_ms: 6_000,
            greeting_delay_ms: 1_000,
            greeting_clear_ms: 8_000,
            extreme_display_ms: 8_000,
            overloaded_display_ms: 6_000,
            shift_display_ms: 3_000,
            short_message_ms: 5_000,
            response_delay_ms: 500,
            response_clear_ms: 7_000,
            recall_message_ms: 6_000,
        }
    }
}

/// Random periodic event tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Seconds between dream-distortion rolls.
    pub dream_interval_secs: u64,
    /// Chance per roll.
    pub dream_probability: f64,
    /// How long a dream distortion lasts.
    pub dream_duration_ms: u64,
    /// Seconds between ambient weather-event rolls.
    pub ambient_interval_secs: u64,
    /// Chance per roll.
    pub ambient_probability: f64,
    /// Meteor shower length.
    pub meteor_duration_ms: u64,
    /// Snowfall and blooming fog length.
    pub overlay_duration_ms: u64,
    /// Per-frame chance of lightning while anger or loneliness dominates.
    pub lightning_probability: f64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            dream_interval_secs: 10,
            dream_probability: 0.1,
            dream_duration_ms: 3_000,
            ambient_interval_secs: 15,
            ambient_probability: 0.08,
            meteor_duration_ms: 8_000,
            overlay_duration_ms: 10_000,
            lightning_probability: 0.015,
        }
    }
}

/// Garden tool cooldowns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Cooldown units applied after a tool is used.
    pub cooldown: f32,
    /// Units removed from every cooldown per cooldown tick.
    pub cooldown_step: f32,
    /// Cooldown tick spacing in milliseconds.
    pub cooldown_tick_ms: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            cooldown: 10.0,
            cooldown_step: 0.1,
            cooldown_tick_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = GardenConfig::from_toml("").expect("parse");
        assert_eq!(config.memory.capacity, 50);
        assert_eq!(config.plants.floor, 5);
        assert_eq!(config.energy.tick_interval(), Duration::from_secs(2));
        assert!((config.cycle.period_secs - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = GardenConfig::from_toml(
            r#"
            [memory]
            capacity = 10

            [logging]
            level = "debug"
            "#,
        )
        .expect("parse");
        assert_eq!(config.memory.capacity, 10);
        assert_eq!(config.memory.memories_key, "garden_memories");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.scenario.silence_after_secs, 60);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = GardenConfig::from_toml("[memory\ncapacity = ").expect_err("must fail");
        assert!(matches!(err, crate::GardenError::Config(_)));
    }

    #[test]
    fn absence_thresholds_in_hours() {
        let scenario = ScenarioConfig::default();
        assert_eq!(scenario.returning_after(), Duration::from_secs(5 * 3600));
        assert_eq!(scenario.overgrown_after(), Duration::from_secs(48 * 3600));
    }

    #[test]
    fn bad_absence_hours_are_rejected() {
        for value in ["-1.0", "nan", "inf"] {
            let err = GardenConfig::from_toml(&format!(
                "[scenario]\nreturning_after_hours = {value}\n"
            ))
            .expect_err("must fail");
            assert!(matches!(err, crate::GardenError::Config(ref m) if m.contains("returning_after_hours")));
        }
        let err = GardenConfig::from_toml("[scenario]\novergrown_after_hours = -48.0\n")
            .expect_err("must fail");
        assert!(matches!(err, crate::GardenError::Config(ref m) if m.contains("overgrown_after_hours")));

        let err = GardenConfig::from_toml("[cycle]\nperiod_secs = 0.0\n").expect_err("must fail");
        assert!(matches!(err, crate::GardenError::Config(_)));
    }

    #[test]
    fn unvalidated_hours_never_panic() {
        let scenario = ScenarioConfig {
            returning_after_hours: -3.0,
            overgrown_after_hours: f64::NAN,
            ..ScenarioConfig::default()
        };
        assert_eq!(scenario.returning_after(), Duration::ZERO);
        assert_eq!(scenario.overgrown_after(), Duration::ZERO);

        let huge = ScenarioConfig {
            overgrown_after_hours: f64::INFINITY,
            ..ScenarioConfig::default()
        };
        assert_eq!(huge.overgrown_after(), Duration::MAX);
    }
}
