//! Environment cycle: sky, sun, moon, stars and wind as a function of time.
//!
//! The cycle is a pure function of elapsed simulation time modulo the
//! configured period. Progress in `[0, 1)` splits into four equal phases,
//! and each phase interpolates linearly between keyframes:
//!
//! ```text
//!   phase   sky top            sky bottom         sun light   ambient
//!   dawn    #000033→#ff6b3d    #1a0055→#ffcc88    0.0→1.5     0.3→0.8
//!   day     #ff6b3d→#0077ff    #ffcc88→#88ccff    1.5→2.0     0.8→1.2
//!   dusk    #0077ff→#ff4500    #88ccff→#ff8c00    2.0→0.8     1.2→0.5
//!   night   #ff4500→#000033    #ff8c00→#1a0055    0.8→0.1     0.5→0.3
//! ```
//!
//! Manual overrides are resolved by [`Overrides`]; the automatic values keep
//! cycling underneath and come back as soon as an override is cleared.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::CycleConfig;
use crate::types::{Rgb, SimTime, TimeOfDay, WeatherKind};

const SKY_TOP: [u32; 4] = [0x00_00_33, 0xff_6b_3d, 0x00_77_ff, 0xff_45_00];
const SKY_BOTTOM: [u32; 4] = [0x1a_00_55, 0xff_cc_88, 0x88_cc_ff, 0xff_8c_00];
const SUN_LIGHT: [(f32, f32); 4] = [(0.0, 1.5), (1.5, 2.0), (2.0, 0.8), (0.8, 0.1)];
const AMBIENT_LIGHT: [(f32, f32); 4] = [(0.3, 0.8), (0.8, 1.2), (1.2, 0.5), (0.5, 0.3)];
const MOON_LIGHT_PEAK: f32 = 0.5;
const STAR_MAX_OPACITY: f32 = 0.9;
const WIND_SCALE: f32 = 0.02;
/// Sun and moon are never drawn lower than this.
const HORIZON_CLAMP: f32 = -10.0;

fn phase_index(phase: TimeOfDay) -> usize {
    match phase {
        TimeOfDay::Dawn => 0,
        TimeOfDay::Day => 1,
        TimeOfDay::Dusk => 2,
        TimeOfDay::Night => 3,
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// Manual selections from the control surface. `None` means automatic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Overrides {
    /// Pinned phase of the day.
    pub time_of_day: Option<TimeOfDay>,
    /// Forced base weather.
    pub weather: Option<WeatherKind>,
    /// Forced wind intensity.
    pub wind_intensity: Option<f32>,
}

impl Overrides {
    /// The override if set, otherwise the automatic weather.
    #[must_use]
    pub fn weather_or(&self, automatic: WeatherKind) -> WeatherKind {
        self.weather.unwrap_or(automatic)
    }

    /// The override if set, otherwise the automatic wind intensity.
    #[must_use]
    pub fn wind_or(&self, automatic: f32) -> f32 {
        self.wind_intensity.unwrap_or(automatic)
    }
}

// ---------------------------------------------------------------------------
// Cycle sample
// ---------------------------------------------------------------------------

/// A point in the sky, in scene units (x across, y up).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SkyPoint {
    /// Horizontal offset.
    pub x: f32,
    /// Height above the ground plane.
    pub y: f32,
}

/// Horizontal wind displacement applied to swaying geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindVector {
    /// Sway along x.
    pub x: f32,
    /// Sway along z.
    pub z: f32,
}

/// Everything a renderer needs about the sky at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSample {
    /// Position in the cycle, `[0, 1)`.
    pub cycle_progress: f64,
    /// Phase containing `cycle_progress`.
    pub phase: TimeOfDay,
    /// Sun angle on its orbit, in radians.
    pub sun_angle: f64,
    /// Sun position, clamped at the horizon.
    pub sun: SkyPoint,
    /// Moon position, opposite the sun.
    pub moon: SkyPoint,
    /// Sun is above the horizon; otherwise the moon is shown.
    pub sun_visible: bool,
    /// Zenith color.
    pub sky_top: Rgb,
    /// Horizon color.
    pub sky_bottom: Rgb,
    /// Directional sunlight intensity.
    pub sun_intensity: f32,
    /// Ambient light intensity.
    pub ambient_intensity: f32,
    /// Moonlight intensity; non-zero only at night.
    pub moon_intensity: f32,
    /// Star field opacity in `[0, 0.9]`.
    pub star_opacity: f32,
    /// Current wind displacement.
    pub wind: WindVector,
}

/// Day/night cycle evaluator.
#[derive(Debug, Clone)]
pub struct EnvironmentCycle {
    config: CycleConfig,
}

impl EnvironmentCycle {
    /// Create a cycle with the given tuning.
    #[must_use]
    pub fn new(config: CycleConfig) -> Self {
        Self { config }
    }

    /// Cycle progress at `elapsed`, or the midpoint of a pinned phase.
    #[must_use]
    pub fn progress(&self, elapsed: Duration, pinned: Option<TimeOfDay>) -> f64 {
        if let Some(phase) = pinned {
            return phase.midpoint();
        }
        let period = self.config.period_secs.max(f64::EPSILON);
        (elapsed.as_secs_f64() % period) / period
    }

    /// Effective phase at `elapsed`.
    #[must_use]
    pub fn phase(&self, elapsed: Duration, pinned: Option<TimeOfDay>) -> TimeOfDay {
        TimeOfDay::from_progress(self.progress(elapsed, pinned))
    }

    /// Sample the sky at `elapsed`.
    ///
    /// `wind_intensity` is the effective intensity (override or automatic).
    #[must_use]
    pub fn sample(
        &self,
        elapsed: Duration,
        pinned: Option<TimeOfDay>,
        wind_intensity: f32,
    ) -> EnvironmentSample {
        let progress = self.progress(elapsed, pinned);
        let phase = TimeOfDay::from_progress(progress);
        let index = phase_index(phase);
        let t = ((progress - phase.start()) / 0.25) as f32;

        let angle = progress * TAU - FRAC_PI_2;
        let radius = f64::from(self.config.orbit_radius);
        let sun_x = (angle.cos() * radius) as f32;
        let sun_y = (angle.sin() * radius) as f32;

        let next = (index + 1) % 4;
        let sky_top = Rgb::from_hex(SKY_TOP[index]).lerp(Rgb::from_hex(SKY_TOP[next]), t);
        let sky_bottom = Rgb::from_hex(SKY_BOTTOM[index]).lerp(Rgb::from_hex(SKY_BOTTOM[next]), t);

        let (sun_from, sun_to) = SUN_LIGHT[index];
        let (ambient_from, ambient_to) = AMBIENT_LIGHT[index];
        let moon_intensity = if phase == TimeOfDay::Night {
            t * MOON_LIGHT_PEAK
        } else {
            0.0
        };

        let star_opacity = if sun_y <= self.config.star_threshold {
            let fade = ((sun_y - self.config.star_threshold).abs() / self.config.star_fade_span).min(1.0);
            fade * STAR_MAX_OPACITY
        } else {
            0.0
        };

        let secs = elapsed.as_secs_f64();
        let wind = WindVector {
            x: (secs * 0.5).sin() as f32 * WIND_SCALE * wind_intensity,
            z: (secs * 0.3).cos() as f32 * WIND_SCALE * wind_intensity,
        };

        EnvironmentSample {
            cycle_progress: progress,
            phase,
            sun_angle: angle,
            sun: SkyPoint {
                x: sun_x,
                y: sun_y.max(HORIZON_CLAMP),
            },
            moon: SkyPoint {
                x: -sun_x,
                y: (-sun_y).max(HORIZON_CLAMP),
            },
            sun_visible: sun_y > 0.0,
            sky_top,
            sky_bottom,
            sun_intensity: lerp(sun_from, sun_to, t),
            ambient_intensity: lerp(ambient_from, ambient_to, t),
            moon_intensity,
            star_opacity,
            wind,
        }
    }
}

// ---------------------------------------------------------------------------
// Lightning
// ---------------------------------------------------------------------------

const FLASH_SECS: f64 = 0.1;
const FADE_END_SECS: f64 = 2.5;

/// A single lightning strike: a full flash, then a linear fade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Lightning {
    struck_at: Option<SimTime>,
}

impl Lightning {
    /// Start a strike. Ignored while a strike is still in progress.
    pub fn strike(&mut self, now: SimTime) -> bool {
        if self.is_active() {
            return false;
        }
        self.struck_at = Some(now);
        true
    }

    /// Whether a strike is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.struck_at.is_some()
    }

    /// Flash brightness in `[0, 1]`.
    #[must_use]
    pub fn intensity(&self, now: SimTime) -> f32 {
        let Some(start) = self.struck_at else {
            return 0.0;
        };
        let secs = now.since(start).as_secs_f64();
        if secs < FLASH_SECS {
            1.0
        } else if secs < FADE_END_SECS {
            (1.0 - (secs - FLASH_SECS) / (FADE_END_SECS - FLASH_SECS)) as f32
        } else {
            0.0
        }
    }

    /// End the strike once its fade is over.
    pub fn update(&mut self, now: SimTime) {
        if let Some(start) = self.struck_at {
            if now.since(start).as_secs_f64() >= FADE_END_SECS {
                self.struck_at = None;
            }
        }
    }
}
