//! Core type definitions shared across the garden.
//!
//! Everything here is plain data: serializable, cheap to copy, and free of
//! simulation logic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::time::Duration;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for a stored memory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryId(pub Uuid);

impl MemoryId {
    /// Create a new random memory ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arena handle for a plant. Allocated sequentially, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlantId(pub u64);

impl fmt::Display for PlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plant#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Emotions
// ---------------------------------------------------------------------------

/// The six emotions the classifier can produce.
///
/// Declaration order matters: it is the tie-break order when two kinds
/// score equally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionKind {
    /// Peace, stillness, balance.
    Calm,
    /// Rage, frustration, heat.
    Anger,
    /// Longing for the past.
    Nostalgia,
    /// Happiness, delight.
    Joy,
    /// Uncertainty, bewilderment.
    Confusion,
    /// Isolation, emptiness.
    Loneliness,
}

impl EmotionKind {
    /// All kinds in tie-break order.
    pub const ALL: [Self; 6] = [
        Self::Calm,
        Self::Anger,
        Self::Nostalgia,
        Self::Joy,
        Self::Confusion,
        Self::Loneliness,
    ];

    /// Lowercase name, matching the serialized form.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Anger => "anger",
            Self::Nostalgia => "nostalgia",
            Self::Joy => "joy",
            Self::Confusion => "confusion",
            Self::Loneliness => "loneliness",
        }
    }

    /// Short poetic description shown next to a memory.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Calm => "a soft, tranquil feeling",
            Self::Anger => "a burning, intense feeling",
            Self::Nostalgia => "a bittersweet memory",
            Self::Joy => "a bright, radiant feeling",
            Self::Confusion => "an uncertain, wandering thought",
            Self::Loneliness => "a quiet, solitary ache",
        }
    }

    /// Joy and calm feed positive energy.
    #[must_use]
    pub fn is_uplifting(self) -> bool {
        matches!(self, Self::Joy | Self::Calm)
    }

    /// Anger and loneliness feed negative energy.
    #[must_use]
    pub fn is_heavy(self) -> bool {
        matches!(self, Self::Anger | Self::Loneliness)
    }

    /// Weather the garden settles into after a plain submission of this kind.
    #[must_use]
    pub fn weather(self) -> WeatherKind {
        match self {
            Self::Calm | Self::Joy => WeatherKind::Clear,
            Self::Anger => WeatherKind::Storm,
            Self::Nostalgia | Self::Confusion => WeatherKind::Cloudy,
            Self::Loneliness => WeatherKind::Rainy,
        }
    }
}

impl fmt::Display for EmotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// Base weather consumed by the particle renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    /// No precipitation.
    #[default]
    Clear,
    /// Overcast sky.
    Cloudy,
    /// Light rain.
    Rainy,
    /// Heavy rain, wind lines.
    Storm,
}

/// Overlay effect layered on top of the base weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialEvent {
    /// Falling stars, night only.
    MeteorShower,
    /// Snow during calm, clear weather.
    Snowfall,
    /// Colored mist after clouds or rain.
    BloomingFog,
    /// Overlay for the emotional storm scenario.
    EmotionalStorm,
    /// Overlay for the serene bloom scenario.
    SereneBloom,
}

/// One of the four equal phases of the day/night cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// First quarter of the cycle.
    Dawn,
    /// Second quarter.
    Day,
    /// Third quarter.
    Dusk,
    /// Final quarter.
    Night,
}

impl TimeOfDay {
    /// Phase containing `progress` (`[0, 1)` of the cycle).
    #[must_use]
    pub fn from_progress(progress: f64) -> Self {
        if progress < 0.25 {
            Self::Dawn
        } else if progress < 0.5 {
            Self::Day
        } else if progress < 0.75 {
            Self::Dusk
        } else {
            Self::Night
        }
    }

    /// Cycle progress at which this phase starts.
    #[must_use]
    pub fn start(self) -> f64 {
        match self {
            Self::Dawn => 0.0,
            Self::Day => 0.25,
            Self::Dusk => 0.5,
            Self::Night => 0.75,
        }
    }

    /// Midpoint of the phase, used when the phase is pinned manually.
    #[must_use]
    pub fn midpoint(self) -> f64 {
        self.start() + 0.125
    }
}

// ---------------------------------------------------------------------------
// Spatial & Color
// ---------------------------------------------------------------------------

/// A point on the garden ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldPosition {
    /// X coordinate.
    pub x: f32,
    /// Z coordinate.
    pub z: f32,
}

impl FieldPosition {
    /// Create a position.
    #[must_use]
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }
}

impl fmt::Display for FieldPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.z)
    }
}

/// Linear RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
}

impl Rgb {
    /// Build from a packed `0xRRGGBB` value.
    #[must_use]
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    /// Pack back into `0xRRGGBB`.
    #[must_use]
    pub fn to_hex(self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Blend toward `other` (`t = 0` is self, `t = 1` is other).
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Monotonic simulation time: elapsed time since the garden started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SimTime(pub Duration);

impl SimTime {
    /// The instant the garden started.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Build from fractional seconds.
    #[must_use]
    pub fn from_secs_f64(secs: f64) -> Self {
        Self(Duration::from_secs_f64(secs.max(0.0)))
    }

    /// Elapsed seconds as `f64`.
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.0.as_secs_f64()
    }

    /// Time elapsed since `earlier`, saturating at zero.
    #[must_use]
    pub fn since(self, earlier: Self) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for SimTime {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs)
    }
}
