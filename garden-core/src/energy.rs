//! Emotional energy: the slow pressure behind growth and wilting.
//!
//! Two accumulators in `[0, ceiling]`:
//!
//! ```text
//!   joy | calm          → positive += gain,  negative -= drain
//!   anger | loneliness  → negative += gain,  positive -= drain
//!   anything else       → both -= neutral_decay
//! ```
//!
//! Updates are rate-limited: [`EnergyState::tick`] is a no-op until the
//! configured interval has passed since the previous update.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::EnergyConfig;
use crate::types::{EmotionKind, SimTime};

/// Process-wide energy accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyState {
    /// Accumulated uplifting energy.
    pub positive: f32,
    /// Accumulated heavy energy.
    pub negative: f32,
    /// When the last update was applied; `None` before the first one.
    pub last_update: Option<SimTime>,
}

impl Default for EnergyState {
    fn default() -> Self {
        Self::new()
    }
}

impl EnergyState {
    /// Both sides at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positive: 0.0,
            negative: 0.0,
            last_update: None,
        }
    }

    /// Apply one update if the tick interval has elapsed. Returns whether
    /// the state changed.
    pub fn tick(&mut self, now: SimTime, current: EmotionKind, config: &EnergyConfig) -> bool {
        if let Some(last) = self.last_update {
            if now.since(last) < config.tick_interval() {
                return false;
            }
        }
        self.last_update = Some(now);
        self.apply(current, config);
        trace!(
            positive = self.positive,
            negative = self.negative,
            emotion = %current,
            "energy updated"
        );
        true
    }

    /// Apply the accumulation rule once, ignoring the rate limit.
    pub fn apply(&mut self, current: EmotionKind, config: &EnergyConfig) {
        let ceiling = config.ceiling;
        if current.is_uplifting() {
            self.positive = (self.positive + config.gain).min(ceiling);
            self.negative = (self.negative - config.drain).max(0.0);
        } else if current.is_heavy() {
            self.negative = (self.negative + config.gain).min(ceiling);
            self.positive = (self.positive - config.drain).max(0.0);
        } else {
            self.positive = (self.positive - config.neutral_decay).max(0.0);
            self.negative = (self.negative - config.neutral_decay).max(0.0);
        }
    }

    /// Which way the garden is leaning, given the growth threshold.
    #[must_use]
    pub fn mood(&self, threshold: f32) -> EnergyMood {
        if self.positive > self.negative && self.positive > threshold {
            EnergyMood::Thriving
        } else if self.negative > self.positive && self.negative > threshold {
            EnergyMood::Wilting
        } else {
            EnergyMood::Balanced
        }
    }
}

/// Coarse reading of the energy balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyMood {
    /// Positive dominates above the threshold.
    Thriving,
    /// Negative dominates above the threshold.
    Wilting,
    /// Neither side dominates.
    Balanced,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: f64) -> SimTime {
        SimTime::from_secs_f64(secs)
    }

    #[test]
    fn joy_accumulates_positive() {
        let config = EnergyConfig::default();
        let mut energy = EnergyState::new();
        for i in 0..4 {
            assert!(energy.tick(at(f64::from(i) * 2.0), EmotionKind::Joy, &config));
        }
        assert!((energy.positive - 2.0).abs() < 1e-6);
        assert!(energy.negative.abs() < f32::EPSILON);
    }

    #[test]
    fn rate_limited_to_interval() {
        let config = EnergyConfig::default();
        let mut energy = EnergyState::new();
        assert!(energy.tick(at(0.0), EmotionKind::Anger, &config));
        assert!(!energy.tick(at(1.9), EmotionKind::Anger, &config));
        assert!(energy.tick(at(2.0), EmotionKind::Anger, &config));
        assert!((energy.negative - 1.0).abs() < 1e-6);
    }

    #[test]
    fn heavy_emotions_drain_positive() {
        let config = EnergyConfig::default();
        let mut energy = EnergyState {
            positive: 1.0,
            negative: 0.0,
            last_update: None,
        };
        energy.apply(EmotionKind::Loneliness, &config);
        assert!((energy.positive - 0.7).abs() < 1e-6);
        assert!((energy.negative - 0.5).abs() < 1e-6);
    }

    #[test]
    fn neutral_emotions_decay_both_sides() {
        let config = EnergyConfig::default();
        let mut energy = EnergyState {
            positive: 0.05,
            negative: 3.0,
            last_update: None,
        };
        energy.apply(EmotionKind::Nostalgia, &config);
        assert!(energy.positive.abs() < f32::EPSILON);
        assert!((energy.negative - 2.9).abs() < 1e-6);
    }

    #[test]
    fn saturates_at_ceiling() {
        let config = EnergyConfig::default();
        let mut energy = EnergyState::new();
        for _ in 0..100 {
            energy.apply(EmotionKind::Calm, &config);
        }
        assert!((energy.positive - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn mood_thresholds() {
        let mut energy = EnergyState::new();
        assert_eq!(energy.mood(3.0), EnergyMood::Balanced);
        energy.positive = 3.5;
        assert_eq!(energy.mood(3.0), EnergyMood::Thriving);
        energy.negative = 4.0;
        assert_eq!(energy.mood(3.0), EnergyMood::Wilting);
    }
}
