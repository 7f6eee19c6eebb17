//! Injectable randomness.
//!
//! Every random decision in the garden (flavor text, plant colors and
//! positions, spawn counts, event rolls) goes through [`RandomSource`], so
//! tests can script outcomes and hosts can seed a reproducible stream.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::FieldPosition;

/// Source of uniform samples in `[0, 1)`.
pub trait RandomSource {
    /// Next uniform sample in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// Uniform integer in `lo..=hi`.
    fn count_between(&mut self, lo: usize, hi: usize) -> usize {
        if hi <= lo {
            return lo;
        }
        let span = (hi - lo + 1) as f64;
        lo + ((self.unit() * span) as usize).min(hi - lo)
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        ((self.unit() * len as f64) as usize).min(len.saturating_sub(1))
    }

    /// Uniform point in the square `[-half_extent, half_extent]²`.
    fn scatter(&mut self, half_extent: f32) -> FieldPosition {
        let x = (self.unit() as f32 - 0.5) * 2.0 * half_extent;
        let z = (self.unit() as f32 - 0.5) * 2.0 * half_extent;
        FieldPosition::new(x, z)
    }
}

/// Uniformly chosen element of a non-empty slice.
pub fn pick<'a, T>(rng: &mut dyn RandomSource, items: &'a [T]) -> &'a T {
    &items[rng.index(items.len())]
}

/// Default random source backed by `StdRng`.
#[derive(Debug, Clone)]
pub struct GardenRng {
    inner: StdRng,
}

impl GardenRng {
    /// Seed from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }

    /// Deterministic stream for a given seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for GardenRng {
    fn unit(&mut self) -> f64 {
        self.inner.r#gen::<f64>()
    }
}

/// Replays a fixed list of samples, cycling when exhausted.
///
/// Used to force specific branches (a dream roll that hits, a particular
/// template) without depending on a seeded stream.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    samples: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Script the given samples. An empty script always yields `0.0`.
    #[must_use]
    pub fn new(samples: impl Into<Vec<f64>>) -> Self {
        Self {
            samples: samples.into(),
            cursor: 0,
        }
    }

    /// A source that always yields the same sample.
    #[must_use]
    pub fn constant(sample: f64) -> Self {
        Self::new(vec![sample])
    }
}

impl RandomSource for ScriptedRandom {
    fn unit(&mut self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sample = self.samples[self.cursor % self.samples.len()];
        self.cursor += 1;
        sample.clamp(0.0, 0.999_999_999)
    }
}
