//! Plant population: the arena of living plants.
//!
//! `PlantPopulation` is the only source of truth for which plants exist.
//! Renderers never mutate it; they drain [`PopulationDiff`]s and read
//! [`PlantEntity`] state each frame.
//!
//! ## Lifecycle
//!
//! 1. `spawn` creates a newborn plant. For the newborn window the plant
//!    glows and is exempt from energy-driven changes.
//! 2. After the window, every frame pulls `target_scale` and
//!    `health_state` from the energy balance, and `growth_scale` closes a
//!    fixed fraction of the gap to its target.
//! 3. Plants leave only through `despawn`, which refuses to go below the
//!    population floor.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PlantConfig;
use crate::energy::{EnergyMood, EnergyState};
use crate::random::{pick, RandomSource};
use crate::types::{EmotionKind, FieldPosition, PlantId, Rgb, SimTime};

/// Lowest health a plant can wilt to.
pub const MIN_HEALTH: f32 = 0.6;
/// Full health.
pub const MAX_HEALTH: f32 = 1.0;
/// Balanced energy lifts health to at least this.
pub const BALANCED_HEALTH_FLOOR: f32 = 0.8;

/// Color families used when spawning plants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Palette {
    /// Pastels of the starting garden.
    Initial,
    /// Warm colors for ordinary happy submissions.
    Joyful,
    /// Brighter golds and pinks for a serene bloom.
    Bloom,
    /// Blues and violets from watering.
    Water,
    /// Regrowth after chasing wilted plants away.
    Chase,
}

impl Palette {
    /// Packed `0xRRGGBB` colors in this family.
    #[must_use]
    pub fn colors(self) -> &'static [u32] {
        match self {
            Self::Initial => &[0xff6b9d, 0x9d6bff, 0x6b9dff, 0xffa500, 0xff69b4],
            Self::Joyful => &[0xffff00, 0xffa500, 0xff69b4, 0xff1493, 0xff6b9d, 0x9d6bff],
            Self::Bloom => &[0xffff00, 0xffa500, 0xff69b4, 0xff1493, 0xffd700, 0xffc0cb, 0xda70d6],
            Self::Water => &[0x6b9dff, 0x9d6bff, 0xa78bfa],
            Self::Chase => &[0xff69b4, 0xffa500, 0xc084fc],
        }
    }

    /// Draw one color from the family.
    #[must_use]
    pub fn sample(self, rng: &mut dyn RandomSource) -> Rgb {
        Rgb::from_hex(*pick(rng, self.colors()))
    }
}

/// A single plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantEntity {
    /// Arena handle.
    pub id: PlantId,
    /// Where it stands.
    pub position: FieldPosition,
    /// Bloom color.
    pub color: Rgb,
    /// Emotion that planted it.
    pub emotion_tag: EmotionKind,
    /// When it was spawned.
    pub birth_time: SimTime,
    /// Inside the newborn glow window.
    pub is_newborn: bool,
    /// Current rendered scale.
    pub growth_scale: f32,
    /// Scale the plant is easing toward.
    pub target_scale: f32,
    /// Vitality in `[0.6, 1.0]`; renderers fade petals below ~0.9.
    pub health_state: f32,
}

impl PlantEntity {
    /// Oscillating glow factor in `[0, 1]` while newborn, `None` afterwards.
    #[must_use]
    pub fn glow(&self, now: SimTime) -> Option<f32> {
        self.is_newborn
            .then(|| ((now.as_secs_f64() * 5.0).sin() * 0.5 + 0.5) as f32)
    }

    fn follow_energy(&mut self, mood: EnergyMood, energy: &EnergyState, config: &PlantConfig) {
        match mood {
            EnergyMood::Thriving => {
                self.target_scale = 1.0 + (energy.positive * 0.03).min(0.3);
                self.health_state = (self.health_state + config.health_step).min(MAX_HEALTH);
            }
            EnergyMood::Wilting => {
                self.target_scale = 1.0 - (energy.negative * 0.025).min(0.25);
                self.health_state = (self.health_state - config.health_step).max(MIN_HEALTH);
            }
            EnergyMood::Balanced => {
                self.target_scale = 1.0;
                self.health_state = (self.health_state + config.health_drift)
                    .clamp(BALANCED_HEALTH_FLOOR, MAX_HEALTH);
            }
        }
        self.growth_scale += (self.target_scale - self.growth_scale) * config.approach_rate;
    }
}

/// Change notifications for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopulationDiff {
    /// A plant was added.
    Spawned(PlantId),
    /// A plant was removed.
    Despawned(PlantId),
}

/// All plants in the garden, in insertion order.
#[derive(Debug, Clone)]
pub struct PlantPopulation {
    plants: Vec<PlantEntity>,
    next_id: u64,
    diffs: Vec<PopulationDiff>,
    config: PlantConfig,
}

impl PlantPopulation {
    /// An empty population.
    #[must_use]
    pub fn new(config: PlantConfig) -> Self {
        Self {
            plants: Vec::new(),
            next_id: 0,
            diffs: Vec::new(),
            config,
        }
    }

    /// A population pre-filled with the configured number of calm plants.
    ///
    /// Seeded plants are fully grown, not newborn.
    #[must_use]
    pub fn seeded(config: PlantConfig, now: SimTime, rng: &mut dyn RandomSource) -> Self {
        let mut population = Self::new(config);
        for _ in 0..population.config.initial_population {
            let position = rng.scatter(population.config.field_half_extent);
            let color = Palette::Initial.sample(rng);
            let id = population.spawn(position, color, EmotionKind::Calm, now);
            if let Some(plant) = population.get_mut(id) {
                plant.is_newborn = false;
            }
        }
        population
    }

    /// Add a newborn plant.
    pub fn spawn(
        &mut self,
        position: FieldPosition,
        color: Rgb,
        emotion_tag: EmotionKind,
        now: SimTime,
    ) -> PlantId {
        let id = PlantId(self.next_id);
        self.next_id += 1;
        self.plants.push(PlantEntity {
            id,
            position,
            color,
            emotion_tag,
            birth_time: now,
            is_newborn: true,
            growth_scale: 1.0,
            target_scale: 1.0,
            health_state: MAX_HEALTH,
        });
        self.diffs.push(PopulationDiff::Spawned(id));
        debug!(%id, %position, tag = %emotion_tag, population = self.plants.len(), "plant spawned");
        id
    }

    /// Remove one uniformly random plant, unless the population is at or
    /// below the floor.
    pub fn despawn(&mut self, rng: &mut dyn RandomSource) -> Option<PlantId> {
        if self.plants.len() <= self.config.floor {
            debug!(population = self.plants.len(), "despawn skipped at floor");
            return None;
        }
        let victim = self.plants.remove(rng.index(self.plants.len()));
        self.diffs.push(PopulationDiff::Despawned(victim.id));
        debug!(id = %victim.id, population = self.plants.len(), "plant despawned");
        Some(victim.id)
    }

    /// Advance every plant one frame against the current energy balance.
    pub fn tick(&mut self, now: SimTime, energy: &EnergyState) {
        let mood = energy.mood(self.config.energy_threshold);
        let window = self.config.newborn_window();
        for plant in &mut self.plants {
            if plant.is_newborn {
                if now.since(plant.birth_time) >= window {
                    plant.is_newborn = false;
                    plant.target_scale = 1.0;
                }
                continue;
            }
            plant.follow_energy(mood, energy, &self.config);
        }
    }

    /// Take the diffs accumulated since the last call.
    pub fn drain_diffs(&mut self) -> Vec<PopulationDiff> {
        std::mem::take(&mut self.diffs)
    }

    /// Look up a plant.
    #[must_use]
    pub fn get(&self, id: PlantId) -> Option<&PlantEntity> {
        self.plants.iter().find(|p| p.id == id)
    }

    fn get_mut(&mut self, id: PlantId) -> Option<&mut PlantEntity> {
        self.plants.iter_mut().find(|p| p.id == id)
    }

    /// Plants in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PlantEntity> {
        self.plants.iter()
    }

    /// Number of plants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plants.len()
    }

    /// Whether there are no plants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    /// The population floor.
    #[must_use]
    pub fn floor(&self) -> usize {
        self.config.floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{GardenRng, ScriptedRandom};

    fn at(secs: f64) -> SimTime {
        SimTime::from_secs_f64(secs)
    }

    fn population_of(n: usize) -> PlantPopulation {
        let mut rng = GardenRng::seeded(9);
        let config = PlantConfig {
            initial_population: n,
            ..PlantConfig::default()
        };
        PlantPopulation::seeded(config, SimTime::ZERO, &mut rng)
    }

    fn energy(positive: f32, negative: f32) -> EnergyState {
        EnergyState {
            positive,
            negative,
            last_update: None,
        }
    }

    #[test]
    fn seeded_population_is_grown() {
        let population = population_of(20);
        assert_eq!(population.len(), 20);
        assert!(population.iter().all(|p| !p.is_newborn));
        assert!(population.iter().all(|p| p.emotion_tag == EmotionKind::Calm));
    }

    #[test]
    fn despawn_respects_floor() {
        let mut population = population_of(8);
        let mut rng = GardenRng::seeded(1);
        for _ in 0..20 {
            population.despawn(&mut rng);
        }
        assert_eq!(population.len(), 5);
        assert!(population.despawn(&mut rng).is_none());
    }

    #[test]
    fn despawn_picks_by_index() {
        let mut population = population_of(7);
        let first = population.iter().next().map(|p| p.id);
        let mut rng = ScriptedRandom::constant(0.0);
        assert_eq!(population.despawn(&mut rng), first);
    }

    #[test]
    fn diffs_track_spawn_and_despawn() {
        let mut population = population_of(6);
        population.drain_diffs();
        let mut rng = ScriptedRandom::constant(0.99);

        let id = population.spawn(FieldPosition::new(1.0, 2.0), Rgb::default(), EmotionKind::Joy, at(0.0));
        let gone = population.despawn(&mut rng);

        assert_eq!(
            population.drain_diffs(),
            vec![
                PopulationDiff::Spawned(id),
                PopulationDiff::Despawned(gone.expect("above floor"))
            ]
        );
        assert!(population.drain_diffs().is_empty());
    }

    #[test]
    fn newborn_exempt_until_window_passes() {
        let mut population = PlantPopulation::new(PlantConfig::default());
        let id = population.spawn(FieldPosition::default(), Rgb::default(), EmotionKind::Joy, at(0.0));
        let rich = energy(8.0, 0.0);

        population.tick(at(4.9), &rich);
        let plant = population.get(id).expect("exists");
        assert!(plant.is_newborn);
        assert!(plant.glow(at(4.9)).is_some());
        assert!((plant.growth_scale - 1.0).abs() < f32::EPSILON);

        population.tick(at(5.0), &rich);
        let plant = population.get(id).expect("exists");
        assert!(!plant.is_newborn);
        assert!((plant.target_scale - 1.0).abs() < f32::EPSILON);
        assert!(plant.glow(at(5.0)).is_none());
    }

    #[test]
    fn thriving_energy_grows_plants() {
        let mut population = population_of(6);
        let rich = energy(8.0, 1.0);
        for i in 0..100 {
            population.tick(at(f64::from(i) * 0.016), &rich);
        }
        for plant in population.iter() {
            assert!((plant.target_scale - 1.24).abs() < 1e-5);
            assert!(plant.growth_scale > 1.0 && plant.growth_scale < plant.target_scale);
            assert!((plant.health_state - MAX_HEALTH).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn wilting_energy_shrinks_and_sickens() {
        let mut population = population_of(6);
        let grim = energy(0.0, 10.0);
        for _ in 0..1000 {
            population.tick(at(100.0), &grim);
        }
        for plant in population.iter() {
            assert!((plant.target_scale - 0.75).abs() < 1e-6);
            assert!(plant.growth_scale < 1.0 && plant.growth_scale > 0.75);
            assert!((plant.health_state - MIN_HEALTH).abs() < 1e-6);
        }
    }

    #[test]
    fn growth_approach_never_overshoots() {
        let mut population = population_of(6);
        let rich = energy(10.0, 0.0);
        let mut previous = 1.0_f32;
        for _ in 0..5000 {
            population.tick(at(100.0), &rich);
            let scale = population.iter().next().map_or(0.0, |p| p.growth_scale);
            assert!(scale >= previous);
            assert!(scale <= 1.3 + 1e-5);
            previous = scale;
        }
    }

    #[test]
    fn balanced_energy_recovers_into_the_healthy_band() {
        let mut population = population_of(6);
        for _ in 0..1000 {
            population.tick(at(100.0), &energy(0.0, 10.0));
        }
        let sick = population.iter().next().map_or(0.0, |p| p.health_state);
        assert!((sick - MIN_HEALTH).abs() < 1e-6);

        population.tick(at(100.0), &energy(1.0, 1.0));
        for plant in population.iter() {
            assert!(plant.health_state >= BALANCED_HEALTH_FLOOR);
        }

        // Inside the band it keeps drifting up slowly.
        let before = population.iter().next().map_or(0.0, |p| p.health_state);
        population.tick(at(100.0), &energy(1.0, 1.0));
        let after = population.iter().next().map_or(0.0, |p| p.health_state);
        assert!(after > before && after < before + 0.001);
    }

    #[test]
    fn palettes_sample_their_own_colors() {
        let mut rng = GardenRng::seeded(5);
        for palette in [Palette::Initial, Palette::Joyful, Palette::Bloom, Palette::Water, Palette::Chase] {
            let color = palette.sample(&mut rng);
            assert!(palette.colors().contains(&color.to_hex()));
        }
    }
}
