//! Property-Based Tests for Garden Core
//!
//! Uses `proptest` to check the garden's invariants under random inputs:
//! classifier bounds, energy saturation, store capacity, the population
//! floor and plant health limits.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use proptest::prelude::*;

use garden_core::classifier::{classify, EmotionVerdict, MAX_INTENSITY, MIN_INTENSITY};
use garden_core::config::{EnergyConfig, MemoryConfig, PlantConfig};
use garden_core::energy::EnergyState;
use garden_core::memory::MemoryStore;
use garden_core::plants::{PlantPopulation, MAX_HEALTH, MIN_HEALTH};
use garden_core::random::GardenRng;
use garden_core::storage::InMemoryBackend;
use garden_core::types::{EmotionKind, FieldPosition, Rgb, SimTime};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_emotion() -> impl Strategy<Value = EmotionKind> {
    prop::sample::select(EmotionKind::ALL.to_vec())
}

/// Text mixing real keywords, hedges and punctuation with noise.
fn arb_feeling_text() -> impl Strategy<Value = String> {
    let words = prop::sample::select(vec![
        "calm", "peace", "angry", "rage", "remember", "old", "happy", "love", "confused",
        "maybe", "lonely", "alone", "not sure", "so happy", "driving me crazy", "pebble",
        "river", "!", "!!", "?", "the", "and",
    ]);
    prop::collection::vec(words, 1..50).prop_map(|w| w.join(" "))
}

// ---------------------------------------------------------------------------
// Property: intensity in [0.3, 1], scores non-negative
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn verdict_bounds_hold_for_feeling_text(text in arb_feeling_text()) {
        let v = classify(&text).expect("non-empty");
        prop_assert!(v.intensity >= MIN_INTENSITY);
        prop_assert!(v.intensity <= MAX_INTENSITY);
        prop_assert!(v.scores.values().all(|s| *s >= 0.0));
    }

    #[test]
    fn verdict_bounds_hold_for_any_text(text in "\\PC{1,200}") {
        prop_assume!(!text.trim().is_empty());
        let v = classify(&text).expect("non-empty");
        prop_assert!((MIN_INTENSITY..=MAX_INTENSITY).contains(&v.intensity));
        prop_assert!(v.scores.values().all(|s| *s >= 0.0));
    }

    #[test]
    fn classification_is_deterministic(text in arb_feeling_text()) {
        let a = classify(&text).expect("non-empty");
        let b = classify(&text).expect("non-empty");
        prop_assert_eq!(a, b);
    }

    #[test]
    fn hedges_always_mean_confusion(prefix in arb_feeling_text(), suffix in arb_feeling_text()) {
        let v = classify(&format!("{prefix} i don't know {suffix}")).expect("non-empty");
        prop_assert_eq!(v.primary, EmotionKind::Confusion);
        prop_assert!(v.is_ambiguous);
    }
}

// ---------------------------------------------------------------------------
// Property: energy never leaves [0, 10]
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn energy_stays_in_bounds(sequence in prop::collection::vec(arb_emotion(), 0..500)) {
        let config = EnergyConfig::default();
        let mut energy = EnergyState::new();
        for kind in sequence {
            energy.apply(kind, &config);
            prop_assert!((0.0..=config.ceiling).contains(&energy.positive));
            prop_assert!((0.0..=config.ceiling).contains(&energy.negative));
        }
    }
}

// ---------------------------------------------------------------------------
// Property: store capacity and ordering
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn store_never_exceeds_capacity(n in 0usize..120, seed in any::<u64>()) {
        let store = MemoryStore::new(Arc::new(InMemoryBackend::new()), MemoryConfig::default());
        let mut rng = GardenRng::seeded(seed);
        let t0 = Utc::now();
        for i in 0..n {
            store.append(
                &format!("entry {i}"),
                EmotionVerdict::neutral(),
                t0 + ChronoDuration::seconds(i64::try_from(i).expect("small")),
                &mut rng,
            );
        }
        let all = store.list_all();
        prop_assert_eq!(all.len(), n.min(50));
        prop_assert!(all.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        if n > 50 {
            prop_assert_eq!(&all[0].text, &format!("entry {}", n - 50));
        }
    }
}

// ---------------------------------------------------------------------------
// Property: population floor and plant health
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn despawn_never_breaks_the_floor(
        start in 0usize..30,
        extra in 0usize..10,
        despawns in 0usize..60,
        seed in any::<u64>(),
    ) {
        let mut rng = GardenRng::seeded(seed);
        let config = PlantConfig { initial_population: start, ..PlantConfig::default() };
        let mut population = PlantPopulation::seeded(config, SimTime::ZERO, &mut rng);
        for _ in 0..extra {
            population.spawn(FieldPosition::default(), Rgb::default(), EmotionKind::Joy, SimTime::ZERO);
        }
        let before = population.len();
        for _ in 0..despawns {
            population.despawn(&mut rng);
        }
        prop_assert!(population.len() >= before.min(5));
        prop_assert_eq!(population.len(), before.saturating_sub(despawns).max(before.min(5)));
    }

    #[test]
    fn health_and_scale_stay_bounded(
        frames in prop::collection::vec((0.0f32..10.0, 0.0f32..10.0), 1..300),
    ) {
        let mut rng = GardenRng::seeded(1);
        let mut population = PlantPopulation::seeded(PlantConfig::default(), SimTime::ZERO, &mut rng);
        for (i, (positive, negative)) in frames.into_iter().enumerate() {
            let energy = EnergyState { positive, negative, last_update: None };
            population.tick(SimTime::from_secs_f64(i as f64 * 0.016), &energy);
            for plant in population.iter() {
                prop_assert!(plant.health_state >= MIN_HEALTH - 1e-6);
                prop_assert!(plant.health_state <= MAX_HEALTH + 1e-6);
                prop_assert!(plant.growth_scale >= 0.75 - 1e-5);
                prop_assert!(plant.growth_scale <= 1.3 + 1e-5);
            }
        }
    }
}
