//! Garden Benchmark Suite
//!
//! Performance targets:
//!   classify_sentence ................ < 20μs
//!   classify_overloaded_60_words ..... < 50μs
//!   frame_tick_100_plants ............ < 10μs
//!   submission_end_to_end ............ < 200μs
//!   one_minute_at_60fps .............. < 40ms

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use garden_core::config::GardenConfig;
use garden_core::energy::EnergyState;
use garden_core::plants::PlantPopulation;
use garden_core::random::GardenRng;
use garden_core::storage::InMemoryBackend;
use garden_core::types::{EmotionKind, SimTime};
use garden_core::{classify, Garden, MemoryStore};

fn started_at() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-05-10T08:30:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

/// A garden opened by a returning visitor, so no first-visit gate.
fn returning_garden(initial_population: usize) -> Garden {
    let backend = Arc::new(InMemoryBackend::new());
    let mut config = GardenConfig::default();
    config.plants.initial_population = initial_population;
    MemoryStore::new(backend.clone(), config.memory.clone())
        .record_visit(started_at() - chrono::Duration::hours(1), EmotionKind::Calm);
    Garden::open(config, backend, Box::new(GardenRng::seeded(42)), started_at())
}

/// Benchmark: one ordinary sentence (target: < 20μs).
fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify_sentence", |b| {
        b.iter(|| {
            let verdict = classify(black_box(
                "I feel so calm by the river, but a little lonely without you",
            ));
            black_box(verdict)
        });
    });

    let long = vec!["pebble"; 60].join(" ");
    c.bench_function("classify_overloaded_60_words", |b| {
        b.iter(|| black_box(classify(black_box(&long))));
    });
}

/// Benchmark: plant growth pass over 100 plants (target: < 10μs).
fn bench_frame_tick(c: &mut Criterion) {
    let config = GardenConfig::default();
    let mut rng = GardenRng::seeded(7);
    let mut plants = PlantPopulation::seeded(
        garden_core::config::PlantConfig {
            initial_population: 100,
            ..config.plants.clone()
        },
        SimTime::ZERO,
        &mut rng,
    );
    let energy = EnergyState {
        positive: 6.0,
        negative: 2.0,
        last_update: None,
    };
    let mut now = SimTime::ZERO;

    c.bench_function("frame_tick_100_plants", |b| {
        b.iter(|| {
            now = now + Duration::from_millis(16);
            plants.tick(black_box(now), black_box(&energy));
        });
    });
}

/// Benchmark: classify, transition, store (target: < 200μs).
fn bench_submission(c: &mut Criterion) {
    c.bench_function("submission_end_to_end", |b| {
        b.iter_batched(
            || returning_garden(20),
            |mut garden| {
                let sub = garden.submit_text(black_box("such a happy and wonderful day"));
                black_box(sub)
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark: a full minute of frames with timers, effects and events
/// (target: < 40ms).
fn bench_minute(c: &mut Criterion) {
    c.bench_function("one_minute_at_60fps", |b| {
        b.iter_batched(
            || {
                let mut garden = returning_garden(20);
                garden.submit_text("I am so calm and at peace");
                garden
            },
            |mut garden| {
                for _ in 0..3600 {
                    garden.advance(Duration::from_micros(16_667));
                }
                black_box(garden.plants().len())
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_classify,
    bench_frame_tick,
    bench_submission,
    bench_minute,
);
criterion_main!(benches);
