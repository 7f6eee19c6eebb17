//! Integration Tests: End-to-End Garden Flows
//!
//! These tests drive a whole [`Garden`] through its public API: startup
//! scenarios, submissions and their scheduled plant changes, persistence
//! across reopen, and teardown.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use garden_core::config::GardenConfig;
use garden_core::plants::PopulationDiff;
use garden_core::random::{GardenRng, RandomSource, ScriptedRandom};
use garden_core::scenario::{self, GardenTool, ScenarioState, SubmissionBranch};
use garden_core::storage::{InMemoryBackend, KeyValueBackend, SqliteBackend};
use garden_core::{classify, EmotionKind, Garden, MemoryStore, SpecialEvent, WeatherKind};

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-05-10T08:30:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

fn pebbles(n: usize) -> String {
    vec!["pebble"; n].join(" ")
}

/// A backend that remembers a visit one hour before `t0`.
fn returning_backend() -> Arc<InMemoryBackend> {
    let backend = Arc::new(InMemoryBackend::new());
    MemoryStore::new(backend.clone(), GardenConfig::default().memory)
        .record_visit(t0() - chrono::Duration::hours(1), EmotionKind::Calm);
    backend
}

fn open(backend: Arc<dyn KeyValueBackend>, seed: u64) -> Garden {
    Garden::open(GardenConfig::default(), backend, Box::new(GardenRng::seeded(seed)), t0())
}

fn run_for(garden: &mut Garden, secs: u64) {
    for _ in 0..secs * 10 {
        garden.advance(Duration::from_millis(100));
    }
}

fn spawned(diffs: &[PopulationDiff]) -> usize {
    diffs
        .iter()
        .filter(|d| matches!(d, PopulationDiff::Spawned(_)))
        .count()
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

#[test]
fn calm_submission_clears_sky_and_plants_three_to_six() {
    let verdict = classify("I am so calm and at peace").expect("non-empty");
    assert_eq!(verdict.primary, EmotionKind::Calm);
    assert!(!verdict.is_extreme);

    for seed in 0..20 {
        let mut garden = open(returning_backend(), seed);
        garden.drain_diffs();
        let sub = garden
            .submit_text("I am so calm and at peace")
            .expect("accepted");
        assert_eq!(sub.branch, SubmissionBranch::Normal);
        assert_eq!(garden.effective_weather(), WeatherKind::Clear);

        run_for(&mut garden, 2);
        let born = spawned(&garden.drain_diffs());
        assert!((3..=6).contains(&born), "seed {seed}: {born} spawns");
    }
}

#[test]
fn thirty_five_plain_words_overload_the_garden() {
    let text = pebbles(35);
    let mut garden = open(returning_backend(), 1);
    let sub = garden.submit_text(&text).expect("accepted");

    assert!(sub.verdict.is_overloaded);
    assert_eq!(sub.branch, SubmissionBranch::Overloaded);
    assert_eq!(garden.scenario(), ScenarioState::Overloaded);
    assert_eq!(garden.effective_weather(), WeatherKind::Storm);

    run_for(&mut garden, 6);
    assert_eq!(garden.scenario(), ScenarioState::None);
}

#[test]
fn extreme_anger_outranks_overload() {
    let text = format!("I hate this so much!!! {}", pebbles(30));
    let mut garden = open(returning_backend(), 2);
    let sub = garden.submit_text(&text).expect("accepted");

    assert!(sub.verdict.is_overloaded);
    assert!(sub.verdict.is_extreme);
    assert_eq!(sub.verdict.primary, EmotionKind::Anger);
    assert_eq!(garden.scenario(), ScenarioState::EmotionalStorm);
    assert_eq!(garden.special_event(), Some(SpecialEvent::EmotionalStorm));
}

#[test]
fn hedging_forces_confusion_and_clouds() {
    let mut garden = open(returning_backend(), 3);
    let sub = garden
        .submit_text("not sure how i feel, maybe happy")
        .expect("accepted");
    assert_eq!(sub.verdict.primary, EmotionKind::Confusion);
    assert!(sub.verdict.is_ambiguous);
    assert_eq!(sub.branch, SubmissionBranch::Ambiguity);
    assert_eq!(garden.effective_weather(), WeatherKind::Cloudy);
    assert_eq!(
        garden.message().map(|m| m.text.as_str()),
        Some("Uncertainty is a feeling, too.")
    );
}

#[test]
fn storm_never_digs_below_the_floor() {
    let mut config = GardenConfig::default();
    config.plants.initial_population = 8;
    let mut garden = Garden::open(
        config,
        returning_backend(),
        Box::new(GardenRng::seeded(4)),
        t0(),
    );

    garden
        .submit_text("I hate this, I am furious!!! so much rage")
        .expect("accepted");
    run_for(&mut garden, 2);
    assert_eq!(garden.plants().len(), 5);

    garden
        .submit_text("I feel so lonely and alone!!! empty and cold")
        .expect("accepted");
    run_for(&mut garden, 2);
    assert_eq!(garden.plants().len(), 5);
}

#[test]
fn shift_then_return_to_normal() {
    let mut garden = open(returning_backend(), 5);
    garden.submit_text("I feel so lonely and alone").expect("accepted");
    let sub = garden.submit_text("such a happy day").expect("accepted");
    assert_eq!(sub.branch, SubmissionBranch::Shift);
    assert_eq!(garden.scenario(), ScenarioState::EmotionalShift);

    run_for(&mut garden, 3);
    assert_eq!(garden.scenario(), ScenarioState::None);

    let sub = garden.submit_text("such a happy day").expect("accepted");
    assert_eq!(sub.branch, SubmissionBranch::Normal);
}

// ---------------------------------------------------------------------------
// Memory & persistence
// ---------------------------------------------------------------------------

#[test]
fn clear_returns_garden_to_first_ever() {
    let mut garden = open(returning_backend(), 6);
    garden.submit_text("a wonderful bright morning").expect("accepted");
    assert!(!garden.store().is_first_ever());

    garden.clear_memories();
    assert!(garden.memories().is_empty());
    assert!(garden.store().is_first_ever());
}

#[test]
fn fifty_memories_at_most() {
    let mut garden = open(returning_backend(), 7);
    for i in 0..51 {
        garden
            .submit_text(&format!("calm thought number {i}"))
            .expect("accepted");
        garden.advance(Duration::from_secs(1));
    }
    let memories = garden.memories();
    assert_eq!(memories.len(), 50);
    assert_eq!(memories[0].text, "calm thought number 1");
}

#[test]
fn sqlite_garden_remembers_across_visits() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("garden.db");

    {
        let backend = Arc::new(SqliteBackend::open(&path).expect("open"));
        let mut garden = open(backend, 8);
        assert_eq!(garden.scenario(), ScenarioState::FirstVisit);
        garden.submit_text("the old days by the lake").expect("accepted");
        garden.shutdown();
    }

    let reopen = |hours: i64| {
        let backend = Arc::new(SqliteBackend::open(&path).expect("reopen"));
        Garden::open(
            GardenConfig::default(),
            backend,
            Box::new(GardenRng::seeded(9)),
            t0() + chrono::Duration::hours(hours),
        )
    };

    let soon = reopen(6);
    assert_eq!(soon.scenario(), ScenarioState::Returning);
    assert_eq!(soon.memories().len(), 1);
    assert_eq!(
        soon.message().map(|m| m.text.as_str()),
        Some("I remained quiet while you were away.")
    );

    // The 6h visit was recorded, so measure from there.
    let later = reopen(6 + 49);
    assert_eq!(later.scenario(), ScenarioState::Overgrown);
    assert_eq!(later.effective_weather(), WeatherKind::Cloudy);
}

// ---------------------------------------------------------------------------
// Periodic events & tools
// ---------------------------------------------------------------------------

#[test]
fn dream_distortion_comes_and_goes() {
    // 0.05 hits the 10% dream roll but misses the 1.5% lightning roll.
    let rng: Box<dyn RandomSource + Send> = Box::new(ScriptedRandom::constant(0.05));
    let mut garden = Garden::open(GardenConfig::default(), returning_backend(), rng, t0());

    run_for(&mut garden, 10);
    assert_eq!(garden.scenario(), ScenarioState::DreamDistortion);
    assert_eq!(
        garden.message().map(|m| m.text.as_str()),
        Some("Time is not real here.")
    );

    run_for(&mut garden, 3);
    assert_eq!(garden.scenario(), ScenarioState::None);
}

#[test]
fn chase_regrows_after_a_pause() {
    let mut garden = open(returning_backend(), 10);
    garden.drain_diffs();
    garden.use_tool(GardenTool::Chase).expect("ready");

    garden.advance(Duration::from_millis(700));
    assert_eq!(spawned(&garden.drain_diffs()), 0);

    run_for(&mut garden, 2);
    let regrown = spawned(&garden.drain_diffs());
    assert!((3..=6).contains(&regrown));
    assert!((garden.effective_wind() - 0.9).abs() < f32::EPSILON);

    run_for(&mut garden, 3);
    assert!((garden.effective_wind() - 0.5).abs() < f32::EPSILON);
}

#[test]
fn pure_transition_matches_garden_behaviour() {
    let config = GardenConfig::default();
    let verdict = classify("such a happy day").expect("non-empty");
    let mut rng = GardenRng::seeded(11);
    let (branch, transition) = scenario::on_submission(
        ScenarioState::None,
        EmotionKind::Calm,
        &verdict,
        &config,
        &mut rng,
    );
    assert_eq!(branch, SubmissionBranch::Normal);
    assert!((3..=6).contains(&transition.spawn_count()));
    assert_eq!(transition.weather(), Some(WeatherKind::Clear));
}

#[test]
fn shutdown_stops_every_timer() {
    let mut garden = open(returning_backend(), 12);
    garden
        .submit_text("so happy, what a wonderful day")
        .expect("accepted");
    garden.use_tool(GardenTool::Water).expect("ready");
    garden.shutdown();

    let plants = garden.plants().len();
    let idle = garden.idle_secs();
    let scenario = garden.scenario();
    run_for(&mut garden, 120);
    assert_eq!(garden.plants().len(), plants);
    assert_eq!(garden.idle_secs(), idle);
    assert_eq!(garden.scenario(), scenario);
    assert_eq!(garden.pending_effects(), 0);
    assert!(!garden.is_running());
}
