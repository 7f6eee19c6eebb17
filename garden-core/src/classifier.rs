//! Rule-based emotion classifier.
//!
//! Text is scored against six fixed lexicons:
//!
//! 1. every keyword found as a substring adds 1 to its emotion,
//! 2. every fixed phrase found adds 3,
//! 3. punctuation and length heuristics add fractional boosts,
//! 4. hedging markers force `confusion` regardless of the scores.
//!
//! The result is a pure function of the input text.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{GardenError, Result};
use crate::types::EmotionKind;

/// Floor and ceiling of [`EmotionVerdict::intensity`].
pub const MIN_INTENSITY: f32 = 0.3;
/// Upper bound of [`EmotionVerdict::intensity`].
pub const MAX_INTENSITY: f32 = 1.0;

/// Word count above which a submission is overloaded.
const OVERLOAD_WORDS: usize = 30;
/// Bonus added to confusion when a hedging marker is present.
const AMBIGUITY_BONUS: f32 = 5.0;
/// Denominator floor, so a single keyword never reads as full intensity.
const TOTAL_FLOOR: f32 = 5.0;

const KEYWORDS: [(EmotionKind, &[&str]); 6] = [
    (
        EmotionKind::Calm,
        &[
            "peace", "calm", "quiet", "serene", "tranquil", "still", "gentle", "soft", "relaxed",
            "breathe", "ease", "rest", "centered", "balanced", "clear", "meditation", "zen",
            "harmony", "soothing", "peaceful", "silence",
        ],
    ),
    (
        EmotionKind::Anger,
        &[
            "angry", "mad", "furious", "rage", "hate", "frustrated", "annoyed", "irritated",
            "upset", "bitter", "resentful", "hostile", "aggressive", "violent", "cruel", "destroy",
            "hurt", "pain", "fight", "scream", "explode", "fire", "burn",
        ],
    ),
    (
        EmotionKind::Nostalgia,
        &[
            "remember", "memory", "past", "used to", "once", "before", "miss", "gone", "lost",
            "yesterday", "childhood", "old", "former", "previous", "ancient", "forgotten",
            "faded", "echo", "ghost", "remnant", "trace", "amber", "sepia",
        ],
    ),
    (
        EmotionKind::Joy,
        &[
            "happy", "joy", "excited", "glad", "delighted", "wonderful", "amazing", "love",
            "smile", "laugh", "bright", "cheerful", "pleased", "content", "grateful", "blessed",
            "celebration", "sunshine", "radiant", "gleeful", "euphoric",
        ],
    ),
    (
        EmotionKind::Confusion,
        &[
            "confused", "uncertain", "unsure", "lost", "don't know", "maybe", "perhaps", "unclear",
            "puzzled", "bewildered", "perplexed", "wondering", "question", "doubt", "chaos",
            "messy", "tangled", "foggy", "blurry", "strange", "weird",
        ],
    ),
    (
        EmotionKind::Loneliness,
        &[
            "lonely", "alone", "isolated", "empty", "abandoned", "solitary", "separate",
            "distant", "far", "apart", "nobody", "nothing", "void", "hollow", "cold", "silent",
            "dark", "invisible", "forgotten", "ignored", "excluded",
        ],
    ),
];

const PHRASES: [(EmotionKind, &[&str]); 6] = [
    (
        EmotionKind::Calm,
        &[
            "feel at peace", "feeling calm", "everything is okay", "taking it slow",
            "breathing deeply", "finding balance",
        ],
    ),
    (
        EmotionKind::Anger,
        &[
            "so mad", "really angry", "hate it", "makes me furious", "can't stand",
            "driving me crazy",
        ],
    ),
    (
        EmotionKind::Nostalgia,
        &[
            "remember when", "those days", "used to be", "wish i could go back",
            "things were different", "the old days",
        ],
    ),
    (
        EmotionKind::Joy,
        &[
            "so happy", "feel amazing", "love this", "couldn't be better", "best day",
            "feeling great",
        ],
    ),
    (
        EmotionKind::Confusion,
        &[
            "don't understand", "not sure", "what is", "how do i", "confused about",
            "makes no sense",
        ],
    ),
    (
        EmotionKind::Loneliness,
        &[
            "feel alone", "nobody cares", "all by myself", "miss someone", "feeling empty",
            "no one understands",
        ],
    ),
];

const AMBIGUITY_MARKERS: [&str; 9] = [
    "don't know",
    "not sure",
    "maybe",
    "uncertain",
    "confused about how",
    "can't tell",
    "mixed",
    "unclear",
    "don't understand how i feel",
];

/// The classifier's judgement of one submission. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionVerdict {
    /// Dominant emotion.
    pub primary: EmotionKind,
    /// Strength of the dominant emotion, in `[0.3, 1.0]`.
    pub intensity: f32,
    /// Raw non-negative score per kind.
    pub scores: BTreeMap<EmotionKind, f32>,
    /// A hedging marker forced the verdict to confusion.
    pub is_ambiguous: bool,
    /// More than 30 words.
    pub is_overloaded: bool,
    /// Up to three runner-up kinds with a positive score, strongest first.
    pub secondary_emotions: Vec<EmotionKind>,
    /// Very intense or heavily exclaimed.
    pub is_extreme: bool,
}

impl EmotionVerdict {
    /// A fixed verdict for actions that bypass classification (garden tools).
    #[must_use]
    pub fn synthetic(primary: EmotionKind, intensity: f32) -> Self {
        Self {
            primary,
            intensity: intensity.clamp(MIN_INTENSITY, MAX_INTENSITY),
            scores: EmotionKind::ALL.iter().map(|k| (*k, 0.0)).collect(),
            is_ambiguous: false,
            is_overloaded: false,
            secondary_emotions: Vec::new(),
            is_extreme: false,
        }
    }

    /// Calm at minimum intensity, the degraded default.
    #[must_use]
    pub fn neutral() -> Self {
        Self::synthetic(EmotionKind::Calm, MIN_INTENSITY)
    }

    /// Score for one kind (zero if absent).
    #[must_use]
    pub fn score(&self, kind: EmotionKind) -> f32 {
        self.scores.get(&kind).copied().unwrap_or(0.0)
    }
}

fn slot(kind: EmotionKind) -> usize {
    kind as usize
}

/// Classify a piece of text.
///
/// # Errors
/// Returns [`GardenError::EmptySubmission`] if the text is empty or
/// whitespace-only.
pub fn classify(text: &str) -> Result<EmotionVerdict> {
    if text.trim().is_empty() {
        return Err(GardenError::EmptySubmission);
    }

    let lower = text.to_lowercase();
    let word_count = text.split_whitespace().count();
    let exclamations = lower.matches('!').count();
    let is_ambiguous = AMBIGUITY_MARKERS.iter().any(|m| lower.contains(m));

    let mut scores = [0.0_f32; 6];

    for (kind, keywords) in KEYWORDS {
        let hits = keywords.iter().filter(|k| lower.contains(*k)).count();
        scores[slot(kind)] += hits as f32;
    }
    for (kind, phrases) in PHRASES {
        let hits = phrases.iter().filter(|p| lower.contains(*p)).count();
        scores[slot(kind)] += 3.0 * hits as f32;
    }

    if lower.contains('?') {
        scores[slot(EmotionKind::Confusion)] += 1.0;
    }
    if exclamations > 0 {
        scores[slot(EmotionKind::Joy)] += 0.5;
        scores[slot(EmotionKind::Anger)] += 0.5;
    }
    if word_count < 3 {
        scores[slot(EmotionKind::Loneliness)] += 0.5;
    }
    if exclamations > 1 {
        let n = exclamations as f32;
        scores[slot(EmotionKind::Anger)] += n * 0.5;
        scores[slot(EmotionKind::Joy)] += n * 0.3;
    }

    // Stable sort: equal scores keep declaration order.
    let mut ranked: Vec<(EmotionKind, f32)> =
        EmotionKind::ALL.iter().map(|k| (*k, scores[slot(*k)])).collect();
    ranked.sort_by_key(|(_, score)| Reverse(OrderedFloat(*score)));

    let (top_kind, max_score) = ranked[0];
    let mut primary = if max_score > 0.0 {
        top_kind
    } else {
        EmotionKind::Calm
    };

    if is_ambiguous {
        primary = EmotionKind::Confusion;
        scores[slot(EmotionKind::Confusion)] += AMBIGUITY_BONUS;
    }

    let total: f32 = scores.iter().sum();
    let raw_intensity = if total > 0.0 {
        max_score / total.max(TOTAL_FLOOR)
    } else {
        MIN_INTENSITY
    };
    let intensity = raw_intensity.clamp(MIN_INTENSITY, MAX_INTENSITY);

    let secondary_emotions = ranked
        .iter()
        .skip(1)
        .take(3)
        .filter(|(_, score)| *score > 0.0)
        .map(|(kind, _)| *kind)
        .collect();

    let is_extreme = intensity > 0.8 || exclamations > 2 || text.contains("!!");

    Ok(EmotionVerdict {
        primary,
        intensity,
        scores: EmotionKind::ALL
            .iter()
            .map(|k| (*k, scores[slot(*k)]))
            .collect(),
        is_ambiguous,
        is_overloaded: word_count > OVERLOAD_WORDS,
        secondary_emotions,
        is_extreme,
    })
}
