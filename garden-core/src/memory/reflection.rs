//! Reflection templates attached to each stored record.
//!
//! Template choice is the only randomized part of the memory store.

use crate::random::{pick, RandomSource};
use crate::types::EmotionKind;

/// The fixed reflection templates for an emotion.
#[must_use]
pub fn templates(kind: EmotionKind) -> &'static [&'static str] {
    match kind {
        EmotionKind::Calm => &[
            "this felt like a quiet apology drifting in lavender fog",
            "a soft exhale that turned into morning mist",
            "the space between thoughts where stillness grows",
            "peace settling like dust in abandoned rooms",
        ],
        EmotionKind::Anger => &[
            "fire that refuses to become smoke",
            "a scream caught in amber, still burning",
            "thorns that grew from buried rage",
            "heat that crystallized into crimson glass",
        ],
        EmotionKind::Nostalgia => &[
            "a photograph slowly fading in sunlight",
            "the echo of a song you can't quite remember",
            "autumn leaves pressed between forgotten pages",
            "a dream of a place that may never have existed",
        ],
        EmotionKind::Joy => &[
            "light spilling through cracks in reality",
            "laughter that became wildflowers",
            "a moment so bright it left afterimages",
            "happiness that couldn't be contained",
        ],
        EmotionKind::Confusion => &[
            "questions spiraling into fractal patterns",
            "thought-threads tangled in impossible knots",
            "a maze where all paths lead to themselves",
            "uncertainty blooming in purple fractals",
        ],
        EmotionKind::Loneliness => &[
            "silence that has its own gravity",
            "an echo in an empty cathedral",
            "the cold side of the bed, forever",
            "a single star in an infinite void",
        ],
    }
}

/// Draw one reflection for `kind`.
#[must_use]
pub fn reflect(kind: EmotionKind, rng: &mut dyn RandomSource) -> String {
    (*pick(rng, templates(kind))).to_string()
}
