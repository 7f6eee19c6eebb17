//! Stored records: one per submission, plus the session bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::EmotionVerdict;
use crate::types::{EmotionKind, MemoryId};

/// A single remembered submission. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique identifier.
    pub id: MemoryId,
    /// The text as submitted.
    pub text: String,
    /// What the classifier made of it.
    pub emotion: EmotionVerdict,
    /// Wall-clock time of submission.
    pub timestamp: DateTime<Utc>,
    /// Poetic one-liner drawn from the emotion's templates.
    pub reflection: String,
}

impl MemoryRecord {
    /// Age of the record at `now` (zero if `now` is earlier).
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.timestamp).to_std().unwrap_or_default()
    }

    /// Compact relative label: "just now", "5m ago", "3h ago", "2d ago".
    #[must_use]
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let secs = self.age(now).as_secs();
        let minutes = secs / 60;
        let hours = secs / 3600;
        let days = secs / 86_400;
        if minutes < 1 {
            "just now".to_string()
        } else if minutes < 60 {
            format!("{minutes}m ago")
        } else if hours < 24 {
            format!("{hours}h ago")
        } else {
            format!("{days}d ago")
        }
    }
}

/// Per-garden session bookkeeping, persisted next to the records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Last time the garden was opened or written to.
    pub last_visit: DateTime<Utc>,
    /// Primary emotion of the last submission.
    pub last_emotion: EmotionKind,
}
