//! The memory store: a bounded, append-only log of submissions.
//!
//! Records and session state are serialized to JSON and handed to a
//! [`KeyValueBackend`] under two keys. Backend failures never escape this
//! module: a failed read is treated as "no data" and a failed write is
//! logged and dropped.

pub mod record;
pub mod reflection;

pub use record::{MemoryRecord, SessionState};

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::classifier::EmotionVerdict;
use crate::config::MemoryConfig;
use crate::error::{GardenError, Result};
use crate::random::RandomSource;
use crate::storage::KeyValueBackend;
use crate::types::{EmotionKind, MemoryId};

/// Bounded log of memory records plus the session state record.
#[derive(Clone)]
pub struct MemoryStore {
    backend: Arc<dyn KeyValueBackend>,
    config: MemoryConfig,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Wrap a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueBackend>, config: MemoryConfig) -> Self {
        Self { backend, config }
    }

    /// Record a submission and return the stored record.
    ///
    /// The record is returned even if persisting it fails.
    pub fn append(
        &self,
        text: &str,
        verdict: EmotionVerdict,
        now: DateTime<Utc>,
        rng: &mut dyn RandomSource,
    ) -> MemoryRecord {
        let record = MemoryRecord {
            id: MemoryId::new(),
            text: text.to_string(),
            reflection: reflection::reflect(verdict.primary, rng),
            emotion: verdict,
            timestamp: now,
        };

        let mut records = self.list_all();
        let at = records.partition_point(|r| r.timestamp <= record.timestamp);
        records.insert(at, record.clone());
        if records.len() > self.config.capacity {
            let overflow = records.len() - self.config.capacity;
            records.drain(..overflow);
            debug!(evicted = overflow, "memory store at capacity");
        }

        self.write_json(&self.config.memories_key, &records);
        record
    }

    /// All records, oldest first.
    #[must_use]
    pub fn list_all(&self) -> Vec<MemoryRecord> {
        self.read_json(&self.config.memories_key).unwrap_or_default()
    }

    /// Look up a single record.
    ///
    /// # Errors
    /// Returns [`GardenError::MemoryNotFound`] if no record has this ID.
    pub fn get(&self, id: MemoryId) -> Result<MemoryRecord> {
        self.list_all()
            .into_iter()
            .find(|r| r.id == id)
            .ok_or(GardenError::MemoryNotFound(id))
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list_all().len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list_all().is_empty()
    }

    /// The persisted session state, if any.
    #[must_use]
    pub fn session(&self) -> Option<SessionState> {
        self.read_json(&self.config.session_key)
    }

    /// True iff there are no records and no session state.
    #[must_use]
    pub fn is_first_ever(&self) -> bool {
        self.is_empty() && self.session().is_none()
    }

    /// Time since the last recorded visit; zero when none is recorded.
    #[must_use]
    pub fn time_since_last_visit(&self, now: DateTime<Utc>) -> Duration {
        self.session()
            .and_then(|s| (now - s.last_visit).to_std().ok())
            .unwrap_or_default()
    }

    /// Persist `now` as the last visit together with the last emotion.
    pub fn record_visit(&self, now: DateTime<Utc>, last_emotion: EmotionKind) {
        let state = SessionState {
            last_visit: now,
            last_emotion,
        };
        self.write_json(&self.config.session_key, &state);
    }

    /// Forget every record and the session state.
    pub fn clear(&self) {
        for key in [&self.config.memories_key, &self.config.session_key] {
            if let Err(e) = self.backend.remove(key) {
                warn!(key = %key, error = %e, "failed to clear garden storage");
            }
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "garden storage read failed, treating as empty");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "garden storage holds unreadable data, ignoring");
                None
            }
        }
    }

    fn write_json<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(GardenError::from)
            .and_then(|json| self.backend.set(key, &json));
        if let Err(e) = result {
            warn!(key, error = %e, "garden storage write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::GardenRng;
    use crate::storage::InMemoryBackend;
    use chrono::Duration as ChronoDuration;

    /// Backend whose every call fails.
    struct BrokenBackend;

    impl KeyValueBackend for BrokenBackend {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(GardenError::Storage("disk on fire".to_string()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(GardenError::Storage("disk on fire".to_string()))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(GardenError::Storage("disk on fire".to_string()))
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new(Arc::new(InMemoryBackend::new()), MemoryConfig::default())
    }

    #[test]
    fn append_then_list_oldest_first() {
        let store = store();
        let mut rng = GardenRng::seeded(1);
        let t0 = Utc::now();
        store.append("first", EmotionVerdict::neutral(), t0, &mut rng);
        store.append(
            "second",
            EmotionVerdict::neutral(),
            t0 + ChronoDuration::seconds(1),
            &mut rng,
        );

        let all = store.list_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].text, "first");
        assert_eq!(all[1].text, "second");
        assert_eq!(store.get(all[1].id).expect("found").text, "second");
    }

    #[test]
    fn fifty_first_record_evicts_the_oldest() {
        let store = store();
        let mut rng = GardenRng::seeded(2);
        let t0 = Utc::now();
        for i in 0..51 {
            store.append(
                &format!("entry {i}"),
                EmotionVerdict::neutral(),
                t0 + ChronoDuration::seconds(i),
                &mut rng,
            );
        }
        let all = store.list_all();
        assert_eq!(all.len(), 50);
        assert_eq!(all[0].text, "entry 1");
        assert_eq!(all[49].text, "entry 50");
    }

    #[test]
    fn out_of_order_timestamp_is_placed_by_time() {
        let store = store();
        let mut rng = GardenRng::seeded(3);
        let t0 = Utc::now();
        store.append("late", EmotionVerdict::neutral(), t0, &mut rng);
        store.append(
            "early",
            EmotionVerdict::neutral(),
            t0 - ChronoDuration::minutes(1),
            &mut rng,
        );
        let texts: Vec<String> = store.list_all().into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["early", "late"]);
    }

    #[test]
    fn first_ever_and_visits() {
        let store = store();
        let t0 = Utc::now();
        assert!(store.is_first_ever());
        assert_eq!(store.time_since_last_visit(t0), Duration::ZERO);

        store.record_visit(t0, EmotionKind::Joy);
        assert!(!store.is_first_ever());
        assert_eq!(
            store.time_since_last_visit(t0 + ChronoDuration::hours(6)),
            Duration::from_secs(6 * 3600)
        );
        assert_eq!(store.session().map(|s| s.last_emotion), Some(EmotionKind::Joy));
    }

    #[test]
    fn clear_resets_to_first_ever() {
        let store = store();
        let mut rng = GardenRng::seeded(4);
        let t0 = Utc::now();
        store.append("something", EmotionVerdict::neutral(), t0, &mut rng);
        store.record_visit(t0, EmotionKind::Calm);

        store.clear();
        assert!(store.list_all().is_empty());
        assert!(store.is_first_ever());
    }

    #[test]
    fn broken_backend_fails_soft() {
        let store = MemoryStore::new(Arc::new(BrokenBackend), MemoryConfig::default());
        let mut rng = GardenRng::seeded(5);
        let record = store.append("still here", EmotionVerdict::neutral(), Utc::now(), &mut rng);
        assert_eq!(record.text, "still here");
        assert!(store.list_all().is_empty());
        assert!(store.is_first_ever());
        store.clear();
    }

    #[test]
    fn corrupt_payload_reads_as_empty() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.set("garden_memories", "{not json").expect("set");
        let store = MemoryStore::new(backend, MemoryConfig::default());
        assert!(store.list_all().is_empty());
    }
}
