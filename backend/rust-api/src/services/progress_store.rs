use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::metrics::STORAGE_READ_FAILURES_TOTAL;
use crate::models::{DailyActivityBucket, PuzzleHistoryEntry, UserProgress};
use crate::storage::{
    KeyValueStore, PUZZLE_ACTIVITY_KEY, PUZZLE_HISTORY_KEY, SOLVED_PUZZLES_KEY,
    THEME_PROGRESS_KEY, USER_RATING_KEY,
};

/// Newest-first history keeps at most this many entries.
pub const HISTORY_CAP: usize = 50;

/// Stored ratings outside this range are treated as corrupt.
pub const RATING_RANGE: RangeInclusive<i32> = 0..=10_000;

pub type ThemeCounts = BTreeMap<String, u32>;

/// Activity buckets keyed by `yyyy-MM-dd`.
pub type ActivityBuckets = BTreeMap<String, DailyActivityBucket>;

/// Typed access to the persisted progress keys.
///
/// Unreadable values are logged and replaced by defaults; write failures are logged and
/// never reach the caller.
pub struct ProgressStore {
    store: Arc<dyn KeyValueStore>,
    initial_rating: i32,
}

impl ProgressStore {
    pub fn new(store: Arc<dyn KeyValueStore>, initial_rating: i32) -> Self {
        Self {
            store,
            initial_rating,
        }
    }

    pub fn load(&self) -> UserProgress {
        let rating = match self.read_raw(USER_RATING_KEY) {
            Some(raw) => match raw.trim().parse::<i32>() {
                Ok(rating) if RATING_RANGE.contains(&rating) => rating,
                Ok(rating) => {
                    self.record_corruption(
                        USER_RATING_KEY,
                        &format!("rating {} outside {:?}", rating, RATING_RANGE),
                    );
                    self.initial_rating
                }
                Err(e) => {
                    self.record_corruption(USER_RATING_KEY, &e);
                    self.initial_rating
                }
            },
            None => self.initial_rating,
        };

        UserProgress {
            rating,
            solved_puzzle_ids: self.read_json(SOLVED_PUZZLES_KEY),
        }
    }

    pub fn save(&self, progress: &UserProgress) {
        self.write_raw(USER_RATING_KEY, &progress.rating.to_string());
        self.write_json(SOLVED_PUZZLES_KEY, &progress.solved_puzzle_ids);
    }

    pub fn load_theme_counts(&self) -> ThemeCounts {
        self.read_json(THEME_PROGRESS_KEY)
    }

    pub fn save_theme_counts(&self, counts: &ThemeCounts) {
        self.write_json(THEME_PROGRESS_KEY, counts);
    }

    pub fn load_history(&self) -> Vec<PuzzleHistoryEntry> {
        self.read_json(PUZZLE_HISTORY_KEY)
    }

    pub fn save_history(&self, history: &[PuzzleHistoryEntry]) {
        self.write_json(PUZZLE_HISTORY_KEY, history);
    }

    pub fn load_activity(&self) -> ActivityBuckets {
        let mut buckets: ActivityBuckets = self.read_json(PUZZLE_ACTIVITY_KEY);
        buckets.retain(|date, bucket| match bucket.attempts_total() {
            Some(total) if total == bucket.count => true,
            Some(total) => {
                tracing::warn!(
                    "Activity bucket {} has count {} but {} solved + {} failed, repairing",
                    date,
                    bucket.count,
                    bucket.solved,
                    bucket.failed
                );
                bucket.count = total;
                true
            }
            None => {
                self.record_corruption(
                    PUZZLE_ACTIVITY_KEY,
                    &format!("bucket {} counters overflow", date),
                );
                false
            }
        });
        buckets
    }

    pub fn save_activity(&self, buckets: &ActivityBuckets) {
        self.write_json(PUZZLE_ACTIVITY_KEY, buckets);
    }

    /// Runs `f` with writes coalesced into a single persist at the end.
    pub fn in_batch<R>(&self, f: impl FnOnce() -> R) -> R {
        self.store.begin_batch();
        let result = f();
        if let Err(e) = self.store.end_batch() {
            tracing::error!("Failed to persist batched progress writes: {}", e);
        }
        result
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                self.record_corruption(key, &e);
                None
            }
        }
    }

    fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self.read_raw(key) else {
            return T::default();
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                self.record_corruption(key, &e);
                T::default()
            }
        }
    }

    fn write_raw(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::error!("Failed to persist '{}': {}", key, e);
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.write_raw(key, &json),
            Err(e) => tracing::error!("Failed to serialize '{}': {}", key, e),
        }
    }

    fn record_corruption(&self, key: &str, error: &dyn std::fmt::Display) {
        tracing::warn!("Stored value for '{}' is unreadable ({}), using defaults", key, error);
        STORAGE_READ_FAILURES_TOTAL.with_label_values(&[key]).inc();
    }
}
