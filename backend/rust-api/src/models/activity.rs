use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Date format used for bucket keys.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Attempts recorded on one calendar day.
///
/// `count == solved + failed` holds for every bucket written through [`DailyActivityBucket::record`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivityBucket {
    pub count: u32,
    pub solved: u32,
    pub failed: u32,
    /// Seconds, accumulated.
    #[serde(rename = "time")]
    pub time_spent_secs: u64,
}

impl DailyActivityBucket {
    pub fn record(&mut self, outcome: &AttemptOutcome) {
        self.count = self.count.saturating_add(1);
        if outcome.success {
            self.solved = self.solved.saturating_add(1);
        } else {
            self.failed = self.failed.saturating_add(1);
        }
        self.time_spent_secs = self.time_spent_secs.saturating_add(outcome.time_spent_secs);
    }

    /// `None` when the counters cannot be summed without overflow.
    pub fn attempts_total(&self) -> Option<u32> {
        self.solved.checked_add(self.failed)
    }

    pub fn is_consistent(&self) -> bool {
        self.attempts_total() == Some(self.count)
    }
}

/// The part of an attempt the aggregator cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub success: bool,
    pub time_spent_secs: u64,
}

/// One attempt in the recent-history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleHistoryEntry {
    pub puzzle_id: String,
    pub timestamp: DateTime<Utc>,
    pub rating: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    pub success: bool,
    pub time_spent_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub bucket: DailyActivityBucket,
}

/// Calendar view over the most recent days, oldest first.
#[derive(Debug, Serialize)]
pub struct ActivityCalendar {
    pub days: Vec<CalendarDay>,
    pub current_streak: u32,
    pub total_attempts: u32,
    pub total_solved: u32,
    pub total_time_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_keeps_count_equal_to_solved_plus_failed() {
        let mut bucket = DailyActivityBucket::default();
        for success in [true, false, true, true, false] {
            bucket.record(&AttemptOutcome {
                success,
                time_spent_secs: 30,
            });
            assert!(bucket.is_consistent());
        }
        assert_eq!(bucket.count, 5);
        assert_eq!(bucket.solved, 3);
        assert_eq!(bucket.failed, 2);
        assert_eq!(bucket.time_spent_secs, 150);
    }

    #[test]
    fn bucket_with_overflowing_counters_is_inconsistent() {
        let bucket = DailyActivityBucket {
            count: 0,
            solved: u32::MAX,
            failed: 1,
            time_spent_secs: 0,
        };
        assert_eq!(bucket.attempts_total(), None);
        assert!(!bucket.is_consistent());
    }

    #[test]
    fn record_saturates_instead_of_wrapping() {
        let mut bucket = DailyActivityBucket {
            count: u32::MAX,
            solved: u32::MAX,
            failed: 0,
            time_spent_secs: u64::MAX,
        };
        bucket.record(&AttemptOutcome {
            success: true,
            time_spent_secs: 10,
        });
        assert_eq!(bucket.count, u32::MAX);
        assert_eq!(bucket.solved, u32::MAX);
        assert_eq!(bucket.time_spent_secs, u64::MAX);
    }

    #[test]
    fn bucket_serializes_time_field() {
        let bucket = DailyActivityBucket {
            count: 1,
            solved: 1,
            failed: 0,
            time_spent_secs: 42,
        };
        let value = serde_json::to_value(bucket).unwrap();
        assert_eq!(value["time"], 42);
    }
}
