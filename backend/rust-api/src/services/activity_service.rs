use std::sync::Arc;

use chrono::{DateTime, Days, Local, NaiveDate};

use super::progress_store::{ActivityBuckets, ProgressStore, HISTORY_CAP};
use crate::models::activity::DATE_KEY_FORMAT;
use crate::models::{
    ActivityCalendar, AttemptOutcome, CalendarDay, DailyActivityBucket, PuzzleHistoryEntry,
};

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Consecutive active days ending today, scanning at most `lookback_days` days.
///
/// A day without attempts today means no streak.
pub fn streak_from(buckets: &ActivityBuckets, today: NaiveDate, lookback_days: u32) -> u32 {
    let mut streak = 0;
    for offset in 0..lookback_days {
        let Some(day) = today.checked_sub_days(Days::new(u64::from(offset))) else {
            break;
        };
        match buckets.get(&date_key(day)) {
            Some(bucket) if bucket.count > 0 => streak += 1,
            _ => break,
        }
    }
    streak
}

/// Folds attempts into per-day buckets and the capped history log.
pub struct ActivityAggregator {
    store: Arc<ProgressStore>,
    lookback_days: u32,
}

impl ActivityAggregator {
    pub fn new(store: Arc<ProgressStore>, lookback_days: u32) -> Self {
        Self {
            store,
            lookback_days,
        }
    }

    /// Buckets the event by its local calendar date.
    pub fn record_event(
        &self,
        outcome: &AttemptOutcome,
        at: DateTime<Local>,
    ) -> DailyActivityBucket {
        self.record_on(outcome, at.date_naive())
    }

    pub fn record_on(&self, outcome: &AttemptOutcome, date: NaiveDate) -> DailyActivityBucket {
        let mut buckets = self.store.load_activity();
        let bucket = buckets.entry(date_key(date)).or_default();
        bucket.record(outcome);
        let updated = *bucket;
        self.store.save_activity(&buckets);

        tracing::debug!(
            "Activity {}: count={}, solved={}, failed={}, time={}s",
            date,
            updated.count,
            updated.solved,
            updated.failed,
            updated.time_spent_secs
        );
        updated
    }

    /// Inserts at the front and evicts from the tail beyond the cap.
    pub fn append_history(&self, entry: PuzzleHistoryEntry) -> usize {
        let mut history = self.store.load_history();
        history.insert(0, entry);
        history.truncate(HISTORY_CAP);
        self.store.save_history(&history);
        history.len()
    }

    pub fn history(&self) -> Vec<PuzzleHistoryEntry> {
        self.store.load_history()
    }

    pub fn bucket_for(&self, date: NaiveDate) -> DailyActivityBucket {
        self.store
            .load_activity()
            .get(&date_key(date))
            .copied()
            .unwrap_or_default()
    }

    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        streak_from(&self.store.load_activity(), today, self.lookback_days)
    }

    /// The last `days` days ending with `today`, oldest first. Missing days are empty buckets.
    pub fn calendar(&self, today: NaiveDate, days: u32) -> ActivityCalendar {
        let buckets = self.store.load_activity();
        let mut calendar_days = Vec::with_capacity(days as usize);

        for offset in (0..days).rev() {
            let Some(date) = today.checked_sub_days(Days::new(u64::from(offset))) else {
                continue;
            };
            let bucket = buckets.get(&date_key(date)).copied().unwrap_or_default();
            calendar_days.push(CalendarDay { date, bucket });
        }

        ActivityCalendar {
            total_attempts: calendar_days.iter().map(|d| d.bucket.count).sum(),
            total_solved: calendar_days.iter().map(|d| d.bucket.solved).sum(),
            total_time_secs: calendar_days.iter().map(|d| d.bucket.time_spent_secs).sum(),
            current_streak: streak_from(&buckets, today, self.lookback_days),
            days: calendar_days,
        }
    }
}
