use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, NaiveDate, Utc};

use super::activity_service::ActivityAggregator;
use super::notification_service::NotificationCenter;
use super::progress_store::{ProgressStore, ThemeCounts};
use super::scoring_service::ScoringEngine;
use crate::models::{
    ActivityCalendar, AttemptOutcome, AttemptedPuzzle, ProgressSnapshot, PuzzleHistoryEntry,
    RecordAttemptResponse,
};

/// Records attempts against scoring, activity and history as one unit.
pub struct TrainingService {
    store: Arc<ProgressStore>,
    scoring: ScoringEngine,
    activity: ActivityAggregator,
    write_lock: Mutex<()>,
}

impl TrainingService {
    pub fn new(
        store: Arc<ProgressStore>,
        notifications: Arc<NotificationCenter>,
        streak_lookback_days: u32,
    ) -> Self {
        Self {
            scoring: ScoringEngine::new(store.clone(), notifications),
            activity: ActivityAggregator::new(store.clone(), streak_lookback_days),
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn record_attempt(
        &self,
        puzzle: &AttemptedPuzzle,
        success: bool,
        time_spent_secs: u64,
        at: DateTime<Local>,
    ) -> RecordAttemptResponse {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        self.store.in_batch(|| {
            let outcome = self.scoring.record_outcome(puzzle, success);
            let today = self.activity.record_event(
                &AttemptOutcome {
                    success,
                    time_spent_secs,
                },
                at,
            );
            let history_entry = PuzzleHistoryEntry {
                puzzle_id: puzzle.id.clone(),
                timestamp: at.with_timezone(&Utc),
                rating: puzzle.rating,
                theme: puzzle.themes.first().cloned(),
                success,
                time_spent_secs,
            };
            self.activity.append_history(history_entry.clone());

            RecordAttemptResponse {
                outcome,
                today,
                current_streak: self.activity.current_streak(at.date_naive()),
                history_entry,
            }
        })
    }

    pub fn snapshot(&self, today: NaiveDate) -> ProgressSnapshot {
        let progress = self.store.load();
        ProgressSnapshot {
            rating: progress.rating,
            solved_count: progress.solved_puzzle_ids.len(),
            solved_puzzle_ids: progress.solved_puzzle_ids,
            current_streak: self.activity.current_streak(today),
        }
    }

    pub fn calendar(&self, today: NaiveDate, days: u32) -> ActivityCalendar {
        self.activity.calendar(today, days)
    }

    pub fn history(&self) -> Vec<PuzzleHistoryEntry> {
        self.activity.history()
    }

    pub fn theme_counts(&self) -> ThemeCounts {
        self.store.load_theme_counts()
    }
}
