use std::sync::Arc;

use super::notification_service::NotificationCenter;
use super::progress_store::ProgressStore;
use crate::metrics::PUZZLE_OUTCOMES_TOTAL;
use crate::models::{AttemptedPuzzle, NotificationKind, UpdatedProgress};

/// Award tiers: puzzles rated at least the threshold earn the points.
pub const RATING_TIERS: [(u32, i32); 2] = [(2000, 3), (1600, 2)];
/// Award for anything below the lowest tier.
pub const BASE_AWARD: i32 = 1;
/// Failures never cost rating.
pub const FAILURE_PENALTY: i32 = 0;

/// Rating change for one attempt.
pub fn rating_delta(puzzle_rating: u32, success: bool) -> i32 {
    if !success {
        return -FAILURE_PENALTY;
    }
    RATING_TIERS
        .iter()
        .find(|(threshold, _)| puzzle_rating >= *threshold)
        .map(|(_, award)| *award)
        .unwrap_or(BASE_AWARD)
}

pub struct ScoringEngine {
    store: Arc<ProgressStore>,
    notifications: Arc<NotificationCenter>,
}

impl ScoringEngine {
    pub fn new(store: Arc<ProgressStore>, notifications: Arc<NotificationCenter>) -> Self {
        Self {
            store,
            notifications,
        }
    }

    /// Applies one attempt to the persisted progress.
    ///
    /// Not atomic on its own; callers serialise read-modify-write cycles.
    pub fn record_outcome(&self, puzzle: &AttemptedPuzzle, success: bool) -> UpdatedProgress {
        let mut progress = self.store.load();
        let previous_rating = progress.rating;
        let delta = rating_delta(puzzle.rating, success);

        if success {
            progress.solved_puzzle_ids.push(puzzle.id.clone());
            progress.rating = progress.rating.saturating_add(delta);
            self.bump_theme_counts(&puzzle.themes);
        }
        self.store.save(&progress);

        let result = if success { "solved" } else { "failed" };
        PUZZLE_OUTCOMES_TOTAL.with_label_values(&[result]).inc();

        tracing::info!(
            "Puzzle {} {}: rating {} -> {} ({:+})",
            puzzle.id,
            result,
            previous_rating,
            progress.rating,
            delta
        );

        if success {
            self.notifications.notify(
                NotificationKind::Success,
                "Puzzle solved!",
                format!("Rating {:+} (now {})", delta, progress.rating),
            );
        } else {
            self.notifications.notify(
                NotificationKind::Error,
                "Incorrect solution",
                format!("Rating {:+} (still {})", delta, progress.rating),
            );
        }

        UpdatedProgress {
            progress,
            previous_rating,
            delta,
            success,
        }
    }

    fn bump_theme_counts(&self, themes: &[String]) {
        if themes.is_empty() {
            return;
        }
        let mut counts = self.store.load_theme_counts();
        for theme in themes {
            *counts.entry(theme.clone()).or_insert(0) += 1;
        }
        self.store.save_theme_counts(&counts);
    }
}
