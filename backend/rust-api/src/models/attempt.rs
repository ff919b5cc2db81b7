use serde::{Deserialize, Serialize};
use validator::Validate;

use super::activity::{DailyActivityBucket, PuzzleHistoryEntry};
use super::progress::UpdatedProgress;

/// The puzzle facts scoring needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptedPuzzle {
    pub id: String,
    pub rating: u32,
    pub themes: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordAttemptRequest {
    #[validate(length(min = 1, max = 64))]
    pub puzzle_id: String,
    #[validate(range(max = 4000))]
    pub puzzle_rating: u32,
    #[serde(default)]
    pub themes: Vec<String>,
    pub success: bool,
    #[serde(default)]
    #[validate(range(max = 86400))]
    pub time_spent_secs: u64,
}

impl RecordAttemptRequest {
    pub fn attempted_puzzle(&self) -> AttemptedPuzzle {
        AttemptedPuzzle {
            id: self.puzzle_id.clone(),
            rating: self.puzzle_rating,
            themes: self.themes.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordAttemptResponse {
    #[serde(flatten)]
    pub outcome: UpdatedProgress,
    pub today: DailyActivityBucket,
    pub current_streak: u32,
    pub history_entry: PuzzleHistoryEntry,
}
