use serde::{Deserialize, Serialize};

/// Persisted learner progress. The streak is derived from activity and never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub rating: i32,
    /// One entry per successful attempt, duplicates included.
    pub solved_puzzle_ids: Vec<String>,
}

/// Result of one scored attempt.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatedProgress {
    pub progress: UserProgress,
    pub previous_rating: i32,
    pub delta: i32,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ProgressSnapshot {
    pub rating: i32,
    pub solved_count: usize,
    pub solved_puzzle_ids: Vec<String>,
    pub current_streak: u32,
}
