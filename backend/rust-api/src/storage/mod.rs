//! Key/value persistence port for local progress data.

use crate::error::StorageError;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

pub const SOLVED_PUZZLES_KEY: &str = "solvedPuzzles";
pub const USER_RATING_KEY: &str = "userRating";
pub const THEME_PROGRESS_KEY: &str = "themeProgress";
pub const PUZZLE_HISTORY_KEY: &str = "puzzleHistory";
pub const PUZZLE_ACTIVITY_KEY: &str = "puzzleActivity";

/// String-valued store with browser local-storage semantics.
///
/// Calls are synchronous; a read-modify-write done under one lock cannot interleave.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Defers persistence until the matching `end_batch`. Batches nest.
    fn begin_batch(&self) {}

    fn end_batch(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
