//! Puzzle backends: the live remote services and the bundled offline set.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::models::Puzzle;

pub mod offline;
pub mod proxy;
pub mod rapidapi;

pub use offline::OfflineSource;
pub use proxy::ProxyPuzzleSource;
pub use rapidapi::RapidApiSource;

#[async_trait]
pub trait PuzzleSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lightweight reachability check (the proxy fetches the account profile).
    async fn probe(&self) -> Result<(), SourceError>;

    async fn fetch_by_id(&self, id: &str) -> Result<Puzzle, SourceError>;

    async fn fetch_batch_by_theme(&self, theme: &str) -> Result<Vec<Puzzle>, SourceError>;

    async fn fetch_batch_by_rating(&self, rating: u32) -> Result<Vec<Puzzle>, SourceError>;

    async fn fetch_next(&self) -> Result<Puzzle, SourceError>;

    async fn fetch_daily(&self) -> Result<Puzzle, SourceError>;

    /// Raw puzzle dashboard for the last `days` days, when the backend has one.
    async fn dashboard(&self, _days: u32) -> Result<serde_json::Value, SourceError> {
        Err(SourceError::Empty)
    }

    /// Raw recent puzzle activity, when the backend has one.
    async fn activity(&self, _max: u32) -> Result<serde_json::Value, SourceError> {
        Err(SourceError::Empty)
    }
}

/// Keeps only playable puzzles; an empty batch is an empty result.
pub(crate) fn playable_batch(batch: Vec<Puzzle>) -> Result<Vec<Puzzle>, SourceError> {
    let playable: Vec<Puzzle> = batch.into_iter().filter(Puzzle::is_playable).collect();
    if playable.is_empty() {
        Err(SourceError::Empty)
    } else {
        Ok(playable)
    }
}

pub(crate) fn playable(puzzle: Puzzle) -> Result<Puzzle, SourceError> {
    if puzzle.is_playable() {
        Ok(puzzle)
    } else {
        Err(SourceError::Empty)
    }
}
