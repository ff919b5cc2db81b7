use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};
use rand::seq::IndexedRandom;

use super::PuzzleSource;
use crate::error::SourceError;
use crate::models::{Puzzle, PuzzlePayload};

const BUNDLED_PUZZLES: &str = include_str!("../../data/offline_puzzles.json");

/// How many nearest-rated puzzles make up a rating batch.
const RATING_BATCH_SIZE: usize = 5;

/// Finite puzzle set shipped with the binary.
#[derive(Debug, Clone)]
pub struct OfflineSource {
    puzzles: Vec<Puzzle>,
}

impl OfflineSource {
    pub fn bundled() -> anyhow::Result<Self> {
        let payloads: Vec<PuzzlePayload> = serde_json::from_str(BUNDLED_PUZZLES)?;
        let puzzles: Vec<Puzzle> = payloads
            .into_iter()
            .map(Puzzle::from)
            .filter(Puzzle::is_playable)
            .collect();
        if puzzles.is_empty() {
            anyhow::bail!("bundled offline puzzle set is empty");
        }
        Ok(Self { puzzles })
    }

    pub fn from_puzzles(puzzles: Vec<Puzzle>) -> Self {
        Self { puzzles }
    }

    pub fn puzzles(&self) -> &[Puzzle] {
        &self.puzzles
    }

    /// Same puzzle for every call on the same calendar day.
    pub fn daily_for(&self, date: NaiveDate) -> Option<&Puzzle> {
        if self.puzzles.is_empty() {
            return None;
        }
        let index = date.num_days_from_ce().unsigned_abs() as usize % self.puzzles.len();
        self.puzzles.get(index)
    }

    fn nearest_rated(&self, rating: u32) -> Vec<Puzzle> {
        let mut ranked: Vec<&Puzzle> = self.puzzles.iter().collect();
        ranked.sort_by_key(|p| p.rating.abs_diff(rating));
        ranked
            .into_iter()
            .take(RATING_BATCH_SIZE)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PuzzleSource for OfflineSource {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn probe(&self) -> Result<(), SourceError> {
        Ok(())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Puzzle, SourceError> {
        self.puzzles
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(SourceError::Empty)
    }

    async fn fetch_batch_by_theme(&self, theme: &str) -> Result<Vec<Puzzle>, SourceError> {
        let tagged: Vec<Puzzle> = self
            .puzzles
            .iter()
            .filter(|p| p.has_theme(theme))
            .cloned()
            .collect();
        if !tagged.is_empty() {
            return Ok(tagged);
        }

        tracing::debug!(
            "No offline puzzle tagged '{}', offering the whole set",
            theme
        );
        super::playable_batch(self.puzzles.clone())
    }

    async fn fetch_batch_by_rating(&self, rating: u32) -> Result<Vec<Puzzle>, SourceError> {
        super::playable_batch(self.nearest_rated(rating))
    }

    async fn fetch_next(&self) -> Result<Puzzle, SourceError> {
        self.puzzles
            .choose(&mut rand::rng())
            .cloned()
            .ok_or(SourceError::Empty)
    }

    async fn fetch_daily(&self) -> Result<Puzzle, SourceError> {
        self.daily_for(Local::now().date_naive())
            .cloned()
            .ok_or(SourceError::Empty)
    }
}
