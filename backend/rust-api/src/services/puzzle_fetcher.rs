use std::sync::Arc;

use rand::seq::IndexedRandom;
use serde_json::Value;

use super::notification_service::NotificationCenter;
use super::slots::{PuzzleSlots, SlotState};
use super::source_selector::SourceSelector;
use crate::error::{FetchError, SourceError};
use crate::metrics::PUZZLE_FETCHES_TOTAL;
use crate::models::{FetchedPuzzle, NotificationKind, Puzzle, PuzzleOrigin, PuzzleRequest};
use crate::sources::PuzzleSource;
use crate::utils::retry::{retry_async_if, RetryConfig};

/// Result of a fetch issued for a slot.
#[derive(Debug)]
pub struct SlotOutcome {
    /// False when a newer request for the same slot had already been issued.
    pub applied: bool,
    pub result: Result<FetchedPuzzle, FetchError>,
    pub state: SlotState,
}

/// Live-first puzzle retrieval with offline fallback.
pub struct PuzzleFetcher {
    selector: Arc<SourceSelector>,
    offline: Arc<dyn PuzzleSource>,
    notifications: Arc<NotificationCenter>,
    slots: PuzzleSlots,
    retry: RetryConfig,
}

impl PuzzleFetcher {
    pub fn new(
        selector: Arc<SourceSelector>,
        offline: Arc<dyn PuzzleSource>,
        notifications: Arc<NotificationCenter>,
    ) -> Self {
        Self {
            selector,
            offline,
            notifications,
            slots: PuzzleSlots::new(),
            retry: RetryConfig::live_call(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub async fn fetch_by_id(&self, id: &str) -> Result<FetchedPuzzle, FetchError> {
        self.fetch(&PuzzleRequest::ById(id.to_string())).await
    }

    pub async fn fetch_by_theme(&self, theme: &str) -> Result<FetchedPuzzle, FetchError> {
        self.fetch(&PuzzleRequest::ByTheme(theme.to_string())).await
    }

    pub async fn fetch_by_rating(&self, rating: u32) -> Result<FetchedPuzzle, FetchError> {
        self.fetch(&PuzzleRequest::ByRating(rating)).await
    }

    pub async fn fetch_next(&self) -> Result<FetchedPuzzle, FetchError> {
        self.fetch(&PuzzleRequest::Next).await
    }

    pub async fn fetch_daily(&self) -> Result<FetchedPuzzle, FetchError> {
        self.fetch(&PuzzleRequest::Daily).await
    }

    pub async fn fetch(&self, request: &PuzzleRequest) -> Result<FetchedPuzzle, FetchError> {
        let operation = request.operation();

        if self.selector.is_live_available().await {
            if let Some(live) = self.selector.live_source() {
                match self.try_live(live.as_ref(), request).await {
                    Ok(puzzle) => {
                        PUZZLE_FETCHES_TOTAL
                            .with_label_values(&[operation, PuzzleOrigin::Live.as_str(), "success"])
                            .inc();
                        return Ok(FetchedPuzzle {
                            puzzle,
                            origin: PuzzleOrigin::Live,
                        });
                    }
                    Err(e) if e.disables_live() => {
                        self.selector.force_offline(&e);
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Live {} fetch failed ({}), falling back to offline puzzles",
                            operation,
                            e
                        );
                        self.notifications.notify(
                            NotificationKind::Info,
                            "Offline puzzle",
                            "The live puzzle could not be loaded, showing an offline one.",
                        );
                    }
                }
            }
        }

        match Self::run(self.offline.as_ref(), request).await {
            Ok(puzzle) => {
                PUZZLE_FETCHES_TOTAL
                    .with_label_values(&[operation, PuzzleOrigin::Offline.as_str(), "success"])
                    .inc();
                Ok(FetchedPuzzle {
                    puzzle,
                    origin: PuzzleOrigin::Offline,
                })
            }
            Err(e) => {
                PUZZLE_FETCHES_TOTAL
                    .with_label_values(&[operation, PuzzleOrigin::Offline.as_str(), "error"])
                    .inc();
                tracing::warn!("Offline {} fetch failed: {}", operation, e);
                self.notifications.notify(
                    NotificationKind::Error,
                    "No puzzle available",
                    "No puzzle matches this request right now.",
                );
                Err(FetchError::NoPuzzleAvailable {
                    reason: format!("{:?}: {}", request, e),
                })
            }
        }
    }

    /// Fetches into a named slot; only the most recently issued request updates it.
    pub async fn load_into_slot(&self, slot: &str, request: PuzzleRequest) -> SlotOutcome {
        let ticket = self.slots.begin(slot);
        let result = self.fetch(&request).await;
        let applied = self.slots.resolve(&ticket, &result);
        SlotOutcome {
            applied,
            result,
            state: self.slots.get(slot),
        }
    }

    pub fn slot(&self, slot: &str) -> SlotState {
        self.slots.get(slot)
    }

    /// Live-only passthrough; offline sessions get `FallbackRequested`.
    pub async fn live_dashboard(&self, days: u32) -> Result<Value, SourceError> {
        match self.live_if_available().await {
            Some(live) => live.dashboard(days).await,
            None => Err(SourceError::FallbackRequested),
        }
    }

    pub async fn live_activity(&self, max: u32) -> Result<Value, SourceError> {
        match self.live_if_available().await {
            Some(live) => live.activity(max).await,
            None => Err(SourceError::FallbackRequested),
        }
    }

    async fn live_if_available(&self) -> Option<&Arc<dyn PuzzleSource>> {
        if self.selector.is_live_available().await {
            self.selector.live_source()
        } else {
            None
        }
    }

    async fn try_live(
        &self,
        live: &dyn PuzzleSource,
        request: &PuzzleRequest,
    ) -> Result<Puzzle, SourceError> {
        retry_async_if(
            self.retry.clone(),
            || Self::run(live, request),
            SourceError::is_transient,
        )
        .await
    }

    async fn run(source: &dyn PuzzleSource, request: &PuzzleRequest) -> Result<Puzzle, SourceError> {
        match request {
            PuzzleRequest::ById(id) => source.fetch_by_id(id).await,
            PuzzleRequest::ByTheme(theme) => pick_random(source.fetch_batch_by_theme(theme).await?),
            PuzzleRequest::ByRating(rating) => {
                pick_random(source.fetch_batch_by_rating(*rating).await?)
            }
            PuzzleRequest::Next => source.fetch_next().await,
            PuzzleRequest::Daily => source.fetch_daily().await,
        }
    }
}

/// Uniform pick from a batch.
fn pick_random(batch: Vec<Puzzle>) -> Result<Puzzle, SourceError> {
    batch
        .choose(&mut rand::rng())
        .cloned()
        .ok_or(SourceError::Empty)
}
