use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::OnceCell;

use super::notification_service::NotificationCenter;
use crate::error::SourceError;
use crate::metrics::PUZZLE_SOURCE_LIVE;
use crate::models::NotificationKind;
use crate::sources::PuzzleSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    Undecided,
    Live,
    Offline,
}

/// One-shot decision between the live backend and offline puzzles.
///
/// The probe runs at most once per process. Once offline, the session stays offline.
pub struct SourceSelector {
    live: Option<Arc<dyn PuzzleSource>>,
    decision: OnceCell<bool>,
    forced_offline: AtomicBool,
    probe_timeout: Duration,
    notifications: Arc<NotificationCenter>,
}

impl SourceSelector {
    pub fn new(
        live: Option<Arc<dyn PuzzleSource>>,
        probe_timeout: Duration,
        notifications: Arc<NotificationCenter>,
    ) -> Self {
        Self {
            live,
            decision: OnceCell::new(),
            forced_offline: AtomicBool::new(false),
            probe_timeout,
            notifications,
        }
    }

    pub async fn is_live_available(&self) -> bool {
        if self.forced_offline.load(Ordering::SeqCst) {
            return false;
        }
        let probed = *self.decision.get_or_init(|| self.probe()).await;
        probed && !self.forced_offline.load(Ordering::SeqCst)
    }

    pub fn live_source(&self) -> Option<&Arc<dyn PuzzleSource>> {
        self.live.as_ref()
    }

    pub fn mode(&self) -> SourceMode {
        if self.forced_offline.load(Ordering::SeqCst) {
            return SourceMode::Offline;
        }
        match self.decision.get() {
            None => SourceMode::Undecided,
            Some(true) => SourceMode::Live,
            Some(false) => SourceMode::Offline,
        }
    }

    /// Permanently switches this session to offline puzzles.
    pub fn force_offline(&self, reason: &SourceError) {
        if self.forced_offline.swap(true, Ordering::SeqCst) {
            return;
        }
        PUZZLE_SOURCE_LIVE.set(0);
        tracing::warn!("Live puzzle backend disabled for this session: {}", reason);
        self.notifications.notify(
            NotificationKind::Warning,
            "Using offline puzzles",
            format!("Live puzzles are unavailable ({}).", reason.kind()),
        );
    }

    async fn probe(&self) -> bool {
        let Some(live) = &self.live else {
            tracing::info!("No live puzzle backend configured, using offline puzzles");
            PUZZLE_SOURCE_LIVE.set(0);
            self.notifications.notify(
                NotificationKind::Info,
                "Offline mode",
                "Using the bundled offline puzzles.",
            );
            return false;
        };

        let outcome = match tokio::time::timeout(self.probe_timeout, live.probe()).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Transport(format!(
                "probe timed out after {}ms",
                self.probe_timeout.as_millis()
            ))),
        };

        match outcome {
            Ok(()) => {
                tracing::info!("Live puzzle backend '{}' reachable", live.name());
                PUZZLE_SOURCE_LIVE.set(1);
                self.notifications.notify(
                    NotificationKind::Success,
                    "Live puzzles",
                    format!("Connected to {}.", live.name()),
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Live puzzle backend '{}' probe failed ({}), using offline puzzles",
                    live.name(),
                    e
                );
                PUZZLE_SOURCE_LIVE.set(0);
                self.notifications.notify(
                    NotificationKind::Warning,
                    "Using offline puzzles",
                    "The live puzzle service could not be reached.",
                );
                false
            }
        }
    }
}
