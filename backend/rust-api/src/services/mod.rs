use std::sync::Arc;

use crate::config::{Config, LiveProvider};
use crate::sources::{OfflineSource, ProxyPuzzleSource, PuzzleSource, RapidApiSource};
use crate::storage::{FileStore, KeyValueStore};

pub mod activity_service;
pub mod notification_service;
pub mod progress_store;
pub mod puzzle_fetcher;
pub mod scoring_service;
pub mod slots;
pub mod source_selector;
pub mod training_service;

use notification_service::NotificationCenter;
use progress_store::ProgressStore;
use puzzle_fetcher::PuzzleFetcher;
use source_selector::SourceSelector;
use training_service::TrainingService;

pub struct AppState {
    pub notifications: Arc<NotificationCenter>,
    pub selector: Arc<SourceSelector>,
    pub fetcher: PuzzleFetcher,
    pub training: TrainingService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = FileStore::open(config.storage_path.clone())?;
        tracing::info!("Progress stored at {}", store.path().display());

        let live = build_live_source(&config)?;
        let offline = OfflineSource::bundled()?;
        tracing::info!("Loaded {} offline puzzles", offline.puzzles().len());

        let state = Self::with_parts(config, Arc::new(store), live, Arc::new(offline));

        // Warm the one-shot probe so the first request does not pay for it.
        let live_available = state.selector.is_live_available().await;
        tracing::info!(
            "Puzzle source: {}",
            if live_available { "live" } else { "offline" }
        );

        Ok(state)
    }

    pub fn with_parts(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        live: Option<Arc<dyn PuzzleSource>>,
        offline: Arc<dyn PuzzleSource>,
    ) -> Self {
        let notifications = Arc::new(NotificationCenter::new());
        let selector = Arc::new(SourceSelector::new(
            live,
            config.probe_timeout(),
            notifications.clone(),
        ));
        let fetcher = PuzzleFetcher::new(selector.clone(), offline, notifications.clone());
        let progress = Arc::new(ProgressStore::new(store, config.initial_rating));
        let training = TrainingService::new(
            progress,
            notifications.clone(),
            config.streak_lookback_days,
        );

        Self {
            notifications,
            selector,
            fetcher,
            training,
        }
    }
}

fn build_live_source(config: &Config) -> anyhow::Result<Option<Arc<dyn PuzzleSource>>> {
    let source: Arc<dyn PuzzleSource> = match config.live_provider {
        LiveProvider::Proxy => Arc::new(ProxyPuzzleSource::new(
            config.proxy_url.clone(),
            config.live_timeout(),
        )?),
        LiveProvider::RapidApi => Arc::new(RapidApiSource::new(
            config.rapidapi_url.clone(),
            config.rapidapi_host.clone(),
            config.rapidapi_key.clone(),
            config.live_timeout(),
        )?),
        LiveProvider::None => {
            tracing::info!("No live puzzle provider configured");
            return Ok(None);
        }
    };
    tracing::info!("Live puzzle provider: {}", source.name());
    Ok(Some(source))
}
