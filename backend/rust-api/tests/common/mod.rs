#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chesstrainer_api::{
    config::{Config, LiveProvider},
    create_router,
    error::SourceError,
    models::Puzzle,
    services::AppState,
    sources::{OfflineSource, PuzzleSource},
    storage::{KeyValueStore, MemoryStore},
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// How the scripted live backend answers every call.
#[derive(Clone, Copy, Debug)]
pub enum LiveBehavior {
    Healthy,
    ProbeFails,
    QuotaExceeded,
    Unreachable,
}

pub struct ScriptedLiveSource {
    behavior: LiveBehavior,
    pub calls: AtomicUsize,
}

impl ScriptedLiveSource {
    pub fn new(behavior: LiveBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer<T>(&self, value: T) -> Result<T, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            LiveBehavior::Healthy | LiveBehavior::ProbeFails => Ok(value),
            LiveBehavior::QuotaExceeded => Err(SourceError::classify("Too many requests (429)")),
            LiveBehavior::Unreachable => {
                Err(SourceError::Transport("connection refused".to_string()))
            }
        }
    }
}

pub fn live_puzzle(id: &str, rating: u32, themes: &[&str]) -> Puzzle {
    Puzzle {
        id: id.to_string(),
        fen: "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3".to_string(),
        solution: vec!["f3e5".to_string(), "c6e5".to_string()],
        rating,
        themes: themes.iter().map(|t| t.to_string()).collect(),
        color: Some("white".to_string()),
        game: None,
    }
}

#[async_trait]
impl PuzzleSource for ScriptedLiveSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn probe(&self) -> Result<(), SourceError> {
        match self.behavior {
            LiveBehavior::ProbeFails => Err(SourceError::Transport("probe refused".to_string())),
            _ => Ok(()),
        }
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Puzzle, SourceError> {
        self.answer(live_puzzle(id, 1500, &["fork"]))
    }

    async fn fetch_batch_by_theme(&self, theme: &str) -> Result<Vec<Puzzle>, SourceError> {
        self.answer(vec![live_puzzle("LIVETHEME", 1500, &[theme])])
    }

    async fn fetch_batch_by_rating(&self, rating: u32) -> Result<Vec<Puzzle>, SourceError> {
        self.answer(vec![live_puzzle("LIVERATED", rating, &["middlegame"])])
    }

    async fn fetch_next(&self) -> Result<Puzzle, SourceError> {
        self.answer(live_puzzle("LIVENEXT", 1600, &["pin"]))
    }

    async fn fetch_daily(&self) -> Result<Puzzle, SourceError> {
        self.answer(live_puzzle("LIVEDAILY", 1800, &["mateIn2"]))
    }

    async fn dashboard(&self, days: u32) -> Result<serde_json::Value, SourceError> {
        self.answer(serde_json::json!({ "days": days, "themes": {} }))
    }
}

pub fn test_config() -> Config {
    Config {
        live_provider: LiveProvider::None,
        probe_timeout_ms: 500,
        live_timeout_ms: 500,
        ..Config::default()
    }
}

/// Router over in-memory storage with offline puzzles only.
pub fn create_test_app() -> Router {
    create_test_app_with_live(None).0
}

pub fn create_test_app_with_live(
    live: Option<Arc<ScriptedLiveSource>>,
) -> (Router, Arc<AppState>) {
    build_app(Arc::new(MemoryStore::new()), live)
}

/// Offline-only router over the given store.
pub fn create_test_app_with_store(store: Arc<dyn KeyValueStore>) -> Router {
    build_app(store, None).0
}

fn build_app(
    store: Arc<dyn KeyValueStore>,
    live: Option<Arc<ScriptedLiveSource>>,
) -> (Router, Arc<AppState>) {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let offline = OfflineSource::bundled().expect("bundled puzzles load");
    let live = live.map(|source| source as Arc<dyn PuzzleSource>);
    let app_state = Arc::new(AppState::with_parts(
        test_config(),
        store,
        live,
        Arc::new(offline),
    ));

    (create_router(app_state.clone()), app_state)
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_json(response).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&body).to_string())
        })
    };
    (status, json)
}
