use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::PuzzleSource;
use crate::error::SourceError;
use crate::metrics::track_live_call;
use crate::models::Puzzle;

const BATCH_COUNT: u32 = 10;

/// Either a JSON list or a space separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Words {
    List(Vec<String>),
    Text(String),
}

impl Default for Words {
    fn default() -> Self {
        Words::List(Vec::new())
    }
}

impl Words {
    fn into_vec(self) -> Vec<String> {
        match self {
            Words::List(list) => list,
            Words::Text(text) => text.split_whitespace().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderPuzzle {
    #[serde(alias = "id", alias = "puzzleId")]
    puzzleid: String,
    #[serde(default)]
    fen: String,
    #[serde(default)]
    rating: u32,
    #[serde(default)]
    moves: Words,
    #[serde(default)]
    themes: Words,
}

impl From<ProviderPuzzle> for Puzzle {
    fn from(raw: ProviderPuzzle) -> Self {
        // The first move belongs to the opponent, so the solver plays the side not to move.
        let color = match raw.fen.split_whitespace().nth(1) {
            Some("w") => Some("black".to_string()),
            Some("b") => Some("white".to_string()),
            _ => None,
        };
        Puzzle {
            id: raw.puzzleid,
            fen: raw.fen,
            solution: raw.moves.into_vec(),
            rating: raw.rating,
            themes: raw.themes.into_vec(),
            color,
            game: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    puzzles: Vec<ProviderPuzzle>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    fallback: bool,
}

/// Live source backed by the RapidAPI chess puzzle provider.
pub struct RapidApiSource {
    http_client: Client,
    base_url: String,
    host: String,
    api_key: Option<String>,
}

impl RapidApiSource {
    pub fn new(
        base_url: impl Into<String>,
        host: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into(),
            host: host.into(),
            api_key,
        })
    }

    async fn query(&self, params: &[(&str, String)]) -> Result<Vec<Puzzle>, SourceError> {
        // Without a key the provider cannot be reached; same outcome as its fallback sentinel.
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::FallbackRequested)?;

        tracing::debug!("Calling RapidAPI puzzles: params={:?}", params);

        let response = self
            .http_client
            .get(&self.base_url)
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", &self.host)
            .query(params)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let body: ProviderResponse = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(SourceError::classify(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    text
                )))
            }
            Err(e) => return Err(SourceError::Decode(e.to_string())),
        };

        if body.fallback {
            return Err(SourceError::FallbackRequested);
        }
        if let Some(error) = body.error.or(if status.is_success() {
            None
        } else {
            body.message
        }) {
            return Err(SourceError::classify(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error
            )));
        }
        if !status.is_success() {
            return Err(SourceError::classify(format!("HTTP {}", status.as_u16())));
        }

        super::playable_batch(body.puzzles.into_iter().map(Puzzle::from).collect())
    }

    fn pick_first(batch: Vec<Puzzle>) -> Result<Puzzle, SourceError> {
        batch.into_iter().next().ok_or(SourceError::Empty)
    }
}

#[async_trait]
impl PuzzleSource for RapidApiSource {
    fn name(&self) -> &'static str {
        "rapidapi"
    }

    async fn probe(&self) -> Result<(), SourceError> {
        track_live_call("account", self.query(&[("count", "1".to_string())]))
            .await
            .map(|_| ())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Puzzle, SourceError> {
        let batch = track_live_call("by_id", self.query(&[("id", id.to_string())])).await?;
        Self::pick_first(batch)
    }

    async fn fetch_batch_by_theme(&self, theme: &str) -> Result<Vec<Puzzle>, SourceError> {
        let themes = serde_json::to_string(&[theme]).map_err(|e| SourceError::Decode(e.to_string()))?;
        track_live_call(
            "by_theme",
            self.query(&[("themes", themes), ("count", BATCH_COUNT.to_string())]),
        )
        .await
    }

    async fn fetch_batch_by_rating(&self, rating: u32) -> Result<Vec<Puzzle>, SourceError> {
        track_live_call(
            "by_rating",
            self.query(&[
                ("rating", rating.to_string()),
                ("count", BATCH_COUNT.to_string()),
            ]),
        )
        .await
    }

    async fn fetch_next(&self) -> Result<Puzzle, SourceError> {
        let batch = track_live_call("next", self.query(&[("count", "1".to_string())])).await?;
        Self::pick_first(batch)
    }

    async fn fetch_daily(&self) -> Result<Puzzle, SourceError> {
        // The provider has no daily puzzle.
        Err(SourceError::Empty)
    }
}
