use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PuzzleSource;
use crate::error::SourceError;
use crate::metrics::track_live_call;
use crate::models::{Puzzle, PuzzlePayload};

/// Body sent to the serverless proxy in front of Lichess.
#[derive(Debug, Serialize)]
struct ProxyRequest<'a> {
    endpoint: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    params: BTreeMap<&'static str, String>,
}

/// `{ data }` on success, `{ error }` otherwise.
#[derive(Debug, Deserialize)]
struct ProxyResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    fallback: bool,
}

#[derive(Debug, Deserialize)]
struct PuzzleBatch {
    #[serde(default)]
    puzzles: Vec<PuzzlePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BatchShape {
    Wrapped(PuzzleBatch),
    Bare(Vec<PuzzlePayload>),
}

/// Live source backed by the Lichess proxy function.
pub struct ProxyPuzzleSource {
    http_client: Client,
    proxy_url: String,
}

impl ProxyPuzzleSource {
    pub fn new(proxy_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            proxy_url: proxy_url.into(),
        })
    }

    async fn call(
        &self,
        endpoint: &str,
        params: BTreeMap<&'static str, String>,
    ) -> Result<Value, SourceError> {
        tracing::debug!("Calling puzzle proxy: endpoint={}, params={:?}", endpoint, params);

        let response = self
            .http_client
            .post(&self.proxy_url)
            .json(&ProxyRequest { endpoint, params })
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let body: ProxyResponse = match serde_json::from_str(&text) {
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
        if let Some(error) = body.error {
            return Err(SourceError::classify(error));
        }
        if !status.is_success() {
            return Err(SourceError::classify(format!("HTTP {}", status.as_u16())));
        }

        match body.data {
            Some(Value::Null) | None => Err(SourceError::Empty),
            Some(data) => Ok(data),
        }
    }

    async fn single(
        &self,
        endpoint: &str,
        params: BTreeMap<&'static str, String>,
    ) -> Result<Puzzle, SourceError> {
        let data = self.call(endpoint, params).await?;
        let payload: PuzzlePayload =
            serde_json::from_value(data).map_err(|e| SourceError::Decode(e.to_string()))?;
        super::playable(Puzzle::from(payload))
    }

    async fn batch(
        &self,
        endpoint: &str,
        params: BTreeMap<&'static str, String>,
    ) -> Result<Vec<Puzzle>, SourceError> {
        let data = self.call(endpoint, params).await?;
        let payloads = match serde_json::from_value(data)
            .map_err(|e| SourceError::Decode(e.to_string()))?
        {
            BatchShape::Wrapped(batch) => batch.puzzles,
            BatchShape::Bare(list) => list,
        };
        super::playable_batch(payloads.into_iter().map(Puzzle::from).collect())
    }
}

#[async_trait]
impl PuzzleSource for ProxyPuzzleSource {
    fn name(&self) -> &'static str {
        "lichess-proxy"
    }

    async fn probe(&self) -> Result<(), SourceError> {
        track_live_call("account", self.call("account", BTreeMap::new()))
            .await
            .map(|_| ())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Puzzle, SourceError> {
        let endpoint = format!("puzzle/{}", id);
        track_live_call("by_id", self.single(&endpoint, BTreeMap::new())).await
    }

    async fn fetch_batch_by_theme(&self, theme: &str) -> Result<Vec<Puzzle>, SourceError> {
        let endpoint = format!("puzzle/batch/{}", theme);
        track_live_call("by_theme", self.batch(&endpoint, BTreeMap::new())).await
    }

    async fn fetch_batch_by_rating(&self, rating: u32) -> Result<Vec<Puzzle>, SourceError> {
        let params = BTreeMap::from([("rating", rating.to_string())]);
        track_live_call("by_rating", self.batch("puzzle/batch/mix", params)).await
    }

    async fn fetch_next(&self) -> Result<Puzzle, SourceError> {
        track_live_call("next", self.single("puzzle/next", BTreeMap::new())).await
    }

    async fn fetch_daily(&self) -> Result<Puzzle, SourceError> {
        track_live_call("daily", self.single("puzzle/daily", BTreeMap::new())).await
    }

    async fn dashboard(&self, days: u32) -> Result<Value, SourceError> {
        let endpoint = format!("puzzle/dashboard/{}", days);
        track_live_call("dashboard", self.call(&endpoint, BTreeMap::new())).await
    }

    async fn activity(&self, max: u32) -> Result<Value, SourceError> {
        let params = BTreeMap::from([("max", max.to_string())]);
        track_live_call("activity", self.call("puzzle/activity", params)).await
    }
}
