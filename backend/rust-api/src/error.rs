use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref QUOTA_MARKERS: Regex =
        Regex::new(r"(?i)rate[\s_-]?limit|too many requests|quota|\b429\b").expect("valid regex");
    static ref AUTH_CONFIG_MARKERS: Regex = Regex::new(
        r"(?i)api[\s_-]?key|not configured|missing configuration|unauthori[sz]ed|forbidden|invalid token|\b401\b|\b403\b"
    )
    .expect("valid regex");
}

/// Failure of a single puzzle source call.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("quota or rate limit reached: {0}")]
    Quota(String),

    #[error("authentication or configuration problem: {0}")]
    AuthConfiguration(String),

    #[error("no usable puzzle in response")]
    Empty,

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("provider asked for offline data")]
    FallbackRequested,
}

impl SourceError {
    /// Maps a backend-reported message onto the error taxonomy.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if QUOTA_MARKERS.is_match(&message) {
            SourceError::Quota(message)
        } else if AUTH_CONFIG_MARKERS.is_match(&message) {
            SourceError::AuthConfiguration(message)
        } else {
            SourceError::Backend(message)
        }
    }

    /// Errors that switch the whole session to offline puzzles.
    pub fn disables_live(&self) -> bool {
        matches!(
            self,
            SourceError::Quota(_) | SourceError::AuthConfiguration(_) | SourceError::FallbackRequested
        )
    }

    /// Errors worth a second attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Transport(_) | SourceError::Backend(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Transport(_) => "transport",
            SourceError::Backend(_) => "backend",
            SourceError::Quota(_) => "quota",
            SourceError::AuthConfiguration(_) => "auth_config",
            SourceError::Empty => "empty",
            SourceError::Decode(_) => "decode",
            SourceError::FallbackRequested => "fallback_requested",
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return SourceError::Decode(err.to_string());
        }
        if let Some(status) = err.status() {
            return SourceError::classify(format!("HTTP {}: {}", status.as_u16(), err));
        }
        SourceError::Transport(err.to_string())
    }
}

/// Returned when neither the live nor the offline source produced a puzzle.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no puzzle available: {reason}")]
    NoPuzzleAvailable { reason: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
