use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage::FileStore;

/// Which remote backend serves live puzzles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveProvider {
    /// Serverless proxy in front of the Lichess API.
    Proxy,
    /// Third-party chess puzzle provider behind RapidAPI.
    RapidApi,
    /// Offline puzzles only.
    None,
}

impl LiveProvider {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "rapidapi" => LiveProvider::RapidApi,
            "none" | "offline" => LiveProvider::None,
            _ => LiveProvider::Proxy,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub live_provider: LiveProvider,
    pub proxy_url: String,
    pub rapidapi_url: String,
    pub rapidapi_host: String,
    pub rapidapi_key: Option<String>,
    pub live_timeout_ms: u64,
    pub probe_timeout_ms: u64,
    pub storage_path: PathBuf,
    pub initial_rating: i32,
    pub streak_lookback_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8082".to_string(),
            live_provider: LiveProvider::Proxy,
            proxy_url: "http://localhost:8888/.netlify/functions/lichess".to_string(),
            rapidapi_url: "https://chess-puzzles.p.rapidapi.com".to_string(),
            rapidapi_host: "chess-puzzles.p.rapidapi.com".to_string(),
            rapidapi_key: None,
            live_timeout_ms: 5000,
            probe_timeout_ms: 3000,
            storage_path: FileStore::default_path(),
            initial_rating: 1200,
            streak_lookback_days: 7,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Local .env is optional
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let defaults = Config::default();

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or(defaults.bind_addr);

        let live_provider = settings
            .get_string("live.provider")
            .or_else(|_| env::var("LIVE_PROVIDER"))
            .map(|v| LiveProvider::parse(&v))
            .unwrap_or(defaults.live_provider);

        let proxy_url = settings
            .get_string("live.proxy_url")
            .or_else(|_| env::var("LICHESS_PROXY_URL"))
            .unwrap_or(defaults.proxy_url);

        let rapidapi_url = settings
            .get_string("live.rapidapi_url")
            .or_else(|_| env::var("RAPIDAPI_URL"))
            .unwrap_or(defaults.rapidapi_url);

        let rapidapi_host = settings
            .get_string("live.rapidapi_host")
            .or_else(|_| env::var("RAPIDAPI_HOST"))
            .unwrap_or(defaults.rapidapi_host);

        let rapidapi_key = settings
            .get_string("live.rapidapi_key")
            .or_else(|_| env::var("RAPIDAPI_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());

        let live_timeout_ms = settings
            .get_int("live.timeout_ms")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.live_timeout_ms);

        let probe_timeout_ms = settings
            .get_int("live.probe_timeout_ms")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.probe_timeout_ms);

        let storage_path = settings
            .get_string("storage.path")
            .or_else(|_| env::var("PROGRESS_FILE"))
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_path);

        let initial_rating = settings
            .get_int("progress.initial_rating")
            .ok()
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(defaults.initial_rating);

        let streak_lookback_days = settings
            .get_int("progress.streak_lookback_days")
            .ok()
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.streak_lookback_days);

        if live_provider == LiveProvider::RapidApi && rapidapi_key.is_none() {
            tracing::warn!("RapidAPI selected but no key configured; offline puzzles will be used");
        }

        Ok(Config {
            bind_addr,
            live_provider,
            proxy_url,
            rapidapi_url,
            rapidapi_host,
            rapidapi_key,
            live_timeout_ms,
            probe_timeout_ms,
            storage_path,
            initial_rating,
            streak_lookback_days,
        })
    }

    pub fn live_timeout(&self) -> Duration {
        Duration::from_millis(self.live_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}
