use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the Groq API key
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    /// Default tracing filter, overridden by `RUST_LOG`
    pub log_level: String,
    /// Requests slower than this are logged as warnings
    pub slow_request_secs: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8000".to_string(),
            log_level: "info".to_string(),
            slow_request_secs: 1.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Load the built-in place list at startup
    pub seed_builtin: bool,
    /// Optional CSV (or .csv.gz) of extra places loaded at startup
    pub places_file: Option<PathBuf>,
    /// Local results needed before external place search is skipped
    pub local_result_threshold: usize,
    /// Pause between external searches for successive terms
    pub term_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            seed_builtin: true,
            places_file: None,
            local_result_threshold: 3,
            term_delay_ms: 200,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UpstreamConfig {
    pub open_meteo_forecast_url: String,
    pub open_meteo_geocoding_url: String,
    pub nominatim_url: String,
    pub groq_url: String,
    pub groq_model: String,
    pub user_agent: String,
    #[serde(skip)]
    pub groq_api_key: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            open_meteo_forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            open_meteo_geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            nominatim_url: "https://nominatim.openstreetmap.org/search".to_string(),
            groq_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            groq_model: "llama-3.3-70b-versatile".to_string(),
            user_agent: "WeatherWiseApp/1.0".to_string(),
            groq_api_key: None,
        }
    }
}

impl UpstreamConfig {
    /// Every service pointed at one base URL (used with mock servers)
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            open_meteo_forecast_url: format!("{}/v1/forecast", base),
            open_meteo_geocoding_url: format!("{}/v1/search", base),
            nominatim_url: format!("{}/search", base),
            groq_url: format!("{}/openai/v1/chat/completions", base),
            ..Self::default()
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise defaults; then read secrets from the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.upstream.groq_api_key = std::env::var(GROQ_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Ok(config)
    }
}
