//! Configuration for the point spread scraper.
//!
//! Settings are built once at startup and passed explicitly to the pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ScrapeError;

/// Extraction backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Structural parsing of the matchups markup
    #[default]
    Markup,
    /// Natural-language extraction service
    Llm,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// API key for the extraction service
    #[serde(default)]
    pub google_api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Cache time-to-live in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,
    /// Persisted spreads and totals dataset
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    #[serde(default)]
    pub backend: Backend,
    /// Minimum spacing between requests to the matchups site, in milliseconds
    #[serde(default = "default_request_interval_ms")]
    pub request_interval_ms: u64,
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".cache")
}

fn default_cache_ttl() -> u64 {
    24 * 60 * 60
}

fn default_request_interval_ms() -> u64 {
    1500
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/spreads_and_totals.csv")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            google_api_key: None,
            gemini_model: default_gemini_model(),
            cache_dir: default_cache_dir(),
            cache_ttl: default_cache_ttl(),
            data_path: default_data_path(),
            backend: Backend::default(),
            request_interval_ms: default_request_interval_ms(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, `point_spreads.toml` and the environment
    /// (`POINT_SPREADS_CACHE_DIR`, `POINT_SPREADS_GOOGLE_API_KEY`, ...).
    pub fn load() -> anyhow::Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name("point_spreads").required(false))
            .add_source(
                config::Environment::with_prefix("POINT_SPREADS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.cache_ttl == 0 {
            anyhow::bail!("cache_ttl must be greater than zero");
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }

    /// The extraction service credential, required when the `llm` backend
    /// is selected.
    pub fn require_api_key(&self) -> Result<&str, ScrapeError> {
        match self.google_api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ScrapeError::MissingCredential("POINT_SPREADS_GOOGLE_API_KEY")),
        }
    }
}
