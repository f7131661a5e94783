//! Fetch, validate and extract games for one date.
//!
//! Both the document fetch and the validate+extract pass are cached by their
//! typed arguments. A cache hit skips the network and the retry loop
//! entirely.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Backend, Settings};
use crate::error::{ScrapeError, ScrapeResult};
use crate::retry::{retry_if, RetryConfig};
use crate::scraper::cache::cache_key;
use crate::scraper::{
    Cache, CacheCategory, DocumentSource, GameExtractor, HttpSource, LlmExtractor, MarkupExtractor,
};
use crate::types::GameRecord;

pub struct Pipeline {
    source: Box<dyn DocumentSource>,
    extractor: Box<dyn GameExtractor>,
    cache: Cache,
    retry: RetryConfig,
}

impl Pipeline {
    pub fn new(source: Box<dyn DocumentSource>, extractor: Box<dyn GameExtractor>, cache: Cache) -> Self {
        Self {
            source,
            extractor,
            cache,
            retry: RetryConfig::network(),
        }
    }

    /// Build the HTTP-backed pipeline for the selected backend.
    ///
    /// Fails when the `llm` backend is selected without a credential.
    pub fn from_settings(settings: &Settings, backend: Backend) -> ScrapeResult<Self> {
        let extractor: Box<dyn GameExtractor> = match backend {
            Backend::Markup => Box::new(MarkupExtractor),
            Backend::Llm => Box::new(LlmExtractor::new(
                settings.require_api_key()?,
                &settings.gemini_model,
            )?),
        };
        let cache = Cache::new(settings.cache_dir.clone(), settings.cache_ttl());

        let source = HttpSource::new(settings.request_interval())?;

        Ok(Self::new(Box::new(source), extractor, cache))
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Games for `date`, stamped with `run_date` as their update date.
    pub async fn games_for_date(&self, date: NaiveDate, run_date: NaiveDate) -> ScrapeResult<Vec<GameRecord>> {
        let html = self.fetch_document(date).await?;
        self.parse_document(&html, date, run_date).await
    }

    /// Raw matchups document, cached and retried on transient errors.
    pub async fn fetch_document(&self, date: NaiveDate) -> ScrapeResult<String> {
        let date_key = date.to_string();
        let key = cache_key(&["document", &date_key]);
        if let Some(html) = self.cache.get::<String>(CacheCategory::Document, &key) {
            debug!("document cache hit for {}", date);
            return Ok(html);
        }

        let html = retry_if(
            &self.retry,
            &format!("fetch {}", date),
            ScrapeError::is_transient,
            || self.source.fetch(date),
        )
        .await?;

        self.store(CacheCategory::Document, &key, &html);
        Ok(html)
    }

    /// Validate the document against `requested` and extract its games.
    ///
    /// A document that displays any other date yields no records.
    pub async fn parse_document(
        &self,
        html: &str,
        requested: NaiveDate,
        run_date: NaiveDate,
    ) -> ScrapeResult<Vec<GameRecord>> {
        let digest = blake3::hash(html.as_bytes()).to_hex();
        let date_key = requested.to_string();
        let key = cache_key(&["games", self.extractor.name(), digest.as_str(), &date_key]);
        if let Some(records) = self.cache.get::<Vec<GameRecord>>(CacheCategory::Games, &key) {
            debug!("games cache hit for {}", requested);
            return Ok(records);
        }

        let resolved = self.extractor.resolve_date(html).await?;
        let records = if resolved == Some(requested) {
            self.extractor.extract_games(html, requested, run_date).await?
        } else {
            info!(
                "requested {} but page shows {}, discarding",
                requested,
                resolved.map_or_else(|| "no date".to_string(), |d| d.to_string())
            );
            Vec::new()
        };

        self.store(CacheCategory::Games, &key, &records);
        Ok(records)
    }

    fn store<T: Serialize>(&self, category: CacheCategory, key: &str, data: &T) {
        if let Err(e) = self.cache.set(category, key, data) {
            warn!("failed to cache {} entry: {}", category.dir_name(), e);
        }
    }
}
