//! Document transport.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

use super::{matchups_url, BASE_URL};
use super::rate_limiter::RateLimiter;
use crate::error::{check_status, ScrapeResult};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Something that can produce the matchups document for a date
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, date: NaiveDate) -> ScrapeResult<String>;
}

/// Plain HTTP GET against the matchups page
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    limiter: RateLimiter,
}

impl HttpSource {
    /// `request_interval` is the minimum spacing between requests.
    pub fn new(request_interval: Duration) -> ScrapeResult<Self> {
        Self::with_base_url(BASE_URL.to_string(), request_interval)
    }

    pub fn with_base_url(base_url: String, request_interval: Duration) -> ScrapeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url,
            limiter: RateLimiter::with_interval(request_interval),
        })
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, date: NaiveDate) -> ScrapeResult<String> {
        let url = matchups_url(&self.base_url, date);
        self.limiter.acquire().await;
        let response = self.client.get(&url).send().await?;

        check_status(response.status(), "covers.com", &url)?;
        Ok(response.text().await?)
    }
}
