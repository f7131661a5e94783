//! Scraper for covers.com NCAA basketball matchups.
//!
//! Provides the document transport, the HTML parsers and the extraction
//! backends built on them.

pub mod cache;
pub mod extractor;
pub mod llm;
pub mod parsers;
pub mod rate_limiter;
pub mod source;

pub use cache::{Cache, CacheCategory};
pub use extractor::{GameExtractor, MarkupExtractor};
pub use llm::LlmExtractor;
pub use source::{DocumentSource, HttpSource};

use chrono::NaiveDate;

/// Base URL for covers.com
pub const BASE_URL: &str = "https://www.covers.com";

/// Build the matchups URL for a date
pub fn matchups_url(base_url: &str, date: NaiveDate) -> String {
    format!(
        "{}/Sports/NCAAB/Matchups?selectedDate={}",
        base_url,
        date.format("%Y-%m-%d")
    )
}
