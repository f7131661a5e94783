//! Error taxonomy for fetching and extracting matchup data.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Rate limited by {service}")]
    RateLimited { service: String },

    /// More than one navigation year visible outside the Dec/Jan boundary.
    #[error("Ambiguous year for '{month}': navigation shows {years:?}")]
    AmbiguousYear { month: String, years: Vec<i32> },

    /// A container accepted as a real game is missing mandatory markup.
    #[error("Markup violation on {date} ({teams}): {reason}")]
    Markup {
        date: NaiveDate,
        teams: String,
        reason: String,
    },

    #[error("Extraction service error: {0}")]
    Service(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
}

impl ScrapeError {
    pub fn markup(date: NaiveDate, teams: impl Into<String>, reason: impl Into<String>) -> Self {
        ScrapeError::Markup {
            date,
            teams: teams.into(),
            reason: reason.into(),
        }
    }

    /// Transport-level failures worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            ScrapeError::Http(_) | ScrapeError::RateLimited { .. } => true,
            ScrapeError::Status { status, .. } => *status >= 500 || *status == 408,
            _ => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ScrapeError::RateLimited { .. })
    }
}

pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;

/// Map a response status to the error taxonomy.
///
/// 429 becomes `RateLimited` for `service`; any other non-2xx becomes
/// `Status`.
pub fn check_status(status: reqwest::StatusCode, service: &str, url: &str) -> ScrapeResult<()> {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ScrapeError::RateLimited {
            service: service.to_string(),
        });
    }
    if !status.is_success() {
        return Err(ScrapeError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(())
}
