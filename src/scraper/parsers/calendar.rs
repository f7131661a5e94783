//! Date navigation parser for the matchups page.
//!
//! The page shows the selected day as a short "Mon D" label without a year.
//! The neighbouring day links carry full ISO dates in their hrefs, which is
//! where the year has to come from.

use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::error::{ScrapeError, ScrapeResult};

static NAV: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".date-nav").unwrap());
static ACTIVE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".active").unwrap());
static DAY_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href*='selectedDate=']").unwrap());

static SHORT_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})\b")
        .unwrap()
});
static HREF_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"selectedDate=(\d{4})-(\d{1,2})-(\d{1,2})").unwrap());

/// Parser for the calendar strip
pub struct CalendarParser;

impl CalendarParser {
    /// Resolve the date the document actually displays.
    ///
    /// Returns `Ok(None)` when the navigation markup is missing, which the
    /// caller must treat as a mismatch.
    pub fn resolve(html: &str) -> ScrapeResult<Option<NaiveDate>> {
        let document = Html::parse_document(html);
        Self::resolve_document(&document)
    }

    pub fn resolve_document(document: &Html) -> ScrapeResult<Option<NaiveDate>> {
        let Some(nav) = document.select(&NAV).next() else {
            return Ok(None);
        };

        let Some(active) = nav.select(&ACTIVE).next() else {
            return Ok(None);
        };
        let label = active.text().collect::<Vec<_>>().join(" ");
        let Some((month_label, month, day)) = Self::parse_short_date(&label) else {
            return Ok(None);
        };

        let years: BTreeSet<i32> = nav
            .select(&DAY_LINK)
            .filter_map(|link| link.value().attr("href"))
            .filter_map(|href| HREF_DATE_RE.captures(href))
            .filter_map(|caps| caps[1].parse().ok())
            .collect();

        let Some(year) = Self::infer_year(&month_label, month, &years)? else {
            return Ok(None);
        };

        Ok(NaiveDate::from_ymd_opt(year, month, day))
    }

    /// The calendar strip's outer HTML, for the extraction service.
    pub fn nav_fragment(html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let fragment = document.select(&NAV).next().map(|nav| nav.html());
        fragment
    }

    /// Parse "Mar 8" / "Wed Dec 31" into (label, month, day).
    fn parse_short_date(text: &str) -> Option<(String, u32, u32)> {
        let caps = SHORT_DATE_RE.captures(text)?;
        let label = caps[1].to_string();
        let month = month_number(&label)?;
        let day = caps[2].parse().ok()?;
        Some((label, month, day))
    }

    /// Pick the year for an undated month/day from the years visible in the
    /// navigation links.
    ///
    /// A December label next to January links resolves to the earlier year,
    /// a January label next to December links to the later one. Any other
    /// mix of years is an error.
    pub fn infer_year(month_label: &str, month: u32, years: &BTreeSet<i32>) -> ScrapeResult<Option<i32>> {
        let (Some(&min), Some(&max)) = (years.first(), years.last()) else {
            return Ok(None);
        };

        if years.len() == 1 {
            return Ok(Some(min));
        }
        match month {
            12 => Ok(Some(min)),
            1 => Ok(Some(max)),
            _ => Err(ScrapeError::AmbiguousYear {
                month: month_label.to_string(),
                years: years.iter().copied().collect(),
            }),
        }
    }
}

fn month_number(label: &str) -> Option<u32> {
    let month = match label.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
