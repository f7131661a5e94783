//! Multi-date collection.
//!
//! Dates are processed one at a time. Off-season dates are dropped before
//! any fetch is attempted.

use anyhow::{Context, Result};
use chrono::{Datelike, Days, NaiveDate};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use tracing::{info, warn};

use crate::pipeline::Pipeline;
use crate::types::GameRecord;

/// May through October, no college basketball
pub const OFF_SEASON_MONTHS: RangeInclusive<u32> = 5..=10;

/// How far past today the refresh window reaches
pub const LOOKAHEAD_DAYS: u64 = 8;

pub fn in_season(date: NaiveDate) -> bool {
    !OFF_SEASON_MONTHS.contains(&date.month())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectMode {
    /// Record per-date failures and keep going
    Batch,
    /// Stop at the first failing date
    Strict,
}

#[derive(Debug, Clone)]
pub struct DateFailure {
    pub date: NaiveDate,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct CollectReport {
    pub records: Vec<GameRecord>,
    pub failures: Vec<DateFailure>,
    /// Dates skipped as off-season
    pub skipped: usize,
}

/// Run the pipeline for every in-season date and concatenate the results.
pub async fn collect_games(
    pipeline: &Pipeline,
    dates: &[NaiveDate],
    mode: CollectMode,
    run_date: NaiveDate,
) -> Result<CollectReport> {
    let mut report = CollectReport::default();

    let season_dates: Vec<NaiveDate> = dates.iter().copied().filter(|d| in_season(*d)).collect();
    report.skipped = dates.len() - season_dates.len();
    if report.skipped > 0 {
        info!("skipping {} off-season dates", report.skipped);
    }

    let total = season_dates.len();
    for (i, date) in season_dates.into_iter().enumerate() {
        info!("[{}/{}] processing {}", i + 1, total, date);

        match pipeline.games_for_date(date, run_date).await {
            Ok(records) => {
                info!("{}: {} games", date, records.len());
                report.records.extend(records);
            }
            Err(e) if mode == CollectMode::Batch => {
                warn!("{}: {}", date, e);
                report.failures.push(DateFailure {
                    date,
                    error: e.to_string(),
                });
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to collect games for {}", date));
            }
        }
    }

    Ok(report)
}

/// Dates worth re-fetching for an existing dataset.
///
/// Rows with `game_date >= updated_date - 1` are still open; their dates are
/// included, plus every day from the earlier of (latest open game date,
/// today) through `today + 8`.
pub fn refresh_dates(existing: &[GameRecord], today: NaiveDate) -> Vec<NaiveDate> {
    let mut dates: BTreeSet<NaiveDate> = existing
        .iter()
        .filter(|r| r.updated_date.pred_opt().map_or(true, |floor| r.game_date >= floor))
        .map(|r| r.game_date)
        .collect();

    let start = dates.last().map_or(today, |&last| last.min(today));
    let end = today.checked_add_days(Days::new(LOOKAHEAD_DAYS)).unwrap_or(today);
    dates.extend(date_range(start, end));

    dates.into_iter().collect()
}

/// Every date from `from` through `to`, inclusive.
pub fn date_range(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |d| *d <= to)
}
