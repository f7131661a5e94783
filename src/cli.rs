//! CLI commands for point-spreads.
//!
//! Single-date lookup, batch collection over a date range, and in-place
//! refresh of the persisted dataset.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::collect::{collect_games, date_range, refresh_dates, CollectMode, CollectReport};
use crate::config::{Backend, Settings};
use crate::pipeline::Pipeline;
use crate::scraper::CacheCategory;
use crate::storage::{merge, GameRepository};
use crate::types::GameRecord;

#[derive(Parser)]
#[command(name = "point-spreads")]
#[command(version, about = "NCAA basketball point spreads and totals from covers.com", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show games for a single date
    Games {
        /// Date to fetch (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Extraction backend override
        #[arg(short, long, value_enum)]
        backend: Option<Backend>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Collect games over a date range into a CSV file
    Range {
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Last date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,

        /// Output CSV path, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Extraction backend override
        #[arg(short, long, value_enum)]
        backend: Option<Backend>,
    },

    /// Refresh recent and upcoming games in the dataset
    Update {
        /// Dataset path override
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Extraction backend override
        #[arg(short, long, value_enum)]
        backend: Option<Backend>,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove cached documents and parsed games
    ClearCache,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

fn build_pipeline(settings: &Settings, backend: Option<Backend>) -> Result<Pipeline> {
    let backend = backend.unwrap_or(settings.backend);
    tracing::info!("Using {:?} backend", backend);
    Pipeline::from_settings(settings, backend).context("Failed to initialise pipeline")
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Fetch and print games for one date.
pub async fn run_games(date: NaiveDate, backend: Option<Backend>, format: OutputFormat) -> Result<()> {
    let settings = Settings::load()?;
    let pipeline = build_pipeline(&settings, backend)?;

    let report = collect_games(&pipeline, &[date], CollectMode::Strict, today()).await?;
    if report.skipped > 0 {
        eprintln!("{} is in the off-season, nothing to fetch", date);
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report.records)?),
        OutputFormat::Table => print_table(&report.records),
    }

    Ok(())
}

/// Collect a date range in batch mode and write it as CSV.
pub async fn run_range(
    from: NaiveDate,
    to: NaiveDate,
    output: Option<PathBuf>,
    backend: Option<Backend>,
) -> Result<()> {
    if from > to {
        anyhow::bail!("--from {} is after --to {}", from, to);
    }

    let settings = Settings::load()?;
    let pipeline = build_pipeline(&settings, backend)?;

    let dates: Vec<NaiveDate> = date_range(from, to).collect();
    let report = collect_games(&pipeline, &dates, CollectMode::Batch, today()).await?;

    match output {
        Some(path) => {
            GameRepository::new(path.clone()).save(&report.records)?;
            eprintln!("Saved {} games to {}", report.records.len(), path.display());
        }
        None => crate::storage::repository::write_records(std::io::stdout().lock(), &report.records)?,
    }

    print_failures(&report);
    Ok(())
}

/// Refresh the persisted dataset in place.
pub async fn run_update(data: Option<PathBuf>, backend: Option<Backend>, dry_run: bool) -> Result<()> {
    let settings = Settings::load()?;
    let repository = GameRepository::new(data.unwrap_or_else(|| settings.data_path.clone()));

    let existing = repository.load()?;
    eprintln!("Loaded {} games from {}", existing.len(), repository.path().display());

    let run_date = today();
    let dates = refresh_dates(&existing, run_date);
    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        eprintln!("Refreshing {} dates between {} and {}", dates.len(), first, last);
    }

    let pipeline = build_pipeline(&settings, backend)?;
    let report = collect_games(&pipeline, &dates, CollectMode::Batch, run_date).await?;

    let outcome = merge(existing, report.records.clone());
    eprintln!(
        "Inserted: {}, updated: {}, skipped without spread: {}",
        outcome.inserted, outcome.updated, outcome.skipped
    );

    if dry_run {
        eprintln!("Dry run, {} not written", repository.path().display());
    } else {
        repository.save(&outcome.records)?;
        eprintln!("Saved {} games to {}", outcome.records.len(), repository.path().display());
    }

    print_failures(&report);
    Ok(())
}

/// Remove every cache category.
pub fn run_clear_cache() -> Result<()> {
    let settings = Settings::load()?;
    let cache = crate::scraper::Cache::new(settings.cache_dir.clone(), settings.cache_ttl());

    for category in [CacheCategory::Document, CacheCategory::Games] {
        cache
            .clear(category)
            .with_context(|| format!("Failed to clear {} cache", category.dir_name()))?;
    }
    eprintln!("Cleared cache at {}", settings.cache_dir.display());
    Ok(())
}

fn print_failures(report: &CollectReport) {
    if report.failures.is_empty() {
        return;
    }
    eprintln!();
    eprintln!("=== Failed dates ({}) ===", report.failures.len());
    for failure in &report.failures {
        eprintln!("  {}: {}", failure.date, failure.error);
    }
}

/// Print games in table format.
fn print_table(records: &[GameRecord]) {
    if records.is_empty() {
        println!("No games found");
        return;
    }

    println!(
        "{:<10}  {:<24} {:<24} {:>7} {:>7}  {}",
        "Date", "Away", "Home", "Spread", "Total", "Notes"
    );
    for game in records {
        let mut notes = Vec::new();
        if game.neutral_site {
            notes.push("neutral".to_string());
        }
        if !game.tournament.is_empty() {
            notes.push(game.tournament.clone());
        }
        println!(
            "{:<10}  {:<24} {:<24} {:>7} {:>7}  {}",
            game.game_date.to_string(),
            game.away_team,
            game.home_team,
            display_value(&game.spread),
            display_value(&game.total),
            notes.join(", ")
        );
    }
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
