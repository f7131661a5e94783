//! Point Spreads
//!
//! CLI for collecting NCAA basketball point spreads and totals.

mod cli;
mod collect;
mod config;
mod error;
mod pipeline;
mod retry;
mod scraper;
mod storage;
mod types;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so CSV/JSON on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "point_spreads=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Games {
            date,
            backend,
            format,
        } => cli::run_games(date, backend, format).await,
        Commands::Range {
            from,
            to,
            output,
            backend,
        } => cli::run_range(from, to, output, backend).await,
        Commands::Update {
            data,
            backend,
            dry_run,
        } => cli::run_update(data, backend, dry_run).await,
        Commands::ClearCache => cli::run_clear_cache(),
    }
}
