//! Column layout of the spreads and totals dataset
//!
//! Columns, in order:
//! - game_date, updated_date: ISO calendar dates
//! - home_team, away_team
//! - spread, total: empty when unknown
//! - neutral_site: true/false
//! - tournament: empty when not applicable

use anyhow::{bail, Result};
use csv::StringRecord;

pub const COLUMNS: [&str; 8] = [
    "game_date",
    "updated_date",
    "home_team",
    "away_team",
    "spread",
    "total",
    "neutral_site",
    "tournament",
];

/// Columns every dataset file must carry; the rest default when absent
const REQUIRED: [&str; 4] = ["game_date", "updated_date", "home_team", "away_team"];

/// Older files name the provenance column `update_date`
const LEGACY_ALIASES: [(&str, &str); 1] = [("update_date", "updated_date")];

/// Check a header row for the required columns.
pub fn check_header(header: &StringRecord) -> Result<()> {
    let present: Vec<&str> = header
        .iter()
        .map(|name| {
            let name = name.trim();
            LEGACY_ALIASES
                .iter()
                .find(|(old, _)| *old == name)
                .map_or(name, |(_, new)| *new)
        })
        .collect();

    let missing: Vec<&str> = REQUIRED
        .iter()
        .copied()
        .filter(|column| !present.contains(column))
        .collect();
    if !missing.is_empty() {
        bail!("dataset is missing columns: {}", missing.join(", "));
    }
    Ok(())
}
