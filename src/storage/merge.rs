//! Upsert of freshly parsed games into the persisted dataset.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::debug;

use crate::types::{GameKey, GameRecord};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Merged dataset, sorted by (game_date, home_team, away_team)
    pub records: Vec<GameRecord>,
    pub inserted: usize,
    pub updated: usize,
    /// Fresh rows dropped for having no spread
    pub skipped: usize,
}

/// Merge `fresh` into `existing` by game key.
///
/// Only rows with a known spread take part, so an unknown value never
/// replaces a known one. A fresh row replaces an existing row only when it
/// differs and is not older.
pub fn merge(existing: Vec<GameRecord>, fresh: Vec<GameRecord>) -> MergeOutcome {
    let mut by_key: BTreeMap<GameKey, GameRecord> =
        existing.into_iter().map(|record| (record.key(), record)).collect();

    let mut outcome = MergeOutcome::default();
    for record in fresh {
        if record.spread.is_empty() {
            outcome.skipped += 1;
            continue;
        }

        match by_key.entry(record.key()) {
            Entry::Occupied(mut slot) => {
                let current = slot.get();
                if *current != record && record.updated_date >= current.updated_date {
                    debug!(
                        "{} on {}: spread {} -> {}",
                        record.matchup(),
                        record.game_date,
                        current.spread,
                        record.spread
                    );
                    slot.insert(record);
                    outcome.updated += 1;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
                outcome.inserted += 1;
            }
        }
    }

    outcome.records = by_key.into_values().collect();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    fn game(game_day: u32, home: &str, spread: &str, updated_day: u32) -> GameRecord {
        GameRecord {
            game_date: d(game_day),
            updated_date: d(updated_day),
            home_team: home.to_string(),
            away_team: "AWAY".to_string(),
            spread: spread.to_string(),
            total: "140".to_string(),
            neutral_site: false,
            tournament: String::new(),
        }
    }

    #[test]
    fn test_insert_and_update() {
        let existing = vec![game(10, "DUKE", "-3", 9)];
        let fresh = vec![game(10, "DUKE", "-4", 11), game(10, "KANSAS", "-7", 11)];

        let outcome = merge(existing, fresh);
        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].spread, "-4");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let existing = vec![game(9, "DUKE", "-3", 9)];
        let fresh = vec![game(10, "DUKE", "-4", 11), game(10, "KANSAS", "0", 11)];

        let first = merge(existing, fresh.clone());
        let second = merge(first.records.clone(), fresh);

        assert_eq!(second.records, first.records);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.updated, 0);
    }

    #[test]
    fn test_unknown_spread_never_overwrites_or_inserts() {
        let existing = vec![game(10, "DUKE", "-3", 9)];
        let fresh = vec![game(10, "DUKE", "", 11), game(10, "KANSAS", "", 11)];

        let outcome = merge(existing.clone(), fresh);
        assert_eq!(outcome.records, existing);
        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.inserted + outcome.updated, 0);
    }

    #[test]
    fn test_older_row_does_not_replace_newer() {
        let existing = vec![game(10, "DUKE", "-3", 12)];
        let outcome = merge(existing.clone(), vec![game(10, "DUKE", "-5", 11)]);
        assert_eq!(outcome.records, existing);
        assert_eq!(outcome.updated, 0);
    }

    #[test]
    fn test_output_sorted_by_key() {
        let existing = vec![game(12, "A", "-1", 12), game(10, "Z", "-1", 10)];
        let fresh = vec![game(10, "B", "-2", 12)];

        let keys: Vec<(NaiveDate, String)> = merge(existing, fresh)
            .records
            .into_iter()
            .map(|r| (r.game_date, r.home_team))
            .collect();
        assert_eq!(
            keys,
            vec![
                (d(10), "B".to_string()),
                (d(10), "Z".to_string()),
                (d(12), "A".to_string())
            ]
        );
    }
}
