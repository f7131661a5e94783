//! CSV repository for the spreads and totals dataset

use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use super::schema::{check_header, COLUMNS};
use crate::types::GameRecord;

/// Repository backed by a single CSV file
pub struct GameRepository {
    path: PathBuf,
}

impl GameRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every record. A missing file is an empty dataset.
    pub fn load(&self) -> Result<Vec<GameRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = std::fs::File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        read_records(file).with_context(|| format!("Failed to read {}", self.path.display()))
    }

    /// Replace the file with `records`, creating parent directories if needed
    pub fn save(&self, records: &[GameRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }

        let file = std::fs::File::create(&self.path)
            .with_context(|| format!("Failed to create {}", self.path.display()))?;
        write_records(file, records)
    }
}

pub fn read_records<R: Read>(reader: R) -> Result<Vec<GameRecord>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    check_header(reader.headers()?)?;

    let mut records = Vec::new();
    for (i, row) in reader.deserialize().enumerate() {
        // header is line 1
        let record: GameRecord = row.with_context(|| format!("Invalid row at line {}", i + 2))?;
        records.push(record);
    }
    Ok(records)
}

pub fn write_records<W: Write>(writer: W, records: &[GameRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn create_test_record(home: &str, spread: &str) -> GameRecord {
        GameRecord {
            game_date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            updated_date: NaiveDate::from_ymd_opt(2024, 2, 11).unwrap(),
            home_team: home.to_string(),
            away_team: "UNC".to_string(),
            spread: spread.to_string(),
            total: "150".to_string(),
            neutral_site: true,
            tournament: "ACC Tournament".to_string(),
        }
    }

    #[test]
    fn test_write_exact_header() {
        let mut out = Vec::new();
        write_records(&mut out, &[create_test_record("DUKE", "-4")]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("game_date,updated_date,home_team,away_team,spread,total,neutral_site,tournament")
        );
        assert_eq!(
            lines.next(),
            Some("2024-02-10,2024-02-11,DUKE,UNC,-4,150,true,ACC Tournament")
        );
    }

    #[test]
    fn test_empty_dataset_keeps_header() {
        let mut out = Vec::new();
        write_records(&mut out, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap().trim_end(),
            COLUMNS.join(",")
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let repo = GameRepository::new(dir.path().join("data").join("games.csv"));

        let records = vec![create_test_record("DUKE", "-4"), create_test_record("KANSAS", "")];
        repo.save(&records).unwrap();

        assert_eq!(repo.load().unwrap(), records);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = GameRepository::new(dir.path().join("nope.csv"));
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn test_legacy_file_defaults_missing_columns() {
        let csv = "game_date,update_date,home_team,away_team,spread,total\n\
                   2023-03-08,2023-03-09,INDIANA,PURDUE,0,145.5\n";
        let records = read_records(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].updated_date, NaiveDate::from_ymd_opt(2023, 3, 9).unwrap());
        assert_eq!(records[0].spread, "0");
        assert!(!records[0].neutral_site);
        assert_eq!(records[0].tournament, "");
    }

    #[test]
    fn test_boolean_spellings() {
        let csv = "game_date,updated_date,home_team,away_team,spread,total,neutral_site,tournament\n\
                   2023-03-08,2023-03-09,A,B,-1,140,True,\n\
                   2023-03-08,2023-03-09,C,D,-1,140,0,\n\
                   2023-03-08,2023-03-09,E,F,-1,140,1,\n\
                   2023-03-08,2023-03-09,G,H,-1,140,,\n";
        let flags: Vec<bool> = read_records(csv.as_bytes())
            .unwrap()
            .iter()
            .map(|r| r.neutral_site)
            .collect();
        assert_eq!(flags, vec![true, false, true, false]);
    }

    #[test]
    fn test_rejects_file_without_teams() {
        let csv = "game_date,updated_date,spread\n2023-03-08,2023-03-09,-1\n";
        assert!(read_records(csv.as_bytes()).is_err());
    }
}
