//! Game record shared by extraction, merge and storage.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// One game on one calendar day.
///
/// `spread` and `total` are kept as strings: an empty string means the value
/// is unknown, which is distinct from a push (`"0"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_date: NaiveDate,
    #[serde(alias = "update_date")]
    pub updated_date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub spread: String,
    #[serde(default)]
    pub total: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub neutral_site: bool,
    #[serde(default)]
    pub tournament: String,
}

/// Composite identity of a game within the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameKey {
    pub game_date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
}

impl GameRecord {
    pub fn key(&self) -> GameKey {
        GameKey {
            game_date: self.game_date,
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
        }
    }

    /// "AWAY @ HOME", used in logs and error context.
    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away_team, self.home_team)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Accepts the boolean spellings found in older dataset files.
pub(crate) fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(n) => Ok(n != 0),
        Flag::Text(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Ok(true),
            "false" | "no" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "invalid boolean '{}'",
                other
            ))),
        },
    }
}
