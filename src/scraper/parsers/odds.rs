//! Spread and total extraction for both gamebox dialects.
//!
//! Scheduled games show consensus lines directly. Final games only carry a
//! narrative summary ("Duke covered the spread of <strong>-6.5</strong> ..."),
//! so the home-relative spread has to be reconstructed from which team the
//! summary says covered.

use chrono::NaiveDate;
use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;
use tracing::warn;

use super::gamebox::{collapse_whitespace, GameBox, GameState};
use crate::error::{ScrapeError, ScrapeResult};

static CONSENSUS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.team-consensus").unwrap());
static OVER_UNDER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.team-overunder").unwrap());
static SCORE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".team-score").unwrap());
static SUMMARY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p.summary-box").unwrap());
static EMPHASIS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("strong").unwrap());

/// "under 140", "over <strong>140</strong>", "pre-game total of 140.5"
static TOTAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:under|over|pre-game total of)(?:\s|<[^>]*>)*(\d+(?:\.\d+)?)").unwrap()
});

const PUSH_PHRASE: &str = "pushed the spread";
const COVER_PHRASE: &str = "covered the spread";
const CANCELED_SCORE: &str = "-";
const PICK_EM: &str = "PK";

/// Spread (home-relative) and total for one game
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameLines {
    pub spread: String,
    pub total: String,
}

impl GameLines {
    fn unknown() -> Self {
        Self::default()
    }

    fn new(spread: &str, total: &str) -> Self {
        Self {
            spread: normalize_spread(spread),
            total: normalize_total(total),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Home,
    Away,
}

/// Parser for spread/total values
pub struct OddsParser;

impl OddsParser {
    pub fn parse(gamebox: &GameBox<'_>, game_date: NaiveDate) -> ScrapeResult<GameLines> {
        match gamebox.state {
            GameState::PreGame => Ok(Self::parse_pregame(gamebox)),
            GameState::PostGame => Self::parse_postgame(gamebox, game_date),
        }
    }

    /// Consensus lines of a scheduled game.
    ///
    /// Lines that are not posted yet come back empty.
    fn parse_pregame(gamebox: &GameBox<'_>) -> GameLines {
        // Second consensus fragment is the home side; only its own text
        // nodes, not the nested percentage spans.
        let spread = gamebox
            .element
            .select(&CONSENSUS)
            .nth(1)
            .and_then(|span| {
                span.children()
                    .filter_map(|node| node.value().as_text())
                    .map(|text| text.trim())
                    .find(|text| !text.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_default();

        let total = gamebox
            .element
            .select(&OVER_UNDER)
            .next()
            .map(|span| span.text().collect::<String>())
            .unwrap_or_default();

        GameLines::new(&spread, &total)
    }

    /// Decision cascade for a final game: canceled, bets off, push,
    /// covered, then best effort.
    fn parse_postgame(gamebox: &GameBox<'_>, game_date: NaiveDate) -> ScrapeResult<GameLines> {
        let markup_error = |reason: &str| ScrapeError::markup(game_date, gamebox.matchup(), reason);

        let scores: Vec<String> = gamebox
            .element
            .select(&SCORE)
            .map(|s| s.text().collect::<String>().trim().to_string())
            .collect();
        if scores.len() < 2 {
            return Err(markup_error("final scores missing"));
        }
        if scores.iter().all(|s| s == CANCELED_SCORE) {
            return Ok(GameLines::unknown());
        }

        // No summary means the game was taken off the board
        let Some(summary) = gamebox.element.select(&SUMMARY).next() else {
            return Ok(GameLines::unknown());
        };

        let summary_text = collapse_whitespace(&summary.text().collect::<String>());
        let lowered = summary_text.to_lowercase();
        let emphasized: Vec<String> = summary
            .select(&EMPHASIS)
            .map(|e| collapse_whitespace(&e.text().collect::<String>()))
            .collect();

        let pushed = lowered.contains(PUSH_PHRASE);
        let spread = if pushed {
            "0".to_string()
        } else if let Some(idx) = lowered.find(COVER_PHRASE) {
            let magnitude = emphasized
                .first()
                .ok_or_else(|| markup_error("covered the spread without a value"))?;
            if is_zero(magnitude) {
                // "0" is reserved for pushes
                PICK_EM.to_string()
            } else {
                match covering_side(&lowered[..idx], &gamebox.home_team, &gamebox.away_team) {
                    Some(Side::Home) => magnitude.clone(),
                    Some(Side::Away) => flip_sign(magnitude),
                    None => return Err(markup_error("covering team matches neither side")),
                }
            }
        } else {
            let value = emphasized
                .first()
                .ok_or_else(|| markup_error("summary has no spread value"))?;
            warn!(
                "{} on {}: no covering team in summary, using '{}' as-is",
                gamebox.matchup(),
                game_date,
                value
            );
            if is_zero(value) {
                PICK_EM.to_string()
            } else {
                value.clone()
            }
        };

        let total_idx = if pushed { 2 } else { 1 };
        let total = emphasized
            .get(total_idx)
            .filter(|value| value.chars().any(|c| c.is_ascii_digit()))
            .cloned()
            .or_else(|| {
                // summary only, never the header or scores
                TOTAL_RE
                    .captures(&summary.html())
                    .map(|caps| caps[1].to_string())
            })
            .ok_or_else(|| markup_error("total not found in summary"))?;

        Ok(GameLines::new(&spread, &total))
    }
}

/// Which team the summary names right before "covered the spread".
///
/// The team whose name ends closest to the phrase wins, so "Miami (OH)"
/// is not mistaken for "Miami".
fn covering_side(before_phrase: &str, home: &str, away: &str) -> Option<Side> {
    let end_of = |team: &str| {
        let team = team.to_lowercase();
        before_phrase.rfind(&team).map(|pos| (pos + team.len(), team.len()))
    };

    match (end_of(home), end_of(away)) {
        (Some(h), Some(a)) => Some(if h >= a { Side::Home } else { Side::Away }),
        (Some(_), None) => Some(Side::Home),
        (None, Some(_)) => Some(Side::Away),
        (None, None) => None,
    }
}

fn is_zero(value: &str) -> bool {
    value.trim().trim_start_matches(['+', '-']).parse::<f64>() == Ok(0.0)
}

/// Flip a stated spread to the other side. Unsigned values are the
/// favourite's line and read as negative.
pub fn flip_sign(value: &str) -> String {
    let value = value.trim();
    if let Some(rest) = value.strip_prefix('+') {
        format!("-{}", rest)
    } else if let Some(rest) = value.strip_prefix('-') {
        format!("+{}", rest)
    } else if value.parse::<f64>().map(|v| v == 0.0).unwrap_or(true) {
        // zero or non-numeric ("PK") has no sign to flip
        value.to_string()
    } else {
        format!("+{}", value)
    }
}

pub fn normalize_spread(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Strip "o/u ", "under ", "over " prefixes and upper-case the rest.
pub fn normalize_total(raw: &str) -> String {
    let trimmed = raw.trim();
    let lowered = trimmed.to_lowercase();
    let stripped = ["o/u ", "under ", "over "]
        .iter()
        .find(|prefix| lowered.starts_with(*prefix))
        .map(|prefix| trimmed[prefix.len()..].trim())
        .unwrap_or(trimmed);
    stripped.to_uppercase()
}
