//! Extraction backends.
//!
//! A backend turns one fetched matchups document into game records. The
//! structural [`MarkupExtractor`] is the default; the service-backed
//! extractor in [`super::llm`] produces the same records.

use async_trait::async_trait;
use chrono::NaiveDate;
use scraper::Html;

use super::parsers::{CalendarParser, GameBoxLocator, OddsParser};
use crate::error::ScrapeResult;
use crate::types::GameRecord;

#[async_trait]
pub trait GameExtractor: Send + Sync {
    /// Stable name, part of the parse cache key
    fn name(&self) -> &'static str;

    /// The date the document displays, `None` when it cannot be found.
    async fn resolve_date(&self, html: &str) -> ScrapeResult<Option<NaiveDate>>;

    /// One record per game container.
    async fn extract_games(
        &self,
        html: &str,
        game_date: NaiveDate,
        run_date: NaiveDate,
    ) -> ScrapeResult<Vec<GameRecord>>;
}

/// Structural extraction from the page markup
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupExtractor;

impl MarkupExtractor {
    pub fn extract(html: &str, game_date: NaiveDate, run_date: NaiveDate) -> ScrapeResult<Vec<GameRecord>> {
        let document = Html::parse_document(html);

        let records: ScrapeResult<Vec<GameRecord>> = GameBoxLocator::locate(&document)
            .iter()
            .map(|gamebox| {
                let lines = OddsParser::parse(gamebox, game_date)?;
                Ok(GameRecord {
                    game_date,
                    updated_date: run_date,
                    home_team: gamebox.home_team.clone(),
                    away_team: gamebox.away_team.clone(),
                    spread: lines.spread,
                    total: lines.total,
                    neutral_site: gamebox.neutral_site(),
                    tournament: gamebox.tournament.clone(),
                })
            })
            .collect();
        records
    }
}

#[async_trait]
impl GameExtractor for MarkupExtractor {
    fn name(&self) -> &'static str {
        "markup"
    }

    async fn resolve_date(&self, html: &str) -> ScrapeResult<Option<NaiveDate>> {
        CalendarParser::resolve(html)
    }

    async fn extract_games(
        &self,
        html: &str,
        game_date: NaiveDate,
        run_date: NaiveDate,
    ) -> ScrapeResult<Vec<GameRecord>> {
        Self::extract(html, game_date, run_date)
    }
}
