//! Extraction through the Gemini `generateContent` API.
//!
//! Each game container (and the calendar strip, for date resolution) is sent
//! as a small HTML fragment with a fixed deterministic generation config.
//! Replies are JSON and go through the same value normalization as the
//! markup path.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::json;
use std::time::Duration;

use super::extractor::GameExtractor;
use super::parsers::odds::{normalize_spread, normalize_total};
use super::parsers::{CalendarParser, GameBoxLocator};
use crate::error::{check_status, ScrapeError, ScrapeResult};
use crate::retry::{retry_if, RetryConfig};
use crate::types::{deserialize_flag, GameRecord};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const SEED: u32 = 42;

const DATE_PROMPT: &str = "The HTML below is the date navigation of a college basketball \
matchups page. Return JSON {\"date\": \"YYYY-MM-DD\"} for the day marked active, taking the \
year from the neighbouring links. Return {\"date\": null} if no day is marked active.";

const GAME_PROMPT: &str = "The HTML below describes one college basketball game. Return JSON \
with keys home_team, away_team, spread, total, neutral_site, tournament. Team names without \
mascots. spread is the home team's point spread as a signed number string: \"0\" for a push, \
\"\" if the game was canceled or no line is available. total is the over/under number as a \
string or \"\". neutral_site is a boolean. tournament is the event name or \"\".";

#[derive(Debug, Deserialize)]
struct DateReply {
    date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct GameReply {
    home_team: String,
    away_team: String,
    #[serde(default, deserialize_with = "deserialize_line")]
    spread: String,
    #[serde(default, deserialize_with = "deserialize_line")]
    total: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    neutral_site: bool,
    #[serde(default, deserialize_with = "deserialize_line")]
    tournament: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Line {
    Text(String),
    Number(serde_json::Number),
}

/// Text fields come back as strings, bare numbers or null.
fn deserialize_line<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Line>::deserialize(deserializer)? {
        Some(Line::Text(text)) => text,
        Some(Line::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    seed: u32,
    response_mime_type: &'static str,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 1.0,
            seed: SEED,
            response_mime_type: "application/json",
        }
    }
}

/// Gemini-backed extractor
pub struct LlmExtractor {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    retry: RetryConfig,
}

impl LlmExtractor {
    pub fn new(api_key: &str, model: &str) -> ScrapeResult<Self> {
        Self::with_base_url(API_BASE.to_string(), api_key, model)
    }

    pub fn with_base_url(base_url: String, api_key: &str, model: &str) -> ScrapeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
            model: model.to_string(),
            retry: RetryConfig::rate_limited(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// One generateContent call, retried only on 429.
    async fn generate<T: DeserializeOwned>(&self, prompt: &str, fragment: &str) -> ScrapeResult<T> {
        let text = retry_if(
            &self.retry,
            "gemini generateContent",
            ScrapeError::is_rate_limited,
            || self.call(prompt, fragment),
        )
        .await?;

        serde_json::from_str(&text)
            .map_err(|e| ScrapeError::Service(format!("unparseable reply ({}): {}", e, text)))
    }

    async fn call(&self, prompt: &str, fragment: &str) -> ScrapeResult<String> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": format!("{}\n\n{}", prompt, fragment) }] }],
            "generationConfig": GenerationConfig::default(),
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        check_status(response.status(), "gemini", &url)?;
        let payload: serde_json::Value = response.json().await?;
        reply_text(&payload)
    }
}

/// Pull candidates[0].content.parts[0].text out of a reply
fn reply_text(payload: &serde_json::Value) -> ScrapeResult<String> {
    payload["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ScrapeError::Service(format!("reply without text: {}", payload)))
}

fn to_record(reply: GameReply, game_date: NaiveDate, run_date: NaiveDate) -> ScrapeResult<GameRecord> {
    let home_team = reply.home_team.trim().to_string();
    let away_team = reply.away_team.trim().to_string();
    if home_team.is_empty() || away_team.is_empty() {
        return Err(ScrapeError::markup(
            game_date,
            format!("{} @ {}", away_team, home_team),
            "extraction service returned an empty team",
        ));
    }

    Ok(GameRecord {
        game_date,
        updated_date: run_date,
        home_team,
        away_team,
        spread: normalize_spread(&reply.spread),
        total: normalize_total(&reply.total),
        neutral_site: reply.neutral_site,
        tournament: reply.tournament.trim().to_string(),
    })
}

#[async_trait]
impl GameExtractor for LlmExtractor {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn resolve_date(&self, html: &str) -> ScrapeResult<Option<NaiveDate>> {
        let Some(fragment) = CalendarParser::nav_fragment(html) else {
            return Ok(None);
        };
        let reply: DateReply = self.generate(DATE_PROMPT, &fragment).await?;
        Ok(reply.date)
    }

    async fn extract_games(
        &self,
        html: &str,
        game_date: NaiveDate,
        run_date: NaiveDate,
    ) -> ScrapeResult<Vec<GameRecord>> {
        // Html is not Send; collect fragments before awaiting
        let fragments = GameBoxLocator::fragments(html);

        let mut records = Vec::with_capacity(fragments.len());
        for fragment in &fragments {
            let reply: GameReply = self.generate(GAME_PROMPT, fragment).await?;
            records.push(to_record(reply, game_date, run_date)?);
        }
        Ok(records)
    }
}
