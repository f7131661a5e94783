//! Game container locator.
//!
//! Every game on the matchups page is an `article.gamebox`, marked either
//! `pregamebox` (scheduled, live odds) or `postgamebox` (final, narrative
//! summary). The two dialects put the header paragraph in slightly different
//! places, so both forms are matched here.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

static GAMEBOX: LazyLock<Selector> = LazyLock::new(|| Selector::parse("article.gamebox").unwrap());
static HEADER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p#gamebox-header, p.gamebox-header").unwrap());
static TEAMS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("strong.text-uppercase").unwrap());
static TOURNAMENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".gamebox-tournament").unwrap());

/// Separator between away and home team in the header
pub const TEAM_SEPARATOR: char = '@';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    PreGame,
    PostGame,
}

/// One located game container
#[derive(Debug, Clone)]
pub struct GameBox<'a> {
    pub element: ElementRef<'a>,
    pub state: GameState,
    pub away_team: String,
    pub home_team: String,
    /// Full text of the header paragraph, markers included
    pub header_text: String,
    pub tournament: String,
}

impl GameBox<'_> {
    pub fn matchup(&self) -> String {
        format!("{} {} {}", self.away_team, TEAM_SEPARATOR, self.home_team)
    }

    /// Neutral venue marker in the header.
    ///
    /// Final games also count "neutral" or "tournament" anywhere in the
    /// header, which is how older pages flag them.
    pub fn neutral_site(&self) -> bool {
        let header = self.header_text.to_lowercase();
        if header.contains("(n)") {
            return true;
        }
        self.state == GameState::PostGame && (header.contains("neutral") || header.contains("tournament"))
    }
}

/// Locator for game containers
pub struct GameBoxLocator;

impl GameBoxLocator {
    /// All recognisable game containers, in document order.
    ///
    /// Containers without a state class or without an "AWAY @ HOME" header
    /// are skipped.
    pub fn locate(document: &Html) -> Vec<GameBox<'_>> {
        document
            .select(&GAMEBOX)
            .filter_map(|element| {
                let located = Self::classify(element);
                if located.is_none() {
                    debug!("skipping unrecognised gamebox");
                }
                located
            })
            .collect()
    }

    /// Outer HTML of every located container.
    pub fn fragments(html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let fragments: Vec<String> = Self::locate(&document)
            .iter()
            .map(|gamebox| gamebox.element.html())
            .collect();
        fragments
    }

    fn classify(element: ElementRef<'_>) -> Option<GameBox<'_>> {
        let state = Self::state_of(element)?;
        let header = element.select(&HEADER).next()?;
        let teams_text = header.select(&TEAMS).next()?.text().collect::<String>();
        let (away_team, home_team) = split_teams(&teams_text)?;

        let tournament = header
            .select(&TOURNAMENT)
            .next()
            .map(|t| collapse_whitespace(&t.text().collect::<String>()))
            .unwrap_or_default();

        Some(GameBox {
            element,
            state,
            away_team,
            home_team,
            header_text: collapse_whitespace(&header.text().collect::<String>()),
            tournament,
        })
    }

    fn state_of(element: ElementRef<'_>) -> Option<GameState> {
        let mut classes = element.value().classes();
        if classes.any(|c| c == "postgamebox") {
            return Some(GameState::PostGame);
        }
        if element.value().classes().any(|c| c == "pregamebox") {
            return Some(GameState::PreGame);
        }
        None
    }
}

/// Split "AWAY @ HOME" into trimmed, non-empty (away, home).
pub fn split_teams(text: &str) -> Option<(String, String)> {
    let (away, home) = text.split_once(TEAM_SEPARATOR)?;
    let away = collapse_whitespace(away);
    let home = collapse_whitespace(home);
    if away.is_empty() || home.is_empty() {
        return None;
    }
    Some((away, home))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"<html><body>
<article class="gamebox pregamebox">
  <p id="gamebox-header"><strong class="text-uppercase">UNC @ DUKE</strong> (N)</p>
</article>
<article class="gamebox postgamebox">
  <p class="gamebox-header"><strong class="text-uppercase">  KANSAS  @  BAYLOR </strong>
    <span class="gamebox-tournament">Big 12 Tournament</span></p>
</article>
<article class="gamebox pregamebox">
  <p id="gamebox-header"><strong class="text-uppercase">TBD</strong></p>
</article>
<article class="gamebox">
  <p id="gamebox-header"><strong class="text-uppercase">A @ B</strong></p>
</article>
<article class="gamebox postgamebox">
  <p class="gamebox-header"><strong class="text-uppercase"> @ GONZAGA</strong></p>
</article>
</body></html>"#;

    #[test]
    fn test_locate_and_classify() {
        let document = Html::parse_document(SAMPLE_HTML);
        let boxes = GameBoxLocator::locate(&document);

        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].state, GameState::PreGame);
        assert_eq!(boxes[0].away_team, "UNC");
        assert_eq!(boxes[0].home_team, "DUKE");
        assert!(boxes[0].neutral_site());
        assert_eq!(boxes[0].tournament, "");

        assert_eq!(boxes[1].state, GameState::PostGame);
        assert_eq!(boxes[1].away_team, "KANSAS");
        assert_eq!(boxes[1].home_team, "BAYLOR");
        assert_eq!(boxes[1].tournament, "Big 12 Tournament");
        assert!(boxes[1].neutral_site());
        assert_eq!(boxes[1].matchup(), "KANSAS @ BAYLOR");
    }

    #[test]
    fn test_split_teams() {
        assert_eq!(
            split_teams(" St. John's @ Seton Hall "),
            Some(("St. John's".to_string(), "Seton Hall".to_string()))
        );
        assert_eq!(split_teams("Duke vs UNC"), None);
        assert_eq!(split_teams("Duke @ "), None);
    }

    #[test]
    fn test_tournament_word_only_counts_for_final_games() {
        let html = r#"<article class="gamebox pregamebox">
          <p id="gamebox-header"><strong class="text-uppercase">A @ B</strong> Tournament</p>
        </article>"#;
        let document = Html::parse_document(html);
        let boxes = GameBoxLocator::locate(&document);
        assert_eq!(boxes.len(), 1);
        assert!(!boxes[0].neutral_site());
    }

    #[test]
    fn test_fragments() {
        let fragments = GameBoxLocator::fragments(SAMPLE_HTML);
        assert_eq!(fragments.len(), 2);
        assert!(fragments[0].starts_with("<article"));
        assert!(fragments[1].contains("BAYLOR"));
    }

    #[test]
    fn test_empty_document() {
        let document = Html::parse_document("<html></html>");
        assert!(GameBoxLocator::locate(&document).is_empty());
    }
}
