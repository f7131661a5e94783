//! HTML parsers for covers.com matchup pages.

pub mod calendar;
pub mod gamebox;
pub mod odds;

pub use calendar::CalendarParser;
pub use gamebox::GameBoxLocator;
pub use odds::OddsParser;
