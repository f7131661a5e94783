//! CSV storage for the spreads and totals dataset
//!
//! Provides loading and saving of the persisted dataset and the upsert
//! merge that folds freshly scraped games into it.

pub mod merge;
pub mod repository;
pub mod schema;

pub use merge::{merge, MergeOutcome};
pub use repository::GameRepository;
