//! Loot recognition for heist captures.
//!
//! Takes OCR text of in-game item tooltips, matches it against a term
//! dictionary, resolves enchant placement and stack sizes, and keeps a
//! de-duplicated loot log.

pub mod cli;
pub mod config;
pub mod dictionary;
pub mod history;
pub mod logging;
pub mod matching;
pub mod paths;
pub mod pipeline;
pub mod text;

pub use config::{load_config, AppConfig};
pub use pipeline::{ClassifiedRow, Pipeline, RowMetadata};
