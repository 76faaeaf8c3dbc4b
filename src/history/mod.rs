//! Loot log persistence and recent-duplicate detection.
//!
//! This module provides:
//! - The loot log row schema and its line encoding
//! - Reading, appending, editing and deleting rows
//! - Duplicate detection within the dedup window
//! - A summary of the log with JSON export

pub mod dedup;
pub mod record;
pub mod store;
pub mod summary;

pub use dedup::{is_recent_duplicate, window_from_secs, RecentObservations, DEFAULT_WINDOW_SECS};
pub use record::{format_timestamp, parse_timestamp, LogEntry, DUPLICATE_FLAG, LOG_HEADER, TIME_FORMAT};
pub use store::LootLog;
pub use summary::{export_to_json, LogSummary};
