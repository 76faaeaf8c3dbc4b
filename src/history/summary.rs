//! Loot log summary and JSON export.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::record::{format_timestamp, LogEntry};
use crate::dictionary::Category;

/// Aggregated counts over the whole loot log.
#[derive(Debug, Clone, Serialize)]
pub struct LogSummary {
    /// Number of rows in the log
    pub total_records: usize,
    /// Rows recorded with the duplicate flag set
    pub duplicates_flagged: usize,
    /// Earliest parsable `Time` value
    pub first_time: Option<String>,
    /// Latest parsable `Time` value
    pub last_time: Option<String>,
    /// Row count per category column, in column order
    pub categories: IndexMap<String, usize>,
    /// Summed stack size per currency/scarab, in first-seen order
    pub stacks: IndexMap<String, u64>,
}

impl LogSummary {
    /// Summarizes `entries`.
    ///
    /// Stackable rows with an empty or unreadable stack size count as one item.
    pub fn from_entries(entries: &[LogEntry]) -> Self {
        let mut categories: IndexMap<String, usize> = Category::ALL
            .iter()
            .map(|c| (c.column_name().to_string(), 0))
            .collect();
        let mut stacks: IndexMap<String, u64> = IndexMap::new();

        for entry in entries {
            let Some((category, value)) = entry.populated_category() else {
                continue;
            };
            *categories.entry(category.column_name().to_string()).or_insert(0) += 1;

            if category.has_stack_size() {
                let size = entry.stack_size.trim().parse::<u64>().unwrap_or(1);
                *stacks.entry(value.to_string()).or_insert(0) += size;
            }
        }

        let timestamps: Vec<_> = entries.iter().filter_map(LogEntry::timestamp).collect();

        LogSummary {
            total_records: entries.len(),
            duplicates_flagged: entries.iter().filter(|e| e.is_flagged_duplicate()).count(),
            first_time: timestamps.iter().min().map(format_timestamp),
            last_time: timestamps.iter().max().map(format_timestamp),
            categories,
            stacks,
        }
    }
}

/// Export a summary to a JSON file.
///
/// The output is pretty-printed for human readability.
pub fn export_to_json(summary: &LogSummary, output_path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(summary).context("Failed to serialize summary to JSON")?;

    let mut file = File::create(output_path)
        .context(format!("Failed to create JSON file: {}", output_path.display()))?;

    file.write_all(json.as_bytes())
        .context("Failed to write JSON data")?;

    Ok(())
}
