//! Loot log file access.
//!
//! Rows are appended one write at a time so that completed captures are
//! already on disk if the process dies mid-session. Edits and deletes
//! rewrite the whole file through a temp file in the same directory.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::record::{LogEntry, LOG_HEADER};

/// The append-only loot log at a fixed path.
#[derive(Debug, Clone)]
pub struct LootLog {
    path: PathBuf,
}

impl LootLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file with its header if it doesn't exist or is empty.
    ///
    /// An existing file with content is left untouched.
    pub fn init(&self) -> Result<()> {
        if self.path.exists() {
            let file = File::open(&self.path).context("Failed to open existing loot log")?;
            let reader = BufReader::new(file);
            if reader.lines().next().is_some() {
                return Ok(());
            }
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create loot log directory")?;
        }
        let mut file = File::create(&self.path).context("Failed to create loot log")?;
        writeln!(file, "{}", LOG_HEADER).context("Failed to write loot log header")?;
        Ok(())
    }

    /// Reads every well-formed row. A missing file reads as empty.
    ///
    /// The first line is the header. Blank lines are skipped, and malformed
    /// rows are skipped with a warning.
    pub fn read(&self) -> Result<Vec<LogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .context(format!("Failed to open loot log: {}", self.path.display()))?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.context("Failed to read line from loot log")?;

            if line_num == 0 || line.trim().is_empty() {
                continue;
            }

            match LogEntry::parse_line(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    log::warn!("Skipping malformed loot log row {}: {}", line_num + 1, e);
                }
            }
        }

        Ok(entries)
    }

    /// Appends rows, assigning each the next record number.
    ///
    /// Returns the assigned record numbers in input order.
    pub fn append(&self, entries: &[LogEntry]) -> Result<Vec<u64>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        self.init()?;

        let first = next_record_number(&self.read()?);
        let last = first.and_then(|n| n.checked_add(entries.len() as u64 - 1));
        let (Some(first), Some(last)) = (first, last) else {
            return Err(anyhow!(
                "No record numbers left in {}",
                self.path.display()
            ));
        };

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .context("Failed to open loot log for append")?;
        if !ends_with_newline(&mut file)? {
            writeln!(file).context("Failed to terminate last loot log row")?;
        }

        let mut assigned = Vec::with_capacity(entries.len());
        for (record, entry) in (first..=last).zip(entries) {
            let row = LogEntry {
                record,
                ..entry.clone()
            };
            writeln!(file, "{}", row.to_line()).context("Failed to write loot log row")?;
            assigned.push(record);
        }

        log::info!(
            "Appended {} row(s) to {}",
            assigned.len(),
            self.path.display()
        );
        Ok(assigned)
    }

    /// Sets one column of the row with the given record number.
    ///
    /// Returns false if no such row exists.
    pub fn update(&self, record: u64, column: &str, value: &str) -> Result<bool> {
        let mut entries = self.read()?;
        let Some(entry) = entries.iter_mut().find(|e| e.record == record) else {
            return Ok(false);
        };
        entry.set_column(column, value)?;
        self.rewrite(&entries)?;
        log::info!("Updated record {} ({} = '{}')", record, column, value);
        Ok(true)
    }

    /// Removes the row with the given record number.
    ///
    /// Returns false if no such row exists. Other record numbers are kept.
    pub fn delete(&self, record: u64) -> Result<bool> {
        let mut entries = self.read()?;
        let before = entries.len();
        entries.retain(|e| e.record != record);
        if entries.len() == before {
            return Ok(false);
        }
        self.rewrite(&entries)?;
        log::info!("Deleted record {}", record);
        Ok(true)
    }

    fn rewrite(&self, entries: &[LogEntry]) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir).context("Failed to create temp loot log")?;

        writeln!(temp, "{}", LOG_HEADER).context("Failed to write loot log header")?;
        for entry in entries {
            writeln!(temp, "{}", entry.to_line()).context("Failed to write loot log row")?;
        }
        temp.flush().context("Failed to flush temp loot log")?;
        temp.persist(&self.path)
            .context(format!("Failed to replace loot log: {}", self.path.display()))?;
        Ok(())
    }
}

/// True for an empty file or one whose last byte is a line break.
fn ends_with_newline(file: &mut File) -> Result<bool> {
    let len = file.metadata().context("Failed to stat loot log")?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))
        .context("Failed to seek in loot log")?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)
        .context("Failed to read loot log")?;
    Ok(last[0] == b'\n')
}

/// One past the highest record number, or 1 for an empty log.
///
/// `None` once the highest record is `u64::MAX`.
pub fn next_record_number(entries: &[LogEntry]) -> Option<u64> {
    entries
        .iter()
        .map(|e| e.record)
        .max()
        .map_or(Some(1), |max| max.checked_add(1))
}
