//! Capture pipeline: OCR text in, classified loot rows out.
//!
//! One `process` call is one capture cycle. The loot log is read once per
//! cycle to build the recent-duplicate window, then every matched term is
//! classified, ratio-annotated and flagged.

use anyhow::Result;
use chrono::{Local, NaiveDateTime, TimeDelta};

use crate::config::AppConfig;
use crate::dictionary::{load_body_armors, load_terms, BodyArmorList, Category, TermDictionary};
use crate::history::{
    format_timestamp, window_from_secs, LogEntry, LootLog, RecentObservations, DUPLICATE_FLAG,
};
use crate::matching::{ratio_for, resolve_enchant_side, Similarity, TermMatcher};

/// Row metadata copied onto every emitted row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowMetadata {
    pub league: String,
    pub logged_by: String,
    pub blueprint_type: String,
    pub area_level: String,
}

impl RowMetadata {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            league: config.league.clone(),
            logged_by: config.logged_by.clone(),
            blueprint_type: config.blueprint_type.clone(),
            area_level: config.area_level.clone(),
        }
    }
}

/// One classified match, ready to become a loot log row.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    /// The single category column this row populates
    pub column: Category,
    /// Canonical term name
    pub value: String,
    /// Current stack count, only for stackable categories
    pub stack_size: Option<u32>,
    /// Seen within the dedup window
    pub is_duplicate: bool,
    pub metadata: RowMetadata,
    pub variant: String,
    pub time: NaiveDateTime,
}

impl ClassifiedRow {
    /// The loot log row for this match. `record` is assigned on append.
    pub fn to_entry(&self) -> LogEntry {
        let mut entry = LogEntry {
            record: 0,
            league: self.metadata.league.clone(),
            logged_by: self.metadata.logged_by.clone(),
            blueprint_type: self.metadata.blueprint_type.clone(),
            area_level: self.metadata.area_level.clone(),
            stack_size: self.stack_size.map(|n| n.to_string()).unwrap_or_default(),
            variant: self.variant.clone(),
            time: format_timestamp(&self.time),
            ..Default::default()
        };
        if self.is_duplicate {
            entry.flag = DUPLICATE_FLAG.to_string();
        }
        entry.set_category(self.column, &self.value);
        entry
    }
}

/// The loaded dictionary and settings for repeated capture cycles.
pub struct Pipeline {
    dictionary: TermDictionary,
    matcher: TermMatcher,
    body_armors: BodyArmorList,
    similarity: Box<dyn Similarity>,
    metadata: RowMetadata,
    use_fuzzy: bool,
    dedup_window: TimeDelta,
    log: LootLog,
}

impl Pipeline {
    pub fn new(
        dictionary: TermDictionary,
        body_armors: BodyArmorList,
        config: &AppConfig,
        log: LootLog,
    ) -> Self {
        let matcher = TermMatcher::new(&dictionary);
        if matcher.is_empty() {
            log::warn!("No term patterns compiled, scans will match nothing");
        } else {
            log::debug!("Compiled {} term patterns", matcher.len());
        }
        Self {
            dictionary,
            matcher,
            body_armors,
            similarity: config.similarity.build(),
            metadata: RowMetadata::from_config(config),
            use_fuzzy: config.use_fuzzy,
            dedup_window: window_from_secs(config.dedup_window_secs),
            log,
        }
    }

    /// Loads the dictionary, body-armor list and log named by `config`.
    ///
    /// A missing body-armor list only disables proximity disambiguation.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let dictionary = load_terms(&config.terms_path())?;
        let body_armors = match load_body_armors(&config.body_armor_path()) {
            Ok(armors) => armors,
            Err(e) => {
                log::warn!("{:#}. Continuing without body-armor names.", e);
                BodyArmorList::new()
            }
        };
        Ok(Self::new(
            dictionary,
            body_armors,
            config,
            LootLog::new(config.log_path()),
        ))
    }

    pub fn with_fuzzy(mut self, use_fuzzy: bool) -> Self {
        self.use_fuzzy = use_fuzzy;
        self
    }

    pub fn dictionary(&self) -> &TermDictionary {
        &self.dictionary
    }

    pub fn log(&self) -> &LootLog {
        &self.log
    }

    /// Runs one capture cycle at the current local time.
    pub fn process(&self, text: &str, allow_duplicates: bool) -> Vec<ClassifiedRow> {
        self.process_at(text, allow_duplicates, Local::now().naive_local())
    }

    /// Runs one capture cycle as of `now`.
    ///
    /// An unreadable loot log is treated as empty.
    pub fn process_at(
        &self,
        text: &str,
        allow_duplicates: bool,
        now: NaiveDateTime,
    ) -> Vec<ClassifiedRow> {
        let recent = if allow_duplicates {
            RecentObservations::default()
        } else {
            match self.log.read() {
                Ok(entries) => RecentObservations::from_entries(&entries, self.dedup_window, now),
                Err(e) => {
                    log::warn!("{:#}. Skipping duplicate check.", e);
                    RecentObservations::default()
                }
            }
        };
        self.classify(text, &recent, allow_duplicates, now)
    }

    /// Classifies every match in `text` against a fixed recent-value window.
    pub fn classify(
        &self,
        text: &str,
        recent: &RecentObservations,
        allow_duplicates: bool,
        now: NaiveDateTime,
    ) -> Vec<ClassifiedRow> {
        let candidates = self.matcher.match_terms(
            text,
            self.use_fuzzy,
            self.similarity.as_ref(),
            |value| !allow_duplicates && recent.contains(value),
        );

        candidates
            .into_iter()
            .map(|candidate| {
                let term = candidate.term;
                let column = if term.category.is_enchant() {
                    resolve_enchant_side(
                        &term.canonical_name,
                        text,
                        &self.body_armors,
                        self.dictionary.type_lookup(),
                        self.similarity.as_ref(),
                    )
                    .category()
                } else {
                    term.category
                };

                let stack_size = ratio_for(text, &term.canonical_name, column)
                    .filter(|ratio| ratio.current > 0)
                    .map(|ratio| ratio.current);

                if candidate.is_duplicate {
                    log::info!("'{}' seen within the dedup window", term.canonical_name);
                } else {
                    log::debug!("Matched '{}' as {}", term.canonical_name, column);
                }

                ClassifiedRow {
                    column,
                    value: term.canonical_name,
                    stack_size,
                    is_duplicate: candidate.is_duplicate,
                    metadata: self.metadata.clone(),
                    variant: String::new(),
                    time: now,
                }
            })
            .collect()
    }

    /// Appends the rows that should be persisted.
    ///
    /// Duplicate-flagged rows are dropped unless `allow_duplicates` is set,
    /// in which case they are recorded with the duplicate flag.
    pub fn persist(&self, rows: &[ClassifiedRow], allow_duplicates: bool) -> Result<Vec<u64>> {
        let entries: Vec<LogEntry> = rows
            .iter()
            .filter(|row| allow_duplicates || !row.is_duplicate)
            .map(ClassifiedRow::to_entry)
            .collect();

        let skipped = rows.len() - entries.len();
        if skipped > 0 {
            log::info!("Skipped {} duplicate row(s)", skipped);
        }
        self.log.append(&entries)
    }
}
