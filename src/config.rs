//! Application configuration.
//!
//! Loads settings from config.json at startup: row metadata written with
//! every logged item, the dedup window, the fuzzy toggle and the data
//! file names.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::history::DEFAULT_WINDOW_SECS;
use crate::matching::SimilarityKind;
use crate::paths;

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// League name written to every row
    #[serde(default)]
    pub league: String,
    /// Name of the person logging
    #[serde(default)]
    pub logged_by: String,
    /// Blueprint type of the current run
    #[serde(default)]
    pub blueprint_type: String,
    /// Area level of the current run
    #[serde(default)]
    pub area_level: String,
    /// Seconds during which a repeated value counts as a duplicate
    #[serde(default = "default_dedup_window_secs")]
    pub dedup_window_secs: u64,
    /// Enables fuzzy term matching
    #[serde(default)]
    pub use_fuzzy: bool,
    /// String-similarity algorithm used by fuzzy matching
    #[serde(default)]
    pub similarity: SimilarityKind,
    /// Term dictionary file, relative to the data directory
    #[serde(default = "default_terms_file")]
    pub terms_file: String,
    /// Body-armor list file, relative to the data directory
    #[serde(default = "default_body_armor_file")]
    pub body_armor_file: String,
    /// Loot log file, relative to the data directory
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_dedup_window_secs() -> u64 {
    DEFAULT_WINDOW_SECS
}

fn default_terms_file() -> String {
    "terms.csv".to_string()
}

fn default_body_armor_file() -> String {
    "body_armors.txt".to_string()
}

fn default_log_file() -> String {
    "loot_log.csv".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            league: String::new(),
            logged_by: String::new(),
            blueprint_type: String::new(),
            area_level: String::new(),
            dedup_window_secs: default_dedup_window_secs(),
            use_fuzzy: false,
            similarity: SimilarityKind::default(),
            terms_file: default_terms_file(),
            body_armor_file: default_body_armor_file(),
            log_file: default_log_file(),
        }
    }
}

impl AppConfig {
    pub fn terms_path(&self) -> PathBuf {
        paths::resolve_in(&paths::get_data_dir(), &self.terms_file)
    }

    pub fn body_armor_path(&self) -> PathBuf {
        paths::resolve_in(&paths::get_data_dir(), &self.body_armor_file)
    }

    pub fn log_path(&self) -> PathBuf {
        paths::resolve_in(&paths::get_data_dir(), &self.log_file)
    }
}

/// Loads configuration from `config_path` or returns defaults.
pub fn load_config(config_path: &Path) -> AppConfig {
    log::info!("Looking for config at: {}", config_path.display());

    if config_path.exists() {
        match fs::read_to_string(config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("Config loaded from {}", config_path.display());
                    return config;
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse {}: {}. Using defaults.",
                        config_path.display(),
                        e
                    );
                }
            },
            Err(e) => {
                log::warn!(
                    "Failed to read {}: {}. Using defaults.",
                    config_path.display(),
                    e
                );
            }
        }
    } else {
        log::info!("{} not found. Using default config.", config_path.display());
    }

    AppConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(&dir.path().join("config.json"));
        assert_eq!(config.dedup_window_secs, 60);
        assert!(!config.use_fuzzy);
        assert_eq!(config.similarity, SimilarityKind::Sequence);
        assert_eq!(config.terms_file, "terms.csv");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "league": "Settlers", "use_fuzzy": true, "similarity": "levenshtein" }"#,
        )
        .unwrap();

        let config = load_config(&path);
        assert_eq!(config.league, "Settlers");
        assert!(config.use_fuzzy);
        assert_eq!(config.similarity, SimilarityKind::Levenshtein);
        assert_eq!(config.dedup_window_secs, 60);
        assert_eq!(config.log_file, "loot_log.csv");
    }

    #[test]
    fn test_invalid_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let config = load_config(&path);
        assert!(config.league.is_empty());
        assert_eq!(config.body_armor_file, "body_armors.txt");
    }

    #[test]
    fn test_absolute_file_names_kept() {
        let dir = tempdir().unwrap();
        let log_file = dir.path().join("loot.csv");
        let config = AppConfig {
            log_file: log_file.to_string_lossy().into_owned(),
            ..Default::default()
        };
        assert_eq!(config.log_path(), log_file);
        assert!(config.terms_path().ends_with("data/terms.csv"));
    }
}
