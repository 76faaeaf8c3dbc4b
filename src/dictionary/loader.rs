//! Loading the term table and body-armor list from disk.
//!
//! Both loaders are best-effort: malformed rows are skipped and loading
//! continues. Only failing to read the file itself is an error.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::{BodyArmorList, Category, TermDictionary};
use crate::text::split_fields;

fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "fuzzy"
    )
}

/// Builds a dictionary from `term,category[,fuzzy]` rows.
///
/// A header row (second column literally "category") is skipped, as are
/// rows with fewer than two columns, empty terms and unknown categories.
pub fn parse_terms(content: &str) -> TermDictionary {
    let mut dictionary = TermDictionary::new();
    let mut skipped = 0usize;

    for (line_num, line) in content.lines().enumerate() {
        if is_skippable(line) {
            continue;
        }

        let fields = split_fields(line);
        if fields.len() < 2 {
            skipped += 1;
            continue;
        }

        let term = fields[0].trim();
        let label = fields[1].trim();
        if line_num == 0 && label.eq_ignore_ascii_case("category") {
            continue;
        }
        if term.is_empty() {
            skipped += 1;
            continue;
        }

        let Some(category) = Category::parse_label(label) else {
            log::warn!(
                "Skipping dictionary row {}: unknown category '{}'",
                line_num + 1,
                label
            );
            skipped += 1;
            continue;
        };

        let fuzzy_only = fields.get(2).is_some_and(|f| parse_flag(f));
        dictionary.insert(term, category, fuzzy_only);
    }

    log::debug!(
        "Parsed {} dictionary terms ({} rows skipped)",
        dictionary.len(),
        skipped
    );
    dictionary
}

/// Reads and parses the term table at `path`.
pub fn load_terms(path: &Path) -> Result<TermDictionary> {
    let content = fs::read_to_string(path)
        .context(format!("Failed to read term dictionary: {}", path.display()))?;
    let dictionary = parse_terms(&content);
    log::info!(
        "Loaded {} terms from {}",
        dictionary.len(),
        path.display()
    );
    Ok(dictionary)
}

/// Builds a body-armor list from one name per line.
pub fn parse_body_armors(content: &str) -> BodyArmorList {
    content
        .lines()
        .filter(|line| !is_skippable(line))
        .collect()
}

/// Reads and parses the body-armor list at `path`.
pub fn load_body_armors(path: &Path) -> Result<BodyArmorList> {
    let content = fs::read_to_string(path)
        .context(format!("Failed to read body-armor list: {}", path.display()))?;
    let armors = parse_body_armors(&content);
    log::info!(
        "Loaded {} body-armor names from {}",
        armors.len(),
        path.display()
    );
    Ok(armors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_terms_skips_malformed() {
        let content = "term,category
Thief's Trinket,Trinket

# comment line
lonely column
Chaos Orb,Currency
,Currency
Mystery Item,Gem
\"Adds 1 to 2, Fire; Leech\",Weapon Enchant
Orb Of Horizons,Currency,fuzzy";

        let dict = parse_terms(content);
        assert_eq!(dict.len(), 4);
        assert_eq!(dict.category("Thief's Trinket"), Some(Category::Trinket));
        assert_eq!(dict.category("Chaos Orb"), Some(Category::Currency));
        assert_eq!(
            dict.category("Adds 1 To 2, Fire; Leech"),
            Some(Category::WeaponEnchant)
        );
        assert!(dict.is_fuzzy_only("Orb Of Horizons"));
        assert!(!dict.contains("Mystery Item"));
    }

    #[test]
    fn test_parse_terms_without_header() {
        let dict = parse_terms("chaos orb,currency\n");
        assert_eq!(dict.category("Chaos Orb"), Some(Category::Currency));
    }

    #[test]
    fn test_load_terms_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "Term,Category\nGilded Scarab,Scarab\n").unwrap();

        let dict = load_terms(file.path()).unwrap();
        assert_eq!(dict.category("Gilded Scarab"), Some(Category::Scarab));
    }

    #[test]
    fn test_load_terms_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_terms(&dir.path().join("nope.csv")).is_err());
    }

    #[test]
    fn test_parse_body_armors() {
        let armors = parse_body_armors("Astral Plate\n\n# note\nVaal Regalia\nAstral Plate\n");
        let names: Vec<_> = armors.iter().collect();
        assert_eq!(names, vec!["Astral Plate", "Vaal Regalia"]);
    }
}
