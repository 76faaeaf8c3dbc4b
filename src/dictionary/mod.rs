//! Term dictionary: canonical term names mapped to their item category.
//!
//! This module provides:
//! - `Category`, the closed set of item categories
//! - `TermDictionary`, built once at startup and read-only afterwards
//! - `TypeLookup`, every category a base phrase was ever tagged with
//! - `BodyArmorList`, names used only as anchors for enchant placement

pub mod category;
pub mod loader;

pub use category::Category;
pub use loader::{load_body_armors, load_terms, parse_body_armors, parse_terms};

use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};

use crate::text::{normalize_for_search, smart_title_case};

/// Separator between the two phrases of a combo enchant term.
pub const COMBO_SEPARATOR: char = ';';

/// Splits a combo term into its two trimmed phrases.
///
/// Returns `None` when the separator is missing or either side is empty.
pub fn combo_parts(name: &str) -> Option<(&str, &str)> {
    let (first, second) = name.split_once(COMBO_SEPARATOR)?;
    let (first, second) = (first.trim(), second.trim());
    if first.is_empty() || second.is_empty() {
        return None;
    }
    Some((first, second))
}

/// Normalized text before the combo separator (the whole term if there is none).
pub fn base_phrase(name: &str) -> String {
    let head = name.split(COMBO_SEPARATOR).next().unwrap_or(name);
    normalize_for_search(head)
}

/// One dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TermEntry {
    pub canonical_name: String,
    pub category: Category,
}

impl TermEntry {
    /// True when this entry must be matched as two nearby phrases.
    pub fn is_combo(&self) -> bool {
        self.category.is_enchant() && combo_parts(&self.canonical_name).is_some()
    }
}

/// Maps normalized base phrases to every category they were tagged with.
#[derive(Debug, Clone, Default)]
pub struct TypeLookup {
    phrases: HashMap<String, HashSet<Category>>,
}

impl TypeLookup {
    /// Records `category` as evidence for the base phrase of `term`.
    pub fn record(&mut self, term: &str, category: Category) {
        let phrase = base_phrase(term);
        if phrase.is_empty() {
            return;
        }
        self.phrases.entry(phrase).or_default().insert(category);
    }

    /// Categories seen for an already-normalized phrase.
    pub fn categories(&self, phrase: &str) -> Option<&HashSet<Category>> {
        self.phrases.get(phrase)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// Canonical term → category table.
///
/// Iteration follows first-insertion order. Re-inserting a canonical name
/// overwrites its category in place (last write wins).
#[derive(Debug, Clone, Default)]
pub struct TermDictionary {
    terms: IndexMap<String, Category>,
    fuzzy_only: HashSet<String>,
    type_lookup: TypeLookup,
}

impl TermDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a raw term, title-casing it into its canonical name.
    ///
    /// `fuzzy_only` terms are left out of the base set and only considered
    /// when fuzzy matching is enabled. Returns the canonical name.
    pub fn insert(&mut self, raw_term: &str, category: Category, fuzzy_only: bool) -> String {
        let canonical = smart_title_case(raw_term.trim());
        self.type_lookup.record(&canonical, category);
        if let Some(previous) = self.terms.insert(canonical.clone(), category) {
            if previous != category {
                log::debug!(
                    "Dictionary collision for '{}': {} replaced by {}",
                    canonical,
                    previous,
                    category
                );
            }
        }
        if fuzzy_only {
            self.fuzzy_only.insert(canonical.clone());
        } else {
            self.fuzzy_only.remove(&canonical);
        }
        canonical
    }

    /// Category of a canonical name. Callers must title-case dynamic names first.
    pub fn category(&self, canonical_name: &str) -> Option<Category> {
        self.terms.get(canonical_name).copied()
    }

    pub fn contains(&self, canonical_name: &str) -> bool {
        self.terms.contains_key(canonical_name)
    }

    pub fn is_fuzzy_only(&self, canonical_name: &str) -> bool {
        self.fuzzy_only.contains(canonical_name)
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Category)> {
        self.terms.iter().map(|(name, &category)| (name.as_str(), category))
    }

    pub fn type_lookup(&self) -> &TypeLookup {
        &self.type_lookup
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Ordered, de-duplicated body-armor names.
#[derive(Debug, Clone, Default)]
pub struct BodyArmorList {
    names: IndexSet<String>,
}

impl BodyArmorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.names.insert(name.to_string());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for BodyArmorList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        for name in iter {
            list.push(name.as_ref());
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_canonicalizes() {
        let mut dict = TermDictionary::new();
        let name = dict.insert("THIEF'S TRINKET", Category::Trinket, false);
        assert_eq!(name, "Thief's Trinket");
        assert_eq!(dict.category("Thief's Trinket"), Some(Category::Trinket));
        assert!(dict.category("THIEF'S TRINKET").is_none());
    }

    #[test]
    fn test_last_write_wins_keeps_position() {
        let mut dict = TermDictionary::new();
        dict.insert("Chaos Orb", Category::Currency, false);
        dict.insert("Exalted Orb", Category::Currency, false);
        dict.insert("chaos orb", Category::Scarab, false);

        let entries: Vec<_> = dict.iter().collect();
        assert_eq!(
            entries,
            vec![
                ("Chaos Orb", Category::Scarab),
                ("Exalted Orb", Category::Currency)
            ]
        );
        let evidence = dict.type_lookup().categories("chaos orb").unwrap();
        assert!(evidence.contains(&Category::Currency));
        assert!(evidence.contains(&Category::Scarab));
    }

    #[test]
    fn test_fuzzy_only_flag() {
        let mut dict = TermDictionary::new();
        dict.insert("Chaos Orb", Category::Currency, false);
        dict.insert("Orb Of Horizons", Category::Currency, true);

        assert!(!dict.is_fuzzy_only("Chaos Orb"));
        assert!(dict.is_fuzzy_only("Orb Of Horizons"));
        let all: Vec<_> = dict.iter().map(|(n, _)| n).collect();
        assert_eq!(all, vec!["Chaos Orb", "Orb Of Horizons"]);

        dict.insert("orb of horizons", Category::Currency, false);
        assert!(!dict.is_fuzzy_only("Orb Of Horizons"));
    }

    #[test]
    fn test_combo_parts_and_base_phrase() {
        assert_eq!(
            combo_parts("Fire Damage; Leech Life"),
            Some(("Fire Damage", "Leech Life"))
        );
        assert_eq!(combo_parts("No Separator"), None);
        assert_eq!(combo_parts("Dangling;"), None);
        assert_eq!(base_phrase("Fire Damage; Leech Life"), "fire damage");
        assert_eq!(base_phrase("+10% Cold"), "10% cold");
    }

    #[test]
    fn test_combo_entry_requires_enchant_category() {
        let combo = TermEntry {
            canonical_name: "A; B".to_string(),
            category: Category::ArmorEnchant,
        };
        let plain = TermEntry {
            canonical_name: "A; B".to_string(),
            category: Category::Currency,
        };
        assert!(combo.is_combo());
        assert!(!plain.is_combo());
    }

    #[test]
    fn test_body_armor_list_dedup() {
        let list: BodyArmorList = ["Astral Plate", "  ", "Glorious Plate", "Astral Plate"]
            .into_iter()
            .collect();
        let names: Vec<_> = list.iter().collect();
        assert_eq!(names, vec!["Astral Plate", "Glorious Plate"]);
    }
}
