//! Finds dictionary terms in OCR text.
//!
//! Matching runs in two phases:
//! 1. `find_candidates` scans every candidate term (exact, fuzzy or combo)
//! 2. `suppress_subsumed` drops stand-alone matches covered by a combo match
//!
//! Duplicate flags are attached afterwards by `match_terms`.

use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

use super::similarity::{best_match, Similarity};
use crate::dictionary::{combo_parts, TermDictionary, TermEntry};
use crate::text::{is_word_char, normalize_for_search, smart_title_case, word_tokens};

/// Lines after the first combo phrase in which the second may appear.
pub const COMBO_LINE_WINDOW: usize = 2;

/// Minimum similarity for a fuzzy token match.
pub const FUZZY_TERM_CUTOFF: f64 = 0.83;

/// Allowed length difference between a term and a fuzzy token.
const FUZZY_LENGTH_SLACK: usize = 2;

/// How a term was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Whole-word, case-insensitive match
    Exact,
    /// Token similarity at or above `FUZZY_TERM_CUTOFF`
    Fuzzy,
    /// Both combo phrases within `COMBO_LINE_WINDOW` lines
    Combo,
}

/// A term found in the text, before duplicate checking.
#[derive(Debug, Clone, PartialEq)]
pub struct TermMatch {
    pub term: TermEntry,
    pub kind: MatchKind,
}

/// A term found in the text with its advisory duplicate flag.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub term: TermEntry,
    pub is_duplicate: bool,
}

#[derive(Debug)]
enum Pattern {
    Plain(Regex),
    Combo { first: String, second: String },
}

#[derive(Debug)]
struct CompiledTerm {
    entry: TermEntry,
    pattern: Pattern,
    fuzzy_only: bool,
}

/// Search patterns for a dictionary, compiled once and reused across scans.
#[derive(Debug)]
pub struct TermMatcher {
    terms: Vec<CompiledTerm>,
}

/// Builds a case-insensitive whole-word pattern for `term`.
///
/// `\b` is only placed on edges where the term has a word character,
/// otherwise terms like "+10%" could never match.
fn word_pattern(term: &str) -> Result<Regex, regex::Error> {
    let start = if term.chars().next().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    let end = if term.chars().next_back().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    RegexBuilder::new(&format!("{}{}{}", start, regex::escape(term), end))
        .case_insensitive(true)
        .build()
}

impl TermMatcher {
    /// Compiles a pattern for every dictionary entry.
    ///
    /// Entries whose pattern fails to compile are skipped with a warning.
    pub fn new(dictionary: &TermDictionary) -> Self {
        let mut terms = Vec::with_capacity(dictionary.len());

        for (name, category) in dictionary.iter() {
            let entry = TermEntry {
                canonical_name: name.to_string(),
                category,
            };
            let pattern = match combo_parts(name).filter(|_| entry.is_combo()) {
                Some((first, second)) => Pattern::Combo {
                    first: normalize_for_search(first),
                    second: normalize_for_search(second),
                },
                None => match word_pattern(name) {
                    Ok(regex) => Pattern::Plain(regex),
                    Err(e) => {
                        log::warn!("Skipping term '{}': invalid pattern: {}", name, e);
                        continue;
                    }
                },
            };
            terms.push(CompiledTerm {
                entry,
                pattern,
                fuzzy_only: dictionary.is_fuzzy_only(name),
            });
        }

        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Phase one: every term present in `text`, in dictionary order.
    pub fn find_candidates(
        &self,
        text: &str,
        use_fuzzy: bool,
        similarity: &dyn Similarity,
    ) -> Vec<TermMatch> {
        let titled = smart_title_case(text);
        let lines: Vec<String> = text.lines().map(normalize_for_search).collect();
        let tokens: Vec<String> = if use_fuzzy {
            word_tokens(&titled)
                .into_iter()
                .map(|(_, token)| token.to_lowercase())
                .collect()
        } else {
            Vec::new()
        };

        let mut matches = Vec::new();
        for term in &self.terms {
            if term.fuzzy_only && !use_fuzzy {
                continue;
            }

            let kind = match &term.pattern {
                Pattern::Combo { first, second } => {
                    combo_present(&lines, first, second).then_some(MatchKind::Combo)
                }
                Pattern::Plain(regex) => {
                    if regex.is_match(&titled) {
                        Some(MatchKind::Exact)
                    } else if use_fuzzy
                        && fuzzy_present(&term.entry.canonical_name, &tokens, similarity)
                    {
                        Some(MatchKind::Fuzzy)
                    } else {
                        None
                    }
                }
            };

            if let Some(kind) = kind {
                log::debug!(
                    "Matched {:?} term '{}' ({})",
                    kind,
                    term.entry.canonical_name,
                    term.entry.category
                );
                matches.push(TermMatch {
                    term: term.entry.clone(),
                    kind,
                });
            }
        }
        matches
    }

    /// Both phases plus duplicate flags from `is_duplicate`.
    pub fn match_terms<F>(
        &self,
        text: &str,
        use_fuzzy: bool,
        similarity: &dyn Similarity,
        is_duplicate: F,
    ) -> Vec<MatchCandidate>
    where
        F: Fn(&str) -> bool,
    {
        suppress_subsumed(self.find_candidates(text, use_fuzzy, similarity))
            .into_iter()
            .map(|m| {
                let is_duplicate = is_duplicate(&m.term.canonical_name);
                MatchCandidate {
                    term: m.term,
                    is_duplicate,
                }
            })
            .collect()
    }
}

/// True when `first` appears on some line and `second` on that line or
/// one of the next `COMBO_LINE_WINDOW` lines.
fn combo_present(lines: &[String], first: &str, second: &str) -> bool {
    if first.is_empty() || second.is_empty() {
        return false;
    }
    lines.iter().enumerate().any(|(i, line)| {
        line.contains(first)
            && lines[i..]
                .iter()
                .take(COMBO_LINE_WINDOW + 1)
                .any(|next| next.contains(second))
    })
}

fn fuzzy_present(term: &str, tokens: &[String], similarity: &dyn Similarity) -> bool {
    let target = term.to_lowercase();
    let target_len = target.chars().count();
    let close_in_length = tokens
        .iter()
        .map(String::as_str)
        .filter(|token| token.chars().count().abs_diff(target_len) <= FUZZY_LENGTH_SLACK);

    match best_match(similarity, &target, close_in_length, FUZZY_TERM_CUTOFF) {
        Some((token, score)) => {
            log::debug!(
                "Fuzzy match '{}' ~ '{}' (ratio {:.2})",
                term,
                token,
                score
            );
            true
        }
        None => false,
    }
}

/// Phase two: drops stand-alone matches whose name is one phrase of a
/// matched combo term, unless that name is itself a matched combo term.
pub fn suppress_subsumed(matches: Vec<TermMatch>) -> Vec<TermMatch> {
    let combo_names: HashSet<String> = matches
        .iter()
        .filter(|m| m.kind == MatchKind::Combo)
        .map(|m| m.term.canonical_name.clone())
        .collect();

    let covered: HashSet<String> = combo_names
        .iter()
        .filter_map(|name| combo_parts(name))
        .flat_map(|(first, second)| [smart_title_case(first), smart_title_case(second)])
        .collect();

    matches
        .into_iter()
        .filter(|m| {
            let name = &m.term.canonical_name;
            let subsumed = covered.contains(name) && !combo_names.contains(name);
            if subsumed {
                log::debug!("Suppressing '{}' in favor of its combo term", name);
            }
            !subsumed
        })
        .collect()
}

/// One-shot matching against a dictionary.
///
/// Compiles the dictionary on every call; hold a `TermMatcher` when scanning
/// repeatedly.
pub fn match_terms<F>(
    text: &str,
    dictionary: &TermDictionary,
    use_fuzzy: bool,
    similarity: &dyn Similarity,
    is_duplicate: F,
) -> Vec<MatchCandidate>
where
    F: Fn(&str) -> bool,
{
    TermMatcher::new(dictionary).match_terms(text, use_fuzzy, similarity, is_duplicate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Category;
    use crate::matching::similarity::SequenceRatio;

    fn dictionary(entries: &[(&str, Category)]) -> TermDictionary {
        let mut dict = TermDictionary::new();
        for (term, category) in entries {
            dict.insert(term, *category, false);
        }
        dict
    }

    fn names(candidates: &[MatchCandidate]) -> Vec<&str> {
        candidates
            .iter()
            .map(|c| c.term.canonical_name.as_str())
            .collect()
    }

    #[test]
    fn test_exact_match_case_insensitive() {
        let dict = dictionary(&[
            ("Thief's Trinket", Category::Trinket),
            ("Chaos Orb", Category::Currency),
            ("Divine Orb", Category::Currency),
        ]);
        let found = match_terms(
            "THIEF\u{2019}S TRINKET\nchaos orb x3",
            &dict,
            false,
            &SequenceRatio,
            |_| false,
        );
        assert_eq!(names(&found), vec!["Thief's Trinket", "Chaos Orb"]);
    }

    #[test]
    fn test_exact_match_requires_word_boundary() {
        let dict = dictionary(&[("Orb", Category::Currency)]);
        let found = match_terms("Orbit", &dict, false, &SequenceRatio, |_| false);
        assert!(found.is_empty());
    }

    #[test]
    fn test_symbol_edged_term_matches() {
        let dict = dictionary(&[("+10% Fire", Category::WeaponEnchant)]);
        let found = match_terms("gain +10% fire damage", &dict, false, &SequenceRatio, |_| false);
        assert_eq!(names(&found), vec!["+10% Fire"]);
    }

    #[test]
    fn test_fuzzy_match_only_when_enabled() {
        let dict = dictionary(&[("Regalia", Category::Replica)]);
        let text = "Regalla found";

        let strict = match_terms(text, &dict, false, &SequenceRatio, |_| false);
        assert!(strict.is_empty());

        let fuzzy = match_terms(text, &dict, true, &SequenceRatio, |_| false);
        assert_eq!(names(&fuzzy), vec!["Regalia"]);
    }

    #[test]
    fn test_fuzzy_rejects_length_mismatch() {
        let dict = dictionary(&[("Regalia", Category::Replica)]);
        let found = match_terms("Regaliaaaaa", &dict, true, &SequenceRatio, |_| false);
        assert!(found.is_empty());
    }

    #[test]
    fn test_fuzzy_only_terms_need_fuzzy_mode() {
        let mut dict = TermDictionary::new();
        dict.insert("Chaos Orb", Category::Currency, false);
        dict.insert("Orb Of Horizons", Category::Currency, true);
        let text = "Chaos Orb\nOrb of Horizons";

        let base = match_terms(text, &dict, false, &SequenceRatio, |_| false);
        assert_eq!(names(&base), vec!["Chaos Orb"]);

        let all = match_terms(text, &dict, true, &SequenceRatio, |_| false);
        assert_eq!(names(&all), vec!["Chaos Orb", "Orb Of Horizons"]);
    }

    #[test]
    fn test_combo_suppresses_parts() {
        let dict = dictionary(&[
            ("A; B", Category::ArmorEnchant),
            ("A", Category::ArmorEnchant),
            ("B", Category::ArmorEnchant),
        ]);
        let found = match_terms("A\nnoise\nB", &dict, false, &SequenceRatio, |_| false);
        assert_eq!(names(&found), vec!["A; B"]);
    }

    #[test]
    fn test_combo_outside_line_window() {
        let dict = dictionary(&[
            ("A; B", Category::ArmorEnchant),
            ("A", Category::ArmorEnchant),
            ("B", Category::ArmorEnchant),
        ]);
        let found = match_terms("A\n1\n2\n3\nB", &dict, false, &SequenceRatio, |_| false);
        assert_eq!(names(&found), vec!["A", "B"]);
    }

    #[test]
    fn test_combo_same_line() {
        let dict = dictionary(&[("Cold Damage; Chill", Category::WeaponEnchant)]);
        let found = match_terms(
            "Adds Cold Damage and may Chill",
            &dict,
            false,
            &SequenceRatio,
            |_| false,
        );
        assert_eq!(names(&found), vec!["Cold Damage; Chill"]);
    }

    #[test]
    fn test_combo_separator_outside_enchants_is_plain() {
        let dict = dictionary(&[("A; B", Category::Currency)]);
        assert!(match_terms("A\nB", &dict, false, &SequenceRatio, |_| false).is_empty());
        let found = match_terms("x a; b y", &dict, false, &SequenceRatio, |_| false);
        assert_eq!(names(&found), vec!["A; B"]);
    }

    #[test]
    fn test_suppress_keeps_part_that_is_a_matched_combo() {
        let entry = |name: &str| TermEntry {
            canonical_name: name.to_string(),
            category: Category::ArmorEnchant,
        };
        let matches = vec![
            TermMatch {
                term: entry("A; B; C"),
                kind: MatchKind::Combo,
            },
            TermMatch {
                term: entry("B; C"),
                kind: MatchKind::Combo,
            },
            TermMatch {
                term: entry("A"),
                kind: MatchKind::Exact,
            },
            TermMatch {
                term: entry("D"),
                kind: MatchKind::Exact,
            },
        ];
        let kept = suppress_subsumed(matches);
        let kept_names: Vec<_> = kept.iter().map(|m| m.term.canonical_name.as_str()).collect();
        assert_eq!(kept_names, vec!["A; B; C", "B; C", "D"]);
    }

    #[test]
    fn test_duplicate_flag_attached() {
        let dict = dictionary(&[
            ("Chaos Orb", Category::Currency),
            ("Divine Orb", Category::Currency),
        ]);
        let found = match_terms(
            "Chaos Orb\nDivine Orb",
            &dict,
            false,
            &SequenceRatio,
            |name| name == "Divine Orb",
        );
        assert!(!found[0].is_duplicate);
        assert!(found[1].is_duplicate);
    }

    #[test]
    fn test_matcher_compiles_every_entry() {
        assert!(TermMatcher::new(&TermDictionary::new()).is_empty());

        let dict = dictionary(&[
            ("Chaos Orb", Category::Currency),
            ("A; B", Category::ArmorEnchant),
            ("Orb Of Horizons", Category::Currency),
        ]);
        let matcher = TermMatcher::new(&dict);
        assert_eq!(matcher.len(), 3);
        assert!(!matcher.is_empty());
    }
}
