use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::dictionary::{Category, TermDictionary};
use crate::text::smart_title_case;

/// Pattern for a stack count like "5/20" or "5 / 20".
static RATIO_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*/\s*(\d+)").expect("ratio pattern is valid"));

/// Largest stack size any item reaches.
pub const MAX_STACK: u32 = 20;

/// Lines after the term's line that are still scanned for a ratio.
const RATIO_LINE_WINDOW: usize = 2;

/// `current/maximum` stack count printed next to stackable items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StackRatio {
    pub current: u32,
    pub maximum: u32,
}

impl StackRatio {
    /// Assumed when a stackable item shows no ratio at all.
    pub const FALLBACK: StackRatio = StackRatio {
        current: 1,
        maximum: MAX_STACK,
    };

    fn is_valid(&self) -> bool {
        0 < self.current && self.current <= self.maximum && self.maximum <= MAX_STACK
    }
}

/// Outcome of scanning the text near a term for a ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioScan {
    /// No `digits/digits` pattern in the scanned lines
    NotFound,
    /// A pattern was found but could not be repaired into a valid ratio
    Invalid,
    Found(StackRatio),
}

impl RatioScan {
    /// Collapses the scan into the value recorded for a stackable item.
    pub fn resolve(self) -> Option<StackRatio> {
        match self {
            RatioScan::NotFound => Some(StackRatio::FALLBACK),
            RatioScan::Invalid => None,
            RatioScan::Found(ratio) => Some(ratio),
        }
    }
}

/// Parses and repairs one `current/maximum` pair.
///
/// OCR sometimes glues a stray digit in front of the count ("419/20" for
/// "9/20"). When the maximum reads as a full stack, only the last digit of
/// the count is kept.
fn repair_ratio(current_text: &str, maximum_text: &str) -> Option<StackRatio> {
    let maximum: u32 = maximum_text.parse().ok()?;
    let current: Option<u32> = current_text.parse().ok();

    if let Some(current) = current {
        let ratio = StackRatio { current, maximum };
        if ratio.is_valid() {
            return Some(ratio);
        }
    }

    if maximum == MAX_STACK {
        let last_digit = current_text.chars().next_back()?.to_digit(10)?;
        let ratio = StackRatio {
            current: last_digit,
            maximum,
        };
        if ratio.is_valid() {
            log::debug!(
                "Repaired stack ratio {}/{} to {}/{}",
                current_text,
                maximum_text,
                ratio.current,
                ratio.maximum
            );
            return Some(ratio);
        }
    }

    None
}

/// Scans the line containing `term` and the next two lines for a ratio.
///
/// Only the first `digits/digits` pattern in that window is considered.
pub fn scan_ratio(text: &str, term: &str) -> RatioScan {
    let target = smart_title_case(term);
    let lines: Vec<&str> = text.lines().collect();

    let Some(start) = lines
        .iter()
        .position(|line| smart_title_case(line).contains(&target))
    else {
        return RatioScan::NotFound;
    };

    for line in lines[start..].iter().take(RATIO_LINE_WINDOW + 1) {
        if let Some(caps) = RATIO_PATTERN.captures(line) {
            return match repair_ratio(&caps[1], &caps[2]) {
                Some(ratio) => RatioScan::Found(ratio),
                None => {
                    log::debug!("Invalid stack ratio '{}' near '{}'", &caps[0], target);
                    RatioScan::Invalid
                }
            };
        }
    }

    RatioScan::NotFound
}

/// Stack ratio for a matched term of a known category.
///
/// Non-stackable categories yield `None`. A missing pattern yields
/// `StackRatio::FALLBACK`; an unrepairable one yields `None`.
pub fn ratio_for(text: &str, term: &str, category: Category) -> Option<StackRatio> {
    if !category.has_stack_size() {
        return None;
    }
    scan_ratio(text, term).resolve()
}

/// Stack ratio for a matched term, looking its category up in `dictionary`.
pub fn extract_ratio(text: &str, term: &str, dictionary: &TermDictionary) -> Option<StackRatio> {
    let category = dictionary.category(&smart_title_case(term))?;
    ratio_for(text, term, category)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn currency_dictionary() -> TermDictionary {
        let mut dict = TermDictionary::new();
        dict.insert("Chaos Orb", Category::Currency, false);
        dict.insert("Gilded Scarab", Category::Scarab, false);
        dict.insert("Thief's Trinket", Category::Trinket, false);
        dict
    }

    fn ratio(current: u32, maximum: u32) -> StackRatio {
        StackRatio { current, maximum }
    }

    #[test]
    fn test_valid_ratio() {
        let dict = currency_dictionary();
        assert_eq!(
            extract_ratio("Chaos Orb\n19/20", "Chaos Orb", &dict),
            Some(ratio(19, 20))
        );
        assert_eq!(
            extract_ratio("Gilded Scarab 3 / 10", "Gilded Scarab", &dict),
            Some(ratio(3, 10))
        );
    }

    #[test]
    fn test_stray_leading_digit_repaired() {
        let dict = currency_dictionary();
        assert_eq!(
            extract_ratio("Chaos Orb\n419/20", "Chaos Orb", &dict),
            Some(ratio(9, 20))
        );
    }

    #[test]
    fn test_invalid_ratio_is_none() {
        let dict = currency_dictionary();
        assert_eq!(extract_ratio("Chaos Orb\n25/30", "Chaos Orb", &dict), None);
        assert_eq!(
            scan_ratio("Chaos Orb\n25/30", "Chaos Orb"),
            RatioScan::Invalid
        );
        assert_eq!(
            extract_ratio("Chaos Orb\n10/20", "Chaos Orb", &dict),
            Some(ratio(10, 20))
        );
        // "30" repairs to a zero count
        assert_eq!(extract_ratio("Chaos Orb\n30/20", "Chaos Orb", &dict), None);
    }

    #[test]
    fn test_missing_ratio_falls_back() {
        let dict = currency_dictionary();
        assert_eq!(
            extract_ratio("Chaos Orb\nsome text\nmore text", "Chaos Orb", &dict),
            Some(StackRatio::FALLBACK)
        );
        assert_eq!(StackRatio::FALLBACK, ratio(1, 20));
    }

    #[test]
    fn test_ratio_outside_window_ignored() {
        let dict = currency_dictionary();
        assert_eq!(
            extract_ratio("Chaos Orb\na\nb\n7/20", "Chaos Orb", &dict),
            Some(StackRatio::FALLBACK)
        );
    }

    #[test]
    fn test_ratio_before_term_ignored() {
        let dict = currency_dictionary();
        assert_eq!(
            extract_ratio("7/20\nChaos Orb", "Chaos Orb", &dict),
            Some(StackRatio::FALLBACK)
        );
    }

    #[test]
    fn test_term_line_matched_case_insensitively() {
        let dict = currency_dictionary();
        assert_eq!(
            extract_ratio("CHAOS ORB 4/20", "chaos orb", &dict),
            Some(ratio(4, 20))
        );
    }

    #[test]
    fn test_non_stackable_category() {
        let dict = currency_dictionary();
        assert_eq!(
            extract_ratio("Thief's Trinket\n5/20", "Thief's Trinket", &dict),
            None
        );
        assert_eq!(extract_ratio("Unknown\n5/20", "Unknown", &dict), None);
    }

    #[test]
    fn test_huge_number_is_invalid() {
        assert_eq!(
            scan_ratio("Chaos Orb 99999999999999/30", "Chaos Orb"),
            RatioScan::Invalid
        );
    }
}
