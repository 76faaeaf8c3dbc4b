//! Term matching against noisy OCR text.
//!
//! This module provides:
//! - Exact, fuzzy and combo term matching with combo suppression
//! - Stack ratio extraction with OCR digit repair
//! - Armor/weapon enchant disambiguation
//! - The pluggable similarity function behind all fuzzy comparisons

pub mod enchant;
pub mod matcher;
pub mod ratio;
pub mod similarity;

pub use enchant::{locate_body_armor, resolve_enchant_side, EnchantSide};
pub use matcher::{
    match_terms, suppress_subsumed, MatchCandidate, MatchKind, TermMatch, TermMatcher,
};
pub use ratio::{extract_ratio, ratio_for, scan_ratio, RatioScan, StackRatio};
pub use similarity::{NormalizedLevenshtein, SequenceRatio, Similarity, SimilarityKind};
