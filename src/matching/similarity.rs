//! Pluggable string similarity used by every fuzzy comparison.

use serde::{Deserialize, Serialize};
use similar::TextDiff;

/// A similarity score between two strings in `0.0..=1.0`.
pub trait Similarity: Send + Sync {
    fn ratio(&self, a: &str, b: &str) -> f64;
}

/// Sequence-matching ratio: `2 * matched_chars / (len(a) + len(b))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRatio;

impl Similarity for SequenceRatio {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        if a.is_empty() && b.is_empty() {
            return 1.0;
        }
        f64::from(TextDiff::from_chars(a, b).ratio())
    }
}

/// Levenshtein distance scaled to `0.0..=1.0` by the longer string.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedLevenshtein;

impl Similarity for NormalizedLevenshtein {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b)
    }
}

/// Similarity algorithm selectable from the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityKind {
    #[default]
    Sequence,
    Levenshtein,
}

impl SimilarityKind {
    pub fn build(self) -> Box<dyn Similarity> {
        match self {
            Self::Sequence => Box::new(SequenceRatio),
            Self::Levenshtein => Box::new(NormalizedLevenshtein),
        }
    }
}

/// Best-scoring candidate at or above `cutoff`. Ties keep the earliest candidate.
pub fn best_match<'a, I>(
    similarity: &dyn Similarity,
    target: &str,
    candidates: I,
    cutoff: f64,
) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, f64)> = None;
    for candidate in candidates {
        let score = similarity.ratio(target, candidate);
        if score >= cutoff && best.is_none_or(|(_, s)| score > s) {
            best = Some((candidate, score));
        }
    }
    best
}
