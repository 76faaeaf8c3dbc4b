//! Decides whether an enchant applies to body armor or to a weapon.
//!
//! Type evidence from the dictionary wins. When the evidence is missing or
//! mixed, the enchant is placed on armor only if its text follows a
//! body-armor name closely; otherwise it defaults to weapon.

use std::collections::HashSet;

use super::similarity::Similarity;
use crate::dictionary::{base_phrase, BodyArmorList, Category, TypeLookup};
use crate::text::{char_offset, find_whole_word, normalize_for_search, word_tokens};

/// Largest distance (in characters) from an armor name to its enchant text.
pub const ARMOR_PROXIMITY_WINDOW: usize = 200;

const SINGLE_WORD_ARMOR_CUTOFF: f64 = 0.8;
const MULTI_WORD_ARMOR_CUTOFF: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnchantSide {
    Armor,
    Weapon,
}

impl EnchantSide {
    pub fn category(self) -> Category {
        match self {
            EnchantSide::Armor => Category::ArmorEnchant,
            EnchantSide::Weapon => Category::WeaponEnchant,
        }
    }
}

/// Side implied by the categories a phrase was tagged with, if unanimous.
fn side_from_evidence(categories: &HashSet<Category>) -> Option<EnchantSide> {
    if categories.is_empty() {
        return None;
    }
    if categories.iter().all(|&c| c == Category::ArmorEnchant) {
        Some(EnchantSide::Armor)
    } else if categories.iter().all(|&c| c == Category::WeaponEnchant) {
        Some(EnchantSide::Weapon)
    } else {
        None
    }
}

fn exact_armor_position<'a>(
    normalized_text: &str,
    armor_names: impl Iterator<Item = &'a str>,
) -> Option<usize> {
    armor_names
        .filter_map(|name| find_whole_word(normalized_text, &normalize_for_search(name)))
        .min()
        .map(|byte_idx| char_offset(normalized_text, byte_idx))
}

fn fuzzy_armor_position<'a>(
    normalized_text: &str,
    armor_names: impl Iterator<Item = &'a str>,
    similarity: &dyn Similarity,
) -> Option<usize> {
    let tokens = word_tokens(normalized_text);
    let mut earliest: Option<usize> = None;

    for name in armor_names {
        let normalized = normalize_for_search(name);
        let parts: Vec<&str> = normalized.split_whitespace().collect();

        let found = match parts.len() {
            0 => None,
            1 => tokens
                .iter()
                .find(|(_, token)| similarity.ratio(parts[0], token) >= SINGLE_WORD_ARMOR_CUTOFF)
                .map(|(idx, _)| *idx),
            n => tokens
                .windows(n)
                .find(|window| {
                    window.iter().zip(&parts).all(|((_, token), part)| {
                        similarity.ratio(part, token) >= MULTI_WORD_ARMOR_CUTOFF
                    })
                })
                .map(|window| window[0].0),
        };

        if let Some(idx) = found {
            earliest = Some(earliest.map_or(idx, |e| e.min(idx)));
        }
    }

    earliest.map(|byte_idx| char_offset(normalized_text, byte_idx))
}

/// Character offset of the first body-armor name in already-normalized text.
///
/// Exact whole-word matches are tried first; fuzzy token matching is only
/// used when no name appears verbatim.
pub fn locate_body_armor(
    normalized_text: &str,
    body_armors: &BodyArmorList,
    similarity: &dyn Similarity,
) -> Option<usize> {
    exact_armor_position(normalized_text, body_armors.iter())
        .or_else(|| fuzzy_armor_position(normalized_text, body_armors.iter(), similarity))
}

/// Resolves an enchant term to its armor or weapon side.
pub fn resolve_enchant_side(
    term: &str,
    text: &str,
    body_armors: &BodyArmorList,
    type_lookup: &TypeLookup,
    similarity: &dyn Similarity,
) -> EnchantSide {
    let phrase = base_phrase(term);

    if let Some(side) = type_lookup.categories(&phrase).and_then(side_from_evidence) {
        log::debug!("Enchant '{}' resolved to {:?} by type evidence", term, side);
        return side;
    }

    let normalized = normalize_for_search(text);
    let armor_pos = locate_body_armor(&normalized, body_armors, similarity);
    let enchant_pos = if phrase.is_empty() {
        None
    } else {
        normalized
            .find(&phrase)
            .map(|byte_idx| char_offset(&normalized, byte_idx))
    };

    let side = match (armor_pos, enchant_pos) {
        (Some(armor), Some(enchant))
            if enchant >= armor && enchant - armor <= ARMOR_PROXIMITY_WINDOW =>
        {
            EnchantSide::Armor
        }
        _ => EnchantSide::Weapon,
    };
    log::debug!(
        "Enchant '{}' resolved to {:?} by proximity (armor at {:?}, enchant at {:?})",
        term,
        side,
        armor_pos,
        enchant_pos
    );
    side
}
