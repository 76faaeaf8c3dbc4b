//! Text normalization helpers shared by the dictionary, matcher and log.
//!
//! Two transforms are provided:
//! - `smart_title_case` produces display-ready canonical names
//! - `normalize_for_search` produces the lowercase, punctuation-stripped
//!   form used for every positional search (never for display)

pub mod fields;
pub mod normalize;

pub use fields::{escape_field, split_fields};
pub use normalize::{
    canonicalize_apostrophes, char_offset, find_whole_word, is_word_char, normalize_for_search,
    smart_title_case, word_tokens,
};
