use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Words with an optional possessive suffix. Case-insensitive so that
/// OCR output like "THIEF'S" keeps the "'S" attached to its word.
static TITLE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\w+'?s?").expect("title word pattern is valid"));

/// Everything outside word characters, whitespace, `%`, `'` and `;`.
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s%';]").expect("disallowed pattern is valid"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Word-like tokens, apostrophes included ("thief's").
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w']+").expect("token pattern is valid"));

/// Returns true for apostrophe look-alikes OCR tends to produce.
fn is_apostrophe_variant(c: char) -> bool {
    matches!(
        c,
        '\u{2019}' // right single quotation mark ’
            | '\u{2018}' // left single quotation mark ‘
            | '`'
            | '\u{00B4}' // acute accent ´
            | '\u{02BC}' // modifier letter apostrophe ʼ
            | '\u{2032}' // prime ′
    )
}

/// Returns true for characters replaced by a space before search normalization.
fn is_search_separator(c: char) -> bool {
    matches!(
        c,
        '\u{2014}' // em-dash —
            | '\u{2013}' // en-dash –
            | '\u{2018}'
            | '\u{2019}'
            | '\u{201C}' // left double quotation mark “
            | '\u{201D}' // right double quotation mark ”
    )
}

/// Approximation of the regex `\w` class for a single character.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Replaces curly/backtick apostrophe variants with a straight `'`.
pub fn canonicalize_apostrophes(text: &str) -> String {
    text.chars()
        .map(|c| if is_apostrophe_variant(c) { '\'' } else { c })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Title-cases every word while keeping possessive suffixes lowercase.
///
/// "GUNSLINGER'S BOOTS" becomes "Gunslinger's Boots". Apostrophe variants
/// are canonicalized first so "Thief’s" and "Thief's" produce the same key.
pub fn smart_title_case(text: &str) -> String {
    let text = canonicalize_apostrophes(text);
    TITLE_WORD
        .replace_all(&text, |caps: &Captures| capitalize(&caps[0]))
        .into_owned()
}

/// Produces the lowercase search form of `text`.
///
/// Dashes and curly quotes become spaces, anything but word characters,
/// whitespace, `%`, `'` and `;` is dropped, and whitespace runs collapse
/// to a single space. Idempotent.
pub fn normalize_for_search(text: &str) -> String {
    let spaced: String = text
        .chars()
        .map(|c| if is_search_separator(c) { ' ' } else { c })
        .collect();
    let lowered = spaced.to_lowercase();
    let stripped = DISALLOWED.replace_all(&lowered, "");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

/// Converts a byte index into `text` to a character offset.
pub fn char_offset(text: &str, byte_idx: usize) -> usize {
    text.get(..byte_idx)
        .map(|prefix| prefix.chars().count())
        .unwrap_or_else(|| text.chars().count())
}

/// Splits text into word-like tokens with their starting byte index.
pub fn word_tokens(text: &str) -> Vec<(usize, &str)> {
    TOKEN
        .find_iter(text)
        .map(|m| (m.start(), m.as_str()))
        .collect()
}

/// Finds the first whole-word occurrence of `needle`, returning its byte index.
///
/// Boundaries are only enforced on edges where the needle itself starts or
/// ends with a word character, mirroring how `\b` behaves around a term.
pub fn find_whole_word(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let check_start = needle.chars().next().is_some_and(is_word_char);
    let check_end = needle.chars().next_back().is_some_and(is_word_char);

    haystack.match_indices(needle).map(|(idx, _)| idx).find(|&idx| {
        let before_ok = !check_start
            || !haystack[..idx].chars().next_back().is_some_and(is_word_char);
        let after_ok = !check_end
            || !haystack[idx + needle.len()..]
                .chars()
                .next()
                .is_some_and(is_word_char);
        before_ok && after_ok
    })
}
