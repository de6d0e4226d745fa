// File: ./src/model/normalize.rs
//! Case and accent folding for phrase matching and date parsing.
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lowercases, strips diacritics and collapses whitespace.
///
/// "Você  CONCORDOU" and "voce concordou" both become "voce concordou".
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    collapse_whitespace(&folded)
}

/// Joins whitespace runs into single spaces and trims both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Accent/case-insensitive containment check.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    normalize(haystack).contains(&normalize(phrase))
}
