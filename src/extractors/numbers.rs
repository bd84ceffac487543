// src/extractors/numbers.rs
//! Integer recognition for loosely formatted page text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Digits with optional comma thousands separators ("412,658", "12").
pub const INTEGER_PATTERN: &str = r"\d{1,3}(?:,\d{3})+|\d+";

static INTEGER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(INTEGER_PATTERN).expect("Failed to compile INTEGER_RE")
});

static BARE_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:19|20)\d{2}$").expect("Failed to compile BARE_YEAR_RE")
});

/// Converts one matched digit substring, dropping separators.
/// Returns `None` when nothing is left or the value overflows.
pub fn parse_token(token: &str) -> Option<u64> {
    let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// First integer found in `text`.
pub fn first_integer(text: &str) -> Option<u64> {
    INTEGER_RE.find(text).and_then(|m| parse_token(m.as_str()))
}

/// Every integer token in `text`, in order.
pub fn integer_tokens(text: &str) -> impl Iterator<Item = &str> {
    INTEGER_RE.find_iter(text).map(|m| m.as_str())
}

/// Four plain digits between 1900 and 2099 ("2024", not "2,024").
pub fn is_bare_year(token: &str) -> bool {
    BARE_YEAR_RE.is_match(token)
}

/// Integers in `text`, skipping tokens that look like a year.
pub fn integers_excluding_years(text: &str) -> Vec<u64> {
    integer_tokens(text)
        .filter(|t| {
            let year = is_bare_year(t);
            if year {
                tracing::trace!("Dropping year-like token '{}'", t);
            }
            !year
        })
        .filter_map(parse_token)
        .collect()
}
