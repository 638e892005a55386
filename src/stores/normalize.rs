//! Text normalization shared by the listing parsers
//!
//! Chilean stores print prices with `.` as the thousands separator
//! ("$9.000", "$4.000 – $12.000") and titles with edition notes in
//! parentheses or after a spaced dash.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

fn price_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\d.,]+").expect("valid regex"))
}

fn foil_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bfoil\b").expect("valid regex"))
}

fn parenthesized() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\([^)]*\)").expect("valid regex"))
}

fn spaced_dash() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+[–-]\s+").expect("valid regex"))
}

/// Returns the lowest integer price found in a price label
///
/// `.` and `,` are treated as thousands separators, so "$4.000 – $12.000"
/// yields 4000. Returns None when no number is present.
///
/// # Examples
///
/// ```
/// use singles_scout::stores::normalize::extract_lowest_price;
///
/// assert_eq!(extract_lowest_price("$4.000 – $12.000"), Some(4000));
/// assert_eq!(extract_lowest_price("Agotado"), None);
/// ```
pub fn extract_lowest_price(text: &str) -> Option<u64> {
    price_runs()
        .find_iter(text)
        .filter_map(|m| {
            let digits: String = m.as_str().chars().filter(char::is_ascii_digit).collect();
            digits.parse::<u64>().ok()
        })
        .min()
}

/// Folds accented characters to ASCII and drops anything that has no ASCII form
pub fn fold_ascii(text: &str) -> String {
    text.nfkd().filter(char::is_ascii).collect()
}

/// Collapses runs of whitespace into single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleans a product title into a card name and a foil flag
///
/// - foil: the word "foil" anywhere, case-insensitive
/// - parenthesized notes are removed
/// - only the part before a spaced dash (" - " or " – ") is kept
/// - accents are folded and whitespace collapsed
///
/// # Examples
///
/// ```
/// use singles_scout::stores::normalize::clean_card_name;
///
/// let (name, foil) = clean_card_name("Lórien Revealed (Foil) – LTR #60");
/// assert_eq!(name, "Lorien Revealed");
/// assert!(foil);
/// ```
pub fn clean_card_name(title: &str) -> (String, bool) {
    let foil = foil_word().is_match(title);
    let without_notes = parenthesized().replace_all(title, "");
    let head = spaced_dash()
        .split(&without_notes)
        .next()
        .unwrap_or_default();

    (collapse_whitespace(&fold_ascii(head)), foil)
}
