//! Text normalization and placeholder detection for raw administrative values.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Placeholder phrases that stand in for "no value" in the source tables,
/// compared after [`normalize_text`].
const PLACEHOLDER_PHRASES: &[&str] = &[
    "invalid",
    "nao informado",
    "nao informada",
    "instituicao nao cadastrada",
    "nao consta",
    "outra",
    "outro",
    "ni",
];

/// Markers spreadsheets and dataframe exports use for an empty cell.
const MISSING_MARKERS: &[&str] = &["nan", "none", "null", "<na>"];

/// Lowercases `raw`, strips diacritics and punctuation, and collapses
/// whitespace.
///
/// Characters outside `[-0-9a-z.]` and whitespace become spaces; `-` and `.`
/// are removed outright so abbreviations such as `U.F.X.` and `U-FX` meet.
///
/// # Examples
/// ```
/// use lineage_core::normalize_text;
///
/// assert_eq!(normalize_text("  José  da Silva-Ñunes "), "jose da silvanunes");
/// assert_eq!(normalize_text("U.F.R.J."), "ufrj");
/// assert_eq!(normalize_text("São Paulo/SP"), "sao paulo sp");
/// ```
#[must_use]
pub fn normalize_text(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut cleaned = String::with_capacity(lowered.len());
    for ch in lowered.nfd().filter(|ch| !is_combining_mark(*ch)) {
        match ch {
            '-' | '.' => {}
            'a'..='z' | '0'..='9' => cleaned.push(ch),
            _ => cleaned.push(' '),
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns `true` when `raw` is empty or one of the missing-cell markers.
///
/// # Examples
/// ```
/// use lineage_core::is_missing_marker;
///
/// assert!(is_missing_marker(" NaN "));
/// assert!(is_missing_marker(""));
/// assert!(!is_missing_marker("1980"));
/// ```
#[must_use]
pub fn is_missing_marker(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty()
        || MISSING_MARKERS
            .iter()
            .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

/// Returns `true` when `raw` is a missing marker or, once normalized, one of
/// the placeholder phrases (the `invalid` sentinel included).
///
/// Unlike [`is_valid_value`] this accepts numeric strings, so it suits
/// document numbers and years.
///
/// # Examples
/// ```
/// use lineage_core::is_placeholder;
///
/// assert!(is_placeholder("INVALID"));
/// assert!(is_placeholder(" Não informado "));
/// assert!(is_placeholder("null"));
/// assert!(!is_placeholder("1970"));
/// ```
#[must_use]
pub fn is_placeholder(raw: &str) -> bool {
    is_missing_marker(raw) || PLACEHOLDER_PHRASES.contains(&normalize_text(raw).as_str())
}

/// Returns `true` when an already normalized value carries information.
///
/// Rejects missing markers, known placeholder phrases, single letters or
/// digits, runs of one repeated character, purely numeric strings, and
/// strings with no alphanumeric characters.
///
/// # Examples
/// ```
/// use lineage_core::is_valid_value;
///
/// assert!(is_valid_value("ufrj"));
/// assert!(!is_valid_value("nao informado"));
/// assert!(!is_valid_value("xxx"));
/// assert!(!is_valid_value("12345"));
/// assert!(!is_valid_value("--"));
/// ```
#[must_use]
pub fn is_valid_value(value: &str) -> bool {
    if is_missing_marker(value) || PLACEHOLDER_PHRASES.contains(&value) {
        return false;
    }
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if chars.clone().next().is_none() && first.is_ascii_alphanumeric() {
        return false;
    }
    if chars.all(|ch| ch == first) {
        return false;
    }
    if value.chars().all(|ch| ch.is_ascii_digit()) {
        return false;
    }
    value
        .chars()
        .any(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
}
