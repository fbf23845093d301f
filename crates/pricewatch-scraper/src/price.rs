//! Locale-agnostic price text parsing.
//!
//! Handles Czech (`1 234,56 Kč`, `1 299,-`), Polish (`99,99 zł`) and
//! plain (`1234.56 CZK`) formats. The parser never fails: unparseable input
//! yields `None`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static CURRENCY_TOKENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)kč|czk|zł|pln|€|eur|usd|\$").expect("valid currency regex"));

/// A 1-3 digit group followed by space-separated three-digit groups, ending
/// at a non-digit. Only horizontal whitespace counts as a separator.
static SPACED_THOUSANDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([0-9]{1,3}(?:[^\S\r\n][0-9]{3})+)([^0-9]|$)").expect("valid spaced thousands regex")
});

static NUMERIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9][0-9.,]*").expect("valid numeric run regex"));

static CANONICAL_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number regex"));

/// Parses a displayed price into a number.
///
/// Currency symbols and ISO codes and the Czech `,-` suffix are stripped.
/// Whitespace (including non-breaking and narrow spaces) is dropped only
/// where it separates thousands groups, so `1 299 Kč 1 599 Kč` stays two
/// amounts. The first numeric run is then normalized to `digits(.digits)?`.
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    let grouped = join_thousands_groups(text);
    let without_suffix = grouped.replace(",-", "").replace(",–", "");
    let without_currency = CURRENCY_TOKENS.replace_all(&without_suffix, "");

    let run = NUMERIC_RUN.find(&without_currency)?.as_str();
    let canonical = canonicalize(run.trim_end_matches(['.', ',']));

    CANONICAL_NUMBER
        .find(&canonical)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Removes the spaces inside thousands-grouped numbers (`1 234 567`).
fn join_thousands_groups(text: &str) -> Cow<'_, str> {
    SPACED_THOUSANDS.replace_all(text, |caps: &Captures<'_>| {
        let digits: String = caps[1].chars().filter(char::is_ascii_digit).collect();
        format!("{digits}{}", &caps[2])
    })
}

/// Rewrites a run of digits and separators so that at most one `.` remains,
/// acting as the decimal point.
fn canonicalize(run: &str) -> String {
    let last_dot = run.rfind('.');
    let last_comma = run.rfind(',');

    let decimal_at = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => Some(dot.max(comma)),
        (None, Some(comma)) => Some(comma),
        (Some(dot), None) => {
            if dot_is_decimal(run, dot) {
                Some(dot)
            } else {
                None
            }
        }
        (None, None) => None,
    };

    run.char_indices()
        .filter_map(|(i, c)| match c {
            '.' | ',' if Some(i) == decimal_at => Some('.'),
            '.' | ',' => None,
            digit => Some(digit),
        })
        .collect()
}

/// A lone dot followed by exactly three digits after a short integer part
/// (`1.299`, `12.500`) is a thousands separator. Several dots are always
/// thousands separators.
fn dot_is_decimal(run: &str, dot: usize) -> bool {
    if run.matches('.').count() > 1 {
        return false;
    }
    let integer_len = dot;
    let fraction_len = run.len() - dot - 1;
    !(fraction_len == 3 && (1..=3).contains(&integer_len))
}
