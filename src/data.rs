//! Token-level recognisers shared by type inference and SQL value coding.
//!
//! Patterns are ASCII-only (`[0-9]`, not Unicode `\d`) so that the inferred
//! type of a column and the literal check applied at emission time always agree.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

static INTEGER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("valid integer pattern"));
static DECIMAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]+)?|\.[0-9]+)$").expect("valid decimal pattern")
});
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date pattern"));
static DATETIME_PREFIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}[T\s][0-9]{2}:[0-9]{2}(?::[0-9]{2})?")
        .expect("valid datetime pattern")
});
static DATETIME_PARTS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2})[T\s]([0-9]{2}:[0-9]{2}(?::[0-9]{2})?)(.*)$")
        .expect("valid datetime parts pattern")
});
static DATETIME_SUFFIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\.[0-9]+)?(?:Z|[+-][0-9]{2}:?[0-9]{2})?$").expect("valid suffix pattern")
});

const TRUTHY_TOKENS: &[&str] = &["true", "t", "yes", "y", "1"];
const FALSEY_TOKENS: &[&str] = &["false", "f", "no", "n", "0"];

pub fn is_integer_token(value: &str) -> bool {
    INTEGER_PATTERN.is_match(value)
}

pub fn is_decimal_token(value: &str) -> bool {
    DECIMAL_PATTERN.is_match(value)
}

/// Maps a truthy/falsey token (case-insensitive, surrounding whitespace ignored).
pub fn parse_boolean_token(value: &str) -> Option<bool> {
    let lowered = value.trim().to_lowercase();
    if TRUTHY_TOKENS.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSEY_TOKENS.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// `YYYY-MM-DD` shape only; the calendar is not consulted.
pub fn is_date_shape(value: &str) -> bool {
    DATE_PATTERN.is_match(value)
}

/// `YYYY-MM-DD[T ]HH:MM[:SS]` prefix shape only.
pub fn has_datetime_shape(value: &str) -> bool {
    DATETIME_PREFIX_PATTERN.is_match(value)
}

pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    if !is_date_shape(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parses a date-time with an optional fractional second and `Z`/offset suffix.
///
/// The suffix is validated but discarded.
pub fn parse_calendar_datetime(value: &str) -> Option<NaiveDateTime> {
    let captures = DATETIME_PARTS_PATTERN.captures(value)?;
    let suffix = captures.get(3).map_or("", |m| m.as_str());
    if !DATETIME_SUFFIX_PATTERN.is_match(suffix) {
        return None;
    }
    let date = NaiveDate::parse_from_str(&captures[1], "%Y-%m-%d").ok()?;
    let clock = &captures[2];
    let time = if clock.len() > 5 {
        NaiveTime::parse_from_str(clock, "%H:%M:%S").ok()?
    } else {
        NaiveTime::parse_from_str(clock, "%H:%M").ok()?
    };
    Some(NaiveDateTime::new(date, time))
}

/// Drops trailing fractional zeros (and a dangling point) from a decimal token.
pub fn canonical_decimal(value: &str) -> &str {
    if !value.contains('.') {
        return value;
    }
    let trimmed = value.trim_end_matches('0');
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    match trimmed {
        "" | "+" | "-" => "0",
        other => other,
    }
}
