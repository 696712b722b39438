//! Conversion of captured substrings into typed values.
//!
//! None of these functions fail loudly: a value that cannot be converted is
//! reported as `None` and the caller leaves the property out.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::level::LogLevel;
use crate::grok::Semantic;

/// Seconds between 1601-01-01 and 1970-01-01
const FILE_TIME_EPOCH_OFFSET: i64 = 11_644_473_600;
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Layouts without an offset, read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S,%3f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S,%3f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S,%3f%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%d/%b/%Y:%H:%M:%S%#z",
    "%d/%b/%Y:%H:%M:%S %#z",
];

/// Tried after the exact layouts and RFC 3339 / RFC 2822
const FALLBACK_NAIVE_FORMATS: &[&str] = &[
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S",
    "%b %d %Y %H:%M:%S",
];

/// Windows file time: 100 ns ticks since 1601-01-01 UTC
pub fn to_file_time(timestamp: DateTime<Utc>) -> i64 {
    timestamp
        .timestamp()
        .saturating_add(FILE_TIME_EPOCH_OFFSET)
        .saturating_mul(TICKS_PER_SECOND)
        .saturating_add(i64::from(timestamp.timestamp_subsec_nanos() / 100))
}

pub fn from_file_time(ticks: i64) -> Option<DateTime<Utc>> {
    let seconds = ticks.div_euclid(TICKS_PER_SECOND) - FILE_TIME_EPOCH_OFFSET;
    let nanos = ticks.rem_euclid(TICKS_PER_SECOND) * 100;
    DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
}

/// Parse a timestamp using the known log layouts first, then the general ones
pub fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let naive = |formats: &[&str]| {
        formats
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
            .map(|dt| dt.and_utc())
    };

    naive(NAIVE_FORMATS)
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|f| DateTime::parse_from_str(text, f).ok())
                .map(|dt| dt.with_timezone(&Utc))
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .or_else(|_| DateTime::parse_from_rfc2822(text))
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
        .or_else(|| naive(FALLBACK_NAIVE_FORMATS))
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

pub fn cast_integer(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

pub fn cast_datetime(raw: &str) -> Option<i64> {
    parse_datetime(raw).map(to_file_time)
}

/// Resolve a severity from captured text.
///
/// With custom rules the first rule whose pattern occurs in `raw` wins and
/// the `*` rule is the fallback. Otherwise `raw` is looked up in the level
/// vocabulary.
pub fn cast_level(raw: &str, semantic: &Semantic, default_level: LogLevel) -> LogLevel {
    if !semantic.has_custom_rules() {
        return LogLevel::from_vocabulary(raw).unwrap_or(default_level);
    }

    semantic
        .rules
        .iter()
        .filter(|rule| !rule.is_default())
        .find(|rule| raw.contains(rule.pattern.as_str()))
        .or_else(|| semantic.default_rule())
        .and_then(|rule| rule.level)
        .unwrap_or(default_level)
}
