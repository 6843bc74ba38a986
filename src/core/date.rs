//! Date parsing for filter literals
//!
//! Accepted textual forms, tried in order:
//! - RFC 3339 (`2024-03-01T10:30:00Z`, `2024-03-01T10:30:00.250+02:00`)
//! - `yyyy-MM-dd'T'HH:mm:ss` (interpreted as UTC)
//! - `yyyy-MM-dd` (midnight UTC)

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Date only format
pub const FORMAT_YMD: &str = "%Y-%m-%d";

/// Date and time format without offset
pub const FORMAT_YMDHMS: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a date literal, returning `None` when no supported format matches.
pub fn parse(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(text, FORMAT_YMDHMS) {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(text, FORMAT_YMD)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Interpret an integer literal as milliseconds since the Unix epoch.
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Canonical textual form, accepted back by [`parse`] without loss.
pub fn format(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Fixed-width UTC form with nanosecond digits; text order is time order
pub fn format_fixed(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
