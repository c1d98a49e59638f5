use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

/// Local wall-clock form shared with the backend; no zone suffix.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M";
pub const DEFAULT_TIME: &str = "00:00";

const PARSE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

pub fn minimal_duration(all_day: bool) -> Duration {
    if all_day {
        Duration::days(1)
    } else {
        Duration::minutes(15)
    }
}

pub fn format_local(value: NaiveDateTime) -> String {
    value.format(CANONICAL_FORMAT).to_string()
}

pub fn to_local(instant: DateTime<Utc>, time_zone: Tz) -> NaiveDateTime {
    instant.with_timezone(&time_zone).naive_local()
}

pub fn to_local_canonical(instant: DateTime<Utc>, time_zone: Tz) -> String {
    format_local(to_local(instant, time_zone))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let head = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Parses a date or date-time string into a naive local date-time.
///
/// A bare date gets midnight appended, a space separator is accepted in place
/// of `T`, and a zone suffix is dropped after converting to that zone's wall
/// clock.
pub fn parse_local(value: &str) -> Option<NaiveDateTime> {
    let mut normalized = value.trim().replace(' ', "T");
    if normalized.is_empty() {
        return None;
    }
    if !normalized.contains('T') {
        normalized = format!("{normalized}T{DEFAULT_TIME}");
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(parsed.naive_local());
    }
    if let Some(stripped) = normalized.strip_suffix('Z') {
        normalized = stripped.to_string();
    }
    PARSE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&normalized, format).ok())
}

/// Joins a `YYYY-MM-DD` date and an optional `HH:MM` time, defaulting to midnight.
pub fn combine(date: &str, time: Option<&str>) -> Option<NaiveDateTime> {
    let date = parse_date(date)?;
    let time = match time.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_time(value)?,
        None => NaiveTime::MIN,
    };
    Some(date.and_time(time))
}

/// Splits a wire date-time into the `YYYY-MM-DD` and `HH:MM` parts.
pub fn split_date_time(value: &str) -> Option<(String, Option<String>)> {
    let parsed = parse_local(value)?;
    let date = parsed.date().format("%Y-%m-%d").to_string();
    let has_time = value.trim().replace(' ', "T").contains('T');
    let time = has_time.then(|| parsed.time().format("%H:%M").to_string());
    Some((date, time))
}

/// Returns `(start, end)` with `end` strictly after `start`; a missing or
/// non-increasing end becomes `start + minimal_duration(all_day)`.
pub fn normalize_window(
    start: NaiveDateTime,
    end: Option<NaiveDateTime>,
    all_day: bool,
) -> (NaiveDateTime, NaiveDateTime) {
    match end {
        Some(end) if end > start => (start, end),
        _ => (start, start + minimal_duration(all_day)),
    }
}
