use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// The only timestamp layout accepted from the GitHub API, e.g. `2024-01-01T00:00:00Z`.
pub const GITHUB_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse a `YYYY-MM-DDTHH:MM:SSZ` timestamp as UTC.
///
/// Offsets and fractional seconds are rejected.
pub fn parse_github_timestamp(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, GITHUB_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Elapsed hours between two timestamps, fractional.
pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_seconds() as f64 / 3600.0
}

/// Hours from `start` to `end` when both parse; `None` otherwise.
pub fn elapsed_hours(start: &str, end: &str) -> Option<f64> {
    let start = parse_github_timestamp(start)?;
    let end = parse_github_timestamp(end)?;
    Some(hours_between(start, end))
}

/// Round to two decimal places, exact halves to the even digit.
///
/// Works on the exact binary value of `value`, so `3.125` becomes `3.12`
/// while `2.675` (stored as `2.67499...`) becomes `2.67`.
pub fn round2(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp(2))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}
