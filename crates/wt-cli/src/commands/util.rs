//! Shared utilities for CLI commands.

use std::fmt;
use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use regex::Regex;
use wt_core::Calendar;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Parse a datetime string as ISO 8601, a local date, or relative time.
///
/// Supports:
/// - ISO 8601: "2026-01-15T10:30:00Z"
/// - Local date: "2026-01-15" (local midnight)
/// - Keywords: "now", "today", "yesterday"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime<Tz: TimeZone>(
    s: &str,
    calendar: &Calendar<Tz>,
    now: DateTime<Utc>,
) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return calendar
            .midnight(date)
            .with_context(|| format!("no local midnight on {date}"));
    }

    match s {
        "now" => return Ok(now),
        "today" => {
            return calendar
                .start_of_day(now)
                .context("could not resolve start of today");
        }
        "yesterday" => {
            return calendar
                .start_of_day(now - Duration::days(1))
                .context("could not resolve start of yesterday");
        }
        _ => {}
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z), a date (2026-01-15) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Formats an instant as local wall-clock time, e.g. `09:30`.
pub fn local_time<Tz>(calendar: &Calendar<Tz>, at: DateTime<Utc>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    at.with_timezone(calendar.timezone())
        .format("%H:%M")
        .to_string()
}

/// Formats an instant as local date and time, e.g. `2025-01-29 09:30`.
pub fn local_datetime<Tz>(calendar: &Calendar<Tz>, at: DateTime<Utc>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    at.with_timezone(calendar.timezone())
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// First eight characters of an ID, for compact listings.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
