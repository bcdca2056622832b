//! Status command for showing running projects and current totals.

use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use wt_core::{Component, Interval, format_duration, format_percentage};

use super::SqliteTracker;
use super::util::{local_datetime, local_time};

pub fn run<W, Tz>(writer: &mut W, tracker: &mut SqliteTracker<Tz>, now: DateTime<Utc>) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let active: Vec<Interval> = tracker.active().cloned().collect();
    if active.is_empty() {
        writeln!(writer, "Nothing is running.")?;
    } else {
        writeln!(writer, "Running:")?;
        let width = active
            .iter()
            .map(|interval| interval.project.as_str().len())
            .max()
            .unwrap_or(0);
        for interval in &active {
            let since = interval.start.unwrap_or(now);
            writeln!(
                writer,
                "  {:<width$}  since {}  {}",
                interval.project.as_str(),
                local_time(tracker.calendar(), since),
                format_duration(interval.seconds(now).unwrap_or(0)),
            )?;
        }
    }

    let today = tracker.total_seconds_daily_at(now)?;
    let week = tracker.total_seconds_weekly_at(now)?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Today:      {} ({})",
        format_duration(today),
        format_percentage(tracker.share_of_span(today, Component::Day, now), 2)
    )?;
    writeln!(
        writer,
        "This week:  {} ({})",
        format_duration(week),
        format_percentage(tracker.share_of_span(week, Component::Week, now), 2)
    )?;

    if let Some(last) = tracker.last_stopped()? {
        let end = last.end.unwrap_or(now);
        writeln!(
            writer,
            "Last stopped: {} at {} ({})",
            last.project,
            local_datetime(tracker.calendar(), end),
            format_duration(last.seconds(now).unwrap_or(0))
        )?;
    }

    Ok(())
}
