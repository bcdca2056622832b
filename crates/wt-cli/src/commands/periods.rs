//! Periods command: intervals touching each day of a range, for diagnostics
//! and export.

use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use wt_core::format_duration;

use super::SqliteTracker;
use super::util::{local_datetime, short_id};

pub fn run<W, Tz>(
    writer: &mut W,
    tracker: &SqliteTracker<Tz>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let periods = tracker.daily_periods_between(from, to)?;
    tracing::debug!(count = periods.len(), "listed daily periods");

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&periods)?)?;
        return Ok(());
    }

    if periods.is_empty() {
        writeln!(writer, "No intervals in range.")?;
        return Ok(());
    }

    let width = periods
        .iter()
        .map(|interval| interval.project.as_str().len())
        .max()
        .unwrap_or(0);
    for interval in &periods {
        let Some(start) = interval.start else {
            continue;
        };
        let end = interval.end.map_or_else(
            || interval.status().to_string(),
            |end| local_datetime(tracker.calendar(), end),
        );
        writeln!(
            writer,
            "{}  {:<width$}  {} - {}  ({})",
            short_id(interval.id.as_str()),
            interval.project.as_str(),
            local_datetime(tracker.calendar(), start),
            end,
            format_duration(interval.seconds(now).unwrap_or(0)),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    use crate::commands::test_support::{at, closed, output, tracker};

    fn fixtures() -> SqliteTracker<Utc> {
        tracker(&[
            closed("aaaaaaaa-1", "alpha", at(28, 23, 0), at(29, 1, 0)),
            closed("bbbbbbbb-2", "beta", at(29, 9, 0), at(29, 10, 0)),
            closed("cccccccc-3", "gamma", at(25, 9, 0), at(25, 10, 0)),
        ])
    }

    #[test]
    fn periods_repeat_intervals_per_day() {
        let tracker = fixtures();
        let mut buffer = Vec::new();

        run(&mut buffer, &tracker, at(28, 0, 0), at(29, 0, 0), false, at(29, 12, 0)).unwrap();

        assert_snapshot!(output(buffer), @r"
        aaaaaaaa  alpha  2025-01-28 23:00 - 2025-01-29 01:00  (2h0m0s)
        aaaaaaaa  alpha  2025-01-28 23:00 - 2025-01-29 01:00  (2h0m0s)
        bbbbbbbb  beta   2025-01-29 09:00 - 2025-01-29 10:00  (1h0m0s)
        ");
    }

    #[test]
    fn periods_show_running_intervals() {
        let mut open = closed("dddddddd-4", "delta", at(29, 11, 0), at(29, 11, 0));
        open.end = None;
        let tracker = tracker(&[open]);
        let mut buffer = Vec::new();

        run(&mut buffer, &tracker, at(29, 0, 0), at(29, 0, 0), false, at(29, 12, 0)).unwrap();

        assert_snapshot!(output(buffer), @"dddddddd  delta  2025-01-29 11:00 - running  (1h0m0s)");
    }

    #[test]
    fn periods_json_lists_intervals() {
        let tracker = fixtures();
        let mut buffer = Vec::new();

        run(&mut buffer, &tracker, at(25, 0, 0), at(25, 0, 0), true, at(29, 12, 0)).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        let periods = value.as_array().unwrap();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0]["id"], "cccccccc-3");
        assert_eq!(periods[0]["project"], "gamma");
    }

    #[test]
    fn periods_reversed_range_is_empty() {
        let tracker = fixtures();
        let mut buffer = Vec::new();

        run(&mut buffer, &tracker, at(29, 0, 0), at(28, 0, 0), false, at(29, 12, 0)).unwrap();

        assert_snapshot!(output(buffer), @"No intervals in range.");
    }
}
