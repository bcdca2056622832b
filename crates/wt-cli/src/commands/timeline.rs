//! Timeline command: intervals split at local midnights, grouped by day.

use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use wt_core::{CLAMP_TICK, IntervalPredicate, IntervalStore, ProjectId, Segment, format_duration};

use super::SqliteTracker;
use super::util::local_time;

/// One row of the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub date: NaiveDate,
    pub segment: Segment,
    pub project: ProjectId,
    pub running: bool,
}

/// Collects the per-day segments of every interval touching the local days
/// from `from` to `to`, ordered by segment start.
///
/// A `to` that falls exactly on a local midnight ends the range there, so the
/// day it opens is not shown.
pub fn collect_entries<Tz: TimeZone>(
    tracker: &SqliteTracker<Tz>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Vec<TimelineEntry>> {
    let predicate = tracker.ranged_predicate(from, to, true);
    let IntervalPredicate::Ranged { start, end } = predicate else {
        return Ok(Vec::new());
    };
    if end <= start {
        return Ok(Vec::new());
    }
    let first = tracker.calendar().local_date(start);
    let last = tracker.calendar().local_date(end - CLAMP_TICK);

    let intervals = tracker.store().fetch(&predicate)?;

    let mut entries = Vec::new();
    for interval in &intervals {
        for segment in tracker.daily_segments(interval, now) {
            let date = tracker.calendar().local_date(segment.start);
            if date < first || date > last {
                continue;
            }
            entries.push(TimelineEntry {
                date,
                segment,
                project: interval.project.clone(),
                running: interval.is_running() && segment.end == now,
            });
        }
    }
    entries.sort_by(|a, b| {
        a.segment
            .start
            .cmp(&b.segment.start)
            .then_with(|| a.project.cmp(&b.project))
    });
    Ok(entries)
}

pub fn run<W, Tz>(
    writer: &mut W,
    tracker: &SqliteTracker<Tz>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let entries = collect_entries(tracker, from, to, now)?;
    if entries.is_empty() {
        writeln!(writer, "No intervals in range.")?;
        return Ok(());
    }

    let width = entries
        .iter()
        .map(|entry| entry.project.as_str().len())
        .max()
        .unwrap_or(0);

    let mut current_date = None;
    for entry in &entries {
        if current_date != Some(entry.date) {
            writeln!(writer, "{}", entry.date.format("%a %Y-%m-%d"))?;
            current_date = Some(entry.date);
        }
        let marker = if entry.running { "  (running)" } else { "" };
        writeln!(
            writer,
            "  {}-{}  {:<width$}  {:>8}{marker}",
            local_time(tracker.calendar(), entry.segment.start),
            local_time(tracker.calendar(), entry.segment.end),
            entry.project.as_str(),
            format_duration(entry.segment.seconds()),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    use crate::commands::test_support::{at, closed, output, project, tracker};

    #[test]
    fn timeline_splits_at_midnight() {
        let mut tracker = tracker(&[
            closed("i-1", "alpha", at(28, 22, 0), at(29, 1, 30)),
            closed("i-2", "beta", at(29, 9, 0), at(29, 9, 45)),
            closed("i-3", "early", at(25, 9, 0), at(25, 10, 0)),
        ]);
        tracker.start_at(&project("gamma"), at(29, 11, 0)).unwrap();

        let mut buffer = Vec::new();
        run(&mut buffer, &tracker, at(28, 0, 0), at(29, 12, 0), at(29, 12, 0)).unwrap();

        assert_snapshot!(output(buffer), @r"
        Tue 2025-01-28
          22:00-00:00  alpha    2h0m0s
        Wed 2025-01-29
          00:00-01:30  alpha   1h30m0s
          09:00-09:45  beta      45m0s
          11:00-12:00  gamma    1h0m0s  (running)
        ");
    }

    #[test]
    fn timeline_drops_segments_outside_range_days() {
        let tracker = tracker(&[closed("i-1", "alpha", at(28, 22, 0), at(29, 1, 0))]);

        let entries =
            collect_entries(&tracker, at(29, 0, 0), at(29, 12, 0), at(29, 12, 0)).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].segment, Segment::new(at(29, 0, 0), at(29, 1, 0)));
    }

    #[test]
    fn timeline_ending_at_midnight_stops_before_that_day() {
        let tracker = tracker(&[
            closed("i-1", "alpha", at(28, 22, 0), at(29, 1, 0)),
            closed("i-2", "beta", at(29, 9, 0), at(29, 10, 0)),
        ]);

        let mut buffer = Vec::new();
        run(&mut buffer, &tracker, at(28, 0, 0), at(29, 0, 0), at(29, 12, 0)).unwrap();

        assert_snapshot!(output(buffer), @r"
        Tue 2025-01-28
          22:00-00:00  alpha    2h0m0s
        ");
    }

    #[test]
    fn timeline_empty_range() {
        let tracker = tracker(&[]);
        let mut buffer = Vec::new();

        run(&mut buffer, &tracker, at(29, 0, 0), at(29, 12, 0), at(29, 12, 0)).unwrap();

        assert_snapshot!(output(buffer), @"No intervals in range.");
    }
}
