//! Stop command.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use wt_core::{Interval, ProjectId, format_duration};

use super::SqliteTracker;

/// What to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    Project(&'a str),
    All,
}

pub fn run<W, Tz>(
    writer: &mut W,
    tracker: &mut SqliteTracker<Tz>,
    target: Target<'_>,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
{
    match target {
        Target::Project(name) => {
            let project = ProjectId::new(name).context("invalid project name")?;
            match tracker.stop_at(&project, now)? {
                Some(interval) => write_stopped(writer, &interval, now)?,
                None => writeln!(writer, "{project} is not running.")?,
            }
        }
        Target::All => {
            let stopped = tracker.stop_all_at(now)?;
            if stopped.is_empty() {
                writeln!(writer, "Nothing is running.")?;
            }
            for interval in &stopped {
                write_stopped(writer, interval, now)?;
            }
        }
    }
    Ok(())
}

fn write_stopped<W: Write>(writer: &mut W, interval: &Interval, now: DateTime<Utc>) -> Result<()> {
    let seconds = interval.seconds(now).unwrap_or(0);
    writeln!(
        writer,
        "Stopped {} after {}.",
        interval.project,
        format_duration(seconds)
    )?;
    Ok(())
}
