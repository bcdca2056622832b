//! Start command.

use std::fmt::Display;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use wt_core::ProjectId;

use super::SqliteTracker;
use super::util::local_time;

/// Starts tracking `project`, creating it on first use.
pub fn run<W, Tz>(
    writer: &mut W,
    tracker: &mut SqliteTracker<Tz>,
    project: &str,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let project = ProjectId::new(project).context("invalid project name")?;
    tracker
        .store()
        .ensure_project(&project, now)
        .with_context(|| format!("failed to create project {project}"))?;

    if let Some(interval) = tracker.start_at(&project, now)? {
        let since = interval.start.unwrap_or(now);
        writeln!(
            writer,
            "Started {project} at {}.",
            local_time(tracker.calendar(), since)
        )?;
        return Ok(());
    }

    let since = tracker
        .active()
        .find(|interval| interval.project == project)
        .and_then(|interval| interval.start)
        .unwrap_or(now);
    writeln!(
        writer,
        "{project} is already running since {}.",
        local_time(tracker.calendar(), since)
    )?;
    Ok(())
}
