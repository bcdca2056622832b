//! Report command for generating time reports.
//!
//! This module implements `wt report` for the current day, the current week or
//! an explicit range, in human-readable or JSON form.

use std::fmt::Display;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use wt_core::{CLAMP_TICK, Calendar, Component, ProjectTotal, format_duration, format_percentage};

use super::SqliteTracker;

/// Report period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub timezone: String,
    pub totals: Vec<ProjectTotal>,
}

impl ReportData {
    fn total_seconds(&self) -> i64 {
        self.totals.iter().map(|total| total.seconds).sum()
    }
}

// ========== Period Boundaries ==========

/// Resolves `period` to a half-open range of instants.
pub fn period_boundaries<Tz: TimeZone>(
    calendar: &Calendar<Tz>,
    period: Period,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let component = match period {
        Period::Range { start, end } => return Ok((start, end)),
        Period::Day => Component::Day,
        Period::Week => Component::Week,
    };
    let span = calendar
        .span(component, now)
        .with_context(|| format!("could not resolve the current {}", component.as_str()))?;
    Ok((span.start, span.end))
}

// ========== Progress Bar ==========

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "ratio is clamped to 0..=10 before the cast"
)]
pub fn progress_bar(value: i64, max: i64) -> String {
    if max <= 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().clamp(0.0, 10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

// ========== Report Generation ==========

/// Generates report data from the tracker.
pub fn generate_report_data<Tz: TimeZone>(
    tracker: &SqliteTracker<Tz>,
    period: Period,
    timezone: String,
    now: DateTime<Utc>,
) -> Result<ReportData> {
    let (period_start, period_end) = period_boundaries(tracker.calendar(), period, now)?;
    let totals = tracker
        .project_totals(period_start, period_end, now)
        .context("failed to compute project totals")?;
    tracing::debug!(projects = totals.len(), %period_start, %period_end, "computed report");

    Ok(ReportData {
        generated_at: now,
        period_start,
        period_end,
        timezone,
        totals,
    })
}

/// Local first and last dates covered by the report.
fn period_description<Tz>(data: &ReportData, calendar: &Calendar<Tz>) -> String
where
    Tz: TimeZone,
{
    let first = calendar.local_date(data.period_start);
    let last = calendar.local_date((data.period_end - CLAMP_TICK).max(data.period_start));
    if first == last {
        first.format("%a %Y-%m-%d").to_string()
    } else {
        format!("{} to {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"))
    }
}

/// Writes the human-readable report.
pub fn write_report<W, Tz>(writer: &mut W, data: &ReportData, calendar: &Calendar<Tz>) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
{
    writeln!(
        writer,
        "TIME REPORT: {} ({})",
        period_description(data, calendar),
        data.timezone
    )?;
    writeln!(writer)?;

    if data.totals.is_empty() {
        writeln!(writer, "No time recorded in this period.")?;
        writeln!(writer)?;
        writeln!(writer, "Hint: Run 'wt start <project>' to begin tracking.")?;
        return Ok(());
    }

    let total = data.total_seconds();
    let max = data.totals.iter().map(|t| t.seconds).max().unwrap_or(0);
    let width = data
        .totals
        .iter()
        .map(|t| t.project.as_str().len())
        .max()
        .unwrap_or(0);

    for entry in &data.totals {
        #[expect(clippy::cast_precision_loss, reason = "tracked seconds stay far below 2^52")]
        let share = entry.seconds as f64 / total as f64;
        writeln!(
            writer,
            "{:<width$}  {:>11}  {}  {:>7}",
            entry.project.as_str(),
            format_duration(entry.seconds),
            progress_bar(entry.seconds, max),
            format_percentage(share, 1),
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "Total tracked: {}", format_duration(total))?;
    Ok(())
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub generated_at: String,
    pub timezone: String,
    pub period: JsonPeriod,
    pub projects: Vec<JsonProject>,
    pub total_seconds: i64,
}

#[derive(Debug, Serialize)]
pub struct JsonPeriod {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct JsonProject {
    pub project: String,
    pub seconds: i64,
    pub duration: String,
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    let report = JsonReport {
        generated_at: data.generated_at.to_rfc3339(),
        timezone: data.timezone.clone(),
        period: JsonPeriod {
            start: data.period_start.to_rfc3339(),
            end: data.period_end.to_rfc3339(),
        },
        projects: data
            .totals
            .iter()
            .map(|total| JsonProject {
                project: total.project.to_string(),
                seconds: total.seconds,
                duration: format_duration(total.seconds),
            })
            .collect(),
        total_seconds: data.total_seconds(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run<W, Tz>(
    writer: &mut W,
    tracker: &SqliteTracker<Tz>,
    period: Period,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
    let data = generate_report_data(tracker, period, timezone, now)?;

    if json {
        writeln!(writer, "{}", format_report_json(&data)?)?;
    } else {
        write_report(writer, &data, tracker.calendar())?;
    }

    Ok(())
}
