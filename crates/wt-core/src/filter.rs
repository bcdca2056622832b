//! Declarative interval predicates.
//!
//! Predicates describe *which* intervals a read path needs without saying how
//! to find them. A storage layer translates each variant into its own query
//! language (see `wt-db`); [`IntervalPredicate::matches`] is the reference
//! in-memory evaluation every translation must agree with.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::Calendar;
use crate::interval::Interval;

/// A boolean test over intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntervalPredicate {
    /// Matches nothing. Used when a range cannot be resolved.
    Never,
    /// Matches everything.
    All,
    /// Both start and end are set.
    Closed,
    /// Not closed: pending, running, or corrupt.
    Unclosed,
    /// Started, and could still contribute time at or after `since`.
    ///
    /// Looser than an exact overlap test so storage can answer it from plain
    /// column comparisons; the exact contribution is computed by clipping.
    Touching { since: DateTime<Utc> },
    /// Occupies some time in `[start, end)`.
    Ranged {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl IntervalPredicate {
    /// Evaluates the predicate against one interval.
    pub fn matches(&self, interval: &Interval) -> bool {
        match *self {
            Self::Never => false,
            Self::All => true,
            Self::Closed => interval.start.is_some() && interval.end.is_some(),
            Self::Unclosed => !(interval.start.is_some() && interval.end.is_some()),
            Self::Touching { since } => interval
                .start
                .is_some_and(|start| start >= since || interval.end.is_none_or(|end| end > since)),
            Self::Ranged { start, end } => overlaps_range(interval, start, end),
        }
    }

    /// Keeps the intervals matching the predicate.
    pub fn filter(&self, intervals: Vec<Interval>) -> Vec<Interval> {
        intervals
            .into_iter()
            .filter(|interval| self.matches(interval))
            .collect()
    }
}

/// Whether `interval` occupies any time in `[range_start, range_end)`.
fn overlaps_range(
    interval: &Interval,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
) -> bool {
    let Some(start) = interval.start else {
        return false;
    };
    if start >= range_start && start < range_end {
        return true;
    }
    if start >= range_end {
        return false;
    }
    // Started before the range: overlaps if it ended inside or after it, or is
    // still running.
    interval.end.is_none_or(|end| end > range_start)
}

/// Builds the predicate selecting intervals that overlap `[range_start, range_end)`.
///
/// With `polarize`, the start is snapped down to its local midnight and the end
/// up to the next local midnight, unless the end already is one. Returns
/// [`IntervalPredicate::Never`] if the calendar cannot resolve those boundaries.
pub fn ranged_predicate<Tz: TimeZone>(
    calendar: &Calendar<Tz>,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    polarize: bool,
) -> IntervalPredicate {
    if !polarize {
        return IntervalPredicate::Ranged {
            start: range_start,
            end: range_end,
        };
    }

    let start = calendar.start_of_day(range_start);
    let end = if calendar.is_day_boundary(range_end) {
        Some(range_end)
    } else {
        calendar.end_of_day(range_end)
    };

    match (start, end) {
        (Some(start), Some(end)) => IntervalPredicate::Ranged { start, end },
        _ => {
            tracing::warn!(
                %range_start,
                %range_end,
                "calendar could not polarize range, matching nothing"
            );
            IntervalPredicate::Never
        }
    }
}
