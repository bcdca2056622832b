//! Local calendar spans.
//!
//! Resolves the local day or week containing an instant as a half-open span of
//! UTC instants. All day boundaries are local midnights in a single time zone.

use chrono::{
    DateTime, Datelike, Days, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc, Weekday,
};
use serde::{Deserialize, Serialize};

/// Calendar component a span can be resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Day,
    Week,
}

impl Component {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

/// A half-open span `[start, end)` of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: DateTime<Utc>,
    /// Exclusive: the instant the next span begins.
    pub end: DateTime<Utc>,
}

impl Span {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

/// Host calendar: one time zone plus the weekday a week starts on.
#[derive(Debug, Clone)]
pub struct Calendar<Tz: TimeZone> {
    tz: Tz,
    week_start: Weekday,
}

impl Calendar<Local> {
    /// Calendar in the system's local time zone.
    pub const fn local(week_start: Weekday) -> Self {
        Self {
            tz: Local,
            week_start,
        }
    }
}

impl<Tz: TimeZone> Calendar<Tz> {
    pub const fn new(tz: Tz, week_start: Weekday) -> Self {
        Self { tz, week_start }
    }

    pub const fn week_start(&self) -> Weekday {
        self.week_start
    }

    pub const fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// The local calendar date containing `at`.
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.tz).date_naive()
    }

    /// Converts a local date at midnight to UTC.
    ///
    /// Ambiguous midnights (DST fall-back) resolve to the earlier instant. A
    /// midnight that does not exist (DST spring-forward) falls back to 01:00.
    pub fn midnight(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let midnight = date.and_time(NaiveTime::from_hms_opt(0, 0, 0)?);
        match self.tz.from_local_datetime(&midnight) {
            LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(a, b) => Some(a.with_timezone(&Utc).min(b.with_timezone(&Utc))),
            LocalResult::None => {
                let one_am = NaiveTime::from_hms_opt(1, 0, 0)?;
                self.tz
                    .from_local_datetime(&date.and_time(one_am))
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
            }
        }
    }

    /// Start of the local day containing `at`.
    pub fn start_of_day(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.midnight(self.local_date(at))
    }

    /// End of the local day containing `at`, i.e. the next local midnight.
    pub fn end_of_day(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.midnight(self.local_date(at).succ_opt()?)
    }

    /// True if `at` is exactly a local midnight.
    pub fn is_day_boundary(&self, at: DateTime<Utc>) -> bool {
        self.start_of_day(at) == Some(at)
    }

    /// First local date of the week containing `date`.
    pub fn first_day_of_week(&self, date: NaiveDate) -> Option<NaiveDate> {
        let offset = (7 + date.weekday().num_days_from_monday()
            - self.week_start.num_days_from_monday())
            % 7;
        date.checked_sub_days(Days::new(u64::from(offset)))
    }

    /// The span of `component` containing `at`.
    ///
    /// Returns `None` when the calendar cannot resolve a boundary.
    pub fn span(&self, component: Component, at: DateTime<Utc>) -> Option<Span> {
        let date = self.local_date(at);
        let (first, next) = match component {
            Component::Day => (date, date.succ_opt()?),
            Component::Week => {
                let first = self.first_day_of_week(date)?;
                (first, first.checked_add_days(Days::new(7))?)
            }
        };

        let span = Span {
            start: self.midnight(first)?,
            end: self.midnight(next)?,
        };
        (span.start < span.end).then_some(span)
    }

    /// Local dates from the day containing `from` to the day containing `to`, inclusive.
    ///
    /// Empty when `from` falls on a later day than `to`.
    pub fn dates_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<NaiveDate> {
        let last = self.local_date(to);
        self.local_date(from)
            .iter_days()
            .take_while(|date| *date <= last)
            .collect()
    }
}
