//! Work intervals - the unit of tracked time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{IntervalId, IntervalStatus, ProjectId};

/// A span of work time tracked against one project, possibly open-ended.
///
/// The lifecycle state is derived from `start` and `end` (see [`IntervalStatus`]).
/// An `end` without a `start` is corrupt; such records contribute nothing to
/// any total and are removed when the tracker reconciles at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Interval {
    /// Unique identifier.
    pub id: IntervalId,

    /// When the record was created. Never changes afterwards.
    pub created_at: DateTime<Utc>,

    /// When work began. Absent while pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,

    /// When work ended. Absent while pending or running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,

    /// The project this interval is tracked against.
    pub project: ProjectId,

    /// Free text, not used for accounting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Interval {
    /// Creates a pending interval for `project`.
    pub fn new(project: ProjectId) -> Self {
        Self::pending_at(project, Utc::now())
    }

    /// Creates a pending interval with an explicit creation time.
    pub fn pending_at(project: ProjectId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: IntervalId::generate(),
            created_at,
            start: None,
            end: None,
            project,
            notes: None,
        }
    }

    /// Creates an interval that is already running since `now`.
    pub fn started(project: ProjectId, now: DateTime<Utc>) -> Self {
        let mut interval = Self::pending_at(project, now);
        interval.start = Some(now);
        interval
    }

    /// Stamps `start`. Returns false if the interval was already started.
    pub fn start_at(&mut self, now: DateTime<Utc>) -> bool {
        if self.start.is_some() {
            return false;
        }
        self.start = Some(now);
        true
    }

    /// Stamps `end`. Returns false if the interval is not running.
    pub fn stop_at(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_running() {
            return false;
        }
        self.end = Some(now);
        true
    }

    /// The lifecycle state. Corrupt records report as pending.
    pub fn status(&self) -> IntervalStatus {
        match (self.start, self.end) {
            (Some(_), None) => IntervalStatus::Running,
            (Some(_), Some(_)) => IntervalStatus::Stopped,
            (None, _) => IntervalStatus::Pending,
        }
    }

    pub const fn is_pending(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub const fn is_running(&self) -> bool {
        self.start.is_some() && self.end.is_none()
    }

    pub const fn is_stopped(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// True when `end` is set but `start` is not.
    pub const fn is_corrupt(&self) -> bool {
        self.start.is_none() && self.end.is_some()
    }

    /// The end used for accounting: the recorded end, or `now` while running.
    pub fn effective_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.end.unwrap_or(now)
    }

    /// Elapsed time, clamped to zero. `None` if the interval never started.
    pub fn duration(&self, now: DateTime<Utc>) -> Option<Duration> {
        let start = self.start?;
        let elapsed = self.effective_end(now) - start;
        Some(elapsed.max(Duration::zero()))
    }

    /// Elapsed whole seconds, clamped to zero.
    pub fn seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.duration(now).map(|d| d.num_seconds())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn ts(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 14, h, m, s).unwrap()
    }

    fn project() -> ProjectId {
        ProjectId::new("thesis").unwrap()
    }

    #[test]
    fn new_interval_is_pending() {
        let interval = Interval::new(project());
        assert!(interval.is_pending());
        assert_eq!(interval.status(), IntervalStatus::Pending);
        assert_eq!(interval.duration(ts(10, 0, 0)), None);
    }

    #[test]
    fn lifecycle_moves_through_states() {
        let mut interval = Interval::pending_at(project(), ts(9, 0, 0));
        assert!(interval.start_at(ts(9, 0, 0)));
        assert_eq!(interval.status(), IntervalStatus::Running);

        assert!(interval.stop_at(ts(9, 30, 0)));
        assert_eq!(interval.status(), IntervalStatus::Stopped);
        assert_eq!(interval.seconds(ts(23, 0, 0)), Some(1800));
    }

    #[test]
    fn start_and_stop_are_single_shot() {
        let mut interval = Interval::started(project(), ts(9, 0, 0));
        assert!(!interval.start_at(ts(10, 0, 0)));
        assert_eq!(interval.start, Some(ts(9, 0, 0)));

        assert!(interval.stop_at(ts(11, 0, 0)));
        assert!(!interval.stop_at(ts(12, 0, 0)));
        assert_eq!(interval.end, Some(ts(11, 0, 0)));
    }

    #[test]
    fn stopping_a_pending_interval_is_refused() {
        let mut interval = Interval::new(project());
        assert!(!interval.stop_at(ts(9, 0, 0)));
        assert!(!interval.is_corrupt());
    }

    #[test]
    fn running_duration_tracks_now() {
        let interval = Interval::started(project(), ts(9, 0, 0));
        assert_eq!(interval.seconds(ts(9, 0, 45)), Some(45));
        assert_eq!(interval.seconds(ts(9, 1, 0)), Some(60));
    }

    #[test]
    fn inverted_interval_duration_is_zero() {
        let mut interval = Interval::started(project(), ts(9, 0, 0));
        interval.end = Some(ts(8, 0, 0));
        assert_eq!(interval.duration(ts(12, 0, 0)), Some(Duration::zero()));
    }

    #[test]
    fn end_without_start_is_corrupt() {
        let mut interval = Interval::new(project());
        interval.end = Some(ts(9, 0, 0));
        assert!(interval.is_corrupt());
        assert!(!interval.is_pending());
        assert_eq!(interval.seconds(ts(10, 0, 0)), None);
    }

    #[test]
    fn interval_serde_roundtrip() {
        let mut interval = Interval::started(project(), ts(9, 0, 0));
        interval.notes = Some("chapter 2".to_string());

        let json = serde_json::to_string(&interval).unwrap();
        assert!(!json.contains("\"end\""));
        let parsed: Interval = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, interval);
    }
}
