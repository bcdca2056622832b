//! Storage collaborator interface.
//!
//! The engine never decides how intervals are persisted or indexed. It hands a
//! declarative [`IntervalPredicate`] to an [`IntervalStore`] and works on
//! whatever comes back.

use std::cell::Cell;
use std::collections::HashMap;
use std::convert::Infallible;

use chrono::{DateTime, Utc};

use crate::filter::IntervalPredicate;
use crate::interval::Interval;
use crate::types::{IntervalId, ProjectId};

/// Persistence for intervals, plus the one project write the engine needs.
pub trait IntervalStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns every interval matching `predicate`, ordered by start then ID.
    ///
    /// Intervals without a start sort first.
    fn fetch(&self, predicate: &IntervalPredicate) -> Result<Vec<Interval>, Self::Error>;

    /// Stores a new interval.
    fn insert(&mut self, interval: &Interval) -> Result<(), Self::Error>;

    /// Overwrites a stored interval's fields.
    fn update(&mut self, interval: &Interval) -> Result<(), Self::Error>;

    /// Removes an interval. Removing a missing ID is not an error.
    fn delete(&mut self, id: &IntervalId) -> Result<(), Self::Error>;

    /// Records that `project` was just used.
    fn touch_project(&mut self, project: &ProjectId, at: DateTime<Utc>)
    -> Result<(), Self::Error>;

    /// The closed interval with the latest end.
    ///
    /// The default scans every closed interval. Stores that can order by end
    /// time should answer with a single lookup.
    fn last_closed(&self) -> Result<Option<Interval>, Self::Error> {
        let closed = self.fetch(&IntervalPredicate::Closed)?;
        Ok(closed.into_iter().max_by(|a, b| a.end.cmp(&b.end)))
    }
}

/// Sorts intervals the way [`IntervalStore::fetch`] promises.
pub fn sort_by_start(intervals: &mut [Interval]) {
    intervals.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
}

/// Vec-backed store for tests and embedding without a database.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    intervals: Vec<Interval>,
    last_accessed: HashMap<ProjectId, DateTime<Utc>>,
    fetches: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `intervals`.
    pub fn with_intervals(intervals: Vec<Interval>) -> Self {
        Self {
            intervals,
            ..Self::default()
        }
    }

    /// All stored intervals in insertion order.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// When `project` was last touched.
    pub fn last_accessed(&self, project: &ProjectId) -> Option<DateTime<Utc>> {
        self.last_accessed.get(project).copied()
    }

    /// Number of `fetch` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl IntervalStore for MemoryStore {
    type Error = Infallible;

    fn fetch(&self, predicate: &IntervalPredicate) -> Result<Vec<Interval>, Self::Error> {
        self.fetches.set(self.fetches.get() + 1);
        let mut matched: Vec<Interval> = self
            .intervals
            .iter()
            .filter(|interval| predicate.matches(interval))
            .cloned()
            .collect();
        sort_by_start(&mut matched);
        Ok(matched)
    }

    fn insert(&mut self, interval: &Interval) -> Result<(), Self::Error> {
        self.intervals.push(interval.clone());
        Ok(())
    }

    fn update(&mut self, interval: &Interval) -> Result<(), Self::Error> {
        if let Some(stored) = self.intervals.iter_mut().find(|i| i.id == interval.id) {
            *stored = interval.clone();
        }
        Ok(())
    }

    fn delete(&mut self, id: &IntervalId) -> Result<(), Self::Error> {
        self.intervals.retain(|interval| &interval.id != id);
        Ok(())
    }

    fn touch_project(
        &mut self,
        project: &ProjectId,
        at: DateTime<Utc>,
    ) -> Result<(), Self::Error> {
        self.last_accessed.insert(project.clone(), at);
        Ok(())
    }
}
