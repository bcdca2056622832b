//! Active interval registry.
//!
//! Tracks the single open interval each project may have, in the order the
//! intervals were opened. Closed intervals are owned by storage alone.

use std::fmt;

use crate::interval::Interval;
use crate::types::ProjectId;

/// Why a record was rejected during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptReason {
    /// Not closed and never started (pending, or an end without a start).
    MissingStart,
    /// A second open interval for a project that already has one.
    DuplicateOpen,
}

impl fmt::Display for CorruptReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingStart => write!(f, "missing start"),
            Self::DuplicateOpen => write!(f, "duplicate open interval"),
        }
    }
}

/// A record the registry refused, to be deleted by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptRecord {
    pub interval: Interval,
    pub reason: CorruptReason,
}

/// Result of rebuilding the registry from stored unclosed intervals.
#[derive(Debug, Default)]
pub struct Reconciliation {
    pub registry: ActiveRegistry,
    pub corrupt: Vec<CorruptRecord>,
}

/// Insertion-ordered map from project to its open interval.
#[derive(Debug, Default, Clone)]
pub struct ActiveRegistry {
    entries: Vec<Interval>,
}

impl ActiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a registry from intervals that are not closed.
    ///
    /// Intervals are taken in the order given (storage returns them by start),
    /// so the earliest open interval of a project wins and later ones are
    /// reported as duplicates.
    pub fn reconcile(unclosed: Vec<Interval>) -> Reconciliation {
        let mut registry = Self::new();
        let mut corrupt = Vec::new();

        for interval in unclosed {
            if interval.start.is_none() {
                corrupt.push(CorruptRecord {
                    interval,
                    reason: CorruptReason::MissingStart,
                });
            } else if registry.contains(&interval.project) {
                corrupt.push(CorruptRecord {
                    interval,
                    reason: CorruptReason::DuplicateOpen,
                });
            } else if interval.is_running() {
                registry.entries.push(interval);
            }
        }

        Reconciliation { registry, corrupt }
    }

    /// The open interval for `project`, if any.
    pub fn get(&self, project: &ProjectId) -> Option<&Interval> {
        self.entries.iter().find(|interval| &interval.project == project)
    }

    pub fn contains(&self, project: &ProjectId) -> bool {
        self.get(project).is_some()
    }

    /// Appends a running interval. Refuses non-running intervals and projects
    /// that already have an open interval.
    pub fn insert(&mut self, interval: Interval) -> bool {
        if !interval.is_running() || self.contains(&interval.project) {
            return false;
        }
        self.entries.push(interval);
        true
    }

    /// Removes and returns the open interval for `project`, keeping the order
    /// of the rest.
    pub fn remove(&mut self, project: &ProjectId) -> Option<Interval> {
        let index = self
            .entries
            .iter()
            .position(|interval| &interval.project == project)?;
        Some(self.entries.remove(index))
    }

    /// Open intervals, oldest-opened first.
    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
