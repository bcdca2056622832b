//! The caller-facing engine.
//!
//! [`Tracker`] owns a store, a calendar, the registry of open intervals and the
//! running totals. Every mutating operation takes `&mut self`, so one tracker
//! is one writer. Operations that depend on the current time come in two
//! forms: `op()` reads the clock once and calls `op_at(now)`.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::cache::{AggregateCache, share_of_span};
use crate::calendar::{Calendar, Component, Span};
use crate::clip::{self, Segment, clip_to_span};
use crate::filter::{self, IntervalPredicate};
use crate::interval::Interval;
use crate::registry::{ActiveRegistry, Reconciliation};
use crate::store::IntervalStore;
use crate::types::ProjectId;

/// Seconds tracked against one project within a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectTotal {
    pub project: ProjectId,
    pub seconds: i64,
}

/// Interval accounting over a store.
#[derive(Debug)]
pub struct Tracker<S: IntervalStore, Tz: TimeZone> {
    store: S,
    calendar: Calendar<Tz>,
    registry: ActiveRegistry,
    cache: AggregateCache,
}

impl<S: IntervalStore, Tz: TimeZone> Tracker<S, Tz> {
    /// Opens a tracker, rebuilding the registry from the store.
    ///
    /// Corrupt records found along the way (unstarted intervals, second open
    /// intervals for the same project) are logged and deleted.
    pub fn open(mut store: S, calendar: Calendar<Tz>) -> Result<Self, S::Error> {
        let unclosed = store.fetch(&IntervalPredicate::Unclosed)?;
        let Reconciliation { registry, corrupt } = ActiveRegistry::reconcile(unclosed);

        for record in &corrupt {
            tracing::warn!(
                interval = %record.interval.id,
                project = %record.interval.project,
                reason = %record.reason,
                "deleting corrupt interval"
            );
            if let Err(error) = store.delete(&record.interval.id) {
                tracing::warn!(
                    interval = %record.interval.id,
                    %error,
                    "failed to delete corrupt interval, leaving it in place"
                );
            }
        }
        tracing::debug!(
            active = registry.len(),
            deleted = corrupt.len(),
            "reconciled open intervals"
        );

        Ok(Self {
            store,
            calendar,
            registry,
            cache: AggregateCache::new(),
        })
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn calendar(&self) -> &Calendar<Tz> {
        &self.calendar
    }

    // ========== Start / Stop ==========

    pub fn start(&mut self, project: &ProjectId) -> Result<Option<Interval>, S::Error> {
        self.start_at(project, Utc::now())
    }

    /// Starts an interval for `project`.
    ///
    /// Returns `None` without touching the store if the project already has an
    /// open interval. Once the interval is stored it is tracked even if
    /// stamping the project's last access fails.
    pub fn start_at(
        &mut self,
        project: &ProjectId,
        now: DateTime<Utc>,
    ) -> Result<Option<Interval>, S::Error> {
        if self.registry.contains(project) {
            tracing::debug!(%project, "project already has an open interval");
            return Ok(None);
        }

        let interval = Interval::started(project.clone(), now);
        self.store.insert(&interval)?;
        self.registry.insert(interval.clone());
        if let Err(error) = self.store.touch_project(project, now) {
            tracing::warn!(%project, %error, "failed to record project access");
        }

        tracing::info!(interval = %interval.id, %project, "started interval");
        Ok(Some(interval))
    }

    pub fn stop(&mut self, project: &ProjectId) -> Result<Option<Interval>, S::Error> {
        self.stop_at(project, Utc::now())
    }

    /// Stops the open interval for `project` and returns it closed.
    ///
    /// Returns `None` if nothing is open. The registry only changes once the
    /// store has accepted the update.
    pub fn stop_at(
        &mut self,
        project: &ProjectId,
        now: DateTime<Utc>,
    ) -> Result<Option<Interval>, S::Error> {
        let Some(open) = self.registry.get(project) else {
            tracing::debug!(%project, "no open interval to stop");
            return Ok(None);
        };

        let mut closed = open.clone();
        closed.stop_at(now);
        self.store.update(&closed)?;
        self.registry.remove(project);
        self.cache.fold_closed(&closed, &self.calendar, now);

        tracing::info!(interval = %closed.id, %project, "stopped interval");
        Ok(Some(closed))
    }

    pub fn stop_all(&mut self) -> Result<Vec<Interval>, S::Error> {
        self.stop_all_at(Utc::now())
    }

    /// Stops every open interval, oldest-opened first.
    pub fn stop_all_at(&mut self, now: DateTime<Utc>) -> Result<Vec<Interval>, S::Error> {
        let projects: Vec<ProjectId> = self
            .registry
            .iter()
            .map(|interval| interval.project.clone())
            .collect();

        let mut stopped = Vec::with_capacity(projects.len());
        for project in &projects {
            if let Some(interval) = self.stop_at(project, now)? {
                stopped.push(interval);
            }
        }
        Ok(stopped)
    }

    pub fn has_active(&self) -> bool {
        !self.registry.is_empty()
    }

    pub fn has_active_for(&self, project: &ProjectId) -> bool {
        self.registry.contains(project)
    }

    /// Open intervals, oldest-opened first.
    pub fn active(&self) -> impl Iterator<Item = &Interval> {
        self.registry.iter()
    }

    // ========== Totals ==========

    pub fn total_seconds_daily(&mut self) -> Result<i64, S::Error> {
        self.total_seconds_daily_at(Utc::now())
    }

    /// Seconds tracked today, open intervals included up to `now`.
    pub fn total_seconds_daily_at(&mut self, now: DateTime<Utc>) -> Result<i64, S::Error> {
        self.total_seconds_at(Component::Day, now)
    }

    pub fn total_seconds_weekly(&mut self) -> Result<i64, S::Error> {
        self.total_seconds_weekly_at(Utc::now())
    }

    /// Seconds tracked this week, open intervals included up to `now`.
    pub fn total_seconds_weekly_at(&mut self, now: DateTime<Utc>) -> Result<i64, S::Error> {
        self.total_seconds_at(Component::Week, now)
    }

    fn total_seconds_at(
        &mut self,
        component: Component,
        now: DateTime<Utc>,
    ) -> Result<i64, S::Error> {
        self.cache.total_seconds(
            &self.store,
            &self.calendar,
            component,
            self.registry.iter(),
            now,
        )
    }

    /// Fraction of the current day or week covered by `seconds`.
    pub fn share_of_span(&self, seconds: i64, component: Component, now: DateTime<Utc>) -> f64 {
        self.calendar
            .span(component, now)
            .map_or(0.0, |span| share_of_span(seconds, span))
    }

    // ========== Read paths ==========

    /// See [`clip::clip`].
    pub fn clip(
        &self,
        interval: &Interval,
        component: Component,
        reference: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<Segment> {
        clip::clip(interval, &self.calendar, component, reference, now)
    }

    /// See [`clip::daily_segments`].
    pub fn daily_segments(&self, interval: &Interval, now: DateTime<Utc>) -> Vec<Segment> {
        clip::daily_segments(interval, &self.calendar, now)
    }

    /// See [`filter::ranged_predicate`].
    pub fn ranged_predicate(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        polarize: bool,
    ) -> IntervalPredicate {
        filter::ranged_predicate(&self.calendar, range_start, range_end, polarize)
    }

    /// Intervals touching each local day from `from` to `to` inclusive,
    /// concatenated day by day.
    ///
    /// An interval spanning several days is returned once for each of them.
    pub fn daily_periods_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Interval>, S::Error> {
        let mut periods = Vec::new();
        for date in self.calendar.dates_between(from, to) {
            let predicate = self
                .calendar
                .midnight(date)
                .and_then(|day_start| self.calendar.span(Component::Day, day_start))
                .map_or(IntervalPredicate::Never, |day| {
                    self.ranged_predicate(day.start, day.end, true)
                });
            if predicate == IntervalPredicate::Never {
                tracing::warn!(%date, "calendar could not resolve day, skipping");
                continue;
            }
            periods.extend(self.store.fetch(&predicate)?);
        }
        Ok(periods)
    }

    /// The closed interval that ended most recently.
    pub fn last_stopped(&self) -> Result<Option<Interval>, S::Error> {
        self.store.last_closed()
    }

    /// Seconds per project within `[range_start, range_end)`, largest first.
    ///
    /// Each interval is clipped to the range the same way calendar totals are.
    /// Projects with no time in the range are left out.
    pub fn project_totals(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ProjectTotal>, S::Error> {
        if range_end <= range_start {
            return Ok(Vec::new());
        }
        let span = Span {
            start: range_start,
            end: range_end,
        };

        let intervals = self.store.fetch(&self.ranged_predicate(range_start, range_end, false))?;
        let mut by_project: BTreeMap<ProjectId, i64> = BTreeMap::new();
        for interval in &intervals {
            if let Some(segment) = clip_to_span(interval, span, now) {
                *by_project.entry(interval.project.clone()).or_default() += segment.seconds();
            }
        }

        let mut totals: Vec<ProjectTotal> = by_project
            .into_iter()
            .filter(|(_, seconds)| *seconds > 0)
            .map(|(project, seconds)| ProjectTotal { project, seconds })
            .collect();
        totals.sort_by(|a, b| {
            b.seconds
                .cmp(&a.seconds)
                .then_with(|| a.project.cmp(&b.project))
        });
        Ok(totals)
    }
}
