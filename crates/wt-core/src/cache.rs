//! Running daily and weekly totals.
//!
//! Each total is a lazily computed base over closed intervals plus the live
//! contribution of every open interval, recomputed on each read. The base is
//! filled from one storage scan and afterwards only grows by folding in
//! intervals as they are stopped.

use chrono::{DateTime, TimeZone, Utc};

use crate::calendar::{Calendar, Component, Span};
use crate::clip::clipped_seconds;
use crate::filter::IntervalPredicate;
use crate::interval::Interval;
use crate::store::IntervalStore;

/// A base total and the span it was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CachedBase {
    span: Span,
    seconds: i64,
}

/// Memoized seconds over closed intervals for the current day and week.
#[derive(Debug, Default, Clone)]
pub struct AggregateCache {
    daily: Option<CachedBase>,
    weekly: Option<CachedBase>,
}

impl AggregateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached base for `component`, if it has been computed.
    pub fn base(&self, component: Component) -> Option<i64> {
        self.slot(component).map(|cached| cached.seconds)
    }

    const fn slot(&self, component: Component) -> Option<&CachedBase> {
        match component {
            Component::Day => self.daily.as_ref(),
            Component::Week => self.weekly.as_ref(),
        }
    }

    const fn slot_mut(&mut self, component: Component) -> &mut Option<CachedBase> {
        match component {
            Component::Day => &mut self.daily,
            Component::Week => &mut self.weekly,
        }
    }

    /// Seconds spent in the current `component` span as of `now`.
    ///
    /// Computes the base on first use, or when the span containing `now` is no
    /// longer the one the base was computed for.
    pub fn total_seconds<'a, S, Tz>(
        &mut self,
        store: &S,
        calendar: &Calendar<Tz>,
        component: Component,
        open: impl IntoIterator<Item = &'a Interval>,
        now: DateTime<Utc>,
    ) -> Result<i64, S::Error>
    where
        S: IntervalStore,
        Tz: TimeZone,
    {
        let Some(span) = calendar.span(component, now) else {
            tracing::warn!(
                component = component.as_str(),
                %now,
                "calendar could not resolve span, reporting zero"
            );
            return Ok(0);
        };

        let base = match self.slot(component) {
            Some(cached) if cached.span == span => cached.seconds,
            _ => {
                let seconds = scan_closed(store, calendar, component, span, now)?;
                tracing::debug!(component = component.as_str(), seconds, "computed base total");
                *self.slot_mut(component) = Some(CachedBase { span, seconds });
                seconds
            }
        };

        let live: i64 = open
            .into_iter()
            .map(|interval| clipped_seconds(interval, calendar, component, now, now))
            .sum();

        Ok(base + live)
    }

    /// Adds a just-stopped interval to every base that is already computed.
    ///
    /// Bases that were never computed stay that way: their first scan will find
    /// the interval in storage.
    pub fn fold_closed<Tz: TimeZone>(
        &mut self,
        interval: &Interval,
        calendar: &Calendar<Tz>,
        now: DateTime<Utc>,
    ) {
        for component in [Component::Day, Component::Week] {
            let current = calendar.span(component, now);
            let slot = self.slot_mut(component);
            let Some(cached) = slot.as_mut() else {
                continue;
            };
            if current != Some(cached.span) {
                *slot = None;
                continue;
            }
            cached.seconds += clipped_seconds(interval, calendar, component, now, now);
        }
    }
}

/// Sums the clipped seconds of closed intervals that may touch `span`.
fn scan_closed<S, Tz>(
    store: &S,
    calendar: &Calendar<Tz>,
    component: Component,
    span: Span,
    now: DateTime<Utc>,
) -> Result<i64, S::Error>
where
    S: IntervalStore,
    Tz: TimeZone,
{
    let candidates = store.fetch(&IntervalPredicate::Touching { since: span.start })?;
    Ok(candidates
        .iter()
        .filter(|interval| interval.is_stopped())
        .map(|interval| clipped_seconds(interval, calendar, component, now, now))
        .sum())
}

/// Fraction of `span` covered by `seconds`.
#[expect(
    clippy::cast_precision_loss,
    reason = "second counts stay far below 2^52"
)]
pub fn share_of_span(seconds: i64, span: Span) -> f64 {
    let length = span.duration().num_seconds();
    if length <= 0 {
        return 0.0;
    }
    seconds as f64 / length as f64
}
