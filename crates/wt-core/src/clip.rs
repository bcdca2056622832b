//! Calendar clipping and per-day segmentation of intervals.
//!
//! Clipping intersects an interval with a calendar span (a local day or week)
//! and yields the portion that falls inside it. Segmentation splits an
//! interval into consecutive pieces along local midnights for timeline
//! rendering. Both are pure functions of the interval, the calendar and `now`.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{Calendar, Component, Span};
use crate::interval::Interval;

/// Subtracted from an exclusive span end when clamping an interval end to it.
///
/// Keeps the clamped end strictly inside the span being queried.
pub const CLAMP_TICK: Duration = Duration::seconds(1);

/// A piece of an interval, `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Segment {
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whole seconds covered by the segment.
    pub fn seconds(&self) -> i64 {
        self.duration().num_seconds()
    }
}

/// Clips `interval` to an explicit span.
///
/// The interval's end (or `now`, while running) is clamped to
/// `span.end - CLAMP_TICK` when it reaches the span end. Returns `None` for
/// intervals that never started or that do not intersect the span.
pub fn clip_to_span(interval: &Interval, span: Span, now: DateTime<Utc>) -> Option<Segment> {
    let start = interval.start?.max(span.start);

    let mut end = interval.effective_end(now);
    if end >= span.end {
        end = span.end - CLAMP_TICK;
    }

    (end > start).then(|| Segment::new(start, end))
}

/// Clips `interval` to the calendar span of `component` containing `reference`.
///
/// Returns `None` if the interval never started, does not intersect the span,
/// or the calendar cannot resolve the span.
pub fn clip<Tz: TimeZone>(
    interval: &Interval,
    calendar: &Calendar<Tz>,
    component: Component,
    reference: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<Segment> {
    interval.start?;
    let Some(span) = calendar.span(component, reference) else {
        tracing::warn!(
            interval = %interval.id,
            component = component.as_str(),
            %reference,
            "calendar could not resolve span, skipping interval"
        );
        return None;
    };
    clip_to_span(interval, span, now)
}

/// Seconds of `interval` inside the span of `component` containing `reference`.
///
/// Zero whenever [`clip`] returns `None`.
pub fn clipped_seconds<Tz: TimeZone>(
    interval: &Interval,
    calendar: &Calendar<Tz>,
    component: Component,
    reference: DateTime<Utc>,
    now: DateTime<Utc>,
) -> i64 {
    clip(interval, calendar, component, reference, now).map_or(0, |segment| segment.seconds())
}

/// Splits `interval` into consecutive per-day segments.
///
/// The segments are ordered, contiguous and non-overlapping, and together cover
/// exactly `[start, end]` (with `now` standing in for a missing end). Intervals
/// of one second or less are never split.
pub fn daily_segments<Tz: TimeZone>(
    interval: &Interval,
    calendar: &Calendar<Tz>,
    now: DateTime<Utc>,
) -> Vec<Segment> {
    let Some(start) = interval.start else {
        return Vec::new();
    };
    let end = interval.effective_end(now);
    if end <= start {
        return Vec::new();
    }
    if end - start <= Duration::seconds(1) {
        return vec![Segment::new(start, end)];
    }

    let mut segments = Vec::new();
    let mut checkpoint = start;
    loop {
        let Some(day_end) = calendar.end_of_day(checkpoint) else {
            tracing::warn!(
                interval = %interval.id,
                %checkpoint,
                "calendar could not resolve end of day, dropping segments"
            );
            return Vec::new();
        };
        if day_end <= checkpoint {
            tracing::warn!(
                interval = %interval.id,
                %checkpoint,
                %day_end,
                "calendar day does not advance, dropping segments"
            );
            return Vec::new();
        }
        if day_end >= end {
            segments.push(Segment::new(checkpoint, end));
            return segments;
        }
        segments.push(Segment::new(checkpoint, day_end));
        checkpoint = day_end;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Weekday};

    use super::*;
    use crate::types::ProjectId;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn calendar() -> Calendar<Utc> {
        Calendar::new(Utc, Weekday::Mon)
    }

    fn interval(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Interval {
        let mut interval = Interval::pending_at(
            ProjectId::new("project").unwrap(),
            utc(1989, 9, 1, 0, 0, 0),
        );
        interval.start = start;
        interval.end = end;
        interval
    }

    fn closed(start: DateTime<Utc>, end: DateTime<Utc>) -> Interval {
        interval(Some(start), Some(end))
    }

    // ========== daily_segments ==========

    #[test]
    fn segments_without_start_are_empty() {
        let now = utc(1989, 9, 9, 12, 0, 0);
        assert!(daily_segments(&interval(None, None), &calendar(), now).is_empty());
        assert!(daily_segments(&interval(None, Some(now)), &calendar(), now).is_empty());
    }

    #[test]
    fn segments_of_inverted_interval_are_empty() {
        let period = closed(utc(1989, 9, 9, 9, 23, 23), utc(1989, 9, 9, 9, 23, 22));
        assert!(daily_segments(&period, &calendar(), utc(2000, 1, 1, 0, 0, 0)).is_empty());
    }

    #[test]
    fn segments_of_zero_length_interval_are_empty() {
        let at = utc(1989, 9, 9, 9, 23, 23);
        assert!(daily_segments(&closed(at, at), &calendar(), at).is_empty());
    }

    #[test]
    fn one_second_interval_is_single_segment() {
        let start = utc(1989, 9, 9, 9, 23, 23);
        let end = utc(1989, 9, 9, 9, 23, 24);
        assert_eq!(
            daily_segments(&closed(start, end), &calendar(), end),
            vec![Segment::new(start, end)]
        );
    }

    #[test]
    fn one_second_across_midnight_is_not_split() {
        let start = utc(1989, 9, 9, 23, 59, 59);
        let end = utc(1989, 9, 10, 0, 0, 0);
        assert_eq!(
            daily_segments(&closed(start, end), &calendar(), end),
            vec![Segment::new(start, end)]
        );
    }

    #[test]
    fn one_second_after_midnight_is_single_segment() {
        let start = utc(1989, 9, 10, 0, 0, 0);
        let end = utc(1989, 9, 10, 0, 0, 1);
        assert_eq!(
            daily_segments(&closed(start, end), &calendar(), end),
            vec![Segment::new(start, end)]
        );
    }

    #[test]
    fn two_seconds_across_midnight_split_at_midnight() {
        let start = utc(1989, 9, 9, 23, 59, 59);
        let end = utc(1989, 9, 10, 0, 0, 1);
        let midnight = utc(1989, 9, 10, 0, 0, 0);
        assert_eq!(
            daily_segments(&closed(start, end), &calendar(), end),
            vec![Segment::new(start, midnight), Segment::new(midnight, end)]
        );
    }

    #[test]
    fn same_day_interval_is_single_segment() {
        let start = utc(1989, 9, 10, 15, 0, 0);
        let end = utc(1989, 9, 10, 17, 4, 1);
        assert_eq!(
            daily_segments(&closed(start, end), &calendar(), end),
            vec![Segment::new(start, end)]
        );
    }

    #[test]
    fn interval_ending_at_midnight_has_no_empty_tail() {
        let start = utc(1989, 9, 10, 15, 0, 0);
        let end = utc(1989, 9, 11, 0, 0, 0);
        assert_eq!(
            daily_segments(&closed(start, end), &calendar(), end),
            vec![Segment::new(start, end)]
        );
    }

    #[test]
    fn three_day_interval_is_split_per_day() {
        let start = utc(1989, 9, 10, 15, 0, 0);
        let end = utc(1989, 9, 12, 0, 0, 1);
        let first_midnight = utc(1989, 9, 11, 0, 0, 0);
        let second_midnight = utc(1989, 9, 12, 0, 0, 0);

        assert_eq!(
            daily_segments(&closed(start, end), &calendar(), end),
            vec![
                Segment::new(start, first_midnight),
                Segment::new(first_midnight, second_midnight),
                Segment::new(second_midnight, end),
            ]
        );
    }

    #[test]
    fn running_interval_is_segmented_up_to_now() {
        let start = utc(1989, 9, 10, 22, 0, 0);
        let now = utc(1989, 9, 11, 1, 30, 0);
        let segments = daily_segments(&interval(Some(start), None), &calendar(), now);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].end, now);
    }

    #[test]
    fn segments_follow_local_midnight() {
        // UTC-5: local midnight is 05:00 UTC
        let calendar = Calendar::new(FixedOffset::west_opt(5 * 3600).unwrap(), Weekday::Mon);
        let start = utc(2024, 3, 1, 3, 0, 0);
        let end = utc(2024, 3, 1, 7, 0, 0);
        let local_midnight = utc(2024, 3, 1, 5, 0, 0);

        assert_eq!(
            daily_segments(&closed(start, end), &calendar, end),
            vec![
                Segment::new(start, local_midnight),
                Segment::new(local_midnight, end)
            ]
        );
    }

    #[test]
    fn segments_partition_the_interval() {
        let start = utc(2024, 2, 27, 13, 17, 5);
        let end = utc(2024, 3, 4, 8, 2, 59);
        let segments = daily_segments(&closed(start, end), &calendar(), end);

        // Feb 27..=Mar 4 in a leap year: 7 days touched
        assert_eq!(segments.len(), 7);
        assert_eq!(segments.first().unwrap().start, start);
        assert_eq!(segments.last().unwrap().end, end);
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert!(pair[0].start < pair[0].end);
        }
        let total: Duration = segments.iter().map(Segment::duration).sum();
        assert_eq!(total, end - start);
    }

    #[test]
    fn segmentation_is_idempotent() {
        let period = closed(utc(2024, 5, 1, 20, 0, 0), utc(2024, 5, 3, 4, 0, 0));
        let now = utc(2024, 6, 1, 0, 0, 0);
        assert_eq!(
            daily_segments(&period, &calendar(), now),
            daily_segments(&period, &calendar(), now)
        );
    }

    // ========== clip ==========

    #[test]
    fn clip_without_start_is_none() {
        let now = utc(2024, 5, 1, 12, 0, 0);
        assert_eq!(
            clip(&interval(None, None), &calendar(), Component::Day, now, now),
            None
        );
        assert_eq!(
            clip(&interval(None, Some(now)), &calendar(), Component::Day, now, now),
            None
        );
    }

    #[test]
    fn clip_inside_day_returns_interval() {
        let start = utc(2024, 5, 1, 9, 0, 0);
        let end = utc(2024, 5, 1, 10, 0, 0);
        let segment = clip(&closed(start, end), &calendar(), Component::Day, end, end).unwrap();

        assert_eq!(segment, Segment::new(start, end));
        assert_eq!(segment.seconds(), 3600);
    }

    #[test]
    fn clip_moves_start_to_span_start() {
        let period = closed(utc(2024, 4, 30, 23, 0, 0), utc(2024, 5, 1, 1, 0, 0));
        let reference = utc(2024, 5, 1, 12, 0, 0);
        let segment = clip(&period, &calendar(), Component::Day, reference, reference).unwrap();

        assert_eq!(segment.start, utc(2024, 5, 1, 0, 0, 0));
        assert_eq!(segment.seconds(), 3600);
    }

    #[test]
    fn clip_clamps_end_one_tick_before_span_end() {
        let period = closed(utc(2024, 5, 1, 23, 0, 0), utc(2024, 5, 2, 1, 0, 0));
        let reference = utc(2024, 5, 1, 12, 0, 0);
        let segment = clip(&period, &calendar(), Component::Day, reference, reference).unwrap();

        assert_eq!(segment.end, utc(2024, 5, 1, 23, 59, 59));
        assert_eq!(segment.seconds(), 3599);
    }

    #[test]
    fn clip_running_interval_uses_now() {
        let period = interval(Some(utc(2024, 5, 1, 9, 0, 0)), None);
        let now = utc(2024, 5, 1, 9, 15, 0);
        assert_eq!(
            clipped_seconds(&period, &calendar(), Component::Day, now, now),
            900
        );
    }

    #[test]
    fn clip_running_interval_from_yesterday_counts_today_only() {
        let period = interval(Some(utc(2024, 5, 1, 22, 0, 0)), None);
        let now = utc(2024, 5, 2, 1, 0, 0);
        assert_eq!(
            clipped_seconds(&period, &calendar(), Component::Day, now, now),
            3600
        );
    }

    #[test]
    fn clip_outside_span_is_none() {
        let period = closed(utc(2024, 5, 1, 9, 0, 0), utc(2024, 5, 1, 10, 0, 0));
        let reference = utc(2024, 5, 2, 12, 0, 0);
        assert_eq!(
            clip(&period, &calendar(), Component::Day, reference, reference),
            None
        );

        let later = closed(utc(2024, 5, 3, 9, 0, 0), utc(2024, 5, 3, 10, 0, 0));
        assert_eq!(
            clip(&later, &calendar(), Component::Day, reference, reference),
            None
        );
    }

    #[test]
    fn clip_never_negative() {
        let inverted = closed(utc(2024, 5, 1, 10, 0, 0), utc(2024, 5, 1, 9, 0, 0));
        let reference = utc(2024, 5, 1, 12, 0, 0);
        assert_eq!(
            clip(&inverted, &calendar(), Component::Day, reference, reference),
            None
        );
        assert_eq!(
            clipped_seconds(&inverted, &calendar(), Component::Day, reference, reference),
            0
        );
    }

    #[test]
    fn clip_week_spans_multiple_days() {
        // Mon Jan 27 .. Mon Feb 3, 2025
        let period = closed(utc(2025, 1, 26, 22, 0, 0), utc(2025, 1, 28, 2, 0, 0));
        let reference = utc(2025, 1, 29, 12, 0, 0);
        let segment = clip(&period, &calendar(), Component::Week, reference, reference).unwrap();

        assert_eq!(segment.start, utc(2025, 1, 27, 0, 0, 0));
        assert_eq!(segment.seconds(), 26 * 3600);
    }

    #[test]
    fn adjacent_days_do_not_double_count() {
        let period = closed(utc(2024, 5, 1, 23, 0, 0), utc(2024, 5, 2, 1, 0, 0));
        let now = utc(2024, 5, 3, 0, 0, 0);
        let day = |reference| clipped_seconds(&period, &calendar(), Component::Day, reference, now);
        let day_a = day(utc(2024, 5, 1, 8, 0, 0));
        let day_b = day(utc(2024, 5, 2, 8, 0, 0));
        let total = period.seconds(now).unwrap();

        assert_eq!(day_a, 3599);
        assert_eq!(day_b, 3600);
        assert!(day_a + day_b <= total);
        assert_eq!(total - (day_a + day_b), CLAMP_TICK.num_seconds());
    }

    #[test]
    fn clip_is_idempotent() {
        let period = closed(utc(2024, 5, 1, 23, 0, 0), utc(2024, 5, 2, 1, 0, 0));
        let reference = utc(2024, 5, 2, 8, 0, 0);
        assert_eq!(
            clip(&period, &calendar(), Component::Day, reference, reference),
            clip(&period, &calendar(), Component::Day, reference, reference)
        );
    }
}
