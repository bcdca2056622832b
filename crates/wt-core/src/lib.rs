//! Interval accounting engine for the work time tracker.
//!
//! This crate contains the domain types and logic for:
//! - Intervals: pending, running and stopped spans of work per project
//! - Calendar clipping: the part of an interval inside a local day or week
//! - Range predicates: declarative filters a store translates to queries
//! - Active registry and running totals, behind the [`Tracker`] facade

pub mod cache;
pub mod calendar;
pub mod clip;
pub mod filter;
pub mod format;
pub mod interval;
pub mod project;
pub mod registry;
pub mod store;
pub mod tracker;
pub mod types;

pub use cache::AggregateCache;
pub use calendar::{Calendar, Component, Span};
pub use clip::{CLAMP_TICK, Segment, clip, clip_to_span, clipped_seconds, daily_segments};
pub use filter::{IntervalPredicate, ranged_predicate};
pub use format::{format_duration, format_percentage, radix_transform};
pub use interval::Interval;
pub use project::Project;
pub use registry::{ActiveRegistry, CorruptReason, CorruptRecord};
pub use store::{IntervalStore, MemoryStore};
pub use tracker::{ProjectTotal, Tracker};
pub use types::{IntervalId, IntervalStatus, ProjectId, ValidationError};
