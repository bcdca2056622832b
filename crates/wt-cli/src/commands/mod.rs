//! CLI subcommand implementations.
//!
//! Every command writes to a caller-supplied writer and takes `now` explicitly,
//! so tests can drive them against an in-memory database and a fixed clock.

pub mod periods;
pub mod report;
pub mod start;
pub mod status;
pub mod stop;
pub mod timeline;
pub mod util;

/// A tracker persisted in SQLite.
pub type SqliteTracker<Tz> = wt_core::Tracker<wt_db::Database, Tz>;
