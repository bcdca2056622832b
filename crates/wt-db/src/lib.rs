//! Storage layer for the work time tracker.
//!
//! Persists projects and intervals using `rusqlite` and implements
//! [`IntervalStore`] so a [`wt_core::Tracker`] can run on top of it.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` (and a tracker owning one) can be moved between threads but needs a
//! `Mutex` to be shared.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC with a fixed nine-digit fraction
//! (e.g. `2024-01-15T10:30:00.000000000Z`). The fixed width means:
//! - Lexicographic ordering matches chronological ordering
//! - Values round-trip without losing precision
//! - Human-readable values in the database
//!
//! ## Predicates
//!
//! Every [`IntervalPredicate`] variant is translated into a `WHERE` clause over
//! `start_time`/`end_time`. The translation must agree with
//! [`IntervalPredicate::matches`]; the tests check both against the same fixtures.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use thiserror::Error;
use wt_core::{
    Interval, IntervalId, IntervalPredicate, IntervalStore, Project, ProjectId, ValidationError,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored timestamp is not valid RFC 3339.
    #[error("invalid {column} for {record_id}: {timestamp}")]
    TimestampParse {
        column: &'static str,
        record_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored identifier failed validation.
    #[error("invalid stored record: {0}")]
    Validation(#[from] ValidationError),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// An interval row before timestamp parsing.
struct IntervalRow {
    id: String,
    created_at: String,
    project_id: String,
    start_time: Option<String>,
    end_time: Option<String>,
    notes: Option<String>,
}

impl IntervalRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            created_at: row.get(1)?,
            project_id: row.get(2)?,
            start_time: row.get(3)?,
            end_time: row.get(4)?,
            notes: row.get(5)?,
        })
    }

    fn into_interval(self) -> Result<Interval, DbError> {
        let created_at = parse_timestamp(&self.created_at, "created_at", &self.id)?;
        let start = self
            .start_time
            .as_deref()
            .map(|ts| parse_timestamp(ts, "start_time", &self.id))
            .transpose()?;
        let end = self
            .end_time
            .as_deref()
            .map(|ts| parse_timestamp(ts, "end_time", &self.id))
            .transpose()?;

        Ok(Interval {
            id: IntervalId::new(self.id)?,
            created_at,
            start,
            end,
            project: ProjectId::new(self.project_id)?,
            notes: self.notes,
        })
    }
}

/// A project row before timestamp parsing.
struct ProjectRow {
    id: String,
    name: String,
    color: Option<u32>,
    parent_id: Option<String>,
    notes: Option<String>,
    created_at: String,
    last_accessed_at: Option<String>,
}

impl ProjectRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
            parent_id: row.get(3)?,
            notes: row.get(4)?,
            created_at: row.get(5)?,
            last_accessed_at: row.get(6)?,
        })
    }

    fn into_project(self) -> Result<Project, DbError> {
        let created_at = parse_timestamp(&self.created_at, "created_at", &self.id)?;
        let last_accessed_at = self
            .last_accessed_at
            .as_deref()
            .map(|ts| parse_timestamp(ts, "last_accessed_at", &self.id))
            .transpose()?;

        Ok(Project {
            id: ProjectId::new(self.id)?,
            name: self.name,
            color: self.color,
            parent: self.parent_id.map(ProjectId::new).transpose()?,
            notes: self.notes,
            created_at,
            last_accessed_at,
        })
    }
}

const INTERVAL_COLUMNS: &str = "id, created_at, project_id, start_time, end_time, notes";
const PROJECT_COLUMNS: &str = "id, name, color, parent_id, notes, created_at, last_accessed_at";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                color INTEGER,
                parent_id TEXT,
                notes TEXT,
                created_at TEXT NOT NULL,
                last_accessed_at TEXT,
                FOREIGN KEY (parent_id) REFERENCES projects(id) ON DELETE SET NULL
            );

            -- Intervals table: one row per tracked span of work
            -- start_time NULL: pending; end_time NULL: pending or running
            CREATE TABLE IF NOT EXISTS intervals (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                project_id TEXT NOT NULL,
                start_time TEXT,
                end_time TEXT,
                notes TEXT,
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_intervals_start ON intervals(start_time);
            CREATE INDEX IF NOT EXISTS idx_intervals_end ON intervals(end_time);
            CREATE INDEX IF NOT EXISTS idx_intervals_project ON intervals(project_id);
            ",
        )?;
        Ok(())
    }

    // ========== Projects ==========

    /// Creates a project named after its ID if it does not exist yet.
    ///
    /// Returns true if a row was created.
    pub fn ensure_project(&self, id: &ProjectId, now: DateTime<Utc>) -> Result<bool, DbError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO projects (id, name, created_at) VALUES (?1, ?1, ?2)",
            params![id.as_str(), format_timestamp(now)],
        )?;
        if inserted > 0 {
            tracing::debug!(project = %id, "created project");
        }
        Ok(inserted > 0)
    }

    /// Looks up a project by ID.
    pub fn get_project(&self, id: &ProjectId) -> Result<Option<Project>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"),
                [id.as_str()],
                ProjectRow::from_row,
            )
            .optional()?;
        row.map(ProjectRow::into_project).transpose()
    }

    /// Lists projects, most recently used first, then by ID.
    pub fn list_projects(&self) -> Result<Vec<Project>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {PROJECT_COLUMNS}
            FROM projects
            ORDER BY last_accessed_at IS NULL, last_accessed_at DESC, id ASC
            "
        ))?;
        let rows = stmt.query_map([], ProjectRow::from_row)?;
        let mut projects = Vec::new();
        for row in rows {
            projects.push(row?.into_project()?);
        }
        Ok(projects)
    }
}

impl IntervalStore for Database {
    type Error = DbError;

    fn fetch(&self, predicate: &IntervalPredicate) -> Result<Vec<Interval>, DbError> {
        let (clause, bindings) = predicate_clause(predicate);
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {INTERVAL_COLUMNS}
            FROM intervals
            WHERE {clause}
            ORDER BY start_time ASC, id ASC
            "
        ))?;
        let rows = stmt.query_map(params_from_iter(bindings), IntervalRow::from_row)?;
        let mut intervals = Vec::new();
        for row in rows {
            intervals.push(row?.into_interval()?);
        }
        tracing::trace!(?predicate, count = intervals.len(), "fetched intervals");
        Ok(intervals)
    }

    /// Inserts the interval, creating its project first if needed.
    fn insert(&mut self, interval: &Interval) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO projects (id, name, created_at) VALUES (?1, ?1, ?2)",
            params![interval.project.as_str(), format_timestamp(interval.created_at)],
        )?;
        tx.execute(
            &format!("INSERT INTO intervals ({INTERVAL_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"),
            params![
                interval.id.as_str(),
                format_timestamp(interval.created_at),
                interval.project.as_str(),
                interval.start.map(format_timestamp),
                interval.end.map(format_timestamp),
                interval.notes,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn update(&mut self, interval: &Interval) -> Result<(), DbError> {
        let updated = self.conn.execute(
            "
            UPDATE intervals
            SET project_id = ?, start_time = ?, end_time = ?, notes = ?
            WHERE id = ?
            ",
            params![
                interval.project.as_str(),
                interval.start.map(format_timestamp),
                interval.end.map(format_timestamp),
                interval.notes,
                interval.id.as_str(),
            ],
        )?;
        if updated == 0 {
            tracing::warn!(interval = %interval.id, "update matched no stored interval");
        }
        Ok(())
    }

    fn delete(&mut self, id: &IntervalId) -> Result<(), DbError> {
        self.conn
            .execute("DELETE FROM intervals WHERE id = ?", [id.as_str()])?;
        Ok(())
    }

    fn touch_project(&mut self, project: &ProjectId, at: DateTime<Utc>) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE projects SET last_accessed_at = ? WHERE id = ?",
            params![format_timestamp(at), project.as_str()],
        )?;
        Ok(())
    }

    fn last_closed(&self) -> Result<Option<Interval>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "
                    SELECT {INTERVAL_COLUMNS}
                    FROM intervals
                    WHERE start_time IS NOT NULL AND end_time IS NOT NULL
                    ORDER BY end_time DESC, id DESC
                    LIMIT 1
                    "
                ),
                [],
                IntervalRow::from_row,
            )
            .optional()?;
        row.map(IntervalRow::into_interval).transpose()
    }
}

/// Translates a predicate into a `WHERE` clause and its positional bindings.
///
/// `?1` is the lower bound (`since` or range start), `?2` the range end.
fn predicate_clause(predicate: &IntervalPredicate) -> (&'static str, Vec<String>) {
    match *predicate {
        IntervalPredicate::Never => ("0", Vec::new()),
        IntervalPredicate::All => ("1", Vec::new()),
        IntervalPredicate::Closed => (
            "start_time IS NOT NULL AND end_time IS NOT NULL",
            Vec::new(),
        ),
        IntervalPredicate::Unclosed => ("start_time IS NULL OR end_time IS NULL", Vec::new()),
        IntervalPredicate::Touching { since } => (
            "start_time IS NOT NULL
             AND (start_time >= ?1 OR end_time IS NULL OR end_time > ?1)",
            vec![format_timestamp(since)],
        ),
        IntervalPredicate::Ranged { start, end } => (
            "start_time IS NOT NULL
             AND start_time < ?2
             AND (start_time >= ?1 OR end_time IS NULL OR end_time > ?1)",
            vec![format_timestamp(start), format_timestamp(end)],
        ),
    }
}

fn parse_timestamp(
    timestamp: &str,
    column: &'static str,
    record_id: &str,
) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            column,
            record_id: record_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
