//! # Schoolplanner - storage core for a school planner
//!
//! Typed entities (teachers, subjects, homework, exams, grades, periods,
//! lessons, weekdays, schedules) persisted in SQLite with foreign keys.
//!
//! Schoolplanner provides:
//! - Schema management for the nine tables and their cascade policy
//! - A row codec that hydrates nested references on every read
//! - A resolver that creates missing dependencies on insert and
//!   reconciles owned child collections instead of duplicating them
//! - Impact counting and a confirmation-gated delete coordinator

pub mod entity;
pub mod storage;
pub mod resolver;
pub mod impact;
pub mod delete;
pub mod seed;
pub mod import;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use entity::{Day, EntityKind, Exam, Grade, Homework, Lesson, Period, Schedule, Subject, Teacher, Weekday};
pub use storage::{Record, SqliteStore};
pub use resolver::Upsert;
pub use delete::{ConfirmDelete, Decision, DeleteCoordinator, DeleteOutcome, DeleteRequest};

use rusqlite::ErrorCode;

/// Result type alias for Schoolplanner operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Schoolplanner operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{kind} #{id} not found")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("{kind} #{id} already exists or violates a uniqueness constraint")]
    AlreadyExists { kind: EntityKind, id: i64 },

    #[error("Store failure during {operation} on {target}: {source}")]
    StoreFailure {
        operation: Operation,
        target: Target,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Unknown entity kind: {0}")]
    UnknownKind(String),

    #[error("Unknown weekday: {0}")]
    UnknownDay(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Maps a raw SQLite error into the typed outcome for `target`.
    ///
    /// Only row-scoped failures can become `NotFound` or `AlreadyExists`.
    pub(crate) fn from_sql(source: rusqlite::Error, operation: Operation, target: Target) -> Self {
        match (target, &source) {
            (Target::Row(kind, id), rusqlite::Error::QueryReturnedNoRows) => Error::NotFound { kind, id },
            (Target::Row(kind, id), rusqlite::Error::SqliteFailure(failure, _)) if is_conflict(failure) => {
                Error::AlreadyExists { kind, id }
            }
            _ => Error::StoreFailure {
                operation,
                target,
                source,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists { .. })
    }
}

fn is_conflict(failure: &rusqlite::ffi::Error) -> bool {
    failure.code == ErrorCode::ConstraintViolation
        && matches!(
            failure.extended_code,
            rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
}

/// The storage operation that was running when an error surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Open,
    Schema,
    Transaction,
    Read,
    Insert,
    Update,
    Delete,
    Count,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Open => "open",
            Operation::Schema => "schema setup",
            Operation::Transaction => "transaction",
            Operation::Read => "read",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Count => "count",
        };
        f.write_str(name)
    }
}

/// What an operation was aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Schema,
    Table(EntityKind),
    Row(EntityKind, i64),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Schema => f.write_str("schema"),
            Target::Table(kind) => write!(f, "table {}", kind),
            Target::Row(kind, id) => write!(f, "{} #{}", kind, id),
        }
    }
}

/// Attaches operation context to raw `rusqlite` results.
pub(crate) trait SqlResultExt<T> {
    fn during(self, operation: Operation, target: Target) -> Result<T>;
}

impl<T> SqlResultExt<T> for rusqlite::Result<T> {
    fn during(self, operation: Operation, target: Target) -> Result<T> {
        self.map_err(|err| Error::from_sql(err, operation, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_row_maps_to_not_found() {
        let err = Error::from_sql(
            rusqlite::Error::QueryReturnedNoRows,
            Operation::Read,
            Target::Row(EntityKind::Exam, 4),
        );
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "exam #4 not found");
    }

    #[test]
    fn test_table_scoped_errors_stay_store_failures() {
        let err = Error::from_sql(
            rusqlite::Error::QueryReturnedNoRows,
            Operation::Count,
            Target::Table(EntityKind::Lesson),
        );
        match err {
            Error::StoreFailure { operation, target, .. } => {
                assert_eq!(operation, Operation::Count);
                assert_eq!(target, Target::Table(EntityKind::Lesson));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_primary_key_conflict_maps_to_already_exists() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY NOT NULL); INSERT INTO t VALUES (1);")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t VALUES (1)", [])
            .during(Operation::Insert, Target::Row(EntityKind::Teacher, 1))
            .unwrap_err();
        assert!(err.is_already_exists());
    }
}
