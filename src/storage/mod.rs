//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - teacher(id, name, abbreviation, gender)
//! - subject(id, teacher_id, name, room, color)
//! - homework(id, subject_id, description, deadline, done)
//! - exam(id, subject_id, description, deadline)
//! - grade(id, subject_id, name, grade)
//! - period(id, school_hour_no, start_time, end_time)
//! - lesson(id, subject_id, period_id, weekday_id)
//! - weekday(id, schedule_id, name)
//! - schedule(id, name)

pub mod schema;
pub mod codec;
pub mod ids;
pub mod sqlite;

pub use codec::Record;
pub use schema::ResetConfirmation;
pub use sqlite::{DbStats, SqliteStore};
