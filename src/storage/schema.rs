//! Database schema definitions
//!
//! Every required reference is declared `ON DELETE CASCADE ON UPDATE CASCADE`,
//! so deleting a parent row removes its dependents inside SQLite itself.
//! `lesson.weekday_id` and `weekday.schedule_id` use the same policy but are
//! nullable.

use rusqlite::Connection;
use crate::{Operation, Result, SqlResultExt, Target};

/// SQL to create the subject table
pub const CREATE_SUBJECT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS subject (
    id INTEGER PRIMARY KEY NOT NULL,
    teacher_id INTEGER NOT NULL
        REFERENCES teacher(id) ON DELETE CASCADE ON UPDATE CASCADE,
    name VARCHAR NOT NULL,
    room VARCHAR NOT NULL,
    color VARCHAR NOT NULL
)
"#;

/// SQL to create the teacher table
pub const CREATE_TEACHER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS teacher (
    id INTEGER PRIMARY KEY NOT NULL,
    name VARCHAR NOT NULL,
    abbreviation VARCHAR UNIQUE,
    gender CHAR NOT NULL
)
"#;

/// SQL to create the homework table
pub const CREATE_HOMEWORK_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS homework (
    id INTEGER PRIMARY KEY NOT NULL,
    subject_id INTEGER NOT NULL
        REFERENCES subject(id) ON DELETE CASCADE ON UPDATE CASCADE,
    description TEXT NOT NULL,
    deadline DATE NOT NULL,
    done INTEGER
)
"#;

/// SQL to create the exam table
pub const CREATE_EXAM_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS exam (
    id INTEGER PRIMARY KEY NOT NULL,
    subject_id INTEGER NOT NULL
        REFERENCES subject(id) ON DELETE CASCADE ON UPDATE CASCADE,
    description TEXT NOT NULL,
    deadline DATE NOT NULL
)
"#;

/// SQL to create the grade table
pub const CREATE_GRADE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS grade (
    id INTEGER PRIMARY KEY NOT NULL,
    subject_id INTEGER NOT NULL
        REFERENCES subject(id) ON DELETE CASCADE ON UPDATE CASCADE,
    name VARCHAR NOT NULL,
    grade VARCHAR NOT NULL
)
"#;

/// SQL to create the period table
pub const CREATE_PERIOD_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS period (
    id INTEGER PRIMARY KEY NOT NULL,
    school_hour_no INTEGER NOT NULL,
    start_time TIME NOT NULL,
    end_time TIME NOT NULL
)
"#;

/// SQL to create the lesson table
pub const CREATE_LESSON_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS lesson (
    id INTEGER PRIMARY KEY NOT NULL,
    subject_id INTEGER NOT NULL
        REFERENCES subject(id) ON DELETE CASCADE ON UPDATE CASCADE,
    period_id INTEGER NOT NULL
        REFERENCES period(id) ON DELETE CASCADE ON UPDATE CASCADE,
    weekday_id INTEGER
        REFERENCES weekday(id) ON DELETE CASCADE ON UPDATE CASCADE
)
"#;

/// SQL to create the weekday table
pub const CREATE_WEEKDAY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS weekday (
    id INTEGER PRIMARY KEY NOT NULL,
    schedule_id INTEGER
        REFERENCES schedule(id) ON DELETE CASCADE ON UPDATE CASCADE,
    name VARCHAR NOT NULL
)
"#;

/// SQL to create the schedule table
pub const CREATE_SCHEDULE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schedule (
    id INTEGER PRIMARY KEY NOT NULL,
    name VARCHAR NOT NULL
)
"#;

/// Indexes on every foreign key column, used by impact counting and hydration
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_subject_teacher ON subject(teacher_id)",
    "CREATE INDEX IF NOT EXISTS idx_homework_subject ON homework(subject_id)",
    "CREATE INDEX IF NOT EXISTS idx_exam_subject ON exam(subject_id)",
    "CREATE INDEX IF NOT EXISTS idx_grade_subject ON grade(subject_id)",
    "CREATE INDEX IF NOT EXISTS idx_lesson_subject ON lesson(subject_id)",
    "CREATE INDEX IF NOT EXISTS idx_lesson_period ON lesson(period_id)",
    "CREATE INDEX IF NOT EXISTS idx_lesson_weekday ON lesson(weekday_id)",
    "CREATE INDEX IF NOT EXISTS idx_weekday_schedule ON weekday(schedule_id)",
];

/// Children before parents, so no drop has to cascade
pub const DROP_ORDER: &[&str] = &[
    "homework", "exam", "grade", "lesson", "weekday", "schedule", "subject", "teacher", "period",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_SUBJECT_TABLE,
        CREATE_TEACHER_TABLE,
        CREATE_HOMEWORK_TABLE,
        CREATE_EXAM_TABLE,
        CREATE_GRADE_TABLE,
        CREATE_PERIOD_TABLE,
        CREATE_LESSON_TABLE,
        CREATE_WEEKDAY_TABLE,
        CREATE_SCHEDULE_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// Proof that the caller really wants every row gone.
///
/// [`reset`] is unreachable without one of these.
#[derive(Debug)]
pub struct ResetConfirmation(());

impl ResetConfirmation {
    pub fn discard_all_data() -> Self {
        Self(())
    }
}

/// Create all nine tables and their indexes in one transaction (idempotent)
pub fn create_all(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction().during(Operation::Schema, Target::Schema)?;
    create_tables(&tx)?;
    tx.commit().during(Operation::Schema, Target::Schema)?;
    tracing::debug!("schema ready");
    Ok(())
}

/// Drop all nine tables in one transaction
pub fn drop_all(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction().during(Operation::Schema, Target::Schema)?;
    drop_tables(&tx)?;
    tx.commit().during(Operation::Schema, Target::Schema)?;
    tracing::info!("all tables dropped");
    Ok(())
}

/// Drop and recreate the schema, discarding every row. Drops and creates
/// share one transaction, so a failed create leaves the old schema in place.
pub fn reset(conn: &mut Connection, _confirmation: ResetConfirmation) -> Result<()> {
    let tx = conn.transaction().during(Operation::Schema, Target::Schema)?;
    drop_tables(&tx)?;
    create_tables(&tx)?;
    tx.commit().during(Operation::Schema, Target::Schema)?;
    tracing::info!("database reset");
    Ok(())
}

fn create_tables(conn: &Connection) -> Result<()> {
    for stmt in all_schema_statements() {
        conn.execute(stmt, []).during(Operation::Schema, Target::Schema)?;
    }
    Ok(())
}

fn drop_tables(conn: &Connection) -> Result<()> {
    for table in DROP_ORDER {
        conn.execute(&format!("DROP TABLE IF EXISTS {}", table), [])
            .during(Operation::Schema, Target::Schema)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect()
    }

    #[test]
    fn test_create_all_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        create_all(&mut conn).unwrap();
        create_all(&mut conn).unwrap();

        let mut names = table_names(&conn);
        names.sort();
        let mut expected: Vec<String> = DROP_ORDER.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_drop_all_removes_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        create_all(&mut conn).unwrap();
        drop_all(&mut conn).unwrap();
        assert!(table_names(&conn).is_empty());
    }

    #[test]
    fn test_reset_discards_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        create_all(&mut conn).unwrap();
        conn.execute("INSERT INTO schedule VALUES (1, 'a')", []).unwrap();

        reset(&mut conn, ResetConfirmation::discard_all_data()).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schedule", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_failed_reset_keeps_old_schema_and_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        create_all(&mut conn).unwrap();
        conn.execute("INSERT INTO schedule VALUES (1, 'a')", []).unwrap();
        // A view squatting on an index name makes the recreate step fail.
        conn.execute_batch(
            "DROP INDEX idx_weekday_schedule;
             CREATE VIEW idx_weekday_schedule AS SELECT 1;",
        )
        .unwrap();

        assert!(reset(&mut conn, ResetConfirmation::discard_all_data()).is_err());

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schedule", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(table_names(&conn).len(), DROP_ORDER.len());
    }

    #[test]
    fn test_foreign_keys_cascade() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        create_all(&mut conn).unwrap();
        conn.execute_batch(
            "INSERT INTO teacher VALUES (1, 'Dickens', 'DICK', 'f');
             INSERT INTO subject VALUES (1, 1, 'German', 'B308', '#ff0000');
             INSERT INTO exam VALUES (1, 1, 'German Test', '2017-5-3');
             DELETE FROM teacher WHERE id = 1;",
        )
        .unwrap();

        let exams: i64 = conn
            .query_row("SELECT COUNT(*) FROM exam", [], |row| row.get(0))
            .unwrap();
        assert_eq!(exams, 0);
    }
}
