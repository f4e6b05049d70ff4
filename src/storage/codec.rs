//! Row codec - entities to rows and back
//!
//! Decoding hydrates required references by recursively decoding the
//! referenced rows, so a `Lesson` comes back with its full `Subject`
//! (and that subject's `Teacher`) and `Period`. A missing row anywhere in
//! that chain surfaces as `NotFound`; no placeholder is ever substituted.
//!
//! Encoding is split per table into `insert_*_row` / `update_*_row`. Row
//! writers take already-resolved foreign key ids; making sure those ids
//! exist is the resolver's job.

use rusqlite::types::{Type, ValueRef};
use rusqlite::{params, Connection, Params};
use crate::entity::{sort_lessons, Day, Exam, Grade, Homework, Lesson, Period, Schedule, Subject, Teacher, Weekday};
use crate::{EntityKind, Error, Operation, Result, SqlResultExt, Target};

/// An entity that maps to exactly one row of its kind's table.
pub trait Record: Sized + Clone + PartialEq + std::fmt::Debug {
    const KIND: EntityKind;

    fn id(&self) -> i64;

    /// Decode the row at `id`, hydrating every required reference.
    fn fetch(conn: &Connection, id: i64) -> Result<Self>;
}

fn read_target<R: Record>(id: i64) -> Target {
    Target::Row(R::KIND, id)
}

fn conversion_error(column: usize, message: impl Into<String>) -> rusqlite::Error {
    let message: String = message.into();
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, message.into())
}

// ========== Decoding ==========

impl Record for Teacher {
    const KIND: EntityKind = EntityKind::Teacher;

    fn id(&self) -> i64 {
        self.id
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Self> {
        conn.query_row(
            "SELECT id, name, abbreviation, gender FROM teacher WHERE id = ?1",
            [id],
            row_to_teacher,
        )
        .during(Operation::Read, read_target::<Self>(id))
    }
}

fn row_to_teacher(row: &rusqlite::Row) -> rusqlite::Result<Teacher> {
    let stored: String = row.get(3)?;
    let mut chars = stored.chars();
    let gender = match (chars.next(), chars.next()) {
        (Some(gender), None) => gender,
        _ => return Err(conversion_error(3, format!("gender must be one character, got {stored:?}"))),
    };

    Ok(Teacher {
        id: row.get(0)?,
        name: row.get(1)?,
        abbreviation: row.get(2)?,
        gender,
    })
}

impl Record for Subject {
    const KIND: EntityKind = EntityKind::Subject;

    fn id(&self) -> i64 {
        self.id
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Self> {
        let (teacher_id, name, room, color): (i64, String, String, String) = conn
            .query_row(
                "SELECT teacher_id, name, room, color FROM subject WHERE id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .during(Operation::Read, read_target::<Self>(id))?;

        Ok(Subject {
            id,
            teacher: Teacher::fetch(conn, teacher_id)?,
            name,
            room,
            color,
        })
    }
}

impl Record for Homework {
    const KIND: EntityKind = EntityKind::Homework;

    fn id(&self) -> i64 {
        self.id
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Self> {
        let (subject_id, description, deadline, done): (i64, String, String, Option<bool>) = conn
            .query_row(
                "SELECT subject_id, description, deadline, done FROM homework WHERE id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .during(Operation::Read, read_target::<Self>(id))?;

        Ok(Homework {
            id,
            subject: Subject::fetch(conn, subject_id)?,
            description,
            deadline,
            done: done.unwrap_or(false),
        })
    }
}

impl Record for Exam {
    const KIND: EntityKind = EntityKind::Exam;

    fn id(&self) -> i64 {
        self.id
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Self> {
        let (subject_id, description, deadline): (i64, String, String) = conn
            .query_row(
                "SELECT subject_id, description, deadline FROM exam WHERE id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .during(Operation::Read, read_target::<Self>(id))?;

        Ok(Exam {
            id,
            subject: Subject::fetch(conn, subject_id)?,
            description,
            deadline,
        })
    }
}

impl Record for Grade {
    const KIND: EntityKind = EntityKind::Grade;

    fn id(&self) -> i64 {
        self.id
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Self> {
        let (subject_id, name, grade): (i64, String, String) = conn
            .query_row(
                "SELECT subject_id, name, grade FROM grade WHERE id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .during(Operation::Read, read_target::<Self>(id))?;

        Ok(Grade {
            id,
            subject: Subject::fetch(conn, subject_id)?,
            name,
            grade,
        })
    }
}

impl Record for Period {
    const KIND: EntityKind = EntityKind::Period;

    fn id(&self) -> i64 {
        self.id
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Self> {
        conn.query_row(
            "SELECT id, school_hour_no, start_time, end_time FROM period WHERE id = ?1",
            [id],
            |row| {
                Ok(Period {
                    id: row.get(0)?,
                    school_hour_no: row.get(1)?,
                    start_time: row.get(2)?,
                    end_time: row.get(3)?,
                })
            },
        )
        .during(Operation::Read, read_target::<Self>(id))
    }
}

impl Record for Lesson {
    const KIND: EntityKind = EntityKind::Lesson;

    fn id(&self) -> i64 {
        self.id
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Self> {
        let (subject_id, period_id, weekday_id): (i64, i64, Option<i64>) = conn
            .query_row(
                "SELECT subject_id, period_id, weekday_id FROM lesson WHERE id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .during(Operation::Read, read_target::<Self>(id))?;

        Ok(Lesson {
            id,
            subject: Subject::fetch(conn, subject_id)?,
            period: Period::fetch(conn, period_id)?,
            weekday_id,
        })
    }
}

impl Record for Weekday {
    const KIND: EntityKind = EntityKind::Weekday;

    fn id(&self) -> i64 {
        self.id
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Self> {
        let (schedule_id, name): (Option<i64>, Day) = conn
            .query_row(
                "SELECT schedule_id, name FROM weekday WHERE id = ?1",
                [id],
                |row| {
                    let label: String = row.get(1)?;
                    let day = label
                        .parse::<Day>()
                        .map_err(|e| conversion_error(1, e.to_string()))?;
                    Ok((row.get(0)?, day))
                },
            )
            .during(Operation::Read, read_target::<Self>(id))?;

        let mut lessons = lessons_of_weekday(conn, id)?;
        sort_lessons(&mut lessons);

        Ok(Weekday {
            id,
            name,
            lessons,
            schedule_id,
        })
    }
}

impl Record for Schedule {
    const KIND: EntityKind = EntityKind::Schedule;

    fn id(&self) -> i64 {
        self.id
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Self> {
        let name: String = conn
            .query_row("SELECT name FROM schedule WHERE id = ?1", [id], |row| row.get(0))
            .during(Operation::Read, read_target::<Self>(id))?;

        let mut schedule = Schedule::empty(id, name);
        for weekday in weekdays_of_schedule(conn, id)? {
            let slot = weekday.name.index();
            match &schedule.days[slot] {
                Some(kept) => {
                    tracing::warn!(
                        schedule = id,
                        kept = kept.id,
                        skipped = weekday.id,
                        day = %weekday.name,
                        "schedule has two weekdays with the same label"
                    );
                }
                None => schedule.days[slot] = Some(weekday),
            }
        }

        Ok(schedule)
    }
}

/// Lessons placed on a weekday, in school-hour order
pub fn lessons_of_weekday(conn: &Connection, weekday_id: i64) -> Result<Vec<Lesson>> {
    let ids = query_ids(
        conn,
        "SELECT lesson.id FROM lesson
         JOIN period ON period.id = lesson.period_id
         WHERE lesson.weekday_id = ?1
         ORDER BY period.school_hour_no, lesson.id",
        [weekday_id],
        Target::Row(EntityKind::Weekday, weekday_id),
    )?;
    ids.into_iter().map(|id| Lesson::fetch(conn, id)).collect()
}

/// Weekdays belonging to a schedule, lowest id first
pub fn weekdays_of_schedule(conn: &Connection, schedule_id: i64) -> Result<Vec<Weekday>> {
    let ids = query_ids(
        conn,
        "SELECT id FROM weekday WHERE schedule_id = ?1 ORDER BY id",
        [schedule_id],
        Target::Row(EntityKind::Schedule, schedule_id),
    )?;
    ids.into_iter().map(|id| Weekday::fetch(conn, id)).collect()
}

/// The lesson placed on `weekday_id` during `period_id`, if any
pub fn lesson_at(conn: &Connection, weekday_id: i64, period_id: i64) -> Result<Option<Lesson>> {
    let ids = query_ids(
        conn,
        "SELECT id FROM lesson WHERE weekday_id = ?1 AND period_id = ?2 ORDER BY id LIMIT 1",
        [weekday_id, period_id],
        Target::Table(EntityKind::Lesson),
    )?;
    ids.first().map(|id| Lesson::fetch(conn, *id)).transpose()
}

// ========== Encoding ==========

pub(crate) fn insert_teacher_row(conn: &Connection, id: i64, teacher: &Teacher) -> Result<()> {
    conn.execute(
        "INSERT INTO teacher (id, name, abbreviation, gender) VALUES (?1, ?2, ?3, ?4)",
        params![id, teacher.name, teacher.abbreviation, teacher.gender.to_string()],
    )
    .during(Operation::Insert, Target::Row(EntityKind::Teacher, id))?;
    Ok(())
}

pub(crate) fn insert_subject_row(conn: &Connection, id: i64, teacher_id: i64, subject: &Subject) -> Result<()> {
    conn.execute(
        "INSERT INTO subject (id, teacher_id, name, room, color) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, teacher_id, subject.name, subject.room, subject.color],
    )
    .during(Operation::Insert, Target::Row(EntityKind::Subject, id))?;
    Ok(())
}

pub(crate) fn insert_homework_row(conn: &Connection, id: i64, subject_id: i64, homework: &Homework) -> Result<()> {
    conn.execute(
        "INSERT INTO homework (id, subject_id, description, deadline, done) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, subject_id, homework.description, homework.deadline, homework.done],
    )
    .during(Operation::Insert, Target::Row(EntityKind::Homework, id))?;
    Ok(())
}

pub(crate) fn insert_exam_row(conn: &Connection, id: i64, subject_id: i64, exam: &Exam) -> Result<()> {
    conn.execute(
        "INSERT INTO exam (id, subject_id, description, deadline) VALUES (?1, ?2, ?3, ?4)",
        params![id, subject_id, exam.description, exam.deadline],
    )
    .during(Operation::Insert, Target::Row(EntityKind::Exam, id))?;
    Ok(())
}

pub(crate) fn insert_grade_row(conn: &Connection, id: i64, subject_id: i64, grade: &Grade) -> Result<()> {
    conn.execute(
        "INSERT INTO grade (id, subject_id, name, grade) VALUES (?1, ?2, ?3, ?4)",
        params![id, subject_id, grade.name, grade.grade],
    )
    .during(Operation::Insert, Target::Row(EntityKind::Grade, id))?;
    Ok(())
}

pub(crate) fn insert_period_row(conn: &Connection, id: i64, period: &Period) -> Result<()> {
    conn.execute(
        "INSERT INTO period (id, school_hour_no, start_time, end_time) VALUES (?1, ?2, ?3, ?4)",
        params![id, period.school_hour_no, period.start_time, period.end_time],
    )
    .during(Operation::Insert, Target::Row(EntityKind::Period, id))?;
    Ok(())
}

pub(crate) fn insert_lesson_row(
    conn: &Connection,
    id: i64,
    subject_id: i64,
    period_id: i64,
    weekday_id: Option<i64>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO lesson (id, subject_id, period_id, weekday_id) VALUES (?1, ?2, ?3, ?4)",
        params![id, subject_id, period_id, weekday_id],
    )
    .during(Operation::Insert, Target::Row(EntityKind::Lesson, id))?;
    Ok(())
}

pub(crate) fn insert_weekday_row(conn: &Connection, id: i64, weekday: &Weekday) -> Result<()> {
    conn.execute(
        "INSERT INTO weekday (id, schedule_id, name) VALUES (?1, ?2, ?3)",
        params![id, weekday.schedule_id, weekday.name.as_str()],
    )
    .during(Operation::Insert, Target::Row(EntityKind::Weekday, id))?;
    Ok(())
}

pub(crate) fn insert_schedule_row(conn: &Connection, id: i64, schedule: &Schedule) -> Result<()> {
    conn.execute(
        "INSERT INTO schedule (id, name) VALUES (?1, ?2)",
        params![id, schedule.name],
    )
    .during(Operation::Insert, Target::Row(EntityKind::Schedule, id))?;
    Ok(())
}

fn expect_changed(changed: usize, kind: EntityKind, id: i64) -> Result<()> {
    if changed == 0 {
        Err(Error::NotFound { kind, id })
    } else {
        Ok(())
    }
}

pub(crate) fn update_teacher_row(conn: &Connection, teacher: &Teacher) -> Result<()> {
    let target = Target::Row(EntityKind::Teacher, teacher.id);
    let changed = conn
        .execute(
            "UPDATE teacher SET name = ?2, abbreviation = ?3, gender = ?4 WHERE id = ?1",
            params![teacher.id, teacher.name, teacher.abbreviation, teacher.gender.to_string()],
        )
        .during(Operation::Update, target)?;
    expect_changed(changed, EntityKind::Teacher, teacher.id)
}

pub(crate) fn update_subject_row(conn: &Connection, subject: &Subject) -> Result<()> {
    let target = Target::Row(EntityKind::Subject, subject.id);
    let changed = conn
        .execute(
            "UPDATE subject SET teacher_id = ?2, name = ?3, room = ?4, color = ?5 WHERE id = ?1",
            params![subject.id, subject.teacher.id, subject.name, subject.room, subject.color],
        )
        .during(Operation::Update, target)?;
    expect_changed(changed, EntityKind::Subject, subject.id)
}

pub(crate) fn update_homework_row(conn: &Connection, homework: &Homework) -> Result<()> {
    let target = Target::Row(EntityKind::Homework, homework.id);
    let changed = conn
        .execute(
            "UPDATE homework SET subject_id = ?2, description = ?3, deadline = ?4, done = ?5 WHERE id = ?1",
            params![
                homework.id,
                homework.subject.id,
                homework.description,
                homework.deadline,
                homework.done
            ],
        )
        .during(Operation::Update, target)?;
    expect_changed(changed, EntityKind::Homework, homework.id)
}

pub(crate) fn update_exam_row(conn: &Connection, exam: &Exam) -> Result<()> {
    let target = Target::Row(EntityKind::Exam, exam.id);
    let changed = conn
        .execute(
            "UPDATE exam SET subject_id = ?2, description = ?3, deadline = ?4 WHERE id = ?1",
            params![exam.id, exam.subject.id, exam.description, exam.deadline],
        )
        .during(Operation::Update, target)?;
    expect_changed(changed, EntityKind::Exam, exam.id)
}

pub(crate) fn update_grade_row(conn: &Connection, grade: &Grade) -> Result<()> {
    let target = Target::Row(EntityKind::Grade, grade.id);
    let changed = conn
        .execute(
            "UPDATE grade SET subject_id = ?2, name = ?3, grade = ?4 WHERE id = ?1",
            params![grade.id, grade.subject.id, grade.name, grade.grade],
        )
        .during(Operation::Update, target)?;
    expect_changed(changed, EntityKind::Grade, grade.id)
}

pub(crate) fn update_period_row(conn: &Connection, period: &Period) -> Result<()> {
    let target = Target::Row(EntityKind::Period, period.id);
    let changed = conn
        .execute(
            "UPDATE period SET school_hour_no = ?2, start_time = ?3, end_time = ?4 WHERE id = ?1",
            params![period.id, period.school_hour_no, period.start_time, period.end_time],
        )
        .during(Operation::Update, target)?;
    expect_changed(changed, EntityKind::Period, period.id)
}

pub(crate) fn update_lesson_row(conn: &Connection, lesson: &Lesson) -> Result<()> {
    let target = Target::Row(EntityKind::Lesson, lesson.id);
    let changed = conn
        .execute(
            "UPDATE lesson SET subject_id = ?2, period_id = ?3, weekday_id = ?4 WHERE id = ?1",
            params![lesson.id, lesson.subject.id, lesson.period.id, lesson.weekday_id],
        )
        .during(Operation::Update, target)?;
    expect_changed(changed, EntityKind::Lesson, lesson.id)
}

pub(crate) fn update_weekday_row(conn: &Connection, weekday: &Weekday) -> Result<()> {
    let target = Target::Row(EntityKind::Weekday, weekday.id);
    let changed = conn
        .execute(
            "UPDATE weekday SET schedule_id = ?2, name = ?3 WHERE id = ?1",
            params![weekday.id, weekday.schedule_id, weekday.name.as_str()],
        )
        .during(Operation::Update, target)?;
    expect_changed(changed, EntityKind::Weekday, weekday.id)
}

pub(crate) fn update_schedule_row(conn: &Connection, schedule: &Schedule) -> Result<()> {
    let target = Target::Row(EntityKind::Schedule, schedule.id);
    let changed = conn
        .execute(
            "UPDATE schedule SET name = ?2 WHERE id = ?1",
            params![schedule.id, schedule.name],
        )
        .during(Operation::Update, target)?;
    expect_changed(changed, EntityKind::Schedule, schedule.id)
}

/// Point a lesson at its owning weekday. Returns false if the lesson is gone.
pub(crate) fn set_lesson_weekday(conn: &Connection, lesson_id: i64, weekday_id: i64) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE lesson SET weekday_id = ?2 WHERE id = ?1",
            params![lesson_id, weekday_id],
        )
        .during(Operation::Update, Target::Row(EntityKind::Lesson, lesson_id))?;
    Ok(changed > 0)
}

/// Point a weekday at its owning schedule. Returns false if the weekday is gone.
pub(crate) fn set_weekday_schedule(conn: &Connection, weekday_id: i64, schedule_id: i64) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE weekday SET schedule_id = ?2 WHERE id = ?1",
            params![weekday_id, schedule_id],
        )
        .during(Operation::Update, Target::Row(EntityKind::Weekday, weekday_id))?;
    Ok(changed > 0)
}

/// Delete the row at `id`; declared cascades remove its dependents.
pub(crate) fn delete_row(conn: &Connection, kind: EntityKind, id: i64) -> Result<()> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", kind.as_str());
    let changed = conn
        .execute(&sql, [id])
        .during(Operation::Delete, Target::Row(kind, id))?;
    expect_changed(changed, kind, id)
}

// ========== Row queries ==========

pub fn exists(conn: &Connection, kind: EntityKind, id: i64) -> Result<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", kind.as_str());
    conn.query_row(&sql, [id], |row| row.get(0))
        .during(Operation::Read, Target::Table(kind))
}

/// Number of rows in `kind`'s table whose `column` equals `id`
pub fn count_referencing(conn: &Connection, kind: EntityKind, column: &str, id: i64) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", kind.as_str(), column);
    let count: i64 = conn
        .query_row(&sql, [id], |row| row.get(0))
        .during(Operation::Count, Target::Table(kind))?;
    Ok(count as u64)
}

/// Ids in `kind`'s table whose `column` equals `id`
pub fn ids_referencing(conn: &Connection, kind: EntityKind, column: &str, id: i64) -> Result<Vec<i64>> {
    let sql = format!("SELECT id FROM {} WHERE {} = ?1 ORDER BY id", kind.as_str(), column);
    query_ids(conn, &sql, [id], Target::Table(kind))
}

pub fn all_ids(conn: &Connection, kind: EntityKind) -> Result<Vec<i64>> {
    let sql = format!("SELECT id FROM {} ORDER BY id", kind.as_str());
    query_ids(conn, &sql, [], Target::Table(kind))
}

pub fn count_rows(conn: &Connection, kind: EntityKind) -> Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}", kind.as_str());
    let count: i64 = conn
        .query_row(&sql, [], |row| row.get(0))
        .during(Operation::Count, Target::Table(kind))?;
    Ok(count as usize)
}

fn query_ids<P: Params>(conn: &Connection, sql: &str, params: P, target: Target) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(sql).during(Operation::Read, target)?;
    let ids = stmt
        .query_map(params, |row| row.get(0))
        .during(Operation::Read, target)?
        .collect::<rusqlite::Result<Vec<i64>>>()
        .during(Operation::Read, target)?;
    Ok(ids)
}

/// Raw dump of a table: one line per row, `column: value || ...`
pub fn dump_table(conn: &Connection, kind: EntityKind) -> Result<String> {
    let target = Target::Table(kind);
    let sql = format!("SELECT * FROM {} ORDER BY id", kind.as_str());
    let mut stmt = conn.prepare(&sql).during(Operation::Read, target)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut out = String::new();
    let mut rows = stmt.query([]).during(Operation::Read, target)?;
    while let Some(row) = rows.next().during(Operation::Read, target)? {
        for (i, column) in columns.iter().enumerate() {
            let value = row.get_ref(i).during(Operation::Read, target)?;
            out.push_str(&format!("{}: {} || ", column, render_value(value)));
        }
        out.push('\n');
    }
    Ok(out)
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "null".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema;

    fn conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        schema::create_all(&mut conn).unwrap();
        conn
    }

    fn seed_rows(conn: &Connection) {
        conn.execute_batch(
            "INSERT INTO teacher VALUES (1, 'Bräuer', 'BRÄ', 'm');
             INSERT INTO subject VALUES (1, 1, 'Math', 'B213', '#ffffff');
             INSERT INTO period VALUES (1, 3, '09-35-00', '10-20-00');
             INSERT INTO period VALUES (2, 1, '07-45-00', '08-30-00');
             INSERT INTO schedule VALUES (1, 'a');
             INSERT INTO weekday VALUES (1, 1, 'monday');
             INSERT INTO lesson VALUES (1, 1, 1, 1);
             INSERT INTO lesson VALUES (2, 1, 2, 1);",
        )
        .unwrap();
    }

    #[test]
    fn test_fetch_hydrates_nested_references() {
        let conn = conn();
        seed_rows(&conn);

        let lesson = Lesson::fetch(&conn, 1).unwrap();
        assert_eq!(lesson.subject.name, "Math");
        assert_eq!(lesson.subject.teacher.abbreviation.as_deref(), Some("BRÄ"));
        assert_eq!(lesson.subject.teacher.gender, 'm');
        assert_eq!(lesson.period.school_hour_no, 3);
        assert_eq!(lesson.weekday_id, Some(1));
    }

    #[test]
    fn test_missing_row_is_not_found() {
        let conn = conn();
        match Exam::fetch(&conn, 7) {
            Err(Error::NotFound { kind, id }) => {
                assert_eq!(kind, EntityKind::Exam);
                assert_eq!(id, 7);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_weekday_lessons_in_school_hour_order() {
        let conn = conn();
        seed_rows(&conn);

        let weekday = Weekday::fetch(&conn, 1).unwrap();
        let hours: Vec<i64> = weekday.lessons.iter().map(|l| l.period.school_hour_no).collect();
        assert_eq!(hours, vec![1, 3]);
        assert_eq!(weekday.name, Day::Monday);
        assert_eq!(weekday.schedule_id, Some(1));
    }

    #[test]
    fn test_schedule_slots_weekdays_by_label() {
        let conn = conn();
        seed_rows(&conn);
        conn.execute("INSERT INTO weekday VALUES (2, 1, 'thursday')", []).unwrap();

        let schedule = Schedule::fetch(&conn, 1).unwrap();
        assert_eq!(schedule.day(Day::Monday).map(|d| d.id), Some(1));
        assert_eq!(schedule.day(Day::Thursday).map(|d| d.id), Some(2));
        assert_eq!(schedule.weekdays().count(), 2);
    }

    #[test]
    fn test_duplicate_label_keeps_lowest_id() {
        let conn = conn();
        seed_rows(&conn);
        conn.execute("INSERT INTO weekday VALUES (5, 1, 'monday')", []).unwrap();

        let schedule = Schedule::fetch(&conn, 1).unwrap();
        assert_eq!(schedule.day(Day::Monday).map(|d| d.id), Some(1));
    }

    #[test]
    fn test_bad_weekday_label_is_store_failure() {
        let conn = conn();
        conn.execute("INSERT INTO weekday VALUES (1, NULL, 'sunday')", []).unwrap();
        assert!(matches!(Weekday::fetch(&conn, 1), Err(Error::StoreFailure { .. })));
    }

    #[test]
    fn test_multi_character_gender_is_store_failure() {
        let conn = conn();
        conn.execute("INSERT INTO teacher VALUES (1, 'Bräuer', 'BRÄ', 'male')", []).unwrap();
        conn.execute("INSERT INTO teacher VALUES (2, 'Dickens', 'DICK', '')", []).unwrap();

        assert!(matches!(Teacher::fetch(&conn, 1), Err(Error::StoreFailure { .. })));
        assert!(matches!(Teacher::fetch(&conn, 2), Err(Error::StoreFailure { .. })));
    }

    #[test]
    fn test_lesson_at_slot() {
        let conn = conn();
        seed_rows(&conn);

        assert_eq!(lesson_at(&conn, 1, 2).unwrap().map(|l| l.id), Some(2));
        assert!(lesson_at(&conn, 1, 99).unwrap().is_none());
    }

    #[test]
    fn test_update_missing_row_is_not_found() {
        let conn = conn();
        let period = Period::new(9, 1, "07-45-00", "08-30-00");
        assert!(update_period_row(&conn, &period).unwrap_err().is_not_found());
    }

    #[test]
    fn test_dump_table_lists_columns() {
        let conn = conn();
        seed_rows(&conn);
        let dump = dump_table(&conn, EntityKind::Schedule).unwrap();
        assert_eq!(dump, "id: 1 || name: a || \n");
    }
}
