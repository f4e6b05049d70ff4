//! Reference resolver - dependency-aware inserts and updates
//!
//! Inserting an entity first makes sure every required reference exists,
//! inserting missing ones recursively, then writes the row itself. Weekdays
//! and schedules then reconcile their child collections: a child already
//! stored with equal fields is only repointed at the new owner, a missing
//! child is inserted, a stored child that differs is left alone.
//!
//! Nothing here opens a transaction. Callers run these functions inside one
//! (see [`crate::SqliteStore::insert`]) so a failure anywhere leaves the
//! database untouched.

use rusqlite::Connection;
use crate::entity::{Exam, Grade, Homework, Lesson, Period, Schedule, Subject, Teacher, Weekday};
use crate::storage::codec::{self, Record};
use crate::storage::ids::resolve_id;
use crate::{EntityKind, Error, Result};

/// An entity that can be written through the resolver.
pub trait Upsert: Record {
    /// Insert `record` and any missing dependency. Returns the id written,
    /// which differs from `record.id()` when that was `<= 0`.
    fn insert_into(conn: &Connection, record: &Self) -> Result<i64>;

    /// Whole-row replace at `record.id()`.
    fn update_in(conn: &Connection, record: &Self) -> Result<()>;
}

/// Id of `dep` in storage, inserting it first when it has no row yet
fn ensure<D: Upsert>(conn: &Connection, dep: &D) -> Result<i64> {
    if dep.id() > 0 && codec::exists(conn, D::KIND, dep.id())? {
        return Ok(dep.id());
    }
    tracing::debug!(kind = %D::KIND, id = dep.id(), "inserting missing dependency");
    D::insert_into(conn, dep)
}

/// Optional back-references are never auto-created; they must point at a stored row.
fn check_owner(conn: &Connection, kind: EntityKind, owner: Option<i64>) -> Result<()> {
    match owner {
        Some(id) if !codec::exists(conn, kind, id)? => Err(Error::NotFound { kind, id }),
        _ => Ok(()),
    }
}

impl Upsert for Teacher {
    fn insert_into(conn: &Connection, teacher: &Self) -> Result<i64> {
        let id = resolve_id(conn, Self::KIND, teacher.id)?;
        codec::insert_teacher_row(conn, id, teacher)?;
        tracing::debug!(id, name = %teacher.name, "inserted teacher");
        Ok(id)
    }

    fn update_in(conn: &Connection, teacher: &Self) -> Result<()> {
        codec::update_teacher_row(conn, teacher)
    }
}

impl Upsert for Subject {
    fn insert_into(conn: &Connection, subject: &Self) -> Result<i64> {
        let teacher_id = ensure(conn, &subject.teacher)?;
        let id = resolve_id(conn, Self::KIND, subject.id)?;
        codec::insert_subject_row(conn, id, teacher_id, subject)?;
        tracing::debug!(id, teacher_id, name = %subject.name, "inserted subject");
        Ok(id)
    }

    fn update_in(conn: &Connection, subject: &Self) -> Result<()> {
        let teacher_id = ensure(conn, &subject.teacher)?;
        let mut row = subject.clone();
        row.teacher.id = teacher_id;
        codec::update_subject_row(conn, &row)
    }
}

impl Upsert for Homework {
    fn insert_into(conn: &Connection, homework: &Self) -> Result<i64> {
        let subject_id = ensure(conn, &homework.subject)?;
        let id = resolve_id(conn, Self::KIND, homework.id)?;
        codec::insert_homework_row(conn, id, subject_id, homework)?;
        tracing::debug!(id, subject_id, "inserted homework");
        Ok(id)
    }

    fn update_in(conn: &Connection, homework: &Self) -> Result<()> {
        let subject_id = ensure(conn, &homework.subject)?;
        let mut row = homework.clone();
        row.subject.id = subject_id;
        codec::update_homework_row(conn, &row)
    }
}

impl Upsert for Exam {
    fn insert_into(conn: &Connection, exam: &Self) -> Result<i64> {
        let subject_id = ensure(conn, &exam.subject)?;
        let id = resolve_id(conn, Self::KIND, exam.id)?;
        codec::insert_exam_row(conn, id, subject_id, exam)?;
        tracing::debug!(id, subject_id, "inserted exam");
        Ok(id)
    }

    fn update_in(conn: &Connection, exam: &Self) -> Result<()> {
        let subject_id = ensure(conn, &exam.subject)?;
        let mut row = exam.clone();
        row.subject.id = subject_id;
        codec::update_exam_row(conn, &row)
    }
}

impl Upsert for Grade {
    fn insert_into(conn: &Connection, grade: &Self) -> Result<i64> {
        let subject_id = ensure(conn, &grade.subject)?;
        let id = resolve_id(conn, Self::KIND, grade.id)?;
        codec::insert_grade_row(conn, id, subject_id, grade)?;
        tracing::debug!(id, subject_id, "inserted grade");
        Ok(id)
    }

    fn update_in(conn: &Connection, grade: &Self) -> Result<()> {
        let subject_id = ensure(conn, &grade.subject)?;
        let mut row = grade.clone();
        row.subject.id = subject_id;
        codec::update_grade_row(conn, &row)
    }
}

impl Upsert for Period {
    fn insert_into(conn: &Connection, period: &Self) -> Result<i64> {
        let id = resolve_id(conn, Self::KIND, period.id)?;
        codec::insert_period_row(conn, id, period)?;
        tracing::debug!(id, hour = period.school_hour_no, "inserted period");
        Ok(id)
    }

    fn update_in(conn: &Connection, period: &Self) -> Result<()> {
        codec::update_period_row(conn, period)
    }
}

impl Upsert for Lesson {
    fn insert_into(conn: &Connection, lesson: &Self) -> Result<i64> {
        let subject_id = ensure(conn, &lesson.subject)?;
        let period_id = ensure(conn, &lesson.period)?;
        check_owner(conn, EntityKind::Weekday, lesson.weekday_id)?;

        let id = resolve_id(conn, Self::KIND, lesson.id)?;
        codec::insert_lesson_row(conn, id, subject_id, period_id, lesson.weekday_id)?;
        tracing::debug!(id, subject_id, period_id, weekday_id = ?lesson.weekday_id, "inserted lesson");
        Ok(id)
    }

    fn update_in(conn: &Connection, lesson: &Self) -> Result<()> {
        let mut row = lesson.clone();
        row.subject.id = ensure(conn, &lesson.subject)?;
        row.period.id = ensure(conn, &lesson.period)?;
        check_owner(conn, EntityKind::Weekday, lesson.weekday_id)?;
        codec::update_lesson_row(conn, &row)
    }
}

impl Upsert for Weekday {
    fn insert_into(conn: &Connection, weekday: &Self) -> Result<i64> {
        check_owner(conn, EntityKind::Schedule, weekday.schedule_id)?;

        // The owner row goes in first so repointed lessons satisfy their foreign key.
        let id = resolve_id(conn, Self::KIND, weekday.id)?;
        codec::insert_weekday_row(conn, id, weekday)?;
        tracing::debug!(id, day = %weekday.name, lessons = weekday.lessons.len(), "inserted weekday");

        for lesson in &weekday.lessons {
            reconcile(conn, lesson, id)?;
        }
        Ok(id)
    }

    fn update_in(conn: &Connection, weekday: &Self) -> Result<()> {
        check_owner(conn, EntityKind::Schedule, weekday.schedule_id)?;
        codec::update_weekday_row(conn, weekday)?;
        for lesson in &weekday.lessons {
            repoint_existing(conn, lesson, weekday.id)?;
        }
        Ok(())
    }
}

impl Upsert for Schedule {
    fn insert_into(conn: &Connection, schedule: &Self) -> Result<i64> {
        let id = resolve_id(conn, Self::KIND, schedule.id)?;
        codec::insert_schedule_row(conn, id, schedule)?;
        tracing::debug!(id, name = %schedule.name, "inserted schedule");

        for weekday in schedule.weekdays() {
            reconcile(conn, weekday, id)?;
        }
        Ok(id)
    }

    fn update_in(conn: &Connection, schedule: &Self) -> Result<()> {
        codec::update_schedule_row(conn, schedule)?;
        for weekday in schedule.weekdays() {
            repoint_existing(conn, weekday, schedule.id)?;
        }
        Ok(())
    }
}

/// A child row held by an owner through a nullable back-reference.
trait Owned: Upsert {
    const OWNER: EntityKind;

    /// Field equality ignoring the back-reference.
    fn same_row(&self, stored: &Self) -> bool;

    /// A copy pointing at `owner`.
    fn owned_by(&self, owner: i64) -> Self;

    /// Rewrite the back-reference of the row at `id`. False if no row changed.
    fn repoint(conn: &Connection, id: i64, owner: i64) -> Result<bool>;
}

impl Owned for Lesson {
    const OWNER: EntityKind = EntityKind::Weekday;

    fn same_row(&self, stored: &Self) -> bool {
        self.matches(stored)
    }

    fn owned_by(&self, owner: i64) -> Self {
        Lesson {
            weekday_id: Some(owner),
            ..self.clone()
        }
    }

    fn repoint(conn: &Connection, id: i64, owner: i64) -> Result<bool> {
        codec::set_lesson_weekday(conn, id, owner)
    }
}

impl Owned for Weekday {
    const OWNER: EntityKind = EntityKind::Schedule;

    fn same_row(&self, stored: &Self) -> bool {
        self.matches(stored)
    }

    fn owned_by(&self, owner: i64) -> Self {
        Weekday {
            schedule_id: Some(owner),
            ..self.clone()
        }
    }

    fn repoint(conn: &Connection, id: i64, owner: i64) -> Result<bool> {
        codec::set_weekday_schedule(conn, id, owner)
    }
}

/// Attach `child` to `owner`, reusing an equal stored row when there is one.
fn reconcile<C: Owned>(conn: &Connection, child: &C, owner: i64) -> Result<()> {
    if child.id() > 0 {
        match C::fetch(conn, child.id()) {
            Ok(stored) if child.same_row(&stored) => {
                C::repoint(conn, child.id(), owner)?;
                tracing::debug!(kind = %C::KIND, id = child.id(), owner_kind = %C::OWNER, owner, "repointed child");
                return Ok(());
            }
            Ok(_) => {
                tracing::warn!(
                    kind = %C::KIND,
                    id = child.id(),
                    owner_kind = %C::OWNER,
                    owner,
                    "stored child differs from supplied one, leaving it untouched"
                );
                return Ok(());
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err),
        }
    }

    let id = C::insert_into(conn, &child.owned_by(owner))?;
    tracing::debug!(kind = %C::KIND, id, owner_kind = %C::OWNER, owner, "inserted child");
    Ok(())
}

fn repoint_existing<C: Owned>(conn: &Connection, child: &C, owner: i64) -> Result<()> {
    if !C::repoint(conn, child.id(), owner)? {
        tracing::warn!(kind = %C::KIND, id = child.id(), owner, "child has no row, nothing to repoint");
    }
    Ok(())
}
