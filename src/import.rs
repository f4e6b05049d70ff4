//! Bulk import of entities from a JSON document
//!
//! ```json
//! { "teachers": [...], "subjects": [...], "periods": [...], "homework": [...],
//!   "exams": [...], "grades": [...], "lessons": [...], "weekdays": [...],
//!   "schedules": [...] }
//! ```
//!
//! Every list is optional. Entries go through the resolver in dependency
//! order inside a single transaction, so a lesson may carry a subject that
//! no list mentions and it will still be created.

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::entity::{Exam, Grade, Homework, Lesson, Period, Schedule, Subject, Teacher, Weekday};
use crate::resolver::Upsert;
use crate::storage::{DbStats, SqliteStore};
use crate::{EntityKind, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportDocument {
    pub teachers: Vec<Teacher>,
    pub subjects: Vec<Subject>,
    pub periods: Vec<Period>,
    pub homework: Vec<Homework>,
    pub exams: Vec<Exam>,
    pub grades: Vec<Grade>,
    pub lessons: Vec<Lesson>,
    pub weekdays: Vec<Weekday>,
    pub schedules: Vec<Schedule>,
}

/// Rows added per table by one import, auto-created dependencies included
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: Vec<(EntityKind, usize)>,
}

impl ImportSummary {
    fn between(before: &DbStats, after: &DbStats) -> Self {
        let added = after
            .counts
            .iter()
            .map(|(kind, count)| (*kind, count.saturating_sub(before.count(*kind))))
            .filter(|(_, added)| *added > 0)
            .collect();
        Self { added }
    }

    pub fn total(&self) -> usize {
        self.added.iter().map(|(_, n)| n).sum()
    }
}

impl ImportDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of top-level entries across all lists
    pub fn len(&self) -> usize {
        self.teachers.len()
            + self.subjects.len()
            + self.periods.len()
            + self.homework.len()
            + self.exams.len()
            + self.grades.len()
            + self.lessons.len()
            + self.weekdays.len()
            + self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert everything in one transaction. Nothing is kept if any entry fails.
    pub fn apply(&self, store: &mut SqliteStore) -> Result<ImportSummary> {
        let before = store.stats()?;

        store.with_transaction(|tx| {
            insert_all(tx, &self.teachers)?;
            insert_all(tx, &self.subjects)?;
            insert_all(tx, &self.periods)?;
            insert_all(tx, &self.homework)?;
            insert_all(tx, &self.exams)?;
            insert_all(tx, &self.grades)?;
            insert_all(tx, &self.lessons)?;
            insert_all(tx, &self.weekdays)?;
            insert_all(tx, &self.schedules)
        })?;

        let summary = ImportSummary::between(&before, &store.stats()?);
        tracing::info!(entries = self.len(), rows = summary.total(), "import committed");
        Ok(summary)
    }
}

fn insert_all<E: Upsert>(conn: &rusqlite::Connection, entities: &[E]) -> Result<()> {
    for entity in entities {
        E::insert_into(conn, entity)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LESSON_ONLY: &str = r##"{
        "lessons": [{
            "id": 0,
            "subject": {
                "id": 0,
                "teacher": { "id": 0, "name": "Dickens", "abbreviation": "DICK", "gender": "f" },
                "name": "German",
                "room": "B308",
                "color": "#ff0000"
            },
            "period": { "id": 0, "school_hour_no": 2, "start_time": "08-35-00", "end_time": "09-20-00" }
        }]
    }"##;

    #[test]
    fn test_missing_lists_default_to_empty() {
        let doc = ImportDocument::from_json(r#"{ "periods": [] }"#).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_nested_dependencies_are_created() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let doc = ImportDocument::from_json(LESSON_ONLY).unwrap();

        let summary = doc.apply(&mut store).unwrap();

        assert_eq!(summary.total(), 4);
        let lesson: Lesson = store.get(1).unwrap();
        assert_eq!(lesson.subject.teacher.abbreviation.as_deref(), Some("DICK"));
        assert_eq!(lesson.weekday_id, None);
    }

    #[test]
    fn test_failed_import_keeps_nothing() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut doc = ImportDocument::from_json(LESSON_ONLY).unwrap();
        doc.teachers.push(Teacher::new(0, "Dickens", Some("DICK"), Teacher::FEMALE));

        let err = doc.apply(&mut store).unwrap_err();

        assert!(err.is_already_exists());
        assert_eq!(store.stats().unwrap().total(), 0);
    }

    #[test]
    fn test_imported_schedule_attaches_weekday_with_unsorted_lessons() {
        use crate::entity::Day;

        let subject = Subject::new(1, Teacher::new(1, "Bräuer", Some("BRÄ"), Teacher::MALE), "Math", "B213", "#ffffff");
        let mut fourth = Lesson::new(1, subject.clone(), Period::new(4, 4, "10-25-00", "11-10-00"));
        let mut first = Lesson::new(2, subject, Period::new(1, 1, "07-45-00", "08-30-00"));
        fourth.weekday_id = Some(1);
        first.weekday_id = Some(1);
        // Document order, not school-hour order.
        let monday = Weekday {
            id: 1,
            name: Day::Monday,
            lessons: vec![fourth, first],
            schedule_id: None,
        };
        let doc = ImportDocument {
            weekdays: vec![monday.clone()],
            schedules: vec![Schedule::new(1, "a", vec![monday])],
            ..Default::default()
        };
        let doc = ImportDocument::from_json(&doc.to_json().unwrap()).unwrap();

        let mut store = SqliteStore::open_in_memory().unwrap();
        doc.apply(&mut store).unwrap();

        assert_eq!(store.size(EntityKind::Weekday).unwrap(), 1);
        let schedule: Schedule = store.get(1).unwrap();
        assert_eq!(schedule.day(Day::Monday).map(|d| d.id), Some(1));
        assert_eq!(schedule.day(Day::Monday).unwrap().lessons.len(), 2);
    }

    #[test]
    fn test_bad_json_is_json_error() {
        assert!(matches!(
            ImportDocument::from_json("{ not json"),
            Err(crate::Error::Json(_))
        ));
    }
}
