//! Impact counting and confirmation-gated deletes against real stores

use std::cell::Cell;
use std::path::Path;
use schoolplanner::{
    Decision, DeleteOutcome, DeleteRequest, EntityKind, Exam, Grade, Homework, Lesson, Period, SqliteStore, Subject,
    Teacher,
};

fn german() -> Subject {
    Subject::new(1, Teacher::new(1, "Dickens", Some("DICK"), Teacher::FEMALE), "German", "B308", "#ff0000")
}

/// Teacher 1 → Subject 1 → Exams 1, 2
fn teacher_with_two_exams(store: &mut SqliteStore) {
    store.insert(&Exam::new(1, german(), "German Test", "2017-5-3")).unwrap();
    store.insert(&Exam::new(2, german(), "Poem recital", "2017-6-1")).unwrap();
}

fn second_connection(path: &Path) -> rusqlite::Connection {
    let conn = rusqlite::Connection::open(path).unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    conn
}

#[test]
fn test_subject_impact_counts_all_dependents() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    teacher_with_two_exams(&mut store);
    store.insert(&Homework::new(1, german(), "Essay", "2017-5-9", false)).unwrap();
    for hour in 1..=3 {
        let period = Period::new(hour, hour, "07-45-00", "08-30-00");
        store.insert(&Lesson::new(hour, german(), period)).unwrap();
    }

    assert_eq!(store.impact_count(EntityKind::Subject, 1).unwrap(), 6);
}

#[test]
fn test_teacher_delete_confirmed_cascades() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    teacher_with_two_exams(&mut store);
    assert_eq!(store.impact_count(EntityKind::Teacher, 1).unwrap(), 3);

    let outcome = store.delete(EntityKind::Teacher, 1, &Decision::Accept).unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted { impact: 3 });
    assert_eq!(store.stats().unwrap().total(), 0);
}

#[test]
fn test_teacher_delete_declined_keeps_everything() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    teacher_with_two_exams(&mut store);
    let before = store.dump_all().unwrap();

    let outcome = store.delete(EntityKind::Teacher, 1, &Decision::Cancel).unwrap();

    assert_eq!(outcome, DeleteOutcome::Aborted { impact: 3 });
    assert_eq!(store.dump_all().unwrap(), before);
}

#[test]
fn test_leaf_deletes_never_ask() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    teacher_with_two_exams(&mut store);
    store.insert(&Grade::new(1, german(), "3rd test", "4")).unwrap();
    store.insert(&Homework::new(1, german(), "Essay", "2017-5-9", false)).unwrap();
    store
        .insert(&Lesson::new(1, german(), Period::new(1, 1, "07-45-00", "08-30-00")))
        .unwrap();

    let asked = Cell::new(0);
    let confirm = |_: &DeleteRequest| {
        asked.set(asked.get() + 1);
        Decision::Cancel
    };

    for kind in [EntityKind::Homework, EntityKind::Exam, EntityKind::Grade, EntityKind::Lesson] {
        let outcome = store.delete(kind, 1, &confirm).unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted { impact: 0 });
    }
    assert_eq!(asked.get(), 0);
}

#[test]
fn test_zero_impact_parent_deletes_without_asking() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.insert(&Period::new(1, 1, "07-45-00", "08-30-00")).unwrap();

    let confirm = |_: &DeleteRequest| -> Decision { panic!("should not be asked") };
    let outcome = store.delete(EntityKind::Period, 1, &confirm).unwrap();

    assert!(outcome.is_deleted());
    assert!(!store.exists(EntityKind::Period, 1).unwrap());
}

#[test]
fn test_row_removed_while_awaiting_confirmation_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planner.db");
    let mut store = SqliteStore::open(&path).unwrap();
    teacher_with_two_exams(&mut store);

    let confirm = |_: &DeleteRequest| {
        second_connection(&path)
            .execute("DELETE FROM teacher WHERE id = 1", [])
            .unwrap();
        Decision::Accept
    };

    let err = store.delete(EntityKind::Teacher, 1, &confirm).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_stale_impact_still_deletes_and_reports_confirmed_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planner.db");
    let mut store = SqliteStore::open(&path).unwrap();
    teacher_with_two_exams(&mut store);

    let confirm = |_: &DeleteRequest| {
        second_connection(&path)
            .execute("INSERT INTO exam VALUES (3, 1, 'Dictation', '2017-7-1')", [])
            .unwrap();
        Decision::Accept
    };

    let outcome = store.delete(EntityKind::Subject, 1, &confirm).unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted { impact: 2 });
    assert_eq!(store.size(EntityKind::Exam).unwrap(), 0);
    assert_eq!(store.size(EntityKind::Teacher).unwrap(), 1);
}

#[test]
fn test_schedule_impact_ignores_lessons() {
    use schoolplanner::{Day, Schedule, Weekday};

    let mut store = SqliteStore::open_in_memory().unwrap();
    let lesson = Lesson::new(1, german(), Period::new(1, 1, "07-45-00", "08-30-00"));
    let monday = Weekday::new(1, Day::Monday, vec![lesson]);
    store.insert(&Schedule::new(1, "a", vec![monday])).unwrap();

    assert_eq!(store.impact_count(EntityKind::Schedule, 1).unwrap(), 1);

    // The cascade still reaches the lesson.
    store.delete(EntityKind::Schedule, 1, &Decision::Accept).unwrap();
    assert_eq!(store.size(EntityKind::Weekday).unwrap(), 0);
    assert_eq!(store.size(EntityKind::Lesson).unwrap(), 0);
}
