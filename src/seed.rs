//! Example data set
//!
//! Two teachers, two subjects with their exams, grades and homework, a full
//! morning of six periods, four lessons on a Monday and a schedule holding
//! that Monday.

use crate::entity::{Day, Exam, Grade, Homework, Lesson, Period, Schedule, Subject, Teacher, Weekday};
use crate::import::{ImportDocument, ImportSummary};
use crate::storage::SqliteStore;
use crate::Result;

pub fn example_data() -> ImportDocument {
    let brauer = Teacher::new(1, "Bräuer", Some("BRÄ"), Teacher::MALE);
    let dickens = Teacher::new(2, "Dickens", Some("DICK"), Teacher::FEMALE);

    let math = Subject::new(1, brauer.clone(), "Math", "B213", "#ffffff");
    let german = Subject::new(2, dickens.clone(), "German", "B308", "#ff0000");

    let periods = vec![
        Period::new(1, 1, "07-45-00", "08-30-00"),
        Period::new(2, 2, "08-35-00", "09-20-00"),
        Period::new(3, 3, "09-35-00", "10-20-00"),
        Period::new(4, 4, "10-25-00", "11-20-00"),
        Period::new(5, 5, "11-35-00", "12-10-00"),
        Period::new(6, 6, "12-15-00", "13-00-00"),
    ];

    let lessons: Vec<Lesson> = periods
        .iter()
        .take(4)
        .enumerate()
        .map(|(i, period)| {
            let subject = if i % 2 == 0 { math.clone() } else { german.clone() };
            Lesson::new(period.id, subject, period.clone())
        })
        .collect();

    let monday = Weekday::new(1, Day::Monday, lessons.clone());

    ImportDocument {
        teachers: vec![brauer, dickens],
        subjects: vec![math.clone(), german.clone()],
        homework: vec![
            Homework::new(1, math.clone(), "Geometry - draw a rectangle", "2017-5-6", false),
            Homework::new(2, german.clone(), "Characterisation Goethe", "2017-6-3", false),
            Homework::new(3, math.clone(), "The calculation of probabilities", "2017-5-7", true),
            Homework::new(4, german.clone(), "Literature during WW2", "2017-5-5", false),
        ],
        exams: vec![
            Exam::new(1, math.clone(), "A simple Test in Math", "2017-6-13"),
            Exam::new(2, german.clone(), "German Test", "2017-5-3"),
        ],
        grades: vec![
            Grade::new(1, math.clone(), "2nd test", "13"),
            Grade::new(2, german.clone(), "3rd test", "4"),
            Grade::new(3, math, "5th test", "14"),
            Grade::new(4, german, "4th test", "6"),
        ],
        periods,
        lessons,
        schedules: vec![Schedule::new(1, "a", vec![monday.clone()])],
        weekdays: vec![monday],
    }
}

/// Insert [`example_data`] into `store` in one transaction
pub fn fill_with_examples(store: &mut SqliteStore) -> Result<ImportSummary> {
    example_data().apply(store)
}
