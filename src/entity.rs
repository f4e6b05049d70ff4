//! Entity types - the nine record kinds of the planner
//!
//! Every entity is a plain value rebuilt from storage on each read:
//! - `Teacher`, `Period`, `Schedule`: no required references
//! - `Subject`: owns a hydrated `Teacher`
//! - `Homework`, `Exam`, `Grade`: own a hydrated `Subject`
//! - `Lesson`: owns a hydrated `Subject` and `Period`
//! - `Weekday`: owns its `Lesson`s, `Schedule` owns its `Weekday`s
//!
//! Back-references (lesson → weekday, weekday → schedule) are kept as ids
//! so hydration never walks back up to the owner.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The nine persisted entity kinds. The string form is the table name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Subject,
    Teacher,
    Homework,
    Exam,
    Grade,
    Period,
    Lesson,
    Weekday,
    Schedule,
}

impl EntityKind {
    /// Table name backing this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Subject => "subject",
            EntityKind::Teacher => "teacher",
            EntityKind::Homework => "homework",
            EntityKind::Exam => "exam",
            EntityKind::Grade => "grade",
            EntityKind::Period => "period",
            EntityKind::Lesson => "lesson",
            EntityKind::Weekday => "weekday",
            EntityKind::Schedule => "schedule",
        }
    }

    /// All kinds, in schema declaration order
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Subject,
            EntityKind::Teacher,
            EntityKind::Homework,
            EntityKind::Exam,
            EntityKind::Grade,
            EntityKind::Period,
            EntityKind::Lesson,
            EntityKind::Weekday,
            EntityKind::Schedule,
        ]
    }

    /// Leaf kinds are never the target of a foreign key.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            EntityKind::Homework | EntityKind::Exam | EntityKind::Grade | EntityKind::Lesson
        )
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "subject" | "subjects" => Ok(EntityKind::Subject),
            "teacher" | "teachers" => Ok(EntityKind::Teacher),
            "homework" | "homeworks" => Ok(EntityKind::Homework),
            "exam" | "exams" => Ok(EntityKind::Exam),
            "grade" | "grades" => Ok(EntityKind::Grade),
            "period" | "periods" => Ok(EntityKind::Period),
            "lesson" | "lessons" => Ok(EntityKind::Lesson),
            "weekday" | "weekdays" | "day" => Ok(EntityKind::Weekday),
            "schedule" | "schedules" => Ok(EntityKind::Schedule),
            _ => Err(Error::UnknownKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weekday labels. A schedule has one slot per label, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
        }
    }

    pub fn all() -> &'static [Day; 6] {
        &[
            Day::Monday,
            Day::Tuesday,
            Day::Wednesday,
            Day::Thursday,
            Day::Friday,
            Day::Saturday,
        ]
    }

    /// Slot index inside a schedule (Monday = 0)
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl FromStr for Day {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Day::all()
            .iter()
            .copied()
            .find(|day| day.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownDay(s.to_string()))
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    /// Unique across all teachers when present
    pub abbreviation: Option<String>,
    pub gender: char,
}

impl Teacher {
    pub const MALE: char = 'm';
    pub const FEMALE: char = 'f';

    pub fn new(id: i64, name: impl Into<String>, abbreviation: Option<&str>, gender: char) -> Self {
        Self {
            id,
            name: name.into(),
            abbreviation: abbreviation.map(str::to_string),
            gender,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub teacher: Teacher,
    pub name: String,
    pub room: String,
    /// `#RRGGBB`
    pub color: String,
}

impl Subject {
    pub fn new(
        id: i64,
        teacher: Teacher,
        name: impl Into<String>,
        room: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id,
            teacher,
            name: name.into(),
            room: room.into(),
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Homework {
    pub id: i64,
    pub subject: Subject,
    pub description: String,
    /// `YYYY-M-D`, stored verbatim
    pub deadline: String,
    pub done: bool,
}

impl Homework {
    pub fn new(
        id: i64,
        subject: Subject,
        description: impl Into<String>,
        deadline: impl Into<String>,
        done: bool,
    ) -> Self {
        Self {
            id,
            subject,
            description: description.into(),
            deadline: deadline.into(),
            done,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,
    pub subject: Subject,
    pub description: String,
    /// `YYYY-M-D`, stored verbatim
    pub deadline: String,
}

impl Exam {
    pub fn new(
        id: i64,
        subject: Subject,
        description: impl Into<String>,
        deadline: impl Into<String>,
    ) -> Self {
        Self {
            id,
            subject,
            description: description.into(),
            deadline: deadline.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub id: i64,
    pub subject: Subject,
    pub name: String,
    pub grade: String,
}

impl Grade {
    pub fn new(id: i64, subject: Subject, name: impl Into<String>, grade: impl Into<String>) -> Self {
        Self {
            id,
            subject,
            name: name.into(),
            grade: grade.into(),
        }
    }
}

/// A school hour slot. Times are kept as the text they were stored with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: i64,
    pub school_hour_no: i64,
    pub start_time: String,
    pub end_time: String,
}

impl Period {
    pub fn new(
        id: i64,
        school_hour_no: i64,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            id,
            school_hour_no,
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub subject: Subject,
    pub period: Period,
    /// Owning weekday, if the lesson is placed on one
    #[serde(default)]
    pub weekday_id: Option<i64>,
}

impl Lesson {
    pub fn new(id: i64, subject: Subject, period: Period) -> Self {
        Self {
            id,
            subject,
            period,
            weekday_id: None,
        }
    }

    /// Field equality ignoring the weekday back-reference.
    pub fn matches(&self, other: &Lesson) -> bool {
        self.id == other.id && self.subject == other.subject && self.period == other.period
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weekday {
    pub id: i64,
    pub name: Day,
    /// Sorted by the period's school-hour number
    pub lessons: Vec<Lesson>,
    /// Owning schedule, if the day belongs to one
    #[serde(default)]
    pub schedule_id: Option<i64>,
}

impl Weekday {
    /// Builds a weekday, sorting its lessons by school hour. When `id` is
    /// already known the lessons' back-references are pointed at it.
    pub fn new(id: i64, name: Day, mut lessons: Vec<Lesson>) -> Self {
        sort_lessons(&mut lessons);
        if id > 0 {
            for lesson in &mut lessons {
                lesson.weekday_id = Some(id);
            }
        }
        Self {
            id,
            name,
            lessons,
            schedule_id: None,
        }
    }

    /// Field equality ignoring the schedule back-reference. Lessons are
    /// compared in school-hour order whatever order either side holds them in.
    pub fn matches(&self, other: &Weekday) -> bool {
        if self.id != other.id || self.name != other.name || self.lessons.len() != other.lessons.len() {
            return false;
        }

        let mut ours: Vec<&Lesson> = self.lessons.iter().collect();
        let mut theirs: Vec<&Lesson> = other.lessons.iter().collect();
        ours.sort_by_key(|lesson| hour_order(lesson));
        theirs.sort_by_key(|lesson| hour_order(lesson));
        ours.iter().zip(&theirs).all(|(a, b)| a.matches(b))
    }
}

fn hour_order(lesson: &Lesson) -> (i64, i64) {
    (lesson.period.school_hour_no, lesson.id)
}

pub(crate) fn sort_lessons(lessons: &mut [Lesson]) {
    lessons.sort_by_key(hour_order);
}

/// Number of weekday slots in a schedule
pub const SCHEDULE_SLOTS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ScheduleDocument")]
pub struct Schedule {
    pub id: i64,
    pub name: String,
    /// Indexed by [`Day::index`]; empty slots are `None`
    pub days: [Option<Weekday>; SCHEDULE_SLOTS],
}

/// Serialized form of a schedule. Weekdays are re-slotted by their label
/// when it is read back, so a day written into the wrong position still
/// lands where a stored schedule would put it.
#[derive(Deserialize)]
struct ScheduleDocument {
    id: i64,
    name: String,
    days: [Option<Weekday>; SCHEDULE_SLOTS],
}

impl From<ScheduleDocument> for Schedule {
    fn from(document: ScheduleDocument) -> Self {
        Schedule::new(document.id, document.name, document.days.into_iter().flatten())
    }
}

impl Schedule {
    /// A schedule with all six slots empty
    pub fn empty(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            days: Default::default(),
        }
    }

    /// Builds a schedule, placing every weekday in the slot of its label.
    /// A later weekday with the same label replaces an earlier one.
    pub fn new(id: i64, name: impl Into<String>, weekdays: impl IntoIterator<Item = Weekday>) -> Self {
        let mut schedule = Self::empty(id, name);
        for weekday in weekdays {
            schedule.set_day(weekday);
        }
        schedule
    }

    /// Places `weekday` in its slot, returning whatever occupied it.
    pub fn set_day(&mut self, mut weekday: Weekday) -> Option<Weekday> {
        if self.id > 0 {
            weekday.schedule_id = Some(self.id);
        }
        let slot = weekday.name.index();
        self.days[slot].replace(weekday)
    }

    pub fn day(&self, day: Day) -> Option<&Weekday> {
        self.days[day.index()].as_ref()
    }

    /// Occupied slots in Monday..Saturday order
    pub fn weekdays(&self) -> impl Iterator<Item = &Weekday> {
        self.days.iter().flatten()
    }
}
