//! Impact counting - how many rows a delete would take with it
//!
//! Teachers expand through their subjects, one level deep. Schedules count
//! their weekdays only; the lessons hanging off those weekdays are not
//! included even though the cascade removes them too.

use rusqlite::Connection;
use crate::storage::codec::{count_referencing, ids_referencing};
use crate::{EntityKind, Result};

/// Tables holding a required or owning reference to `kind`, with the column
pub fn referencing(kind: EntityKind) -> &'static [(EntityKind, &'static str)] {
    match kind {
        EntityKind::Subject => &[
            (EntityKind::Exam, "subject_id"),
            (EntityKind::Homework, "subject_id"),
            (EntityKind::Grade, "subject_id"),
            (EntityKind::Lesson, "subject_id"),
        ],
        EntityKind::Teacher => &[(EntityKind::Subject, "teacher_id")],
        EntityKind::Period => &[(EntityKind::Lesson, "period_id")],
        EntityKind::Weekday => &[(EntityKind::Lesson, "weekday_id")],
        EntityKind::Schedule => &[(EntityKind::Weekday, "schedule_id")],
        EntityKind::Homework | EntityKind::Exam | EntityKind::Grade | EntityKind::Lesson => &[],
    }
}

/// Affected rows per dependent kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpactReport {
    pub entries: Vec<(EntityKind, u64)>,
}

impl ImpactReport {
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    fn add(&mut self, kind: EntityKind, count: u64) {
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, existing)) => *existing += count,
            None => self.entries.push((kind, count)),
        }
    }
}

impl std::fmt::Display for ImpactReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(kind, count)| format!("{} {}", count, kind))
            .collect();
        if parts.is_empty() {
            write!(f, "nothing else")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Rows that reference `kind #id`, broken down by kind
pub fn impact_report(conn: &Connection, kind: EntityKind, id: i64) -> Result<ImpactReport> {
    let mut report = ImpactReport::default();

    for (child, column) in referencing(kind) {
        report.add(*child, count_referencing(conn, *child, column, id)?);
    }

    if kind == EntityKind::Teacher {
        for subject in ids_referencing(conn, EntityKind::Subject, "teacher_id", id)? {
            for (child, column) in referencing(EntityKind::Subject) {
                report.add(*child, count_referencing(conn, *child, column, subject)?);
            }
        }
    }

    Ok(report)
}

/// Total number of rows a delete of `kind #id` would affect
pub fn impact_count(conn: &Connection, kind: EntityKind, id: i64) -> Result<u64> {
    if kind.is_leaf() {
        return Ok(0);
    }
    let count = impact_report(conn, kind, id)?.total();
    tracing::debug!(%kind, id, count, "impact counted");
    Ok(count)
}
