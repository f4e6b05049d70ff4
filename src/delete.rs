//! Delete coordination
//!
//! A delete walks `Counting → {Deleting | AwaitingConfirmation} → {Done | Aborted}`.
//! Anything with dependents needs an explicit accept from a [`ConfirmDelete`]
//! before a row is touched. The confirmation comes back over a crossbeam
//! channel; a sender dropped without answering counts as a decline.

use crossbeam::channel::{bounded, Receiver};
use crate::storage::SqliteStore;
use crate::{EntityKind, Error, Result};

/// What a confirmer is asked to approve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRequest {
    pub kind: EntityKind,
    pub id: i64,
    /// Rows that go with it
    pub impact: u64,
}

impl std::fmt::Display for DeleteRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "delete {} #{} and {} dependent row(s)", self.kind, self.id, self.impact)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Cancel,
}

/// Something that can approve or decline a delete with dependents.
///
/// The answer arrives on the returned channel, possibly from another thread.
pub trait ConfirmDelete {
    fn request(&self, request: &DeleteRequest) -> Receiver<Decision>;
}

/// A fixed decision, answered immediately
impl ConfirmDelete for Decision {
    fn request(&self, _request: &DeleteRequest) -> Receiver<Decision> {
        answered(*self)
    }
}

impl<F> ConfirmDelete for F
where
    F: Fn(&DeleteRequest) -> Decision,
{
    fn request(&self, request: &DeleteRequest) -> Receiver<Decision> {
        answered(self(request))
    }
}

fn answered(decision: Decision) -> Receiver<Decision> {
    let (tx, rx) = bounded(1);
    // Capacity 1 and a live receiver: this send cannot fail.
    let _ = tx.send(decision);
    rx
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePhase {
    Counting,
    AwaitingConfirmation { impact: u64 },
    Deleting { impact: u64 },
    Done { impact: u64 },
    Aborted { impact: u64 },
}

/// Final state of a delete request, with the impact count that was confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { impact: u64 },
    Aborted { impact: u64 },
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted { .. })
    }

    pub fn impact(&self) -> u64 {
        match self {
            DeleteOutcome::Deleted { impact } | DeleteOutcome::Aborted { impact } => *impact,
        }
    }
}

/// Drives one delete request through its phases against a store
pub struct DeleteCoordinator<'a, C: ConfirmDelete + ?Sized> {
    store: &'a mut SqliteStore,
    confirm: &'a C,
}

impl<'a, C: ConfirmDelete + ?Sized> DeleteCoordinator<'a, C> {
    pub fn new(store: &'a mut SqliteStore, confirm: &'a C) -> Self {
        Self { store, confirm }
    }

    pub fn run(self, kind: EntityKind, id: i64) -> Result<DeleteOutcome> {
        let mut phase = if kind.is_leaf() {
            DeletePhase::Deleting { impact: 0 }
        } else {
            DeletePhase::Counting
        };

        loop {
            tracing::debug!(%kind, id, ?phase, "delete phase");
            phase = match phase {
                DeletePhase::Counting => {
                    if !self.store.exists(kind, id)? {
                        return Err(Error::NotFound { kind, id });
                    }
                    match self.store.impact_count(kind, id)? {
                        0 => DeletePhase::Deleting { impact: 0 },
                        impact => DeletePhase::AwaitingConfirmation { impact },
                    }
                }
                DeletePhase::AwaitingConfirmation { impact } => {
                    let request = DeleteRequest { kind, id, impact };
                    match self.confirm.request(&request).recv() {
                        Ok(Decision::Accept) => DeletePhase::Deleting { impact },
                        Ok(Decision::Cancel) => DeletePhase::Aborted { impact },
                        Err(_) => {
                            tracing::debug!(%kind, id, "confirmation channel closed without a decision");
                            DeletePhase::Aborted { impact }
                        }
                    }
                }
                DeletePhase::Deleting { impact } => {
                    self.store.delete_confirmed(kind, id, impact)?;
                    DeletePhase::Done { impact }
                }
                DeletePhase::Done { impact } => return Ok(DeleteOutcome::Deleted { impact }),
                DeletePhase::Aborted { impact } => {
                    tracing::info!(%kind, id, impact, "delete aborted");
                    return Ok(DeleteOutcome::Aborted { impact });
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Exam, Subject, Teacher};
    use std::cell::Cell;

    fn store_with_exam() -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let subject = Subject::new(1, Teacher::new(1, "Dickens", Some("DICK"), Teacher::FEMALE), "German", "B308", "#ff0000");
        store.insert(&Exam::new(1, subject, "German Test", "2017-5-3")).unwrap();
        store
    }

    #[test]
    fn test_leaf_delete_never_asks() {
        let mut store = store_with_exam();
        let asked = Cell::new(false);
        let confirm = |_: &DeleteRequest| {
            asked.set(true);
            Decision::Cancel
        };

        let outcome = DeleteCoordinator::new(&mut store, &confirm).run(EntityKind::Exam, 1).unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted { impact: 0 });
        assert!(!asked.get());
        assert_eq!(store.size(EntityKind::Exam).unwrap(), 0);
    }

    #[test]
    fn test_request_carries_impact() {
        let mut store = store_with_exam();
        let seen = Cell::new(None);
        let confirm = |request: &DeleteRequest| {
            seen.set(Some(*request));
            Decision::Accept
        };

        let outcome = DeleteCoordinator::new(&mut store, &confirm).run(EntityKind::Teacher, 1).unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted { impact: 2 });
        assert_eq!(
            seen.get(),
            Some(DeleteRequest { kind: EntityKind::Teacher, id: 1, impact: 2 })
        );
        assert_eq!(store.size(EntityKind::Exam).unwrap(), 0);
    }

    #[test]
    fn test_decline_touches_nothing() {
        let mut store = store_with_exam();
        let outcome = DeleteCoordinator::new(&mut store, &Decision::Cancel).run(EntityKind::Subject, 1).unwrap();

        assert_eq!(outcome, DeleteOutcome::Aborted { impact: 1 });
        assert_eq!(store.size(EntityKind::Subject).unwrap(), 1);
        assert_eq!(store.size(EntityKind::Exam).unwrap(), 1);
    }

    struct Silent;

    impl ConfirmDelete for Silent {
        fn request(&self, _request: &DeleteRequest) -> Receiver<Decision> {
            let (_tx, rx) = bounded(1);
            rx
        }
    }

    #[test]
    fn test_dropped_channel_aborts() {
        let mut store = store_with_exam();
        let outcome = DeleteCoordinator::new(&mut store, &Silent).run(EntityKind::Teacher, 1).unwrap();

        assert!(!outcome.is_deleted());
        assert_eq!(store.size(EntityKind::Teacher).unwrap(), 1);
    }

    #[test]
    fn test_missing_target_is_not_found() {
        let mut store = store_with_exam();
        let err = DeleteCoordinator::new(&mut store, &Decision::Accept)
            .run(EntityKind::Period, 3)
            .unwrap_err();
        assert!(err.is_not_found());

        let err = DeleteCoordinator::new(&mut store, &Decision::Accept)
            .run(EntityKind::Grade, 3)
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
