//! Transactions with journaled rollback.
//!
//! While a transaction is open every primitive mutation is journaled together
//! with the information needed to invert it. Nested transactions join the
//! outermost one; rolling back a nested transaction marks the whole
//! transaction rollback-only.
//!
//! Rolling back replays the inverse of every journaled mutation in reverse
//! order, emitting the corresponding model events, so that every observer
//! returns to the state it had when the transaction began.
//!
//! # Example
//!
//! ```
//! use horizon_modeler_core::{ElementKind, Model};
//!
//! let model = Model::new();
//! let class = model.create(ElementKind::Class)?;
//!
//! let tx = model.begin();
//! model.set(class, "name", "Draft")?;
//! tx.rollback();
//!
//! assert_eq!(model.text(class, "name")?, None);
//! # Ok::<(), horizon_modeler_core::ModelError>(())
//! ```

use crate::element::{ElementId, Value};
use crate::error::{ModelError, ModelResult};
use crate::event::TransactionEvent;
use crate::logging::targets;
use crate::model::Model;

/// One journaled mutation.
#[derive(Debug, Clone)]
pub(crate) enum JournalEntry {
    Created {
        element: ElementId,
    },
    Deleted {
        element: ElementId,
    },
    Updated {
        element: ElementId,
        attribute: &'static str,
        old: Value,
    },
    Added {
        element: ElementId,
        attribute: &'static str,
        member: ElementId,
    },
    Removed {
        element: ElementId,
        attribute: &'static str,
        member: ElementId,
        index: usize,
    },
    Reordered {
        element: ElementId,
        attribute: &'static str,
        previous: Vec<ElementId>,
    },
}

/// Per-model transaction bookkeeping.
#[derive(Debug, Default)]
pub(crate) struct TransactionState {
    depth: usize,
    rollback_only: bool,
    journal: Vec<JournalEntry>,
}

impl TransactionState {
    pub(crate) fn record(&mut self, entry: JournalEntry) {
        if self.depth > 0 {
            self.journal.push(entry);
        }
    }
}

/// Guard for an open transaction.
///
/// Dropping the guard without calling [`commit`](Self::commit) rolls the
/// transaction back.
#[must_use = "dropping a transaction rolls it back"]
pub struct Transaction {
    model: Model,
    finished: bool,
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("finished", &self.finished)
            .finish()
    }
}

impl Transaction {
    /// Commit the transaction.
    ///
    /// Committing a nested transaction only closes that level. Committing the
    /// outermost transaction of a rollback-only transaction rolls everything
    /// back and returns [`ModelError::RolledBack`].
    pub fn commit(mut self) -> ModelResult<()> {
        self.finished = true;
        self.model.finish_transaction(true)
    }

    /// Roll the transaction back.
    ///
    /// For a nested transaction this marks the outermost transaction
    /// rollback-only; the journal is replayed when it closes.
    pub fn rollback(mut self) {
        self.finished = true;
        // Only a commit can report RolledBack.
        let _ = self.model.finish_transaction(false);
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(target: targets::TRANSACTION, "transaction dropped without commit");
            let _ = self.model.finish_transaction(false);
        }
    }
}

impl Model {
    /// Open a transaction, joining the current one if already inside one.
    pub fn begin(&self) -> Transaction {
        let outermost = {
            let mut state = self.transaction_state().lock();
            state.depth += 1;
            if state.depth == 1 {
                state.rollback_only = false;
                state.journal.clear();
                true
            } else {
                false
            }
        };
        if outermost {
            tracing::debug!(target: targets::TRANSACTION, "transaction begin");
            self.transaction_events().emit(TransactionEvent::Begin);
        }
        Transaction {
            model: self.clone(),
            finished: false,
        }
    }

    /// Run `f` inside a transaction.
    ///
    /// The transaction commits if `f` returns `Ok` and rolls back otherwise.
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Model) -> Result<T, E>,
        E: From<ModelError>,
    {
        let tx = self.begin();
        match f(self) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                tx.rollback();
                Err(err)
            }
        }
    }

    /// Returns `true` while a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.transaction_state().lock().depth > 0
    }

    fn finish_transaction(&self, commit: bool) -> ModelResult<()> {
        let (journal, rollback) = {
            let mut state = self.transaction_state().lock();
            if state.depth == 0 {
                return Ok(());
            }
            if !commit {
                state.rollback_only = true;
            }
            state.depth -= 1;
            if state.depth > 0 {
                return Ok(());
            }
            (std::mem::take(&mut state.journal), state.rollback_only)
        };

        if rollback {
            tracing::debug!(target: targets::TRANSACTION, entries = journal.len(), "transaction rollback");
            for entry in journal.into_iter().rev() {
                self.revert(entry);
            }
            self.transaction_events().emit(TransactionEvent::Rollback);
            if commit {
                return Err(ModelError::RolledBack);
            }
        } else {
            let deleted: Vec<ElementId> = journal
                .iter()
                .filter_map(|entry| match entry {
                    JournalEntry::Deleted { element } => Some(*element),
                    _ => None,
                })
                .collect();
            self.purge(&deleted);
            tracing::debug!(target: targets::TRANSACTION, entries = journal.len(), "transaction commit");
            self.transaction_events().emit(TransactionEvent::Commit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::element::ElementKind;
    use crate::event::ModelEvent;

    use super::*;

    #[test]
    fn test_commit_keeps_changes() {
        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();

        let tx = model.begin();
        model.set(class, "name", "Kept").unwrap();
        tx.commit().unwrap();

        assert!(!model.in_transaction());
        assert_eq!(model.text(class, "name").unwrap().as_deref(), Some("Kept"));
    }

    #[test]
    fn test_rollback_restores_everything() {
        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();
        let kept = model.create(ElementKind::Property).unwrap();
        model.append(class, "ownedAttribute", kept).unwrap();

        let tx = model.begin();
        let added = model.create(ElementKind::Property).unwrap();
        model.append(class, "ownedAttribute", added).unwrap();
        model.swap(class, "ownedAttribute", kept, added).unwrap();
        model.set(kept, "name", "renamed").unwrap();
        model.delete(kept).unwrap();
        drop(tx);

        assert!(model.contains(kept));
        assert!(!model.contains(added));
        assert_eq!(model.members(class, "ownedAttribute").unwrap(), vec![kept]);
        assert_eq!(model.text(kept, "name").unwrap(), None);
        assert_eq!(model.owner(kept).unwrap(), Some((class, "ownedAttribute")));
    }

    #[test]
    fn test_nested_rollback_marks_outer() {
        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();

        let outer = model.begin();
        model.set(class, "name", "outer").unwrap();
        let inner = model.begin();
        model.set(class, "isAbstract", true).unwrap();
        inner.rollback();

        // Nothing is undone until the outermost level closes.
        assert!(model.flag(class, "isAbstract").unwrap());
        assert_eq!(outer.commit(), Err(ModelError::RolledBack));
        assert!(!model.flag(class, "isAbstract").unwrap());
        assert_eq!(model.text(class, "name").unwrap(), None);
    }

    #[test]
    fn test_rollback_emits_inverse_events() {
        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        model.events().connect(move |event| sink.lock().push(event.clone()));

        let tx = model.begin();
        model.set(class, "name", "a").unwrap();
        tx.rollback();

        let events = events.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            ModelEvent::AttributeUpdated {
                element: class,
                attribute: "name",
                old: Value::from("a"),
                new: Value::None,
            }
        );
    }

    #[test]
    fn test_transaction_helper() {
        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();

        let result: Result<(), ModelError> = model.transaction(|model| {
            model.set(class, "name", "temp")?;
            model.set(class, "isAbstract", true)?;
            Err(ModelError::WrongThread)
        });

        assert!(result.is_err());
        assert_eq!(model.text(class, "name").unwrap(), None);
    }

    #[test]
    fn test_boundary_events() {
        let model = Model::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        model
            .transaction_events()
            .connect(move |event| sink.lock().push(*event));

        model.begin().commit().unwrap();
        model.begin().rollback();

        assert_eq!(
            *seen.lock(),
            vec![
                TransactionEvent::Begin,
                TransactionEvent::Commit,
                TransactionEvent::Begin,
                TransactionEvent::Rollback,
            ]
        );
    }

    #[test]
    fn test_deleted_elements_purged_on_commit() {
        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();

        let tx = model.begin();
        model.delete(class).unwrap();
        assert!(!model.contains(class));
        tx.commit().unwrap();

        assert!(!model.contains(class));
        assert!(model.is_empty());
    }
}
