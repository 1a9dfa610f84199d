//! Row synchronizer: keeps an [`EditableTable`] in step with model changes.
//!
//! A change below one of the table's watch paths is resolved to the row's
//! element through the watch event's trail and only that row is
//! re-projected. A change to the collection itself (members added, removed,
//! or reordered by someone other than the table) rebuilds every row.

use std::sync::{Arc, Weak};

use horizon_modeler_core::{WatchEvent, WatchHandler, Watcher};

use super::collection::RowKind;
use super::editable::EditableTable;
use crate::error::EditResult;
use crate::targets;

/// Applies watch events to a table.
///
/// The synchronizer holds the table weakly, so a handler outliving the
/// table does nothing.
pub struct RowSynchronizer<K: RowKind> {
    table: Weak<EditableTable<K>>,
}

impl<K: RowKind> Clone for RowSynchronizer<K> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<K: RowKind> RowSynchronizer<K> {
    /// Create a synchronizer for `table`.
    pub fn new(table: &Arc<EditableTable<K>>) -> Self {
        Self {
            table: Arc::downgrade(table),
        }
    }

    /// Apply one change.
    ///
    /// Returns `true` if any row was updated.
    pub fn handle(&self, event: &WatchEvent) -> bool {
        let Some(table) = self.table.upgrade() else {
            return false;
        };

        if event.is_structural() {
            if table.is_busy() {
                tracing::trace!(target: targets::SYNC, event = ?event.event(), "own change, not rebuilding");
                return false;
            }
            return match table.refresh() {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(target: targets::SYNC, %err, "rebuild after collection change failed");
                    false
                }
            };
        }

        let Some(element) = event.child() else {
            return false;
        };
        let updated = table.refresh_element(element);
        tracing::trace!(target: targets::SYNC, ?element, path = %event.path(), updated, "row sync");
        updated
    }

    /// Watch the table's owner and keep the table up to date.
    ///
    /// Every path of `K::watch_paths` is registered with one shared handler,
    /// so a change matching several paths is applied once.
    pub fn watch(table: &Arc<EditableTable<K>>) -> EditResult<Watcher> {
        let collection = table.collection();
        let sync = Self::new(table);
        let handler: WatchHandler = Arc::new(move |event: &WatchEvent| {
            sync.handle(event);
        });
        let watcher = Watcher::builder(collection.model(), collection.owner())
            .watch_paths(K::watch_paths().iter().copied(), handler)
            .subscribe()?;
        Ok(watcher)
    }
}
