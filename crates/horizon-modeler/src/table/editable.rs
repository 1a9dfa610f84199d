//! Materialized, editable collection table.
//!
//! [`EditableTable`] caches the rows of an [`OrderedCollection`] and serves
//! them to a view through [`TableModel`]. A trailing placeholder row lets
//! the user type a new element into existence; clearing the text of an
//! existing row deletes its element.
//!
//! The cache is only written on the sanctioned paths: edits made through the
//! table, [`EditableTable::refresh`], and [`EditableTable::refresh_element`]
//! (which the row synchronizer calls for model changes made elsewhere).
//! The row lock is never held while the model is mutated or while signals
//! are emitted, so model handlers may read the table re-entrantly.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_modeler_core::{ElementId, Model, PerfSpan};
use parking_lot::RwLock;

use super::collection::{CollectionRow, OrderedCollection, RowKind};
use super::column::ColumnRole;
use super::keys::{Key, KeyAction, KeyboardModifiers, key_action};
use super::role::{CheckState, ItemData, ItemRole};
use super::traits::{ItemFlags, ModelSignals, Orientation, TableModel};
use crate::config::{EditorConfig, ReorderRefresh};
use crate::error::{EditError, EditResult};
use crate::i18n::{self, Translator};
use crate::targets;

/// Marks the table busy while it mutates the model itself.
struct BusyGuard<'a>(&'a AtomicUsize);

impl<'a> BusyGuard<'a> {
    fn new(depth: &'a AtomicUsize) -> Self {
        depth.fetch_add(1, Ordering::SeqCst);
        Self(depth)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// An editable table over one ordered collection.
pub struct EditableTable<K: RowKind> {
    collection: OrderedCollection<K>,
    rows: RwLock<Vec<K::Row>>,
    reorder_refresh: ReorderRefresh,
    translator: Arc<dyn Translator>,
    busy: AtomicUsize,
    signals: ModelSignals,
}

impl<K: RowKind> EditableTable<K> {
    /// Build a table over the `K::COLLECTION` of `owner`.
    pub fn new(model: &Model, owner: ElementId, config: &EditorConfig) -> EditResult<Self> {
        Self::with_translator(model, owner, config, i18n::identity())
    }

    /// Build a table that translates its headers through `translator`.
    pub fn with_translator(
        model: &Model,
        owner: ElementId,
        config: &EditorConfig,
        translator: Arc<dyn Translator>,
    ) -> EditResult<Self> {
        let collection = OrderedCollection::new(model, owner, config);
        let rows = collection.rows()?.collect();
        Ok(Self {
            collection,
            rows: RwLock::new(rows),
            reorder_refresh: config.reorder_refresh,
            translator,
            busy: AtomicUsize::new(0),
            signals: ModelSignals::new(),
        })
    }

    /// The adapter behind this table.
    pub fn collection(&self) -> &OrderedCollection<K> {
        &self.collection
    }

    /// Number of element rows, excluding the placeholder.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns `true` if only the placeholder row is shown.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Returns `true` if `row` is the trailing placeholder.
    pub fn is_placeholder(&self, row: usize) -> bool {
        row == self.len()
    }

    /// A copy of the cached row at `row`.
    pub fn row(&self, row: usize) -> Option<K::Row> {
        self.rows.read().get(row).cloned()
    }

    /// A copy of every cached row.
    pub fn rows(&self) -> Vec<K::Row> {
        self.rows.read().clone()
    }

    /// The back-references of every row, in row order.
    pub fn elements(&self) -> Vec<ElementId> {
        self.rows.read().iter().map(CollectionRow::element).collect()
    }

    /// The row showing `element`.
    pub fn find(&self, element: ElementId) -> Option<usize> {
        self.rows.read().iter().position(|row| row.element() == element)
    }

    fn element_at(&self, row: usize) -> Option<ElementId> {
        self.rows.read().get(row).map(CollectionRow::element)
    }

    /// Returns `true` while the table is applying its own edit.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst) > 0
    }

    fn recover<T>(&self, err: EditError) -> EditResult<T> {
        if err.is_stale() {
            tracing::debug!(target: targets::TABLE, %err, "table out of date, rebuilding");
            self.refresh()?;
        }
        Err(err)
    }

    /// Apply a cell edit.
    ///
    /// On the placeholder row, non-empty text creates a new element. On an
    /// element row, empty text deletes the element and anything else is
    /// applied per the column's role. A rejected edit re-renders the row
    /// from the model and returns the error.
    #[tracing::instrument(skip(self), target = "horizon_modeler::table", level = "trace")]
    pub fn set_value(&self, row: usize, column: usize, input: &str) -> EditResult<()> {
        let Some(spec) = K::columns().get(column) else {
            return Ok(());
        };
        let is_text = spec.role == ColumnRole::Text;

        let Some(element) = self.element_at(row) else {
            if is_text && self.is_placeholder(row) && !input.trim().is_empty() {
                return self.insert(input);
            }
            return Ok(());
        };

        if is_text && input.trim().is_empty() {
            return self.remove(row);
        }

        match self.collection.apply(element, column, input) {
            Ok(()) => {
                self.refresh_element(element);
                Ok(())
            }
            Err(err) if err.is_stale() => self.recover(err),
            Err(err) => {
                tracing::debug!(target: targets::TABLE, ?element, column, %err, "edit rejected");
                self.revert_element(element);
                Err(err)
            }
        }
    }

    fn insert(&self, input: &str) -> EditResult<()> {
        let element = {
            let _busy = BusyGuard::new(&self.busy);
            let collection = &self.collection;
            collection.model().transaction(|_| -> EditResult<ElementId> {
                let element = collection.create()?;
                collection.apply(element, 0, input)?;
                Ok(element)
            })?
        };

        let projected = self.collection.project(element)?;
        let index = {
            let mut rows = self.rows.write();
            rows.push(projected);
            rows.len() - 1
        };
        self.signals.rows_inserted.emit((index, index));
        Ok(())
    }

    /// Delete the element shown in `row`. The placeholder cannot be removed.
    #[tracing::instrument(skip(self), target = "horizon_modeler::table", level = "trace")]
    pub fn remove(&self, row: usize) -> EditResult<()> {
        let Some(element) = self.element_at(row) else {
            return Ok(());
        };

        let result = {
            let _busy = BusyGuard::new(&self.busy);
            self.collection.remove(element)
        };
        if let Err(err) = result {
            return self.recover(err);
        }

        let removed = {
            let mut rows = self.rows.write();
            let index = rows.iter().position(|candidate| candidate.element() == element);
            if let Some(index) = index {
                rows.remove(index);
            }
            index
        };
        if let Some(index) = removed {
            self.signals.rows_removed.emit((index, index));
        }
        Ok(())
    }

    /// Exchange two rows and their elements.
    ///
    /// Returns `Ok(false)` without touching anything if either row is the
    /// placeholder or out of range. A stale row rebuilds the table and
    /// returns the invalid reference error.
    #[tracing::instrument(skip(self), target = "horizon_modeler::table", level = "trace")]
    pub fn swap(&self, a: usize, b: usize) -> EditResult<bool> {
        let (Some(first), Some(second)) = (self.element_at(a), self.element_at(b)) else {
            return Ok(false);
        };
        if a == b {
            return Ok(false);
        }

        let result = {
            let _busy = BusyGuard::new(&self.busy);
            self.collection.swap(first, second)
        };
        if let Err(err) = result {
            return self.recover(err);
        }

        self.rows.write().swap(a, b);
        self.signals.rows_swapped.emit((a, b));
        if self.reorder_refresh == ReorderRefresh::Reproject {
            self.refresh_element(first);
            self.refresh_element(second);
        }
        Ok(true)
    }

    /// Reorder the collection after a drag and drop.
    ///
    /// `new_order` lists elements in their new order; members it leaves out
    /// move to the end. The cached rows are then arranged to match the
    /// collection.
    #[tracing::instrument(skip(self), target = "horizon_modeler::table", level = "trace")]
    pub fn sync_order(&self, new_order: &[ElementId]) -> EditResult<()> {
        let result = {
            let _busy = BusyGuard::new(&self.busy);
            self.collection.reorder(new_order)
        };
        if let Err(err) = result {
            return self.recover(err);
        }

        let members = self.collection.members()?;
        if self.reorder_refresh == ReorderRefresh::Reproject {
            return self.refresh();
        }
        let consistent = {
            let mut rows = self.rows.write();
            rows.sort_by_key(|row| {
                members
                    .iter()
                    .position(|member| *member == row.element())
                    .unwrap_or(members.len())
            });
            rows.len() == members.len()
                && rows.iter().zip(&members).all(|(row, member)| row.element() == *member)
        };
        if !consistent {
            return self.refresh();
        }
        self.signals.layout_changed.emit(());
        Ok(())
    }

    /// Move the row at `from` so it ends up at `to`, as a drag gesture does.
    pub fn move_row(&self, from: usize, to: usize) -> EditResult<()> {
        let mut order = self.elements();
        if from >= order.len() || to >= order.len() || from == to {
            return Ok(());
        }
        let element = order.remove(from);
        order.insert(to, element);
        self.sync_order(&order)
    }

    /// Rebuild every row from the model.
    #[tracing::instrument(skip(self), target = "horizon_modeler::table", level = "trace")]
    pub fn refresh(&self) -> EditResult<()> {
        let _perf = PerfSpan::new("table.refresh");
        let rows: Vec<K::Row> = self.collection.rows()?.collect();
        tracing::trace!(target: targets::TABLE, rows = rows.len(), "table rebuilt");
        self.signals.emit_reset(|| *self.rows.write() = rows);
        Ok(())
    }

    /// Re-project the row showing `element`.
    ///
    /// Returns `false` if no row shows it or it can no longer be projected.
    pub fn refresh_element(&self, element: ElementId) -> bool {
        let Ok(projected) = self.collection.project(element) else {
            return false;
        };
        let changed = {
            let mut rows = self.rows.write();
            match rows.iter().position(|row| row.element() == element) {
                Some(index) if rows[index] != projected => {
                    rows[index] = projected;
                    Some(index)
                }
                _ => None,
            }
        };
        match changed {
            Some(index) => {
                self.signals
                    .emit_row_changed(index, vec![ItemRole::Display, ItemRole::CheckState]);
                true
            }
            None => false,
        }
    }

    /// Re-render the row of `element` after a rejected edit.
    ///
    /// The view still shows the rejected input, so the row is announced even
    /// when its projection did not change.
    fn revert_element(&self, element: ElementId) {
        if self.refresh_element(element) {
            return;
        }
        let index = self.rows.read().iter().position(|row| row.element() == element);
        if let Some(index) = index {
            self.signals
                .emit_row_changed(index, vec![ItemRole::Display, ItemRole::CheckState]);
        }
    }

    /// React to a key press on the selected row.
    ///
    /// Returns `Ok(true)` if the key is one the table handles.
    pub fn handle_key(&self, row: usize, key: Key, modifiers: KeyboardModifiers) -> EditResult<bool> {
        let Some(action) = key_action(key, modifiers) else {
            return Ok(false);
        };
        match action {
            KeyAction::Remove => self.remove(row)?,
            KeyAction::MoveDown => {
                if let Some(next) = row.checked_add(1) {
                    self.swap(row, next)?;
                }
            }
            KeyAction::MoveUp => {
                if let Some(previous) = row.checked_sub(1) {
                    self.swap(row, previous)?;
                }
            }
        }
        Ok(true)
    }

    fn translated(&self, message: &str) -> ItemData {
        if message.is_empty() {
            ItemData::None
        } else {
            ItemData::String(self.translator.translate(message))
        }
    }
}

impl<K: RowKind> TableModel for EditableTable<K> {
    fn row_count(&self) -> usize {
        self.len() + 1
    }

    fn column_count(&self) -> usize {
        K::columns().len()
    }

    fn data(&self, row: usize, column: usize, role: ItemRole) -> ItemData {
        let Some(spec) = K::columns().get(column) else {
            return ItemData::None;
        };
        if role == ItemRole::ToolTip {
            return spec.tooltip.map(|tooltip| self.translated(tooltip)).unwrap_or_default();
        }

        let rows = self.rows.read();
        let cached = rows.get(row);
        if cached.is_none() && row != rows.len() {
            return ItemData::None;
        }

        match (spec.role, role) {
            (ColumnRole::Text, ItemRole::Display | ItemRole::Edit) => {
                ItemData::String(cached.map(|row| row.text().to_string()).unwrap_or_default())
            }
            (ColumnRole::Toggle { attribute }, ItemRole::CheckState) => {
                let checked = cached.and_then(|row| row.toggle(attribute)).unwrap_or(false);
                ItemData::CheckState(CheckState::from(checked))
            }
            (ColumnRole::Reference, ItemRole::Display | ItemRole::Edit) => cached
                .map(|row| ItemData::Element(row.element()))
                .unwrap_or_default(),
            _ => ItemData::None,
        }
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    fn set_data(&self, row: usize, column: usize, value: ItemData, role: ItemRole) -> bool {
        let Some(spec) = K::columns().get(column) else {
            return false;
        };
        let result = match (spec.role, role) {
            (ColumnRole::Text, ItemRole::Edit | ItemRole::Display) => match value.as_string() {
                Some(text) => self.set_value(row, column, text),
                None => return false,
            },
            (ColumnRole::Toggle { attribute }, ItemRole::CheckState) => {
                let Some(wanted) = value.as_bool() else {
                    return false;
                };
                let current = self.row(row).and_then(|cached| cached.toggle(attribute));
                match current {
                    Some(current) if current != wanted => self.set_value(row, column, ""),
                    Some(_) => Ok(()),
                    None => return false,
                }
            }
            (ColumnRole::Reference, _) => self.set_value(row, column, ""),
            _ => return false,
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(target: targets::TABLE, row, column, %err, "cell edit failed");
                false
            }
        }
    }

    fn flags(&self, row: usize, column: usize) -> ItemFlags {
        let placeholder = self.is_placeholder(row);
        match K::columns().get(column).map(|spec| spec.role) {
            Some(ColumnRole::Text) if placeholder => ItemFlags::editable(),
            Some(ColumnRole::Text) => ItemFlags::editable().with_drag(true).with_drop(true),
            Some(ColumnRole::Toggle { .. }) => ItemFlags::checkable().with_enabled(!placeholder),
            Some(ColumnRole::Reference) => ItemFlags::new(),
            None => ItemFlags::disabled(),
        }
    }

    fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        if orientation != Orientation::Horizontal {
            return ItemData::None;
        }
        let Some(spec) = K::columns().get(section) else {
            return ItemData::None;
        };
        match role {
            ItemRole::Display => self.translated(spec.header),
            ItemRole::ToolTip => spec.tooltip.map(|tooltip| self.translated(tooltip)).unwrap_or_default(),
            _ => ItemData::None,
        }
    }
}
