//! Core traits for flat, editable tables.
//!
//! This module defines the interface a rendering layer uses to show and edit
//! a table without knowing what the rows stand for.

use horizon_modeler_core::Signal;

use super::role::{CheckState, ItemData, ItemRole};

/// Flags indicating what operations are allowed on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    /// Cell can be selected.
    pub selectable: bool,
    /// Cell text can be edited.
    pub editable: bool,
    /// Row can be dragged.
    pub drag_enabled: bool,
    /// Rows can be dropped onto this one.
    pub drop_enabled: bool,
    /// Cell has a checkbox.
    pub checkable: bool,
    /// Cell is enabled (can interact).
    pub enabled: bool,
}

impl ItemFlags {
    /// Creates flags with all defaults (selectable and enabled only).
    pub fn new() -> Self {
        Self {
            selectable: true,
            enabled: true,
            ..Default::default()
        }
    }

    /// Creates flags for a disabled cell.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Creates flags for an editable cell.
    pub fn editable() -> Self {
        Self {
            selectable: true,
            editable: true,
            enabled: true,
            ..Default::default()
        }
    }

    /// Creates flags for a checkable cell.
    pub fn checkable() -> Self {
        Self {
            selectable: true,
            checkable: true,
            enabled: true,
            ..Default::default()
        }
    }

    /// Sets the editable flag.
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Sets the checkable flag.
    pub fn with_checkable(mut self, checkable: bool) -> Self {
        self.checkable = checkable;
        self
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the drag enabled flag.
    pub fn with_drag(mut self, enabled: bool) -> Self {
        self.drag_enabled = enabled;
        self
    }

    /// Sets the drop enabled flag.
    pub fn with_drop(mut self, enabled: bool) -> Self {
        self.drop_enabled = enabled;
        self
    }
}

/// A flat table of rows and columns.
///
/// Views query cells through [`data`](TableModel::data) and write edits back
/// through [`set_data`](TableModel::set_data). Implementations emit the
/// matching [`ModelSignals`] after every change so views stay in sync.
pub trait TableModel: Send + Sync {
    /// Returns the number of rows.
    fn row_count(&self) -> usize;

    /// Returns the number of columns.
    fn column_count(&self) -> usize;

    /// Returns the data stored under the given role for a cell.
    ///
    /// Returns `ItemData::None` for out-of-range cells and unsupported roles.
    fn data(&self, row: usize, column: usize, role: ItemRole) -> ItemData;

    /// Returns the signals for this table.
    fn signals(&self) -> &ModelSignals;

    /// Sets the data for a cell.
    ///
    /// Returns `true` if the edit was accepted. The default is read-only.
    fn set_data(&self, _row: usize, _column: usize, _value: ItemData, _role: ItemRole) -> bool {
        false
    }

    /// Returns the flags for a cell.
    fn flags(&self, _row: usize, _column: usize) -> ItemFlags {
        ItemFlags::new()
    }

    /// Returns header data for a section.
    fn header_data(&self, _section: usize, _orientation: Orientation, _role: ItemRole) -> ItemData {
        ItemData::None
    }

    /// Returns the display text of a cell.
    fn display_text(&self, row: usize, column: usize) -> Option<String> {
        self.data(row, column, ItemRole::Display).into_string()
    }

    /// Returns the check state of a cell.
    fn check_state(&self, row: usize, column: usize) -> Option<CheckState> {
        self.data(row, column, ItemRole::CheckState).as_check_state()
    }

    /// Sets the check state of a cell.
    fn set_check_state(&self, row: usize, column: usize, state: CheckState) -> bool {
        self.set_data(row, column, ItemData::CheckState(state), ItemRole::CheckState)
    }
}

/// Header orientation for `header_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Column headers.
    Horizontal,
    /// Row headers.
    Vertical,
}

/// Signals emitted by tables.
///
/// Row ranges are inclusive `(first, last)` pairs.
pub struct ModelSignals {
    /// Emitted after rows have been inserted.
    pub rows_inserted: Signal<(usize, usize)>,

    /// Emitted after rows have been removed.
    pub rows_removed: Signal<(usize, usize)>,

    /// Emitted after two rows exchanged places.
    /// Args: (first row, second row)
    pub rows_swapped: Signal<(usize, usize)>,

    /// Emitted after the row order changed as a whole.
    pub layout_changed: Signal<()>,

    /// Emitted when cell data in existing rows changes.
    /// Args: (first row, last row, changed roles)
    pub data_changed: Signal<(usize, usize, Vec<ItemRole>)>,

    /// Emitted before every row is thrown away.
    pub model_about_to_reset: Signal<()>,

    /// Emitted after every row was rebuilt.
    pub model_reset: Signal<()>,
}

impl Default for ModelSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSignals {
    /// Creates a new set of table signals.
    pub fn new() -> Self {
        Self {
            rows_inserted: Signal::new(),
            rows_removed: Signal::new(),
            rows_swapped: Signal::new(),
            layout_changed: Signal::new(),
            data_changed: Signal::new(),
            model_about_to_reset: Signal::new(),
            model_reset: Signal::new(),
        }
    }

    /// Emits the data_changed signal for a single row.
    pub fn emit_row_changed(&self, row: usize, roles: Vec<ItemRole>) {
        self.data_changed.emit((row, row, roles));
    }

    /// Emits signals for a table reset.
    ///
    /// Calls the provided function between the about_to_reset and reset signals.
    pub fn emit_reset<F>(&self, reset_fn: F)
    where
        F: FnOnce(),
    {
        self.model_about_to_reset.emit(());
        reset_fn();
        self.model_reset.emit(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_item_flags() {
        let flags = ItemFlags::new();
        assert!(flags.selectable);
        assert!(flags.enabled);
        assert!(!flags.editable);
        assert!(!flags.checkable);

        let editable = ItemFlags::editable().with_drag(true);
        assert!(editable.editable);
        assert!(editable.drag_enabled);
    }

    #[test]
    fn test_emit_reset() {
        let signals = ModelSignals::new();
        let counter = Arc::new(Mutex::new(0));

        let c1 = counter.clone();
        signals.model_about_to_reset.connect(move |_| {
            *c1.lock() += 1;
        });

        let c2 = counter.clone();
        signals.model_reset.connect(move |_| {
            *c2.lock() += 10;
        });

        signals.emit_reset(|| {});
        assert_eq!(*counter.lock(), 11);
    }
}
