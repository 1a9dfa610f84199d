//! Pages editing one collection of a classifier through a table.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use horizon_modeler_core::Watcher;

use super::{PageContext, PageState, PropertyPage};
use crate::error::EditResult;
use crate::presentation::{ClassifierItem, Compartment};
use crate::table::{AttributeRows, EditableTable, LiteralRows, OperationRows, RowKind, RowSynchronizer};
use crate::targets;

/// A property page showing a collection table for a classifier item.
///
/// While bound, the page owns the table and the watcher that keeps it in
/// sync. [`destroy`](PropertyPage::destroy) releases the watcher before the
/// table is dropped; dropping the page destroys it.
pub struct TablePage<K: RowKind> {
    name: &'static str,
    order: u32,
    compartment: Compartment,
    ctx: PageContext,
    table: Option<Arc<EditableTable<K>>>,
    watcher: Option<Watcher>,
    state: PageState,
}

/// Edits the attributes of a class, interface, or data type.
pub type AttributesPage = TablePage<AttributeRows>;

/// Edits the operations of a class, interface, or data type.
pub type OperationsPage = TablePage<OperationRows>;

/// Edits the literals of an enumeration.
pub type LiteralsPage = TablePage<LiteralRows>;

impl TablePage<AttributeRows> {
    pub const ORDER: u32 = 20;

    pub fn attributes(ctx: &PageContext) -> Self {
        Self::with_layout(ctx, "attributes", Self::ORDER, Compartment::Attributes)
    }
}

impl TablePage<OperationRows> {
    pub const ORDER: u32 = 30;

    pub fn operations(ctx: &PageContext) -> Self {
        Self::with_layout(ctx, "operations", Self::ORDER, Compartment::Operations)
    }
}

impl TablePage<LiteralRows> {
    pub const ORDER: u32 = 20;

    pub fn literals(ctx: &PageContext) -> Self {
        Self::with_layout(ctx, "literals", Self::ORDER, Compartment::Literals)
    }
}

impl<K: RowKind> TablePage<K> {
    fn with_layout(ctx: &PageContext, name: &'static str, order: u32, compartment: Compartment) -> Self {
        Self {
            name,
            order,
            compartment,
            ctx: ctx.clone(),
            table: None,
            watcher: None,
            state: PageState::Unbound,
        }
    }

    /// The table, while bound.
    pub fn table(&self) -> Option<&Arc<EditableTable<K>>> {
        self.table.as_ref()
    }

    /// The watcher keeping the table in sync, while bound.
    pub fn watcher(&self) -> Option<&Watcher> {
        self.watcher.as_ref()
    }

    /// The compartment this page toggles.
    pub fn compartment(&self) -> Compartment {
        self.compartment
    }

    fn item(&self) -> Option<&Arc<ClassifierItem>> {
        self.ctx.item()
    }

    /// Whether the item shows the compartment.
    pub fn show(&self) -> bool {
        self.item().is_some_and(|item| item.show(self.compartment))
    }

    /// Show or hide the compartment on the item and ask it to update.
    pub fn set_show(&self, show: bool) {
        if let Some(item) = self.item() {
            item.set_show(self.compartment, show);
            item.request_update();
        }
    }
}

impl<K: RowKind> PropertyPage for TablePage<K> {
    fn order(&self) -> u32 {
        self.order
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn state(&self) -> PageState {
        self.state
    }

    fn construct(&mut self) -> EditResult<PageState> {
        if self.state != PageState::Unbound {
            return Ok(self.state);
        }
        let Some(subject) = self.item().and_then(|item| item.subject()) else {
            tracing::trace!(target: targets::PAGES, page = self.name, "no subject, staying unbound");
            return Ok(self.state);
        };

        let table = Arc::new(EditableTable::with_translator(
            self.ctx.model(),
            subject,
            self.ctx.config(),
            self.ctx.translator().clone(),
        )?);
        let watcher = RowSynchronizer::watch(&table)?;

        tracing::debug!(
            target: targets::PAGES,
            page = self.name,
            ?subject,
            rows = table.len(),
            paths = watcher.path_count(),
            "page bound"
        );
        self.table = Some(table);
        self.watcher = Some(watcher);
        self.state = PageState::Bound;
        Ok(self.state)
    }

    fn destroy(&mut self) {
        if self.state == PageState::Destroyed {
            tracing::trace!(target: targets::PAGES, page = self.name, "page already destroyed");
            return;
        }
        if let Some(mut watcher) = self.watcher.take() {
            watcher.unwatch_all();
        }
        self.table = None;
        self.state = PageState::Destroyed;
        tracing::debug!(target: targets::PAGES, page = self.name, "page destroyed");
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<K: RowKind> Drop for TablePage<K> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<K: RowKind> fmt::Debug for TablePage<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TablePage")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("watcher", &self.watcher)
            .finish()
    }
}
