//! Collection tables: ordered child collections edited as flat tables.
//!
//! The pieces, from the model outwards:
//!
//! - [`OrderedCollection`]: stateless adapter turning a collection into rows
//!   and table gestures into model mutations
//! - [`EditableTable`]: cached rows with a placeholder row, served through
//!   the [`TableModel`] trait
//! - [`RowSynchronizer`]: applies watch events to the cached rows
//!
//! Row kinds for attributes, operations, and enumeration literals live in
//! [`kinds`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_modeler::table::{AttributeRows, EditableTable, RowSynchronizer, TableModel};
//! use horizon_modeler::EditorConfig;
//! use horizon_modeler_core::{ElementKind, Model};
//!
//! let model = Model::new();
//! let class = model.create(ElementKind::Class)?;
//! let table = Arc::new(EditableTable::<AttributeRows>::new(&model, class, &EditorConfig::default())?);
//! let _watcher = RowSynchronizer::watch(&table)?;
//!
//! // Typing into the placeholder row creates an attribute.
//! table.set_value(0, 0, "- width: int")?;
//! assert_eq!(table.display_text(0, 0).as_deref(), Some("- width: int"));
//! assert_eq!(table.row_count(), 2);
//! # Ok::<(), horizon_modeler::EditError>(())
//! ```

mod collection;
mod column;
mod editable;
pub mod keys;
pub mod kinds;
mod role;
mod sync;
mod traits;

pub use collection::{CollectionRow, OrderedCollection, RowKind, Rows};
pub use column::{ColumnRole, ColumnSpec};
pub use editable::EditableTable;
pub use keys::{Key, KeyAction, KeyboardModifiers, key_action};
pub use kinds::{AttributeRow, AttributeRows, LiteralRow, LiteralRows, OperationRow, OperationRows};
pub use role::{CheckState, ItemData, ItemRole};
pub use sync::RowSynchronizer;
pub use traits::{ItemFlags, ModelSignals, Orientation, TableModel};
