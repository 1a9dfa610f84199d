//! Horizon Modeler - reactive property editing for UML model elements.
//!
//! This crate bridges a [`horizon_modeler_core::Model`] and an editor UI:
//!
//! - **Text Notation**: attributes, operations, and literals rendered as one
//!   line of text and parsed back ([`format`])
//! - **Collection Tables**: ordered child collections edited as flat tables
//!   with a trailing placeholder row ([`table`])
//! - **Property Pages**: editor sections bound to a diagram item or element,
//!   chosen by an explicit registry ([`pages`])
//! - **Configuration**: TOML-loadable editor settings ([`config`]) and
//!   message catalogs ([`i18n`])
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_modeler::pages::{AttributesPage, PageContext, PageRegistry};
//! use horizon_modeler::presentation::ClassifierItem;
//! use horizon_modeler::table::TableModel;
//! use horizon_modeler::EditorConfig;
//! use horizon_modeler_core::{ElementKind, Model};
//!
//! let model = Model::new();
//! let class = model.create(ElementKind::Class)?;
//! model.set(class, "name", "Shape")?;
//! let item = Arc::new(ClassifierItem::for_subject(&model, class).expect("classifier"));
//!
//! let ctx = PageContext::for_item(&item, &EditorConfig::default());
//! let pages = PageRegistry::with_defaults().build(&ctx)?;
//!
//! let attributes = pages
//!     .iter()
//!     .find_map(|page| page.as_any().downcast_ref::<AttributesPage>())
//!     .and_then(|page| page.table())
//!     .expect("attributes page is bound");
//! attributes.set_value(0, 0, "+ area: float")?;
//! assert_eq!(attributes.display_text(0, 0).as_deref(), Some("+ area: float"));
//! # Ok::<(), horizon_modeler::EditError>(())
//! ```

pub mod config;
mod error;
pub mod format;
pub mod i18n;
pub mod pages;
pub mod presentation;
pub mod table;
pub mod targets;

pub use config::{EditorConfig, FormatOptions, ParsePolicy, ReorderRefresh};
pub use error::{EditError, EditResult, ParseError};
pub use i18n::{Catalog, Translator};
pub use pages::{PageContext, PageRegistry, PageState, PropertyPage};
pub use presentation::{ClassifierItem, Compartment, ItemKind};
pub use table::{EditableTable, OrderedCollection, RowKind, RowSynchronizer, TableModel};
