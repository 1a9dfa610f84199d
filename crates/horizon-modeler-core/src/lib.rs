//! Core systems for Horizon Modeler.
//!
//! This crate provides the model side of the Horizon Modeler editing bridge:
//!
//! - **Element Store**: Typed UML elements with ordered owning collections
//! - **Mutation Layer**: Schema-checked mutations, one change event per mutation
//! - **Transactions**: Journaled rollback with nested transaction support
//! - **Signal/Slot System**: Synchronous, re-entrant change notification
//! - **Change Watcher**: Dotted-path subscriptions rooted at one element
//! - **Property System**: Reactive properties with change detection
//!
//! # Model Example
//!
//! ```
//! use horizon_modeler_core::{ElementKind, Model, ModelEvent};
//!
//! let model = Model::new();
//! model.events().connect(|event: &ModelEvent| {
//!     println!("changed: {:?}", event);
//! });
//!
//! let class = model.create(ElementKind::Class)?;
//! model.set(class, "name", "Shape")?;
//! model.set(class, "isAbstract", true)?;
//! # Ok::<(), horizon_modeler_core::ModelError>(())
//! ```
//!
//! # Watcher Example
//!
//! ```
//! use horizon_modeler_core::{ElementKind, Model, Watcher};
//!
//! let model = Model::new();
//! let class = model.create(ElementKind::Class)?;
//!
//! let mut watcher = Watcher::builder(&model, class)
//!     .watch("ownedAttribute.name", |event| println!("{:?}", event.child()))
//!     .watch("ownedAttribute.isStatic", |event| println!("{:?}", event.child()))
//!     .subscribe()?;
//!
//! // Release every registration at once.
//! watcher.unwatch_all();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod element;
mod error;
mod event;
pub mod logging;
mod model;
pub mod property;
pub mod signal;
pub mod thread_check;
mod transaction;
pub mod watcher;

pub use element::{AttributeSpec, AttributeType, ElementId, ElementKind, Metaclass, Value};
pub use error::{ModelError, ModelResult, WatchError};
pub use event::{ModelEvent, TransactionEvent};
pub use logging::{ElementTreeDebug, PerfSpan, TreeFormatOptions, TreeStyle};
pub use model::{Model, WeakModel};
pub use property::Property;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use transaction::Transaction;
pub use watcher::{PathPattern, WatchEvent, WatchHandler, Watcher, WatcherBuilder};
