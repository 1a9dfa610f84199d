//! Error types for Horizon Modeler core.

use crate::element::{ElementId, ElementKind};

/// A specialized Result type for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Errors raised by the model mutation layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// The element id is invalid or the element has been deleted.
    #[error("Invalid or deleted element {0:?}")]
    UnknownElement(ElementId),

    /// The element kind has no attribute with this name.
    #[error("{kind} has no attribute '{attribute}'")]
    UnknownAttribute {
        kind: ElementKind,
        attribute: String,
    },

    /// The value does not fit the attribute's storage type.
    #[error("Attribute '{attribute}' of {kind} cannot hold {found}")]
    TypeMismatch {
        kind: ElementKind,
        attribute: &'static str,
        found: &'static str,
    },

    /// The element is not a member of the collection.
    #[error("{member:?} is not a member of '{attribute}' on {owner:?}")]
    NotAMember {
        owner: ElementId,
        attribute: &'static str,
        member: ElementId,
    },

    /// A mutation was attempted from a thread other than the model's own.
    #[error("Model mutated from a thread other than the one that created it")]
    WrongThread,

    /// The transaction was marked for rollback and has been rolled back.
    #[error("Transaction was rolled back")]
    RolledBack,
}

/// Errors raised while registering watch paths.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WatchError {
    /// The path is empty or contains an empty segment.
    #[error("Invalid watch path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// The root element of the watcher does not exist.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl WatchError {
    /// Create an invalid-path error.
    pub fn invalid_path(path: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason,
        }
    }
}
