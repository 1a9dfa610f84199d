//! Error types for the editing bridge.

use std::path::PathBuf;

use horizon_modeler_core::{ElementId, ModelError, WatchError};

/// Result type alias for editing operations.
pub type EditResult<T> = std::result::Result<T, EditError>;

/// User text that does not fit the notation of the element being edited.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot parse '{text}': {reason}")]
pub struct ParseError {
    /// The rejected input.
    pub text: String,
    /// What was wrong with it.
    pub reason: &'static str,
}

impl ParseError {
    /// Create a parse error for `text`.
    pub fn new(text: impl Into<String>, reason: &'static str) -> Self {
        Self {
            text: text.into(),
            reason,
        }
    }
}

/// Errors that can occur while editing model elements through a table.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// Cell input did not parse. Nothing was changed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The element is no longer a member of the edited collection.
    #[error("{element:?} is no longer a member of '{collection}'")]
    InvalidReference {
        element: ElementId,
        collection: &'static str,
    },

    /// The underlying model rejected a mutation.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A watcher could not be installed.
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// A configuration or message catalog file could not be loaded.
    #[error("Failed to load configuration '{path}': {message}")]
    Config { path: PathBuf, message: String },
}

impl EditError {
    /// Create an invalid reference error.
    pub fn invalid_reference(element: ElementId, collection: &'static str) -> Self {
        Self::InvalidReference {
            element,
            collection,
        }
    }

    /// Create a configuration error.
    pub fn config(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Config {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Returns `true` for errors caused by the table being out of date
    /// with the model, which a rebuild resolves.
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            Self::InvalidReference { .. } | Self::Model(ModelError::UnknownElement(_))
        )
    }
}
