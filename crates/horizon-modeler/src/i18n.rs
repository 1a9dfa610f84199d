//! Translation of user-visible strings.
//!
//! Tables hand their column headers and tooltips to a [`Translator`] when a
//! view asks for them. [`Catalog`] is a simple TOML-backed implementation:
//!
//! ```toml
//! [messages]
//! Attributes = "Attribute"
//! Static = "Statisch"
//! ```
//!
//! Untranslated strings fall through unchanged.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::config::EditorConfig;
use crate::error::{EditError, EditResult};

/// String-in, string-out translation.
pub trait Translator: Send + Sync {
    /// Translate `message`, or return it unchanged.
    fn translate(&self, message: &str) -> String;
}

/// The translator that returns every message unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Translator for Identity {
    fn translate(&self, message: &str) -> String {
        message.to_string()
    }
}

/// Shared handle to the identity translator.
pub fn identity() -> Arc<dyn Translator> {
    Arc::new(Identity)
}

/// The translator named by `config`: its catalog if one is set, otherwise
/// the identity.
pub fn for_config(config: &EditorConfig) -> EditResult<Arc<dyn Translator>> {
    match &config.catalog {
        Some(path) => Ok(Arc::new(Catalog::load(path)?)),
        None => Ok(identity()),
    }
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    messages: HashMap<String, String>,
}

/// A message catalog loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    messages: HashMap<String, String>,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(text: &str) -> EditResult<Self> {
        let file: CatalogFile = toml::from_str(text).map_err(|e| EditError::config("<string>", e))?;
        Ok(Self {
            messages: file.messages,
        })
    }

    /// Load a catalog file.
    pub fn load(path: impl AsRef<Path>) -> EditResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EditError::config(path, e))?;
        let file: CatalogFile = toml::from_str(&text).map_err(|e| EditError::config(path, e))?;
        tracing::debug!(
            target: crate::targets::I18N,
            path = %path.display(),
            messages = file.messages.len(),
            "loaded message catalog"
        );
        Ok(Self {
            messages: file.messages,
        })
    }

    /// Add or replace a translation.
    pub fn insert(&mut self, message: impl Into<String>, translation: impl Into<String>) {
        self.messages.insert(message.into(), translation.into());
    }

    /// Number of translations.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the catalog has no translations.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Translator for Catalog {
    fn translate(&self, message: &str) -> String {
        self.messages
            .get(message)
            .cloned()
            .unwrap_or_else(|| message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback() {
        let mut catalog = Catalog::new();
        catalog.insert("Static", "Statisch");
        assert_eq!(catalog.translate("Static"), "Statisch");
        assert_eq!(catalog.translate("Abstract"), "Abstract");
        assert_eq!(Identity.translate("Abstract"), "Abstract");
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("de.toml");
        std::fs::write(&path, "[messages]\nAttributes = \"Attribute\"\n").unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.translate("Attributes"), "Attribute");
    }

    #[test]
    fn test_invalid_catalog() {
        assert!(Catalog::from_toml_str("messages = 3").is_err());
        assert!(Catalog::from_toml_str("").unwrap().is_empty());
    }

    #[test]
    fn test_for_config() {
        assert_eq!(for_config(&EditorConfig::default()).unwrap().translate("Static"), "Static");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("de.toml");
        std::fs::write(&path, "[messages]\nStatic = \"Statisch\"\n").unwrap();
        let config = EditorConfig {
            catalog: Some(path),
            ..EditorConfig::default()
        };
        assert_eq!(for_config(&config).unwrap().translate("Static"), "Statisch");

        let missing = EditorConfig {
            catalog: Some(dir.path().join("absent.toml")),
            ..EditorConfig::default()
        };
        assert!(for_config(&missing).is_err());
    }
}
