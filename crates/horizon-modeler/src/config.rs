//! Editor configuration.
//!
//! [`EditorConfig`] collects the knobs of the editing bridge. It is plain
//! data, loadable from TOML:
//!
//! ```toml
//! parse-policy = "strict"
//! reorder-refresh = "keep-cached"
//! catalog = "locale/de.toml"
//!
//! [format]
//! note = true
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditResult};

/// What to do with cell text that does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParsePolicy {
    /// Reject the edit with a parse error and leave the element unchanged.
    #[default]
    Strict,
    /// Store the whole text as the element name.
    Lenient,
}

/// What happens to cached row text when rows are reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReorderRefresh {
    /// Move rows without touching their cached text.
    #[default]
    KeepCached,
    /// Re-project every moved row from the model.
    Reproject,
}

/// Options for rendering elements as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Append `# note` when the element has a note.
    pub note: bool,
}

impl FormatOptions {
    /// Options that include the note.
    pub const WITH_NOTE: Self = Self { note: true };
}

/// Configuration for property pages and their tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EditorConfig {
    /// How table cells render their elements.
    pub format: FormatOptions,
    /// How malformed cell input is handled.
    pub parse_policy: ParsePolicy,
    /// Whether reordering re-renders the moved rows.
    pub reorder_refresh: ReorderRefresh,
    /// Optional message catalog for headers and tooltips.
    pub catalog: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            format: FormatOptions::WITH_NOTE,
            parse_policy: ParsePolicy::default(),
            reorder_refresh: ReorderRefresh::default(),
            catalog: None,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> EditResult<Self> {
        toml::from_str(text).map_err(|e| EditError::config("<string>", e))
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> EditResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EditError::config(path, e))?;
        let config: Self = toml::from_str(&text).map_err(|e| EditError::config(path, e))?;
        tracing::debug!(target: crate::targets::CONFIG, path = %path.display(), ?config, "loaded editor config");
        Ok(config)
    }

    /// Serialize the configuration as TOML.
    pub fn to_toml_string(&self) -> EditResult<String> {
        toml::to_string_pretty(self).map_err(|e| EditError::config("<string>", e))
    }

    /// Write the configuration to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> EditResult<()> {
        let path = path.as_ref();
        let text = self.to_toml_string()?;
        std::fs::write(path, text).map_err(|e| EditError::config(path, e))
    }

    /// Set the parse policy.
    pub fn with_parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.parse_policy = policy;
        self
    }

    /// Set the reorder refresh policy.
    pub fn with_reorder_refresh(mut self, refresh: ReorderRefresh) -> Self {
        self.reorder_refresh = refresh;
        self
    }

    /// Set whether notes are rendered.
    pub fn with_note(mut self, note: bool) -> Self {
        self.format.note = note;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!(config.format.note);
        assert_eq!(config.parse_policy, ParsePolicy::Strict);
        assert_eq!(config.reorder_refresh, ReorderRefresh::KeepCached);
        assert_eq!(config.catalog, None);
    }

    #[test]
    fn test_partial_toml() {
        let config = EditorConfig::from_toml_str(
            r#"
            reorder-refresh = "reproject"

            [format]
            note = false
            "#,
        )
        .unwrap();

        assert!(!config.format.note);
        assert_eq!(config.reorder_refresh, ReorderRefresh::Reproject);
        assert_eq!(config.parse_policy, ParsePolicy::Strict);
    }

    #[test]
    fn test_invalid_toml() {
        let err = EditorConfig::from_toml_str("parse-policy = \"sometimes\"").unwrap_err();
        assert!(matches!(err, EditError::Config { .. }));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.toml");
        let config = EditorConfig::default()
            .with_parse_policy(ParsePolicy::Lenient)
            .with_note(false);

        config.save(&path).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EditorConfig::load(dir.path().join("absent.toml")).unwrap_err();
        match err {
            EditError::Config { path, .. } => assert!(path.ends_with("absent.toml")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
