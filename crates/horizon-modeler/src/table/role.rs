//! Data roles for table cells.
//!
//! A cell can carry several pieces of data, distinguished by their role: the
//! text shown, the text offered for editing, a tooltip, or a check state.

use horizon_modeler_core::ElementId;

/// Roles for accessing different aspects of cell data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRole {
    /// Primary text to display.
    Display,
    /// Value offered to an editor.
    Edit,
    /// Tooltip text shown on hover.
    ToolTip,
    /// Check state for toggle columns.
    CheckState,
    /// Application-specific data.
    User(u32),
}

impl ItemRole {
    /// Returns `true` if this is a user-defined role.
    #[inline]
    pub fn is_user_role(&self) -> bool {
        matches!(self, ItemRole::User(_))
    }
}

/// Check state for toggle cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CheckState {
    /// Item is unchecked.
    #[default]
    Unchecked,
    /// Item is checked.
    Checked,
}

impl CheckState {
    /// Returns `true` if the item is checked.
    pub fn is_checked(&self) -> bool {
        matches!(self, CheckState::Checked)
    }

    /// Toggles between Unchecked and Checked.
    pub fn toggle(&self) -> CheckState {
        match self {
            CheckState::Unchecked => CheckState::Checked,
            CheckState::Checked => CheckState::Unchecked,
        }
    }
}

impl From<bool> for CheckState {
    fn from(checked: bool) -> Self {
        if checked { CheckState::Checked } else { CheckState::Unchecked }
    }
}

/// Container for cell data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ItemData {
    /// No data.
    #[default]
    None,
    /// String data (for Display, Edit, ToolTip).
    String(String),
    /// Boolean data.
    Bool(bool),
    /// Check state data.
    CheckState(CheckState),
    /// A back-reference to a model element.
    Element(ElementId),
}

impl ItemData {
    /// Returns `true` if this is `ItemData::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, ItemData::None)
    }

    /// Returns `true` if this contains some data.
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Attempts to get the data as a string slice.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ItemData::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the data as an owned string.
    pub fn into_string(self) -> Option<String> {
        match self {
            ItemData::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get the data as a boolean. Check states convert.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ItemData::Bool(b) => Some(*b),
            ItemData::CheckState(s) => Some(s.is_checked()),
            _ => None,
        }
    }

    /// Attempts to get the data as check state.
    pub fn as_check_state(&self) -> Option<CheckState> {
        match self {
            ItemData::CheckState(s) => Some(*s),
            ItemData::Bool(b) => Some(CheckState::from(*b)),
            _ => None,
        }
    }

    /// Attempts to get the data as an element reference.
    pub fn as_element(&self) -> Option<ElementId> {
        match self {
            ItemData::Element(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<String> for ItemData {
    fn from(s: String) -> Self {
        ItemData::String(s)
    }
}

impl From<&str> for ItemData {
    fn from(s: &str) -> Self {
        ItemData::String(s.to_string())
    }
}

impl From<bool> for ItemData {
    fn from(b: bool) -> Self {
        ItemData::Bool(b)
    }
}

impl From<CheckState> for ItemData {
    fn from(s: CheckState) -> Self {
        ItemData::CheckState(s)
    }
}

impl From<ElementId> for ItemData {
    fn from(id: ElementId) -> Self {
        ItemData::Element(id)
    }
}

impl From<Option<String>> for ItemData {
    fn from(opt: Option<String>) -> Self {
        match opt {
            Some(s) => ItemData::String(s),
            None => ItemData::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_state_toggle() {
        assert_eq!(CheckState::Unchecked.toggle(), CheckState::Checked);
        assert_eq!(CheckState::Checked.toggle(), CheckState::Unchecked);
        assert!(CheckState::from(true).is_checked());
    }

    #[test]
    fn test_item_data_conversions() {
        let data = ItemData::from("hello");
        assert_eq!(data.as_string(), Some("hello"));
        assert!(data.as_bool().is_none());

        assert_eq!(ItemData::from(true).as_check_state(), Some(CheckState::Checked));
        assert_eq!(ItemData::from(CheckState::Unchecked).as_bool(), Some(false));
        assert!(ItemData::from(None::<String>).is_none());
    }
}
