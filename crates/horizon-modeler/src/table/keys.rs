//! Keyboard gestures on collection tables.
//!
//! Only the keys the tables react to are modelled. `Plus` and `Underscore`
//! are the shifted `Equal` and `Minus` keys and map the same way.

/// Keyboard modifiers that may be held during a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held (Cmd on macOS).
    pub control: bool,
    /// The Alt key is held (Option on macOS).
    pub alt: bool,
    /// The Meta/Super key is held.
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
        meta: false,
    };

    /// Control modifier only.
    pub const CTRL: Self = Self {
        shift: false,
        control: true,
        alt: false,
        meta: false,
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }
}

/// A physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Backspace,
    Delete,
    Enter,
    Escape,
    Minus,
    Equal,
    NumpadAdd,
    NumpadSubtract,
    ArrowUp,
    ArrowDown,
    /// Any other key.
    Other,
}

/// What a key press asks a collection table to do with the selected row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Delete the element.
    Remove,
    /// Swap with the next row.
    MoveDown,
    /// Swap with the previous row.
    MoveUp,
}

/// Map a key press to a table action.
///
/// Returns `None` for unrelated keys and whenever Control is held, so
/// shortcuts such as Ctrl+Minus reach the application.
pub fn key_action(key: Key, modifiers: KeyboardModifiers) -> Option<KeyAction> {
    if modifiers.control {
        return None;
    }
    match key {
        Key::Backspace | Key::Delete => Some(KeyAction::Remove),
        Key::Equal | Key::NumpadAdd => Some(KeyAction::MoveDown),
        Key::Minus | Key::NumpadSubtract => Some(KeyAction::MoveUp),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_actions() {
        assert_eq!(key_action(Key::Delete, KeyboardModifiers::NONE), Some(KeyAction::Remove));
        assert_eq!(key_action(Key::Backspace, KeyboardModifiers::NONE), Some(KeyAction::Remove));
        assert_eq!(key_action(Key::Equal, KeyboardModifiers::SHIFT), Some(KeyAction::MoveDown));
        assert_eq!(key_action(Key::NumpadAdd, KeyboardModifiers::NONE), Some(KeyAction::MoveDown));
        assert_eq!(key_action(Key::Minus, KeyboardModifiers::SHIFT), Some(KeyAction::MoveUp));
        assert_eq!(key_action(Key::Enter, KeyboardModifiers::NONE), None);
    }

    #[test]
    fn test_control_passes_through() {
        for key in [Key::Delete, Key::Equal, Key::Minus] {
            assert_eq!(key_action(key, KeyboardModifiers::CTRL), None);
        }
    }
}
