//! Reactive properties with change detection.
//!
//! `Property<T>` wraps a value and reports whether a `set` actually changed
//! it, so the owner can decide whether to emit its change signal. Diagram
//! presentation flags (such as whether a compartment is shown) are stored
//! this way.
//!
//! # Example
//!
//! ```
//! use horizon_modeler_core::{Property, Signal};
//!
//! struct Compartment {
//!     visible: Property<bool>,
//!     visible_changed: Signal<bool>,
//! }
//!
//! impl Compartment {
//!     fn set_visible(&self, visible: bool) {
//!         if self.visible.set(visible) {
//!             self.visible_changed.emit(visible);
//!         }
//!     }
//! }
//!
//! let compartment = Compartment {
//!     visible: Property::new(true),
//!     visible_changed: Signal::new(),
//! };
//! compartment.set_visible(false);
//! assert!(!compartment.visible.get());
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A reactive property that tracks changes.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Set the value without change detection.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if the value changed.
    ///
    /// The caller should emit the associated notification signal when this
    /// returns `true`.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }

    /// Set the value, returning the old value if it changed.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        if *current != value {
            Some(std::mem::replace(&mut *current, value))
        } else {
            None
        }
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_set_reports_change() {
        let prop = Property::new(true);
        assert!(!prop.set(true));
        assert!(prop.set(false));
        assert!(!prop.get());
    }

    #[test]
    fn test_property_replace() {
        let prop = Property::new(String::from("a"));
        assert_eq!(prop.replace("a".into()), None);
        assert_eq!(prop.replace("b".into()), Some("a".into()));
        assert_eq!(prop.with(|s| s.len()), 1);
    }

    #[test]
    fn test_property_set_silent() {
        let prop = Property::<i32>::default();
        prop.set_silent(7);
        assert_eq!(prop.get(), 7);
    }
}
