//! Change events emitted by the model.

use crate::element::{ElementId, ElementKind, Value};

/// A single change to the model.
///
/// Exactly one event is emitted per primitive mutation, after the mutation
/// has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    /// An element was created.
    ElementCreated { element: ElementId, kind: ElementKind },
    /// An element was deleted.
    ElementDeleted { element: ElementId, kind: ElementKind },
    /// A text, flag, or reference attribute changed.
    AttributeUpdated {
        element: ElementId,
        attribute: &'static str,
        old: Value,
        new: Value,
    },
    /// A member was inserted into an ordered collection.
    AssociationAdded {
        element: ElementId,
        attribute: &'static str,
        member: ElementId,
        index: usize,
    },
    /// A member was removed from an ordered collection.
    AssociationRemoved {
        element: ElementId,
        attribute: &'static str,
        member: ElementId,
        index: usize,
    },
    /// The members of an ordered collection changed position.
    AssociationReordered {
        element: ElementId,
        attribute: &'static str,
    },
}

impl ModelEvent {
    /// The element whose state changed.
    pub fn element(&self) -> ElementId {
        match self {
            Self::ElementCreated { element, .. }
            | Self::ElementDeleted { element, .. }
            | Self::AttributeUpdated { element, .. }
            | Self::AssociationAdded { element, .. }
            | Self::AssociationRemoved { element, .. }
            | Self::AssociationReordered { element, .. } => *element,
        }
    }

    /// The attribute that changed, if the event concerns one.
    pub fn attribute(&self) -> Option<&'static str> {
        match self {
            Self::ElementCreated { .. } | Self::ElementDeleted { .. } => None,
            Self::AttributeUpdated { attribute, .. }
            | Self::AssociationAdded { attribute, .. }
            | Self::AssociationRemoved { attribute, .. }
            | Self::AssociationReordered { attribute, .. } => Some(*attribute),
        }
    }

    /// Returns `true` for membership and ordering changes of a collection.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::AssociationAdded { .. }
                | Self::AssociationRemoved { .. }
                | Self::AssociationReordered { .. }
        )
    }
}

/// Transaction boundary notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionEvent {
    /// The outermost transaction started.
    Begin,
    /// The outermost transaction committed.
    Commit,
    /// The outermost transaction was rolled back.
    Rollback,
}
