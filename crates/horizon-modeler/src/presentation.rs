//! Diagram presentation of classifiers.
//!
//! Only the state property pages touch is modelled: which element an item
//! presents and which compartments it shows. Drawing is left to the host.

use std::fmt;

use horizon_modeler_core::{ElementId, ElementKind, Model, Property, Signal};

/// The kind of diagram item presenting a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Class,
    Interface,
    DataType,
    Enumeration,
}

impl ItemKind {
    /// The item kind that presents elements of `kind` by default.
    pub fn for_element(kind: ElementKind) -> Option<Self> {
        match kind {
            ElementKind::Class | ElementKind::Component => Some(Self::Class),
            ElementKind::Interface => Some(Self::Interface),
            ElementKind::DataType => Some(Self::DataType),
            ElementKind::Enumeration => Some(Self::Enumeration),
            _ => None,
        }
    }
}

/// A compartment of a classifier box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compartment {
    Attributes,
    Operations,
    Literals,
}

/// A diagram item showing a classifier.
pub struct ClassifierItem {
    kind: ItemKind,
    model: Model,
    subject: Option<ElementId>,
    show_attributes: Property<bool>,
    show_operations: Property<bool>,
    show_literals: Property<bool>,
    /// Emitted when the item should be re-laid out and redrawn.
    pub update_requested: Signal<()>,
}

impl ClassifierItem {
    /// Create an item presenting `subject`, with every compartment shown.
    pub fn new(model: &Model, kind: ItemKind, subject: Option<ElementId>) -> Self {
        Self {
            kind,
            model: model.clone(),
            subject,
            show_attributes: Property::new(true),
            show_operations: Property::new(true),
            show_literals: Property::new(true),
            update_requested: Signal::new(),
        }
    }

    /// Create the default item for an existing classifier.
    pub fn for_subject(model: &Model, subject: ElementId) -> Option<Self> {
        let kind = ItemKind::for_element(model.kind(subject).ok()?)?;
        Some(Self::new(model, kind, Some(subject)))
    }

    /// The item kind.
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// The model the subject lives in.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The presented element, if it still exists.
    pub fn subject(&self) -> Option<ElementId> {
        self.subject.filter(|subject| self.model.contains(*subject))
    }

    fn property(&self, compartment: Compartment) -> &Property<bool> {
        match compartment {
            Compartment::Attributes => &self.show_attributes,
            Compartment::Operations => &self.show_operations,
            Compartment::Literals => &self.show_literals,
        }
    }

    /// Whether a compartment is shown.
    pub fn show(&self, compartment: Compartment) -> bool {
        self.property(compartment).get()
    }

    /// Show or hide a compartment. Returns `true` if the value changed.
    pub fn set_show(&self, compartment: Compartment, show: bool) -> bool {
        let changed = self.property(compartment).set(show);
        if changed {
            tracing::debug!(
                target: crate::targets::PRESENTATION,
                kind = ?self.kind,
                ?compartment,
                show,
                "compartment toggled"
            );
        }
        changed
    }

    pub fn show_attributes(&self) -> bool {
        self.show(Compartment::Attributes)
    }

    pub fn show_operations(&self) -> bool {
        self.show(Compartment::Operations)
    }

    pub fn show_literals(&self) -> bool {
        self.show(Compartment::Literals)
    }

    /// Ask the host to update the item.
    pub fn request_update(&self) {
        self.update_requested.emit(());
    }
}

impl fmt::Debug for ClassifierItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierItem")
            .field("kind", &self.kind)
            .field("subject", &self.subject)
            .field("show_attributes", &self.show_attributes)
            .field("show_operations", &self.show_operations)
            .field("show_literals", &self.show_literals)
            .finish()
    }
}
