//! Property pages.
//!
//! A property page is one editable section of the property editor, bound to
//! the selected diagram item or model element. Pages go through a small
//! lifecycle:
//!
//! ```text
//! Unbound --construct (subject present)--> Bound --destroy--> Destroyed
//! ```
//!
//! A page without a subject stays `Unbound` and offers nothing to edit; this
//! is not an error. A bound page holding a watcher releases it in
//! `destroy`, before anything else is torn down.
//!
//! Which pages apply to a selection is decided by a [`PageRegistry`]: an
//! explicit list of constructors keyed by element metaclass or item kind.

mod classifier;
mod table_page;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use horizon_modeler_core::{ElementId, Metaclass, Model};

pub use classifier::{ClassifierPage, ComponentPage, NamedElementPage};
pub use table_page::{AttributesPage, LiteralsPage, OperationsPage, TablePage};

use crate::config::EditorConfig;
use crate::error::EditResult;
use crate::i18n::{self, Translator};
use crate::presentation::{ClassifierItem, ItemKind};
use crate::targets;

/// Lifecycle state of a property page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageState {
    /// No subject; nothing to edit.
    #[default]
    Unbound,
    /// Editing a subject.
    Bound,
    /// Torn down. No further events are processed.
    Destroyed,
}

/// One section of the property editor.
pub trait PropertyPage: Send {
    /// Position among the pages; lower comes first.
    fn order(&self) -> u32;

    /// A stable identifier.
    fn name(&self) -> &'static str;

    /// Current lifecycle state.
    fn state(&self) -> PageState;

    /// Bind the page to its subject.
    ///
    /// Stays `Unbound` when there is no subject. Calling this on a bound or
    /// destroyed page changes nothing.
    fn construct(&mut self) -> EditResult<PageState>;

    /// Tear the page down. Only the first call has an effect.
    fn destroy(&mut self);

    /// For downcasting to the concrete page.
    fn as_any(&self) -> &dyn Any;

    /// For downcasting to the concrete page.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// What pages are built for.
#[derive(Clone)]
pub struct PageContext {
    model: Model,
    item: Option<Arc<ClassifierItem>>,
    subject: Option<ElementId>,
    config: EditorConfig,
    translator: Arc<dyn Translator>,
}

impl PageContext {
    /// Pages for a diagram item and its subject.
    pub fn for_item(item: &Arc<ClassifierItem>, config: &EditorConfig) -> Self {
        Self {
            model: item.model().clone(),
            item: Some(item.clone()),
            subject: item.subject(),
            config: config.clone(),
            translator: i18n::identity(),
        }
    }

    /// Pages for a bare model element.
    pub fn for_element(model: &Model, subject: Option<ElementId>, config: &EditorConfig) -> Self {
        Self {
            model: model.clone(),
            item: None,
            subject,
            config: config.clone(),
            translator: i18n::identity(),
        }
    }

    /// Translate page strings through `translator`.
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn item(&self) -> Option<&Arc<ClassifierItem>> {
        self.item.as_ref()
    }

    /// The subject, if it still exists.
    pub fn subject(&self) -> Option<ElementId> {
        self.subject.filter(|subject| self.model.contains(*subject))
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }

    fn matches(&self, target: PageTarget) -> bool {
        match target {
            PageTarget::Element(metaclass) => self
                .subject()
                .and_then(|subject| self.model.kind(subject).ok())
                .is_some_and(|kind| kind.is_a(metaclass)),
            PageTarget::Item(kind) => self.item.as_ref().is_some_and(|item| item.kind() == kind),
        }
    }
}

impl fmt::Debug for PageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContext")
            .field("item", &self.item)
            .field("subject", &self.subject)
            .finish()
    }
}

/// What a page is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageTarget {
    /// Any subject conforming to the metaclass.
    Element(Metaclass),
    /// Diagram items of this kind.
    Item(ItemKind),
}

/// Builds a page for a context.
pub type PageConstructor = fn(&PageContext) -> Box<dyn PropertyPage>;

struct Registration {
    name: &'static str,
    targets: Vec<PageTarget>,
    constructor: PageConstructor,
}

/// Explicit mapping from targets to page constructors.
#[derive(Default)]
pub struct PageRegistry {
    registrations: Vec<Registration>,
}

impl PageRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the standard classifier pages.
    pub fn with_defaults() -> Self {
        use horizon_modeler_core::ElementKind;

        let classifier_items = [
            PageTarget::Item(ItemKind::Class),
            PageTarget::Item(ItemKind::Interface),
            PageTarget::Item(ItemKind::DataType),
            PageTarget::Item(ItemKind::Enumeration),
        ];

        let mut registry = Self::new();
        registry.register("name", [PageTarget::Element(Metaclass::NamedElement)], |ctx| {
            Box::new(NamedElementPage::new(ctx))
        });
        registry.register("classifier", [PageTarget::Element(Metaclass::Classifier)], |ctx| {
            Box::new(ClassifierPage::new(ctx))
        });
        registry.register(
            "component",
            [PageTarget::Element(Metaclass::Kind(ElementKind::Component))],
            |ctx| Box::new(ComponentPage::new(ctx)),
        );
        registry.register("literals", [PageTarget::Item(ItemKind::Enumeration)], |ctx| {
            Box::new(TablePage::literals(ctx))
        });
        registry.register("attributes", classifier_items, |ctx| Box::new(TablePage::attributes(ctx)));
        registry.register("operations", classifier_items, |ctx| Box::new(TablePage::operations(ctx)));
        registry
    }

    /// Register a page. A later registration under the same name replaces
    /// the earlier one.
    pub fn register(
        &mut self,
        name: &'static str,
        targets: impl IntoIterator<Item = PageTarget>,
        constructor: PageConstructor,
    ) {
        let registration = Registration {
            name,
            targets: targets.into_iter().collect(),
            constructor,
        };
        match self.registrations.iter_mut().find(|existing| existing.name == name) {
            Some(existing) => *existing = registration,
            None => self.registrations.push(registration),
        }
    }

    /// Number of registered pages.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns `true` if no page is registered.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Instantiate every page that applies to `ctx`, sorted by order.
    ///
    /// Pages are returned `Unbound`. Pages of equal order keep their
    /// registration order.
    pub fn pages_for(&self, ctx: &PageContext) -> Vec<Box<dyn PropertyPage>> {
        let mut pages: Vec<Box<dyn PropertyPage>> = self
            .registrations
            .iter()
            .filter(|registration| registration.targets.iter().any(|target| ctx.matches(*target)))
            .map(|registration| (registration.constructor)(ctx))
            .collect();
        pages.sort_by_key(|page| page.order());
        tracing::debug!(
            target: targets::PAGES,
            ?ctx,
            pages = ?pages.iter().map(|page| page.name()).collect::<Vec<_>>(),
            "pages selected"
        );
        pages
    }

    /// Instantiate and construct the pages for `ctx`, keeping those that
    /// bound to a subject.
    pub fn build(&self, ctx: &PageContext) -> EditResult<Vec<Box<dyn PropertyPage>>> {
        let mut bound = Vec::new();
        for mut page in self.pages_for(ctx) {
            if page.construct()? == PageState::Bound {
                bound.push(page);
            }
        }
        Ok(bound)
    }
}

impl fmt::Debug for PageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.registrations.iter().map(|registration| registration.name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use horizon_modeler_core::ElementKind;

    use super::*;

    fn names(pages: &[Box<dyn PropertyPage>]) -> Vec<&'static str> {
        pages.iter().map(|page| page.name()).collect()
    }

    #[test]
    fn test_class_item_pages() {
        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();
        let item = Arc::new(ClassifierItem::for_subject(&model, class).unwrap());
        let ctx = PageContext::for_item(&item, &EditorConfig::default());

        let pages = PageRegistry::with_defaults().pages_for(&ctx);
        assert_eq!(names(&pages), ["name", "classifier", "attributes", "operations"]);
        assert!(pages.iter().all(|page| page.state() == PageState::Unbound));
    }

    #[test]
    fn test_component_and_enumeration_pages() {
        let model = Model::new();
        let component = model.create(ElementKind::Component).unwrap();
        let ctx = PageContext::for_element(&model, Some(component), &EditorConfig::default());
        assert_eq!(
            names(&PageRegistry::with_defaults().pages_for(&ctx)),
            ["name", "classifier", "component"]
        );

        let enumeration = model.create(ElementKind::Enumeration).unwrap();
        let item = Arc::new(ClassifierItem::for_subject(&model, enumeration).unwrap());
        let ctx = PageContext::for_item(&item, &EditorConfig::default());
        assert_eq!(
            names(&PageRegistry::with_defaults().pages_for(&ctx)),
            ["name", "classifier", "literals", "attributes", "operations"]
        );
    }

    #[test]
    fn test_item_without_subject() {
        let model = Model::new();
        let item = Arc::new(ClassifierItem::new(&model, ItemKind::Class, None));
        let ctx = PageContext::for_item(&item, &EditorConfig::default());
        let registry = PageRegistry::with_defaults();

        assert_eq!(names(&registry.pages_for(&ctx)), ["attributes", "operations"]);
        assert!(registry.build(&ctx).unwrap().is_empty());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = PageRegistry::with_defaults();
        let count = registry.len();
        registry.register("name", [PageTarget::Item(ItemKind::Interface)], |ctx| {
            Box::new(NamedElementPage::new(ctx))
        });
        assert_eq!(registry.len(), count);

        let model = Model::new();
        let component = model.create(ElementKind::Component).unwrap();
        let ctx = PageContext::for_element(&model, Some(component), &EditorConfig::default());
        assert_eq!(names(&registry.pages_for(&ctx)), ["classifier", "component"]);
    }
}
