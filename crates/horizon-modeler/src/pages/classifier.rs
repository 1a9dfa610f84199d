//! Pages editing a subject's own attributes.

use std::any::Any;

use horizon_modeler_core::{ElementId, ElementKind};

use super::{PageContext, PageState, PropertyPage};
use crate::error::EditResult;
use crate::targets;

/// Shared state of pages that edit their subject directly.
#[derive(Debug)]
struct SubjectBinding {
    ctx: PageContext,
    subject: Option<ElementId>,
    state: PageState,
}

impl SubjectBinding {
    fn new(ctx: &PageContext) -> Self {
        Self {
            ctx: ctx.clone(),
            subject: None,
            state: PageState::Unbound,
        }
    }

    fn construct(&mut self, page: &'static str, accepts: impl Fn(ElementKind) -> bool) -> PageState {
        if self.state != PageState::Unbound {
            return self.state;
        }
        let subject = self.ctx.subject().filter(|subject| {
            self.ctx
                .model()
                .kind(*subject)
                .is_ok_and(|kind| accepts(kind))
        });
        if let Some(subject) = subject {
            self.subject = Some(subject);
            self.state = PageState::Bound;
            tracing::debug!(target: targets::PAGES, page, ?subject, "page bound");
        }
        self.state
    }

    fn destroy(&mut self, page: &'static str) {
        if self.state == PageState::Destroyed {
            tracing::trace!(target: targets::PAGES, page, "page already destroyed");
            return;
        }
        self.subject = None;
        self.state = PageState::Destroyed;
        tracing::debug!(target: targets::PAGES, page, "page destroyed");
    }

    fn bound_subject(&self) -> Option<ElementId> {
        match self.state {
            PageState::Bound => self.subject,
            _ => None,
        }
    }

    fn flag(&self, attribute: &str) -> Option<bool> {
        let subject = self.bound_subject()?;
        self.ctx.model().flag(subject, attribute).ok()
    }

    fn set_flag(&self, attribute: &'static str, value: bool) -> EditResult<()> {
        let Some(subject) = self.bound_subject() else {
            return Ok(());
        };
        self.ctx.model().transaction(|model| -> EditResult<()> {
            model.set(subject, attribute, value)?;
            Ok(())
        })
    }
}

/// Edits the name of any named element.
#[derive(Debug)]
pub struct NamedElementPage {
    binding: SubjectBinding,
}

impl NamedElementPage {
    const NAME: &'static str = "name";
    pub const ORDER: u32 = 10;

    pub fn new(ctx: &PageContext) -> Self {
        Self {
            binding: SubjectBinding::new(ctx),
        }
    }

    /// The subject's name, while bound.
    pub fn element_name(&self) -> Option<String> {
        let subject = self.binding.bound_subject()?;
        self.binding.ctx.model().text(subject, "name").ok().flatten()
    }

    /// Rename the subject. Blank text clears the name.
    pub fn set_element_name(&self, name: &str) -> EditResult<()> {
        let Some(subject) = self.binding.bound_subject() else {
            return Ok(());
        };
        let name = Some(name.trim()).filter(|name| !name.is_empty());
        self.binding.ctx.model().transaction(|model| -> EditResult<()> {
            model.set(subject, "name", name)?;
            Ok(())
        })
    }
}

impl PropertyPage for NamedElementPage {
    fn order(&self) -> u32 {
        Self::ORDER
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn state(&self) -> PageState {
        self.binding.state
    }

    fn construct(&mut self) -> EditResult<PageState> {
        Ok(self.binding.construct(Self::NAME, |_| true))
    }

    fn destroy(&mut self) {
        self.binding.destroy(Self::NAME);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Edits whether a classifier is abstract.
#[derive(Debug)]
pub struct ClassifierPage {
    binding: SubjectBinding,
}

impl ClassifierPage {
    const NAME: &'static str = "classifier";
    pub const ORDER: u32 = 15;

    pub fn new(ctx: &PageContext) -> Self {
        Self {
            binding: SubjectBinding::new(ctx),
        }
    }

    pub fn is_abstract(&self) -> Option<bool> {
        self.binding.flag("isAbstract")
    }

    pub fn set_abstract(&self, value: bool) -> EditResult<()> {
        self.binding.set_flag("isAbstract", value)
    }
}

impl PropertyPage for ClassifierPage {
    fn order(&self) -> u32 {
        Self::ORDER
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn state(&self) -> PageState {
        self.binding.state
    }

    fn construct(&mut self) -> EditResult<PageState> {
        Ok(self.binding.construct(Self::NAME, |kind| {
            kind.attribute("isAbstract").is_some()
        }))
    }

    fn destroy(&mut self) {
        self.binding.destroy(Self::NAME);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Edits whether a component is indirectly instantiated.
#[derive(Debug)]
pub struct ComponentPage {
    binding: SubjectBinding,
}

impl ComponentPage {
    const NAME: &'static str = "component";
    pub const ORDER: u32 = 15;

    pub fn new(ctx: &PageContext) -> Self {
        Self {
            binding: SubjectBinding::new(ctx),
        }
    }

    pub fn is_indirectly_instantiated(&self) -> Option<bool> {
        self.binding.flag("isIndirectlyInstantiated")
    }

    pub fn set_indirectly_instantiated(&self, value: bool) -> EditResult<()> {
        self.binding.set_flag("isIndirectlyInstantiated", value)
    }
}

impl PropertyPage for ComponentPage {
    fn order(&self) -> u32 {
        Self::ORDER
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn state(&self) -> PageState {
        self.binding.state
    }

    fn construct(&mut self) -> EditResult<PageState> {
        Ok(self.binding.construct(Self::NAME, |kind| kind == ElementKind::Component))
    }

    fn destroy(&mut self) {
        self.binding.destroy(Self::NAME);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use horizon_modeler_core::Model;

    use super::*;
    use crate::config::EditorConfig;

    #[test]
    fn test_name_page() {
        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();
        let mut page = NamedElementPage::new(&PageContext::for_element(&model, Some(class), &EditorConfig::default()));

        assert_eq!(page.element_name(), None);
        assert_eq!(page.construct().unwrap(), PageState::Bound);
        page.set_element_name("  Shape ").unwrap();
        assert_eq!(page.element_name().as_deref(), Some("Shape"));

        page.destroy();
        assert_eq!(page.state(), PageState::Destroyed);
        assert_eq!(page.element_name(), None);
        assert_eq!(page.construct().unwrap(), PageState::Destroyed);
    }

    #[test]
    fn test_classifier_page_toggles_abstract() {
        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();
        let mut page = ClassifierPage::new(&PageContext::for_element(&model, Some(class), &EditorConfig::default()));
        page.construct().unwrap();

        page.set_abstract(true).unwrap();
        assert!(model.flag(class, "isAbstract").unwrap());
        assert_eq!(page.is_abstract(), Some(true));
    }

    #[test]
    fn test_component_page() {
        let model = Model::new();
        let component = model.create(ElementKind::Component).unwrap();
        let mut page = ComponentPage::new(&PageContext::for_element(&model, Some(component), &EditorConfig::default()));
        page.construct().unwrap();

        page.set_indirectly_instantiated(true).unwrap();
        assert_eq!(page.is_indirectly_instantiated(), Some(true));
    }

    #[test]
    fn test_unbound_without_subject() {
        let model = Model::new();
        let mut page = ComponentPage::new(&PageContext::for_element(&model, None, &EditorConfig::default()));
        assert_eq!(page.construct().unwrap(), PageState::Unbound);
        assert_eq!(page.is_indirectly_instantiated(), None);
        page.set_indirectly_instantiated(true).unwrap();
    }
}
