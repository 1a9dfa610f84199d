//! Attribute (`Property`) notation.

use std::fmt::Write as _;

use horizon_modeler_core::{ElementId, Model, ModelResult};

use super::syntax::{AttributeSyntax, Multiplicity, Visibility};
use crate::config::FormatOptions;

/// Render an attribute as `+ /name: type[l..u] = default # note`.
///
/// An unnamed attribute renders as the empty string.
pub(crate) fn format_attribute(model: &Model, id: ElementId, options: FormatOptions) -> ModelResult<String> {
    let Some(name) = model.text(id, "name")?.filter(|name| !name.is_empty()) else {
        return Ok(String::new());
    };

    let mut text = String::new();
    let visibility = Visibility::from_name(model.text(id, "visibility")?.as_deref());
    let _ = write!(text, "{} ", visibility.symbol());
    if model.flag(id, "isDerived")? {
        text.push('/');
    }
    text.push_str(&name);
    if let Some(type_value) = model.text(id, "typeValue")? {
        let _ = write!(text, ": {type_value}");
    }
    text.push_str(&Multiplicity::render(
        model.text(id, "lowerValue")?.as_deref(),
        model.text(id, "upperValue")?.as_deref(),
    ));
    if let Some(default) = model.text(id, "defaultValue")? {
        let _ = write!(text, " = {default}");
    }
    if options.note {
        if let Some(note) = model.text(id, "note")?.filter(|note| !note.is_empty()) {
            let _ = write!(text, " # {note}");
        }
    }
    Ok(text)
}

pub(crate) fn apply_attribute(model: &Model, id: ElementId, syntax: AttributeSyntax) -> ModelResult<()> {
    model.set(id, "visibility", syntax.visibility.name())?;
    model.set(id, "isDerived", syntax.derived)?;
    model.set(id, "name", syntax.name)?;
    model.set(id, "typeValue", syntax.type_value)?;
    model.set(id, "lowerValue", syntax.multiplicity.lower)?;
    model.set(id, "upperValue", syntax.multiplicity.upper)?;
    model.set(id, "defaultValue", syntax.default)?;
    if let Some(note) = syntax.note {
        model.set(id, "note", Some(note).filter(|note| !note.is_empty()))?;
    }
    Ok(())
}

pub(crate) fn reset_attribute(model: &Model, id: ElementId) -> ModelResult<()> {
    for attribute in ["name", "typeValue", "lowerValue", "upperValue", "defaultValue", "note"] {
        model.set(id, attribute, None::<String>)?;
    }
    model.reset(id, "visibility")?;
    model.set(id, "isDerived", false)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use horizon_modeler_core::ElementKind;

    use super::*;
    use crate::format::syntax::parse_attribute;

    fn attribute(model: &Model, text: &str) -> ElementId {
        let id = model.create(ElementKind::Property).unwrap();
        apply_attribute(model, id, parse_attribute(text).unwrap()).unwrap();
        id
    }

    #[test]
    fn test_format_full() {
        let model = Model::new();
        let id = attribute(&model, "-/size :int [1..*]= 3 #  the size ");

        assert_eq!(
            format_attribute(&model, id, FormatOptions::WITH_NOTE).unwrap(),
            "- /size: int[1..*] = 3 # the size"
        );
        assert_eq!(
            format_attribute(&model, id, FormatOptions::default()).unwrap(),
            "- /size: int[1..*] = 3"
        );
    }

    #[test]
    fn test_visibility_always_rendered() {
        let model = Model::new();
        let id = attribute(&model, "x");
        assert_eq!(format_attribute(&model, id, FormatOptions::default()).unwrap(), "+ x");
    }

    #[test]
    fn test_unnamed_renders_empty() {
        let model = Model::new();
        let id = model.create(ElementKind::Property).unwrap();
        assert_eq!(format_attribute(&model, id, FormatOptions::WITH_NOTE).unwrap(), "");
    }

    #[test]
    fn test_note_kept_when_absent() {
        let model = Model::new();
        let id = attribute(&model, "a # keep me");
        apply_attribute(&model, id, parse_attribute("b").unwrap()).unwrap();
        assert_eq!(model.text(id, "note").unwrap().as_deref(), Some("keep me"));

        apply_attribute(&model, id, parse_attribute("b #").unwrap()).unwrap();
        assert_eq!(model.text(id, "note").unwrap(), None);
    }

    #[test]
    fn test_reset() {
        let model = Model::new();
        let id = attribute(&model, "# /a: int[2] = 1 # n");
        reset_attribute(&model, id).unwrap();

        assert_eq!(model.text(id, "name").unwrap(), None);
        assert_eq!(model.text(id, "visibility").unwrap().as_deref(), Some("public"));
        assert!(!model.flag(id, "isDerived").unwrap());
        assert_eq!(format_attribute(&model, id, FormatOptions::WITH_NOTE).unwrap(), "");
    }
}
