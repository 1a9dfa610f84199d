//! Plain name notation, used for enumeration literals and other named
//! elements without a richer grammar.

use horizon_modeler_core::{ElementId, Model, ModelResult};

pub(crate) fn format_name(model: &Model, id: ElementId) -> ModelResult<String> {
    Ok(model.text(id, "name")?.unwrap_or_default())
}

/// Any text is a valid name. Surrounding whitespace is dropped.
pub(crate) fn apply_name(model: &Model, id: ElementId, text: &str) -> ModelResult<()> {
    let name = Some(text.trim()).filter(|name| !name.is_empty());
    model.set(id, "name", name)?;
    Ok(())
}
