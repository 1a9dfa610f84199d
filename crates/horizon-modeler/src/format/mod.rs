//! Formatting layer: UML text notation for model elements.
//!
//! [`format`] renders an element as the single line shown in a table cell,
//! and [`parse`] applies an edited line back to the element. The two are
//! inverses for every state reachable through `parse`:
//!
//! ```
//! use horizon_modeler::format::{self, FormatOptions};
//! use horizon_modeler::ParsePolicy;
//! use horizon_modeler_core::{ElementKind, Model};
//!
//! let model = Model::new();
//! let attr = model.create(ElementKind::Property)?;
//!
//! format::parse(&model, attr, "- size: int[0..1] = 3", ParsePolicy::Strict)?;
//! assert_eq!(format::format(&model, attr, FormatOptions::WITH_NOTE)?, "- size: int[0..1] = 3");
//! # Ok::<(), horizon_modeler::EditError>(())
//! ```
//!
//! Parsing runs in two phases. The text is first turned into a syntax record
//! without touching the model; only a successful parse is applied, inside a
//! single transaction.

mod attribute;
mod literal;
mod operation;
pub mod syntax;

use horizon_modeler_core::{ElementId, ElementKind, Model, ModelResult};

pub use crate::config::FormatOptions;
use crate::config::ParsePolicy;
use crate::error::{EditResult, ParseError};
use crate::targets;
use syntax::{AttributeSyntax, OperationSyntax, ParameterSyntax};

/// Render `id` as text.
pub fn format(model: &Model, id: ElementId, options: FormatOptions) -> EditResult<String> {
    let text = match model.kind(id)? {
        ElementKind::Property => attribute::format_attribute(model, id, options)?,
        ElementKind::Operation => operation::format_operation(model, id, options)?,
        ElementKind::Parameter => operation::format_parameter(model, id)?,
        _ => literal::format_name(model, id)?,
    };
    Ok(text)
}

enum Syntax {
    Reset,
    Name(String),
    Attribute(AttributeSyntax),
    Parameter(ParameterSyntax),
    Operation(OperationSyntax),
}

fn read(kind: ElementKind, text: &str) -> Result<Syntax, ParseError> {
    if text.trim().is_empty() {
        return Ok(Syntax::Reset);
    }
    Ok(match kind {
        ElementKind::Property => Syntax::Attribute(syntax::parse_attribute(text)?),
        ElementKind::Operation => Syntax::Operation(syntax::parse_operation(text)?),
        ElementKind::Parameter => Syntax::Parameter(syntax::parse_parameter(text, text)?),
        _ => Syntax::Name(text.to_string()),
    })
}

fn reset(model: &Model, id: ElementId, kind: ElementKind) -> ModelResult<()> {
    match kind {
        ElementKind::Property => attribute::reset_attribute(model, id),
        ElementKind::Operation => operation::reset_operation(model, id),
        ElementKind::Parameter => operation::reset_parameter(model, id),
        _ => literal::apply_name(model, id, ""),
    }
}

fn apply(model: &Model, id: ElementId, kind: ElementKind, syntax: Syntax) -> ModelResult<()> {
    match syntax {
        Syntax::Reset => reset(model, id, kind),
        Syntax::Name(name) => literal::apply_name(model, id, &name),
        Syntax::Attribute(syntax) => attribute::apply_attribute(model, id, syntax),
        Syntax::Parameter(syntax) => operation::apply_parameter(model, id, syntax),
        Syntax::Operation(syntax) => operation::apply_operation(model, id, syntax),
    }
}

/// Apply `text` to `id`.
///
/// Empty text resets the element to its unnamed default. With
/// [`ParsePolicy::Strict`] malformed text fails with a parse error and the
/// element is left untouched; with [`ParsePolicy::Lenient`] the element is
/// reset and the trimmed text becomes its name.
#[tracing::instrument(skip(model), target = "horizon_modeler::format", level = "trace")]
pub fn parse(model: &Model, id: ElementId, text: &str, policy: ParsePolicy) -> EditResult<()> {
    let kind = model.kind(id)?;
    let syntax = match (read(kind, text), policy) {
        (Ok(syntax), _) => syntax,
        (Err(err), ParsePolicy::Strict) => {
            tracing::debug!(target: targets::FORMAT, ?id, %kind, reason = err.reason, "rejected edit");
            return Err(err.into());
        }
        (Err(err), ParsePolicy::Lenient) => {
            tracing::debug!(target: targets::FORMAT, ?id, %kind, reason = err.reason, "storing unparsed text as name");
            return model.transaction(|model| {
                reset(model, id, kind)?;
                literal::apply_name(model, id, text)?;
                Ok(())
            });
        }
    };

    model.transaction(|model| {
        apply(model, id, kind, syntax)?;
        Ok(())
    })
}
