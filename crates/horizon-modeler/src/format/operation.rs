//! Operation and parameter notation.

use std::fmt::Write as _;

use horizon_modeler_core::{ElementId, ElementKind, Model, ModelResult};

use super::syntax::{Multiplicity, OperationSyntax, ParameterSyntax, Visibility};
use crate::config::FormatOptions;

const RETURN: &str = "return";

fn is_return(model: &Model, param: ElementId) -> ModelResult<bool> {
    Ok(model.text(param, "direction")?.as_deref() == Some(RETURN))
}

/// Render a parameter as `[dir] name[: type][mult][ = default]`.
///
/// The direction is omitted when it is `in`.
pub(crate) fn format_parameter(model: &Model, id: ElementId) -> ModelResult<String> {
    let Some(name) = model.text(id, "name")?.filter(|name| !name.is_empty()) else {
        return Ok(String::new());
    };

    let mut text = String::new();
    if let Some(direction) = model.text(id, "direction")? {
        if direction != "in" && direction != RETURN {
            let _ = write!(text, "{direction} ");
        }
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
    Ok(text)
}

/// Render an operation as `+ name(params): type[mult] # note`.
pub(crate) fn format_operation(model: &Model, id: ElementId, options: FormatOptions) -> ModelResult<String> {
    let Some(name) = model.text(id, "name")?.filter(|name| !name.is_empty()) else {
        return Ok(String::new());
    };

    let mut parameters = Vec::new();
    let mut result = None;
    for param in model.members(id, "ownedParameter")? {
        if is_return(model, param)? {
            result.get_or_insert(param);
        } else {
            let text = format_parameter(model, param)?;
            if !text.is_empty() {
                parameters.push(text);
            }
        }
    }

    let visibility = Visibility::from_name(model.text(id, "visibility")?.as_deref());
    let mut text = format!("{} {}({})", visibility.symbol(), name, parameters.join(", "));
    if let Some(result) = result {
        if let Some(type_value) = model.text(result, "typeValue")? {
            let _ = write!(text, ": {type_value}");
        }
        text.push_str(&Multiplicity::render(
            model.text(result, "lowerValue")?.as_deref(),
            model.text(result, "upperValue")?.as_deref(),
        ));
    }
    if options.note {
        if let Some(note) = model.text(id, "note")?.filter(|note| !note.is_empty()) {
            let _ = write!(text, " # {note}");
        }
    }
    Ok(text)
}

pub(crate) fn apply_parameter(model: &Model, id: ElementId, syntax: ParameterSyntax) -> ModelResult<()> {
    model.set(id, "direction", syntax.direction.unwrap_or_else(|| "in".to_string()))?;
    model.set(id, "name", syntax.name)?;
    model.set(id, "typeValue", syntax.type_value)?;
    model.set(id, "lowerValue", syntax.multiplicity.lower)?;
    model.set(id, "upperValue", syntax.multiplicity.upper)?;
    model.set(id, "defaultValue", syntax.default)?;
    Ok(())
}

fn new_parameter(model: &Model, operation: ElementId) -> ModelResult<ElementId> {
    let param = model.create(ElementKind::Parameter)?;
    model.append(operation, "ownedParameter", param)?;
    Ok(param)
}

/// Apply a parsed operation.
///
/// Existing parameters are reused by position, missing ones are created and
/// surplus ones deleted. The return type lives in a parameter whose
/// direction is `return`.
pub(crate) fn apply_operation(model: &Model, id: ElementId, syntax: OperationSyntax) -> ModelResult<()> {
    model.set(id, "visibility", syntax.visibility.name())?;
    model.set(id, "name", syntax.name)?;
    if let Some(note) = syntax.note {
        model.set(id, "note", Some(note).filter(|note| !note.is_empty()))?;
    }

    let mut results = Vec::new();
    let mut regular = Vec::new();
    for param in model.members(id, "ownedParameter")? {
        if is_return(model, param)? {
            results.push(param);
        } else {
            regular.push(param);
        }
    }

    let has_result = syntax.return_type.is_some() || syntax.return_multiplicity.upper.is_some();
    let mut surplus_results = results.iter().copied();
    if has_result {
        let result = match surplus_results.next() {
            Some(result) => result,
            None => {
                let result = new_parameter(model, id)?;
                model.set(result, "direction", RETURN)?;
                result
            }
        };
        model.set(result, "typeValue", syntax.return_type)?;
        model.set(result, "lowerValue", syntax.return_multiplicity.lower)?;
        model.set(result, "upperValue", syntax.return_multiplicity.upper)?;
    }
    for result in surplus_results {
        model.delete(result)?;
    }

    let count = syntax.parameters.len();
    for (index, parameter) in syntax.parameters.into_iter().enumerate() {
        let param = match regular.get(index) {
            Some(param) => *param,
            None => new_parameter(model, id)?,
        };
        apply_parameter(model, param, parameter)?;
    }
    for surplus in regular.into_iter().skip(count) {
        model.delete(surplus)?;
    }
    Ok(())
}

pub(crate) fn reset_operation(model: &Model, id: ElementId) -> ModelResult<()> {
    model.set(id, "name", None::<String>)?;
    model.set(id, "note", None::<String>)?;
    model.reset(id, "visibility")?;
    for param in model.members(id, "ownedParameter")? {
        model.delete(param)?;
    }
    Ok(())
}

pub(crate) fn reset_parameter(model: &Model, id: ElementId) -> ModelResult<()> {
    for attribute in ["name", "typeValue", "lowerValue", "upperValue", "defaultValue"] {
        model.set(id, attribute, None::<String>)?;
    }
    model.reset(id, "direction")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::syntax::parse_operation;

    fn operation(model: &Model, text: &str) -> ElementId {
        let id = model.create(ElementKind::Operation).unwrap();
        apply_operation(model, id, parse_operation(text).unwrap()).unwrap();
        id
    }

    #[test]
    fn test_format_operation() {
        let model = Model::new();
        let id = operation(&model, "- move( dx:int, out  dy : int[0..1] = 0 ) : bool # moves");

        assert_eq!(
            format_operation(&model, id, FormatOptions::WITH_NOTE).unwrap(),
            "- move(dx: int, out dy: int[0..1] = 0): bool # moves"
        );
    }

    #[test]
    fn test_parameters_reused_by_position() {
        let model = Model::new();
        let id = operation(&model, "f(a: int, b: int): int");
        let before = model.members(id, "ownedParameter").unwrap();
        assert_eq!(before.len(), 3);

        apply_operation(&model, id, parse_operation("f(x: str)").unwrap()).unwrap();
        let after = model.members(id, "ownedParameter").unwrap();

        // The return parameter came first; `a` is reused for `x`.
        assert_eq!(after, vec![before[1]]);
        assert_eq!(model.text(after[0], "name").unwrap().as_deref(), Some("x"));
        assert!(!model.contains(before[0]));
        assert!(!model.contains(before[2]));
    }

    #[test]
    fn test_return_parameter_created_once() {
        let model = Model::new();
        let id = operation(&model, "f(): int");
        apply_operation(&model, id, parse_operation("f(): str[*]").unwrap()).unwrap();

        let params = model.members(id, "ownedParameter").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(model.text(params[0], "direction").unwrap().as_deref(), Some("return"));
        assert_eq!(format_operation(&model, id, FormatOptions::default()).unwrap(), "+ f(): str[*]");
    }

    #[test]
    fn test_format_parameter() {
        let model = Model::new();
        let id = operation(&model, "f(inout p: T[1..2] = d)");
        let param = model.members(id, "ownedParameter").unwrap()[0];
        assert_eq!(format_parameter(&model, param).unwrap(), "inout p: T[1..2] = d");
    }

    #[test]
    fn test_reset_operation() {
        let model = Model::new();
        let id = operation(&model, "f(a, b): int");
        reset_operation(&model, id).unwrap();

        assert!(model.members(id, "ownedParameter").unwrap().is_empty());
        assert_eq!(format_operation(&model, id, FormatOptions::WITH_NOTE).unwrap(), "");
    }
}
