//! Text notation grammar.
//!
//! Parsing produces plain syntax records without touching the model, so a
//! rejected edit can never leave an element half-updated.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::ParseError;

const VISIBILITY: &str = r"^\s*(?P<vis>[-+#~])?";
const NAME: &str = r"\s*(?P<name>[A-Za-z_]\w*)";
const TYPE: &str = r"(?:\s*:\s*(?P<type>[A-Za-z_][\w.]*))?";
const MULTIPLICITY: &str = r"(?:\s*\[\s*(?:(?P<lower>\d+)\s*\.\.\s*)?(?P<upper>\d+|\*)\s*\])?";
const TAGS: &str = r"(?:\s*\{(?P<tags>[^}]*)\})?";
const NOTE_OR_GARBAGE: &str = r"\s*(?:#\s*(?P<note>.*)|(?P<garbage>.*))$";

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"{VISIBILITY}\s*(?P<derived>/)?{NAME}{TYPE}{MULTIPLICITY}(?:\s*=\s*(?P<default>[^\s#{{}}]+))?{TAGS}{NOTE_OR_GARBAGE}"
    );
    Regex::new(&pattern).expect("attribute pattern is valid")
});

static OPERATION: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"{VISIBILITY}{NAME}(?:\s*\((?P<params>[^)]*)\))?{TYPE}{MULTIPLICITY}{TAGS}{NOTE_OR_GARBAGE}"
    );
    Regex::new(&pattern).expect("operation pattern is valid")
});

static PARAMETER: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"^\s*(?:(?P<dir>inout|in|out)\s+)?{NAME}{TYPE}{MULTIPLICITY}(?:\s*=\s*(?P<default>[^\s,]+))?{TAGS}\s*$"
    );
    Regex::new(&pattern).expect("parameter pattern is valid")
});

/// UML visibility of a named element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
    Package,
}

impl Visibility {
    /// Parse the stored attribute value. Unknown values read as public.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("private") => Self::Private,
            Some("protected") => Self::Protected,
            Some("package") => Self::Package,
            _ => Self::Public,
        }
    }

    /// Parse a notation symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Public),
            "-" => Some(Self::Private),
            "#" => Some(Self::Protected),
            "~" => Some(Self::Package),
            _ => None,
        }
    }

    /// The value stored in the `visibility` attribute.
    pub fn name(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
            Self::Package => "package",
        }
    }

    /// The notation symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Public => "+",
            Self::Private => "-",
            Self::Protected => "#",
            Self::Package => "~",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Lower and upper bounds, as written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Multiplicity {
    pub lower: Option<String>,
    pub upper: Option<String>,
}

impl Multiplicity {
    fn capture(caps: &Captures<'_>) -> Self {
        Self {
            lower: group(caps, "lower"),
            upper: group(caps, "upper"),
        }
    }

    /// Render as `[upper]` or `[lower..upper]`; empty without an upper bound.
    pub fn render(lower: Option<&str>, upper: Option<&str>) -> String {
        match (lower, upper) {
            (_, None) => String::new(),
            (Some(lower), Some(upper)) => format!("[{lower}..{upper}]"),
            (None, Some(upper)) => format!("[{upper}]"),
        }
    }
}

/// A parsed attribute line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeSyntax {
    pub visibility: Visibility,
    pub derived: bool,
    pub name: String,
    pub type_value: Option<String>,
    pub multiplicity: Multiplicity,
    pub default: Option<String>,
    /// `None` when the text had no `#`; `Some("")` for a bare `#`.
    pub note: Option<String>,
}

/// A parsed operation parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterSyntax {
    pub direction: Option<String>,
    pub name: String,
    pub type_value: Option<String>,
    pub multiplicity: Multiplicity,
    pub default: Option<String>,
}

/// A parsed operation line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OperationSyntax {
    pub visibility: Visibility,
    pub name: String,
    pub parameters: Vec<ParameterSyntax>,
    pub return_type: Option<String>,
    pub return_multiplicity: Multiplicity,
    pub note: Option<String>,
}

fn group(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn visibility(caps: &Captures<'_>) -> Visibility {
    caps.name("vis")
        .and_then(|m| Visibility::from_symbol(m.as_str()))
        .unwrap_or_default()
}

fn note(caps: &Captures<'_>) -> Option<String> {
    caps.name("note").map(|m| m.as_str().trim().to_string())
}

fn reject_garbage(text: &str, caps: &Captures<'_>) -> Result<(), ParseError> {
    match caps.name("garbage") {
        Some(m) if !m.as_str().trim().is_empty() => {
            Err(ParseError::new(text, "unexpected text after the declaration"))
        }
        _ => Ok(()),
    }
}

/// Parse `[vis] [/] name [: type] [[lower..]upper] [= default] [{tags}] [# note]`.
pub fn parse_attribute(text: &str) -> Result<AttributeSyntax, ParseError> {
    let caps = ATTRIBUTE
        .captures(text)
        .ok_or_else(|| ParseError::new(text, "expected an attribute name"))?;
    reject_garbage(text, &caps)?;

    let name = group(&caps, "name").ok_or_else(|| ParseError::new(text, "expected an attribute name"))?;
    Ok(AttributeSyntax {
        visibility: visibility(&caps),
        derived: caps.name("derived").is_some(),
        name,
        type_value: group(&caps, "type"),
        multiplicity: Multiplicity::capture(&caps),
        default: group(&caps, "default"),
        note: note(&caps),
    })
}

pub(crate) fn parse_parameter(text: &str, whole: &str) -> Result<ParameterSyntax, ParseError> {
    let caps = PARAMETER
        .captures(text)
        .ok_or_else(|| ParseError::new(whole, "malformed parameter"))?;
    let name = group(&caps, "name").ok_or_else(|| ParseError::new(whole, "malformed parameter"))?;
    Ok(ParameterSyntax {
        direction: group(&caps, "dir"),
        name,
        type_value: group(&caps, "type"),
        multiplicity: Multiplicity::capture(&caps),
        default: group(&caps, "default"),
    })
}

/// Parse `[vis] name([dir] name[: type][mult][= default], ...)[: type[mult]] [{tags}] [# note]`.
pub fn parse_operation(text: &str) -> Result<OperationSyntax, ParseError> {
    let caps = OPERATION
        .captures(text)
        .ok_or_else(|| ParseError::new(text, "expected an operation name"))?;
    reject_garbage(text, &caps)?;

    let name = group(&caps, "name").ok_or_else(|| ParseError::new(text, "expected an operation name"))?;
    let parameters = match caps.name("params").map(|m| m.as_str()) {
        Some(params) if !params.trim().is_empty() => params
            .split(',')
            .map(|param| parse_parameter(param, text))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    Ok(OperationSyntax {
        visibility: visibility(&caps),
        name,
        parameters,
        return_type: group(&caps, "type"),
        return_multiplicity: Multiplicity::capture(&caps),
        note: note(&caps),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_attribute() {
        let syntax = parse_attribute("- /width: int[0..*] = 10 {readOnly} # in pixels").unwrap();
        assert_eq!(syntax.visibility, Visibility::Private);
        assert!(syntax.derived);
        assert_eq!(syntax.name, "width");
        assert_eq!(syntax.type_value.as_deref(), Some("int"));
        assert_eq!(syntax.multiplicity.lower.as_deref(), Some("0"));
        assert_eq!(syntax.multiplicity.upper.as_deref(), Some("*"));
        assert_eq!(syntax.default.as_deref(), Some("10"));
        assert_eq!(syntax.note.as_deref(), Some("in pixels"));
    }

    #[test]
    fn test_bare_attribute_name() {
        let syntax = parse_attribute("count").unwrap();
        assert_eq!(syntax.visibility, Visibility::Public);
        assert_eq!(syntax.name, "count");
        assert_eq!(syntax.type_value, None);
        assert_eq!(syntax.note, None);
    }

    #[test]
    fn test_bare_note_marker() {
        let syntax = parse_attribute("a #").unwrap();
        assert_eq!(syntax.note.as_deref(), Some(""));
    }

    #[test]
    fn test_malformed_attributes() {
        for text in ["+ 12abc", "a: int[1..]", "a: int[x]", "a b", "a: int = "] {
            assert!(parse_attribute(text).is_err(), "{text:?} should not parse");
        }
    }

    #[test]
    fn test_operation_with_parameters() {
        let syntax = parse_operation("# resize(in w: int = 0, out h: int[1], inout flags): bool").unwrap();
        assert_eq!(syntax.visibility, Visibility::Protected);
        assert_eq!(syntax.name, "resize");
        assert_eq!(syntax.parameters.len(), 3);
        assert_eq!(syntax.parameters[0].direction.as_deref(), Some("in"));
        assert_eq!(syntax.parameters[0].default.as_deref(), Some("0"));
        assert_eq!(syntax.parameters[1].direction.as_deref(), Some("out"));
        assert_eq!(syntax.parameters[1].multiplicity.upper.as_deref(), Some("1"));
        assert_eq!(syntax.parameters[2].direction.as_deref(), Some("inout"));
        assert_eq!(syntax.parameters[2].name, "flags");
        assert_eq!(syntax.return_type.as_deref(), Some("bool"));
    }

    #[test]
    fn test_parameter_named_like_direction() {
        let syntax = parse_operation("at(index: int, in)").unwrap();
        assert_eq!(syntax.parameters[0].direction, None);
        assert_eq!(syntax.parameters[0].name, "index");
        assert_eq!(syntax.parameters[1].name, "in");
    }

    #[test]
    fn test_operation_without_parentheses() {
        let syntax = parse_operation("run").unwrap();
        assert_eq!(syntax.name, "run");
        assert!(syntax.parameters.is_empty());
    }

    #[test]
    fn test_malformed_operations() {
        for text in ["run(", "run(a,,b)", "run(): ", "run() trailing", "(x)"] {
            assert!(parse_operation(text).is_err(), "{text:?} should not parse");
        }
    }

    #[test]
    fn test_multiplicity_render() {
        assert_eq!(Multiplicity::render(None, None), "");
        assert_eq!(Multiplicity::render(Some("0"), None), "");
        assert_eq!(Multiplicity::render(None, Some("1")), "[1]");
        assert_eq!(Multiplicity::render(Some("0"), Some("*")), "[0..*]");
    }
}
