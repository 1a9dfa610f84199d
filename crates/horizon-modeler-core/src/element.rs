//! Element kinds, identities, and the static attribute schema.
//!
//! Every element in a [`Model`](crate::Model) has a kind, and every kind has a
//! fixed set of attributes. Attributes are addressed by their UML name
//! (`ownedAttribute`, `isStatic`, ...) so that dotted watch paths read the
//! same way the metamodel does.
//!
//! # Key Types
//!
//! - [`ElementId`] - Stable identity of an element; never resolves once deleted
//! - [`ElementKind`] - Concrete metaclass of an element
//! - [`Metaclass`] - Abstract or concrete tag used for "is-a" lookups
//! - [`AttributeSpec`] - Name, type, and default of one attribute
//! - [`Value`] - Dynamically typed attribute value

use std::fmt;

use slotmap::new_key_type;

new_key_type! {
    /// A unique identifier for an element in a model.
    ///
    /// `ElementId`s compare by identity. Once an element is deleted its id
    /// never resolves again, even if the storage slot is reused, which makes
    /// the id safe to hold as a lookup-only back-reference.
    pub struct ElementId;
}

impl ElementId {
    /// Convert the id to a raw u64 value, for logging and interop.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }
}

/// The concrete kind of a model element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Class,
    Interface,
    DataType,
    Enumeration,
    Component,
    Association,
    Property,
    Operation,
    Parameter,
    EnumerationLiteral,
}

impl ElementKind {
    /// All element kinds, in declaration order.
    pub const ALL: [ElementKind; 10] = [
        ElementKind::Class,
        ElementKind::Interface,
        ElementKind::DataType,
        ElementKind::Enumeration,
        ElementKind::Component,
        ElementKind::Association,
        ElementKind::Property,
        ElementKind::Operation,
        ElementKind::Parameter,
        ElementKind::EnumerationLiteral,
    ];

    /// The UML metaclass name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::Interface => "Interface",
            Self::DataType => "DataType",
            Self::Enumeration => "Enumeration",
            Self::Component => "Component",
            Self::Association => "Association",
            Self::Property => "Property",
            Self::Operation => "Operation",
            Self::Parameter => "Parameter",
            Self::EnumerationLiteral => "EnumerationLiteral",
        }
    }

    /// Returns `true` if this kind conforms to the given metaclass.
    pub fn is_a(self, metaclass: Metaclass) -> bool {
        match metaclass {
            Metaclass::Element | Metaclass::NamedElement => true,
            Metaclass::Classifier => matches!(
                self,
                Self::Class
                    | Self::Interface
                    | Self::DataType
                    | Self::Enumeration
                    | Self::Component
                    | Self::Association
            ),
            Metaclass::Feature => matches!(self, Self::Property | Self::Operation),
            Metaclass::Kind(kind) => {
                kind == self
                    // Component specializes Class, Enumeration specializes DataType.
                    || (kind == Self::Class && self == Self::Component)
                    || (kind == Self::DataType && self == Self::Enumeration)
            }
        }
    }

    /// Attributes declared on this kind, excluding the ones every named
    /// element carries.
    fn own_attributes(self) -> &'static [AttributeSpec] {
        match self {
            Self::Class | Self::Interface | Self::DataType => CLASSIFIER,
            Self::Enumeration => ENUMERATION,
            Self::Component => COMPONENT,
            Self::Association => &[],
            Self::Property => PROPERTY,
            Self::Operation => OPERATION,
            Self::Parameter => PARAMETER,
            Self::EnumerationLiteral => ENUMERATION_LITERAL,
        }
    }

    /// Iterate over every attribute of this kind.
    pub fn attributes(self) -> impl Iterator<Item = &'static AttributeSpec> {
        NAMED_ELEMENT.iter().chain(self.own_attributes().iter())
    }

    /// Look up an attribute of this kind by name.
    pub fn attribute(self, name: &str) -> Option<&'static AttributeSpec> {
        self.attributes().find(|spec| spec.name == name)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A metaclass tag, abstract or concrete.
///
/// Used where something is registered against a family of kinds, such as
/// property pages registered for every `Classifier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metaclass {
    Element,
    NamedElement,
    Classifier,
    Feature,
    Kind(ElementKind),
}

/// The storage type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    /// Optional text.
    Text,
    /// Boolean flag.
    Flag,
    /// Optional non-owning reference to another element.
    One,
    /// Ordered collection of owned elements.
    Many,
}

/// Schema entry for one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    /// The attribute name.
    pub name: &'static str,
    /// The storage type.
    pub ty: AttributeType,
    /// Default text for `Text` attributes.
    pub default: Option<&'static str>,
    /// The metaclass every member of a `Many` attribute must conform to.
    pub member: Option<Metaclass>,
}

impl AttributeSpec {
    const fn text(name: &'static str) -> Self {
        Self {
            name,
            ty: AttributeType::Text,
            default: None,
            member: None,
        }
    }

    const fn text_or(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            ty: AttributeType::Text,
            default: Some(default),
            member: None,
        }
    }

    const fn flag(name: &'static str) -> Self {
        Self {
            name,
            ty: AttributeType::Flag,
            default: None,
            member: None,
        }
    }

    const fn one(name: &'static str) -> Self {
        Self {
            name,
            ty: AttributeType::One,
            default: None,
            member: None,
        }
    }

    const fn many(name: &'static str, member: ElementKind) -> Self {
        Self {
            name,
            ty: AttributeType::Many,
            default: None,
            member: Some(Metaclass::Kind(member)),
        }
    }

    /// The value an element reports before the attribute was ever set.
    pub fn default_value(&self) -> Value {
        match self.ty {
            AttributeType::Text => self
                .default
                .map(|text| Value::Text(text.to_string()))
                .unwrap_or(Value::None),
            AttributeType::Flag => Value::Flag(false),
            AttributeType::One => Value::None,
            AttributeType::Many => Value::Many(Vec::new()),
        }
    }

    /// Returns `true` if `value` may be stored in this attribute through
    /// a plain set.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self.ty, value),
            (AttributeType::Text, Value::None | Value::Text(_))
                | (AttributeType::Flag, Value::Flag(_))
                | (AttributeType::One, Value::None | Value::Ref(_))
        )
    }

    /// Returns `true` if an element of `kind` may be appended to this
    /// collection.
    pub fn accepts_member(&self, kind: ElementKind) -> bool {
        self.ty == AttributeType::Many && self.member.is_some_and(|member| kind.is_a(member))
    }
}

const NAMED_ELEMENT: &[AttributeSpec] = &[
    AttributeSpec::text("name"),
    AttributeSpec::text_or("visibility", "public"),
    AttributeSpec::text("note"),
];

const CLASSIFIER: &[AttributeSpec] = &[
    AttributeSpec::flag("isAbstract"),
    AttributeSpec::many("ownedAttribute", ElementKind::Property),
    AttributeSpec::many("ownedOperation", ElementKind::Operation),
];

const ENUMERATION: &[AttributeSpec] = &[
    AttributeSpec::flag("isAbstract"),
    AttributeSpec::many("ownedAttribute", ElementKind::Property),
    AttributeSpec::many("ownedOperation", ElementKind::Operation),
    AttributeSpec::many("ownedLiteral", ElementKind::EnumerationLiteral),
];

const COMPONENT: &[AttributeSpec] = &[
    AttributeSpec::flag("isAbstract"),
    AttributeSpec::many("ownedAttribute", ElementKind::Property),
    AttributeSpec::many("ownedOperation", ElementKind::Operation),
    AttributeSpec::flag("isIndirectlyInstantiated"),
];

const PROPERTY: &[AttributeSpec] = &[
    AttributeSpec::flag("isStatic"),
    AttributeSpec::flag("isDerived"),
    AttributeSpec::text("typeValue"),
    AttributeSpec::text("lowerValue"),
    AttributeSpec::text("upperValue"),
    AttributeSpec::text("defaultValue"),
    AttributeSpec::one("association"),
];

const OPERATION: &[AttributeSpec] = &[
    AttributeSpec::flag("isStatic"),
    AttributeSpec::flag("isAbstract"),
    AttributeSpec::many("ownedParameter", ElementKind::Parameter),
];

const PARAMETER: &[AttributeSpec] = &[
    AttributeSpec::text_or("direction", "in"),
    AttributeSpec::text("typeValue"),
    AttributeSpec::text("lowerValue"),
    AttributeSpec::text("upperValue"),
    AttributeSpec::text("defaultValue"),
];

const ENUMERATION_LITERAL: &[AttributeSpec] = &[AttributeSpec::one("enumeration")];

/// A dynamically typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// No value (unset text or reference).
    #[default]
    None,
    /// A boolean flag.
    Flag(bool),
    /// A text value.
    Text(String),
    /// A reference to another element.
    Ref(ElementId),
    /// The members of an ordered collection.
    Many(Vec<ElementId>),
}

impl Value {
    /// Returns the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the flag, treating anything but `Flag(true)` as `false`.
    pub fn as_flag(&self) -> bool {
        matches!(self, Value::Flag(true))
    }

    /// Returns the referenced element, if this is a reference.
    pub fn as_element(&self) -> Option<ElementId> {
        match self {
            Value::Ref(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Flag(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Option<&str>> for Value {
    fn from(value: Option<&str>) -> Self {
        value.map(Value::from).unwrap_or(Value::None)
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map(Value::Text).unwrap_or(Value::None)
    }
}

impl From<ElementId> for Value {
    fn from(value: ElementId) -> Self {
        Value::Ref(value)
    }
}
