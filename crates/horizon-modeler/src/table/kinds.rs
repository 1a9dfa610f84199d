//! The collection tables of classifiers: attributes, operations, and
//! enumeration literals.

use horizon_modeler_core::{ElementId, ElementKind, Model, ModelResult};

use super::collection::{CollectionRow, RowKind};
use super::column::ColumnSpec;
use crate::config::FormatOptions;
use crate::error::EditResult;
use crate::format;

/// A row of the attributes table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRow {
    pub text: String,
    pub is_static: bool,
    pub element: ElementId,
}

impl CollectionRow for AttributeRow {
    fn element(&self) -> ElementId {
        self.element
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn toggle(&self, attribute: &str) -> Option<bool> {
        match attribute {
            "isStatic" => Some(self.is_static),
            _ => None,
        }
    }
}

/// Attributes of a class, interface, or data type.
///
/// Association ends live in `ownedAttribute` too, but are edited through
/// the association and get no row.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeRows;

impl RowKind for AttributeRows {
    type Row = AttributeRow;

    const COLLECTION: &'static str = "ownedAttribute";
    const CHILD_KIND: ElementKind = ElementKind::Property;

    fn columns() -> &'static [ColumnSpec] {
        const COLUMNS: &[ColumnSpec] = &[
            ColumnSpec::text("Attributes"),
            ColumnSpec::toggle("S", "isStatic", "Static"),
            ColumnSpec::reference(),
        ];
        COLUMNS
    }

    fn watch_paths() -> &'static [&'static str] {
        &[
            "ownedAttribute.name",
            "ownedAttribute.isDerived",
            "ownedAttribute.visibility",
            "ownedAttribute.isStatic",
            "ownedAttribute.lowerValue",
            "ownedAttribute.upperValue",
            "ownedAttribute.defaultValue",
            "ownedAttribute.typeValue",
            "ownedAttribute.note",
        ]
    }

    fn project(model: &Model, element: ElementId, options: FormatOptions) -> EditResult<AttributeRow> {
        Ok(AttributeRow {
            text: format::format(model, element, options)?,
            is_static: model.flag(element, "isStatic")?,
            element,
        })
    }

    fn include(model: &Model, element: ElementId) -> ModelResult<bool> {
        Ok(model.reference(element, "association")?.is_none())
    }
}

/// A row of the operations table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRow {
    pub text: String,
    pub is_abstract: bool,
    pub is_static: bool,
    pub element: ElementId,
}

impl CollectionRow for OperationRow {
    fn element(&self) -> ElementId {
        self.element
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn toggle(&self, attribute: &str) -> Option<bool> {
        match attribute {
            "isAbstract" => Some(self.is_abstract),
            "isStatic" => Some(self.is_static),
            _ => None,
        }
    }
}

/// Operations of a class, interface, or data type.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationRows;

impl RowKind for OperationRows {
    type Row = OperationRow;

    const COLLECTION: &'static str = "ownedOperation";
    const CHILD_KIND: ElementKind = ElementKind::Operation;

    fn columns() -> &'static [ColumnSpec] {
        const COLUMNS: &[ColumnSpec] = &[
            ColumnSpec::text("Operations"),
            ColumnSpec::toggle("A", "isAbstract", "Abstract"),
            ColumnSpec::toggle("S", "isStatic", "Static"),
            ColumnSpec::reference(),
        ];
        COLUMNS
    }

    // Parameters are watched as a whole: the return type and every
    // parameter are rendered in the operation's text.
    fn watch_paths() -> &'static [&'static str] {
        &[
            "ownedOperation.name",
            "ownedOperation.isAbstract",
            "ownedOperation.isStatic",
            "ownedOperation.visibility",
            "ownedOperation.note",
            "ownedOperation.ownedParameter.name",
            "ownedOperation.ownedParameter.direction",
            "ownedOperation.ownedParameter.lowerValue",
            "ownedOperation.ownedParameter.upperValue",
            "ownedOperation.ownedParameter.typeValue",
            "ownedOperation.ownedParameter.defaultValue",
        ]
    }

    fn project(model: &Model, element: ElementId, options: FormatOptions) -> EditResult<OperationRow> {
        Ok(OperationRow {
            text: format::format(model, element, options)?,
            is_abstract: model.flag(element, "isAbstract")?,
            is_static: model.flag(element, "isStatic")?,
            element,
        })
    }
}

/// A row of the enumeration literals table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralRow {
    pub text: String,
    pub element: ElementId,
}

impl CollectionRow for LiteralRow {
    fn element(&self) -> ElementId {
        self.element
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn toggle(&self, _attribute: &str) -> Option<bool> {
        None
    }
}

/// Literals of an enumeration.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralRows;

impl RowKind for LiteralRows {
    type Row = LiteralRow;

    const COLLECTION: &'static str = "ownedLiteral";
    const CHILD_KIND: ElementKind = ElementKind::EnumerationLiteral;

    fn columns() -> &'static [ColumnSpec] {
        const COLUMNS: &[ColumnSpec] = &[ColumnSpec::text("Literals"), ColumnSpec::reference()];
        COLUMNS
    }

    fn watch_paths() -> &'static [&'static str] {
        &["ownedLiteral.name"]
    }

    fn project(model: &Model, element: ElementId, _options: FormatOptions) -> EditResult<LiteralRow> {
        Ok(LiteralRow {
            text: format::format(model, element, FormatOptions::default())?,
            element,
        })
    }

    fn attached(model: &Model, owner: ElementId, element: ElementId) -> ModelResult<()> {
        model.set(element, "enumeration", owner)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::column::is_well_formed;

    #[test]
    fn test_column_layouts() {
        assert!(is_well_formed(AttributeRows::columns()));
        assert!(is_well_formed(OperationRows::columns()));
        assert!(is_well_formed(LiteralRows::columns()));
    }

    #[test]
    fn test_toggle_columns_match_rows() {
        let model = Model::new();
        let op = model.create(ElementKind::Operation).unwrap();
        model.set(op, "name", "f").unwrap();
        model.set(op, "isAbstract", true).unwrap();
        let row = OperationRows::project(&model, op, FormatOptions::WITH_NOTE).unwrap();

        let toggles: Vec<_> = OperationRows::columns()
            .iter()
            .filter_map(|column| column.toggle_attribute())
            .map(|attribute| row.toggle(attribute))
            .collect();
        assert_eq!(toggles, [Some(true), Some(false)]);
        assert_eq!(row.text(), "+ f()");
    }
}
