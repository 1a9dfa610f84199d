//! Column layout of collection tables.

/// What a column shows and how edits to it are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// The formatted element text. Edits are parsed back into the element.
    Text,
    /// A boolean attribute of the element. Edits invert it.
    Toggle { attribute: &'static str },
    /// The back-reference to the element. Writes only refresh the row.
    Reference,
}

/// One column of a collection table.
///
/// Header and tooltip are message ids, translated when a view asks for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub role: ColumnRole,
    pub header: &'static str,
    pub tooltip: Option<&'static str>,
}

impl ColumnSpec {
    /// The formatted text column.
    pub const fn text(header: &'static str) -> Self {
        Self {
            role: ColumnRole::Text,
            header,
            tooltip: None,
        }
    }

    /// A toggle column bound to a boolean attribute.
    pub const fn toggle(header: &'static str, attribute: &'static str, tooltip: &'static str) -> Self {
        Self {
            role: ColumnRole::Toggle { attribute },
            header,
            tooltip: Some(tooltip),
        }
    }

    /// The trailing back-reference column.
    pub const fn reference() -> Self {
        Self {
            role: ColumnRole::Reference,
            header: "",
            tooltip: None,
        }
    }

    /// The attribute a toggle column is bound to.
    pub fn toggle_attribute(&self) -> Option<&'static str> {
        match self.role {
            ColumnRole::Toggle { attribute } => Some(attribute),
            _ => None,
        }
    }
}

/// Returns `true` if `columns` starts with the text column and ends with the
/// reference column, with only toggles in between.
pub(crate) fn is_well_formed(columns: &[ColumnSpec]) -> bool {
    let [first, middle @ .., last] = columns else {
        return false;
    };
    first.role == ColumnRole::Text
        && last.role == ColumnRole::Reference
        && middle.iter().all(|column| column.toggle_attribute().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_check() {
        let good = [
            ColumnSpec::text("Attributes"),
            ColumnSpec::toggle("S", "isStatic", "Static"),
            ColumnSpec::reference(),
        ];
        assert!(is_well_formed(&good));
        assert!(!is_well_formed(&good[..1]));
        assert!(!is_well_formed(&[ColumnSpec::reference(), ColumnSpec::text("x")]));
    }
}
