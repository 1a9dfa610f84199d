//! Ordered collection adapter.
//!
//! [`OrderedCollection`] exposes one ordered child collection of an owner
//! element (the attributes of a class, say) as a sequence of typed rows, and
//! turns table gestures back into model mutations. What a row looks like and
//! which collection it comes from is described by a [`RowKind`].
//!
//! The adapter keeps no state besides its configuration: every call reads
//! the model afresh, so rows can always be re-derived from the collection.

use std::fmt;
use std::marker::PhantomData;

use horizon_modeler_core::{ElementId, ElementKind, Model, ModelResult};

use super::column::{ColumnRole, ColumnSpec};
use crate::config::{EditorConfig, FormatOptions, ParsePolicy};
use crate::error::{EditError, EditResult};
use crate::format;
use crate::targets;

/// A projected row. The back-reference is the only authoritative field.
pub trait CollectionRow: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// The element this row stands for.
    fn element(&self) -> ElementId;

    /// The formatted text of column 0.
    fn text(&self) -> &str;

    /// The value of the toggle bound to `attribute`.
    fn toggle(&self, attribute: &str) -> Option<bool>;
}

/// Describes one kind of collection table.
pub trait RowKind: Send + Sync + 'static {
    /// The row record.
    type Row: CollectionRow;

    /// Name of the owner's collection attribute.
    const COLLECTION: &'static str;

    /// Kind of the elements created for new rows.
    const CHILD_KIND: ElementKind;

    /// Column layout. Column 0 is the text, the last column the reference.
    fn columns() -> &'static [ColumnSpec];

    /// Paths, relative to the owner, whose changes affect a row.
    fn watch_paths() -> &'static [&'static str];

    /// Project `element` into a row.
    fn project(model: &Model, element: ElementId, options: FormatOptions) -> EditResult<Self::Row>;

    /// Whether a collection member gets a row.
    fn include(_model: &Model, _element: ElementId) -> ModelResult<bool> {
        Ok(true)
    }

    /// Called after a new element was appended to `owner`.
    fn attached(_model: &Model, _owner: ElementId, _element: ElementId) -> ModelResult<()> {
        Ok(())
    }
}

/// Adapter between an owner's ordered collection and a row sequence.
pub struct OrderedCollection<K: RowKind> {
    model: Model,
    owner: ElementId,
    options: FormatOptions,
    policy: ParsePolicy,
    _kind: PhantomData<fn() -> K>,
}

impl<K: RowKind> Clone for OrderedCollection<K> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            owner: self.owner,
            options: self.options,
            policy: self.policy,
            _kind: PhantomData,
        }
    }
}

impl<K: RowKind> fmt::Debug for OrderedCollection<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedCollection")
            .field("owner", &self.owner)
            .field("collection", &K::COLLECTION)
            .finish()
    }
}

impl<K: RowKind> OrderedCollection<K> {
    /// Create an adapter over the `K::COLLECTION` of `owner`.
    pub fn new(model: &Model, owner: ElementId, config: &EditorConfig) -> Self {
        Self {
            model: model.clone(),
            owner,
            options: config.format,
            policy: config.parse_policy,
            _kind: PhantomData,
        }
    }

    /// The model this adapter edits.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The element owning the collection.
    pub fn owner(&self) -> ElementId {
        self.owner
    }

    /// The column layout.
    pub fn columns(&self) -> &'static [ColumnSpec] {
        K::columns()
    }

    /// The members that get a row, in collection order.
    pub fn members(&self) -> EditResult<Vec<ElementId>> {
        let mut members = Vec::new();
        for element in self.model.members(self.owner, K::COLLECTION)? {
            if K::include(&self.model, element)? {
                members.push(element);
            }
        }
        Ok(members)
    }

    /// Returns `true` if `element` is currently in the collection.
    pub fn contains(&self, element: ElementId) -> bool {
        matches!(self.model.index_of(self.owner, K::COLLECTION, element), Ok(Some(_)))
    }

    /// Rows in collection order.
    ///
    /// The member list is read when this is called; each row is projected
    /// when the iterator reaches it. Call again to start over.
    pub fn rows(&self) -> EditResult<Rows<'_, K>> {
        Ok(Rows {
            collection: self,
            members: self.members()?.into_iter(),
        })
    }

    /// Project a single element.
    pub fn project(&self, element: ElementId) -> EditResult<K::Row> {
        K::project(&self.model, element, self.options)
    }

    fn check_member(&self, element: ElementId) -> EditResult<()> {
        if self.contains(element) {
            Ok(())
        } else {
            Err(EditError::invalid_reference(element, K::COLLECTION))
        }
    }

    /// Create a new child element and append it to the collection.
    #[tracing::instrument(skip(self), target = "horizon_modeler::table", level = "trace")]
    pub fn create(&self) -> EditResult<ElementId> {
        let owner = self.owner;
        let element = self.model.transaction(|model| -> EditResult<ElementId> {
            let element = model.create(K::CHILD_KIND)?;
            model.append(owner, K::COLLECTION, element)?;
            K::attached(model, owner, element)?;
            Ok(element)
        })?;
        tracing::debug!(target: targets::TABLE, ?owner, ?element, collection = K::COLLECTION, "created row element");
        Ok(element)
    }

    /// Apply a cell edit to `element`.
    ///
    /// The text column parses `input`, a toggle column inverts its attribute,
    /// and the reference column changes nothing.
    #[tracing::instrument(skip(self), target = "horizon_modeler::table", level = "trace")]
    pub fn apply(&self, element: ElementId, column: usize, input: &str) -> EditResult<()> {
        self.check_member(element)?;
        let Some(spec) = K::columns().get(column) else {
            tracing::debug!(target: targets::TABLE, column, "edit to unknown column ignored");
            return Ok(());
        };
        match spec.role {
            ColumnRole::Text => format::parse(&self.model, element, input, self.policy),
            ColumnRole::Toggle { attribute } => self.model.transaction(|model| -> EditResult<()> {
                let value = model.flag(element, attribute)?;
                model.set(element, attribute, !value)?;
                Ok(())
            }),
            ColumnRole::Reference => Ok(()),
        }
    }

    /// Delete `element`.
    #[tracing::instrument(skip(self), target = "horizon_modeler::table", level = "trace")]
    pub fn remove(&self, element: ElementId) -> EditResult<()> {
        self.check_member(element)?;
        self.model.transaction(|model| -> EditResult<()> {
            model.delete(element)?;
            Ok(())
        })
    }

    /// Exchange the positions of two members.
    #[tracing::instrument(skip(self), target = "horizon_modeler::table", level = "trace")]
    pub fn swap(&self, a: ElementId, b: ElementId) -> EditResult<()> {
        self.check_member(a)?;
        self.check_member(b)?;
        let owner = self.owner;
        self.model.transaction(|model| -> EditResult<()> {
            model.swap(owner, K::COLLECTION, a, b)?;
            Ok(())
        })
    }

    /// Reorder the collection to follow `new_order`.
    ///
    /// Members missing from `new_order` keep their relative order after the
    /// listed ones. Unknown elements in `new_order` are ignored.
    #[tracing::instrument(skip(self), target = "horizon_modeler::table", level = "trace")]
    pub fn reorder(&self, new_order: &[ElementId]) -> EditResult<()> {
        let owner = self.owner;
        let tail = new_order.len();
        self.model.transaction(|model| -> EditResult<()> {
            model.order(owner, K::COLLECTION, |element| {
                new_order
                    .iter()
                    .position(|candidate| *candidate == element)
                    .unwrap_or(tail)
            })?;
            Ok(())
        })
    }
}

/// Lazy row iterator returned by [`OrderedCollection::rows`].
pub struct Rows<'a, K: RowKind> {
    collection: &'a OrderedCollection<K>,
    members: std::vec::IntoIter<ElementId>,
}

impl<K: RowKind> Iterator for Rows<'_, K> {
    type Item = K::Row;

    fn next(&mut self) -> Option<K::Row> {
        for element in self.members.by_ref() {
            match self.collection.project(element) {
                Ok(row) => return Some(row),
                // Deleted between listing and projection.
                Err(err) => tracing::trace!(target: targets::TABLE, ?element, %err, "skipping row"),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.members.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::kinds::{AttributeRows, LiteralRows, OperationRows};

    fn class_with(model: &Model, names: &[&str]) -> (ElementId, Vec<ElementId>) {
        let class = model.create(ElementKind::Class).unwrap();
        let attrs = names
            .iter()
            .map(|name| {
                let attr = model.create(ElementKind::Property).unwrap();
                model.set(attr, "name", *name).unwrap();
                model.append(class, "ownedAttribute", attr).unwrap();
                attr
            })
            .collect();
        (class, attrs)
    }

    #[test]
    fn test_rows_follow_collection() {
        let model = Model::new();
        let (class, attrs) = class_with(&model, &["a", "b"]);
        let collection = OrderedCollection::<AttributeRows>::new(&model, class, &EditorConfig::default());

        let texts: Vec<_> = collection.rows().unwrap().map(|row| row.text).collect();
        assert_eq!(texts, ["+ a", "+ b"]);

        model.swap(class, "ownedAttribute", attrs[0], attrs[1]).unwrap();
        let elements: Vec<_> = collection.rows().unwrap().map(|row| row.element).collect();
        assert_eq!(elements, [attrs[1], attrs[0]]);
    }

    #[test]
    fn test_association_ends_skipped() {
        let model = Model::new();
        let (class, attrs) = class_with(&model, &["a", "end"]);
        let association = model.create(ElementKind::Association).unwrap();
        model.set(attrs[1], "association", association).unwrap();

        let collection = OrderedCollection::<AttributeRows>::new(&model, class, &EditorConfig::default());
        assert_eq!(collection.members().unwrap(), [attrs[0]]);
    }

    #[test]
    fn test_create_appends() {
        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();
        let collection = OrderedCollection::<OperationRows>::new(&model, class, &EditorConfig::default());

        let op = collection.create().unwrap();
        assert_eq!(model.members(class, "ownedOperation").unwrap(), [op]);
        assert_eq!(model.kind(op).unwrap(), ElementKind::Operation);
    }

    #[test]
    fn test_literal_create_sets_enumeration() {
        let model = Model::new();
        let enumeration = model.create(ElementKind::Enumeration).unwrap();
        let collection = OrderedCollection::<LiteralRows>::new(&model, enumeration, &EditorConfig::default());

        let literal = collection.create().unwrap();
        assert_eq!(model.reference(literal, "enumeration").unwrap(), Some(enumeration));
    }

    #[test]
    fn test_toggle_inverts() {
        let model = Model::new();
        let (class, attrs) = class_with(&model, &["a"]);
        let collection = OrderedCollection::<AttributeRows>::new(&model, class, &EditorConfig::default());

        collection.apply(attrs[0], 1, "").unwrap();
        assert!(model.flag(attrs[0], "isStatic").unwrap());
        collection.apply(attrs[0], 1, "").unwrap();
        assert!(!model.flag(attrs[0], "isStatic").unwrap());
    }

    #[test]
    fn test_swap_stale_reference() {
        let model = Model::new();
        let (class, attrs) = class_with(&model, &["a", "b"]);
        let collection = OrderedCollection::<AttributeRows>::new(&model, class, &EditorConfig::default());
        model.delete(attrs[1]).unwrap();

        let err = collection.swap(attrs[0], attrs[1]).unwrap_err();
        assert!(matches!(err, EditError::InvalidReference { .. }));
        assert_eq!(model.members(class, "ownedAttribute").unwrap(), [attrs[0]]);
    }

    #[test]
    fn test_partial_reorder_uses_tail() {
        let model = Model::new();
        let (class, attrs) = class_with(&model, &["a", "b", "c"]);
        let collection = OrderedCollection::<AttributeRows>::new(&model, class, &EditorConfig::default());

        collection.reorder(&[attrs[2]]).unwrap();
        assert_eq!(
            model.members(class, "ownedAttribute").unwrap(),
            [attrs[2], attrs[0], attrs[1]]
        );
    }
}
