//! The element store and its mutation layer.
//!
//! [`Model`] owns every element, validates every mutation against the
//! element schema, journals mutations while a transaction is open, and emits
//! one [`ModelEvent`] per primitive mutation.
//!
//! # Ownership
//!
//! Ordered collections (`Many` attributes) own their members. A member
//! belongs to exactly one collection at a time: appending it somewhere else
//! moves it, and deleting an element deletes everything it owns.
//!
//! # Notifications
//!
//! Events are emitted synchronously after the store lock has been released,
//! so handlers may read from and write to the model again.
//!
//! # Example
//!
//! ```
//! use horizon_modeler_core::{ElementKind, Model};
//!
//! let model = Model::new();
//! let class = model.create(ElementKind::Class)?;
//! let attr = model.create(ElementKind::Property)?;
//! model.append(class, "ownedAttribute", attr)?;
//! model.set(attr, "name", "width")?;
//!
//! assert_eq!(model.members(class, "ownedAttribute")?, vec![attr]);
//! assert_eq!(model.text(attr, "name")?.as_deref(), Some("width"));
//! # Ok::<(), horizon_modeler_core::ModelError>(())
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use slotmap::SlotMap;

use crate::element::{AttributeSpec, AttributeType, ElementId, ElementKind, Value};
use crate::error::{ModelError, ModelResult};
use crate::event::{ModelEvent, TransactionEvent};
use crate::logging::targets;
use crate::signal::Signal;
use crate::thread_check::ThreadAffinity;
use crate::transaction::{JournalEntry, TransactionState};

/// Storage for a single element.
struct ElementData {
    kind: ElementKind,
    /// Text, flag, and reference attributes that differ from the default.
    values: HashMap<&'static str, Value>,
    /// Ordered owned collections.
    collections: HashMap<&'static str, Vec<ElementId>>,
    /// The collection this element is a member of.
    owner: Option<(ElementId, &'static str)>,
    /// Deleted elements stay tombstoned until the outermost commit.
    alive: bool,
}

impl ElementData {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            values: HashMap::new(),
            collections: HashMap::new(),
            owner: None,
            alive: true,
        }
    }

    fn scalar(&self, name: &str) -> Value {
        self.values.get(name).cloned().unwrap_or_else(|| {
            self.kind
                .attribute(name)
                .map(AttributeSpec::default_value)
                .unwrap_or_default()
        })
    }
}

type Elements = SlotMap<ElementId, ElementData>;

fn live(elements: &Elements, id: ElementId) -> ModelResult<&ElementData> {
    elements
        .get(id)
        .filter(|data| data.alive)
        .ok_or(ModelError::UnknownElement(id))
}

fn live_mut(elements: &mut Elements, id: ElementId) -> ModelResult<&mut ElementData> {
    elements
        .get_mut(id)
        .filter(|data| data.alive)
        .ok_or(ModelError::UnknownElement(id))
}

fn attribute_spec(kind: ElementKind, attribute: &str) -> ModelResult<&'static AttributeSpec> {
    kind.attribute(attribute)
        .ok_or_else(|| ModelError::UnknownAttribute {
            kind,
            attribute: attribute.to_string(),
        })
}

fn collection_spec(kind: ElementKind, attribute: &str) -> ModelResult<&'static AttributeSpec> {
    let spec = attribute_spec(kind, attribute)?;
    if spec.ty == AttributeType::Many {
        Ok(spec)
    } else {
        Err(ModelError::TypeMismatch {
            kind,
            attribute: spec.name,
            found: "a collection operation",
        })
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::None => "nothing",
        Value::Flag(_) => "a flag",
        Value::Text(_) => "text",
        Value::Ref(_) => "a reference",
        Value::Many(_) => "a collection",
    }
}

struct ModelInner {
    elements: RwLock<Elements>,
    events: Signal<ModelEvent>,
    transaction_events: Signal<TransactionEvent>,
    transaction: Mutex<TransactionState>,
    affinity: ThreadAffinity,
}

/// A shared handle to an element store.
///
/// Cloning is cheap; all clones refer to the same store.
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

/// A non-owning handle to a [`Model`].
///
/// Subscribers hold this instead of a [`Model`] so that a subscription stored
/// inside the model does not keep the model alive.
#[derive(Clone)]
pub struct WeakModel {
    inner: Weak<ModelInner>,
}

impl WeakModel {
    /// Upgrade to a strong handle if the model still exists.
    pub fn upgrade(&self) -> Option<Model> {
        self.inner.upgrade().map(|inner| Model { inner })
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("elements", &self.len())
            .finish()
    }
}

impl Model {
    /// Create an empty model bound to the current thread.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ModelInner {
                elements: RwLock::new(SlotMap::with_key()),
                events: Signal::new(),
                transaction_events: Signal::new(),
                transaction: Mutex::new(TransactionState::default()),
                affinity: ThreadAffinity::current(),
            }),
        }
    }

    /// Create a non-owning handle.
    pub fn downgrade(&self) -> WeakModel {
        WeakModel {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Returns `true` if both handles refer to the same store.
    pub fn ptr_eq(&self, other: &Model) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The signal emitted for every model change.
    pub fn events(&self) -> &Signal<ModelEvent> {
        &self.inner.events
    }

    /// The signal emitted at transaction boundaries.
    pub fn transaction_events(&self) -> &Signal<TransactionEvent> {
        &self.inner.transaction_events
    }

    pub(crate) fn transaction_state(&self) -> &Mutex<TransactionState> {
        &self.inner.transaction
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.inner
            .elements
            .read()
            .values()
            .filter(|data| data.alive)
            .count()
    }

    /// Returns `true` if the model holds no live elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `id` refers to a live element.
    pub fn contains(&self, id: ElementId) -> bool {
        live(&self.inner.elements.read(), id).is_ok()
    }

    /// The kind of an element.
    pub fn kind(&self, id: ElementId) -> ModelResult<ElementKind> {
        live(&self.inner.elements.read(), id).map(|data| data.kind)
    }

    /// The collection an element is currently a member of.
    pub fn owner(&self, id: ElementId) -> ModelResult<Option<(ElementId, &'static str)>> {
        live(&self.inner.elements.read(), id).map(|data| data.owner)
    }

    /// Live elements that are not a member of any collection.
    pub fn roots(&self) -> Vec<ElementId> {
        self.inner
            .elements
            .read()
            .iter()
            .filter(|(_, data)| data.alive && data.owner.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Read an attribute as a dynamic value.
    ///
    /// Collections are returned as `Value::Many` with their live members.
    pub fn get(&self, id: ElementId, attribute: &str) -> ModelResult<Value> {
        let elements = self.inner.elements.read();
        let data = live(&elements, id)?;
        let spec = attribute_spec(data.kind, attribute)?;
        Ok(match spec.ty {
            AttributeType::Many => Value::Many(
                data.collections
                    .get(spec.name)
                    .map(|members| {
                        members
                            .iter()
                            .copied()
                            .filter(|member| live(&elements, *member).is_ok())
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
            _ => data.scalar(spec.name),
        })
    }

    /// Read a text attribute.
    pub fn text(&self, id: ElementId, attribute: &str) -> ModelResult<Option<String>> {
        Ok(self.get(id, attribute)?.as_text().map(str::to_string))
    }

    /// Read a flag attribute.
    pub fn flag(&self, id: ElementId, attribute: &str) -> ModelResult<bool> {
        Ok(self.get(id, attribute)?.as_flag())
    }

    /// Read a reference attribute. Dangling references read as `None`.
    pub fn reference(&self, id: ElementId, attribute: &str) -> ModelResult<Option<ElementId>> {
        Ok(self
            .get(id, attribute)?
            .as_element()
            .filter(|target| self.contains(*target)))
    }

    /// Read the members of an ordered collection.
    pub fn members(&self, id: ElementId, attribute: &str) -> ModelResult<Vec<ElementId>> {
        let kind = self.kind(id)?;
        collection_spec(kind, attribute)?;
        match self.get(id, attribute)? {
            Value::Many(members) => Ok(members),
            _ => Ok(Vec::new()),
        }
    }

    /// Position of `member` within a collection.
    pub fn index_of(
        &self,
        owner: ElementId,
        attribute: &str,
        member: ElementId,
    ) -> ModelResult<Option<usize>> {
        Ok(self
            .members(owner, attribute)?
            .iter()
            .position(|candidate| *candidate == member))
    }

    /// Follow an attribute leniently: the members of a collection, the target
    /// of a reference, or nothing for anything else, including unknown
    /// elements and attributes.
    pub fn navigate(&self, id: ElementId, attribute: &str) -> Vec<ElementId> {
        let Ok(kind) = self.kind(id) else {
            return Vec::new();
        };
        match kind.attribute(attribute).map(|spec| spec.ty) {
            Some(AttributeType::Many) => self.members(id, attribute).unwrap_or_default(),
            Some(AttributeType::One) => self
                .reference(id, attribute)
                .ok()
                .flatten()
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The element and everything it owns, parents before children.
    pub fn subtree(&self, id: ElementId) -> Vec<ElementId> {
        let elements = self.inner.elements.read();
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Ok(data) = live(&elements, current) else {
                continue;
            };
            result.push(current);
            for spec in data.kind.attributes() {
                if let Some(members) = data.collections.get(spec.name) {
                    stack.extend(members.iter().rev().copied());
                }
            }
        }
        result
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Create a new, unowned element of the given kind.
    #[tracing::instrument(skip(self), target = "horizon_modeler_core::model", level = "trace")]
    pub fn create(&self, kind: ElementKind) -> ModelResult<ElementId> {
        self.inner.affinity.check()?;
        let id = self.inner.elements.write().insert(ElementData::new(kind));
        tracing::debug!(target: targets::MODEL, ?id, %kind, "created element");
        self.record(JournalEntry::Created { element: id });
        self.emit(ModelEvent::ElementCreated { element: id, kind });
        Ok(id)
    }

    /// Delete an element and everything it owns.
    ///
    /// The element is removed from its owning collection first. Inside a
    /// transaction the deleted elements are only tombstoned, so a rollback
    /// can bring them back under the same ids.
    #[tracing::instrument(skip(self), target = "horizon_modeler_core::model", level = "trace")]
    pub fn delete(&self, id: ElementId) -> ModelResult<()> {
        self.inner.affinity.check()?;
        if let Some((owner, attribute)) = self.owner(id)? {
            if self.contains(owner) {
                self.remove_member(owner, attribute, id)?;
            }
        }

        let doomed = self.subtree(id);
        for element in doomed.iter().rev() {
            if let Some(kind) = self.set_alive(*element, false) {
                self.record(JournalEntry::Deleted { element: *element });
                self.emit(ModelEvent::ElementDeleted {
                    element: *element,
                    kind,
                });
            }
        }
        tracing::debug!(target: targets::MODEL, ?id, count = doomed.len(), "deleted element");

        if !self.in_transaction() {
            self.purge(&doomed);
        }
        Ok(())
    }

    /// Set a text, flag, or reference attribute.
    ///
    /// Returns `false` (and emits nothing) if the value is unchanged.
    #[tracing::instrument(skip(self, value), target = "horizon_modeler_core::model", level = "trace")]
    pub fn set(&self, id: ElementId, attribute: &str, value: impl Into<Value>) -> ModelResult<bool> {
        self.inner.affinity.check()?;
        let value = value.into();
        let (name, old) = {
            let mut elements = self.inner.elements.write();
            if let Value::Ref(target) = &value {
                live(&elements, *target)?;
            }
            let data = live_mut(&mut elements, id)?;
            let spec = attribute_spec(data.kind, attribute)?;
            if !spec.accepts(&value) {
                return Err(ModelError::TypeMismatch {
                    kind: data.kind,
                    attribute: spec.name,
                    found: describe(&value),
                });
            }
            let old = data.scalar(spec.name);
            if old == value {
                return Ok(false);
            }
            data.values.insert(spec.name, value.clone());
            (spec.name, old)
        };

        self.record(JournalEntry::Updated {
            element: id,
            attribute: name,
            old: old.clone(),
        });
        self.emit(ModelEvent::AttributeUpdated {
            element: id,
            attribute: name,
            old,
            new: value,
        });
        Ok(true)
    }

    /// Reset an attribute to its schema default.
    pub fn reset(&self, id: ElementId, attribute: &str) -> ModelResult<bool> {
        let spec = attribute_spec(self.kind(id)?, attribute)?;
        self.set(id, attribute, spec.default_value())
    }

    /// Append `member` to an ordered collection of `owner`.
    ///
    /// A member owned by another collection is moved. Appending a member
    /// that is already in the collection does nothing. The member's kind
    /// must be one the collection accepts.
    #[tracing::instrument(skip(self), target = "horizon_modeler_core::model", level = "trace")]
    pub fn append(&self, owner: ElementId, attribute: &str, member: ElementId) -> ModelResult<()> {
        self.inner.affinity.check()?;
        let (name, previous_owner) = {
            let elements = self.inner.elements.read();
            let owner_data = live(&elements, owner)?;
            let spec = collection_spec(owner_data.kind, attribute)?;
            let member_data = live(&elements, member)?;
            // Member kinds never own their owners, so this also rules out cycles.
            if !spec.accepts_member(member_data.kind) {
                return Err(ModelError::TypeMismatch {
                    kind: owner_data.kind,
                    attribute: spec.name,
                    found: member_data.kind.name(),
                });
            }
            let already = owner_data
                .collections
                .get(spec.name)
                .is_some_and(|members| members.contains(&member));
            if already {
                return Ok(());
            }
            (spec.name, member_data.owner)
        };

        if let Some((previous, previous_attribute)) = previous_owner {
            if self.contains(previous) {
                self.remove_member(previous, previous_attribute, member)?;
            }
        }

        let index = self.insert_member(owner, name, member, None);
        self.record(JournalEntry::Added {
            element: owner,
            attribute: name,
            member,
        });
        self.emit(ModelEvent::AssociationAdded {
            element: owner,
            attribute: name,
            member,
            index,
        });
        Ok(())
    }

    /// Remove `member` from an ordered collection without deleting it.
    #[tracing::instrument(skip(self), target = "horizon_modeler_core::model", level = "trace")]
    pub fn remove_member(
        &self,
        owner: ElementId,
        attribute: &str,
        member: ElementId,
    ) -> ModelResult<()> {
        self.inner.affinity.check()?;
        let name = collection_spec(self.kind(owner)?, attribute)?.name;
        let index = self
            .take_member(owner, name, member)
            .ok_or(ModelError::NotAMember {
                owner,
                attribute: name,
                member,
            })?;
        self.record(JournalEntry::Removed {
            element: owner,
            attribute: name,
            member,
            index,
        });
        self.emit(ModelEvent::AssociationRemoved {
            element: owner,
            attribute: name,
            member,
            index,
        });
        Ok(())
    }

    /// Exchange the positions of two members of a collection.
    #[tracing::instrument(skip(self), target = "horizon_modeler_core::model", level = "trace")]
    pub fn swap(
        &self,
        owner: ElementId,
        attribute: &str,
        a: ElementId,
        b: ElementId,
    ) -> ModelResult<()> {
        self.inner.affinity.check()?;
        let (name, previous) = {
            let mut elements = self.inner.elements.write();
            let data = live_mut(&mut elements, owner)?;
            let name = collection_spec(data.kind, attribute)?.name;
            let members = data.collections.entry(name).or_default();
            let position = |member: ElementId| {
                members
                    .iter()
                    .position(|candidate| *candidate == member)
                    .ok_or(ModelError::NotAMember {
                        owner,
                        attribute: name,
                        member,
                    })
            };
            let index_a = position(a)?;
            let index_b = position(b)?;
            if index_a == index_b {
                return Ok(());
            }
            let previous = members.clone();
            members.swap(index_a, index_b);
            (name, previous)
        };

        self.record(JournalEntry::Reordered {
            element: owner,
            attribute: name,
            previous,
        });
        self.emit(ModelEvent::AssociationReordered {
            element: owner,
            attribute: name,
        });
        Ok(())
    }

    /// Stable-sort a collection by a key derived from each member.
    ///
    /// The key function runs without any model lock held. Nothing is emitted
    /// if the order does not change.
    #[tracing::instrument(skip(self, key), target = "horizon_modeler_core::model", level = "trace")]
    pub fn order<K, F>(&self, owner: ElementId, attribute: &str, mut key: F) -> ModelResult<()>
    where
        K: Ord,
        F: FnMut(ElementId) -> K,
    {
        self.inner.affinity.check()?;
        let (name, previous) = {
            let elements = self.inner.elements.read();
            let data = live(&elements, owner)?;
            let name = collection_spec(data.kind, attribute)?.name;
            (name, data.collections.get(name).cloned().unwrap_or_default())
        };

        let mut sorted = previous.clone();
        sorted.sort_by_key(|member| key(*member));
        if sorted == previous {
            return Ok(());
        }

        self.replace_members(owner, name, sorted);
        self.record(JournalEntry::Reordered {
            element: owner,
            attribute: name,
            previous,
        });
        self.emit(ModelEvent::AssociationReordered {
            element: owner,
            attribute: name,
        });
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Internals shared with the transaction journal
    // -------------------------------------------------------------------------

    fn record(&self, entry: JournalEntry) {
        self.inner.transaction.lock().record(entry);
    }

    fn emit(&self, event: ModelEvent) {
        tracing::trace!(target: targets::MODEL, ?event, "model event");
        self.inner.events.emit(event);
    }

    fn insert_member(
        &self,
        owner: ElementId,
        attribute: &'static str,
        member: ElementId,
        index: Option<usize>,
    ) -> usize {
        let mut elements = self.inner.elements.write();
        let position = match elements.get_mut(owner) {
            Some(data) => {
                let members = data.collections.entry(attribute).or_default();
                let position = index.unwrap_or(members.len()).min(members.len());
                members.insert(position, member);
                position
            }
            None => return 0,
        };
        if let Some(data) = elements.get_mut(member) {
            data.owner = Some((owner, attribute));
        }
        position
    }

    fn take_member(
        &self,
        owner: ElementId,
        attribute: &'static str,
        member: ElementId,
    ) -> Option<usize> {
        let mut elements = self.inner.elements.write();
        let members = elements.get_mut(owner)?.collections.get_mut(attribute)?;
        let index = members.iter().position(|candidate| *candidate == member)?;
        members.remove(index);
        if let Some(data) = elements.get_mut(member) {
            if data.owner == Some((owner, attribute)) {
                data.owner = None;
            }
        }
        Some(index)
    }

    fn replace_members(&self, owner: ElementId, attribute: &'static str, members: Vec<ElementId>) {
        if let Some(data) = self.inner.elements.write().get_mut(owner) {
            data.collections.insert(attribute, members);
        }
    }

    fn set_alive(&self, id: ElementId, alive: bool) -> Option<ElementKind> {
        let mut elements = self.inner.elements.write();
        let data = elements.get_mut(id)?;
        if data.alive == alive {
            return None;
        }
        data.alive = alive;
        Some(data.kind)
    }

    /// Drop tombstoned elements from storage.
    pub(crate) fn purge(&self, ids: &[ElementId]) {
        let mut elements = self.inner.elements.write();
        for id in ids {
            if elements.get(*id).is_some_and(|data| !data.alive) {
                elements.remove(*id);
            }
        }
    }

    /// Undo one journaled mutation, emitting the matching event.
    pub(crate) fn revert(&self, entry: JournalEntry) {
        match entry {
            JournalEntry::Created { element } => {
                let removed = self.inner.elements.write().remove(element);
                if let Some(data) = removed {
                    self.emit(ModelEvent::ElementDeleted {
                        element,
                        kind: data.kind,
                    });
                }
            }
            JournalEntry::Deleted { element } => {
                if let Some(kind) = self.set_alive(element, true) {
                    self.emit(ModelEvent::ElementCreated { element, kind });
                }
            }
            JournalEntry::Updated {
                element,
                attribute,
                old,
            } => {
                let current = {
                    let mut elements = self.inner.elements.write();
                    let Some(data) = elements.get_mut(element) else {
                        return;
                    };
                    let current = data.scalar(attribute);
                    data.values.insert(attribute, old.clone());
                    current
                };
                self.emit(ModelEvent::AttributeUpdated {
                    element,
                    attribute,
                    old: current,
                    new: old,
                });
            }
            JournalEntry::Added {
                element,
                attribute,
                member,
            } => {
                if let Some(index) = self.take_member(element, attribute, member) {
                    self.emit(ModelEvent::AssociationRemoved {
                        element,
                        attribute,
                        member,
                        index,
                    });
                }
            }
            JournalEntry::Removed {
                element,
                attribute,
                member,
                index,
            } => {
                let index = self.insert_member(element, attribute, member, Some(index));
                self.emit(ModelEvent::AssociationAdded {
                    element,
                    attribute,
                    member,
                    index,
                });
            }
            JournalEntry::Reordered {
                element,
                attribute,
                previous,
            } => {
                self.replace_members(element, attribute, previous);
                self.emit(ModelEvent::AssociationReordered { element, attribute });
            }
        }
    }
}

static_assertions::assert_impl_all!(Model: Send, Sync, Clone);
