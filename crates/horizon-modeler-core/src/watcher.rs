//! Path-based change subscriptions rooted at one element.
//!
//! A [`Watcher`] observes changes to attributes reachable from a root element
//! through dot-separated paths such as `ownedAttribute.isStatic` ("for every
//! element in `ownedAttribute`, notify on changes to its `isStatic`").
//!
//! Registrations are collected on a [`WatcherBuilder`] and installed together
//! by [`WatcherBuilder::subscribe`]. All of them are released together by
//! [`Watcher::unwatch_all`], or when the watcher is dropped.
//!
//! # Matching
//!
//! An event on element `E` for attribute `a` matches the path `s0.s1...sn`
//! when, for some `k`, `a == sk` and `E` is reachable from the root through
//! `s0...s(k-1)`. Every prefix of a path is therefore observed too: a path
//! `ownedAttribute.name` also reports members being added to, removed from,
//! or reordered within `ownedAttribute`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use horizon_modeler_core::{ElementKind, Model, Watcher};
//!
//! let model = Model::new();
//! let class = model.create(ElementKind::Class)?;
//! let attr = model.create(ElementKind::Property)?;
//! model.append(class, "ownedAttribute", attr)?;
//!
//! let hits = Arc::new(AtomicUsize::new(0));
//! let counter = hits.clone();
//! let mut watcher = Watcher::builder(&model, class)
//!     .watch("ownedAttribute.isStatic", move |event| {
//!         assert_eq!(event.child(), Some(attr));
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     })
//!     .subscribe()?;
//!
//! model.set(attr, "isStatic", true)?;
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//!
//! watcher.unwatch_all();
//! model.set(attr, "isStatic", false)?;
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::element::ElementId;
use crate::error::WatchError;
use crate::event::ModelEvent;
use crate::logging::targets;
use crate::model::{Model, WeakModel};
use crate::signal::ConnectionId;

/// Callback invoked for a matching change.
pub type WatchHandler = Arc<dyn Fn(&WatchEvent) + Send + Sync>;

/// A parsed, dot-separated attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<String>,
}

impl PathPattern {
    /// Parse a dotted path. Empty paths and empty segments are rejected.
    pub fn parse(path: &str) -> Result<Self, WatchError> {
        if path.trim().is_empty() {
            return Err(WatchError::invalid_path(path, "path is empty"));
        }
        let segments: Vec<String> = path.split('.').map(|s| s.trim().to_string()).collect();
        if segments.iter().any(String::is_empty) {
            return Err(WatchError::invalid_path(path, "path has an empty segment"));
        }
        Ok(Self { segments })
    }

    /// The attribute names along the path.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve `event` against this path, returning the trail of elements
    /// from the root's child down to the changed element.
    fn resolve(&self, model: &Model, root: ElementId, event: &ModelEvent) -> Option<Vec<ElementId>> {
        let attribute = event.attribute()?;
        let target = event.element();
        for (depth, segment) in self.segments.iter().enumerate() {
            if segment != attribute {
                continue;
            }
            if let Some(trail) = find_trail(model, root, &self.segments[..depth], target) {
                return Some(trail);
            }
        }
        None
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Walk `prefix` from `root` looking for `target`.
fn find_trail(
    model: &Model,
    root: ElementId,
    prefix: &[String],
    target: ElementId,
) -> Option<Vec<ElementId>> {
    let mut frontier: Vec<(ElementId, Vec<ElementId>)> = vec![(root, Vec::new())];
    for segment in prefix {
        frontier = frontier
            .into_iter()
            .flat_map(|(element, trail)| {
                model.navigate(element, segment).into_iter().map(move |next| {
                    let mut trail = trail.clone();
                    trail.push(next);
                    (next, trail)
                })
            })
            .collect();
        if frontier.is_empty() {
            return None;
        }
    }
    frontier
        .into_iter()
        .find(|(element, _)| *element == target)
        .map(|(_, trail)| trail)
}

/// A change delivered to a watch handler.
#[derive(Debug, Clone)]
pub struct WatchEvent {
    root: ElementId,
    path: Arc<PathPattern>,
    trail: Vec<ElementId>,
    event: ModelEvent,
}

impl WatchEvent {
    /// The element the watcher is rooted at.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// The registered path that matched.
    pub fn path(&self) -> &PathPattern {
        &self.path
    }

    /// The element whose state changed.
    pub fn element(&self) -> ElementId {
        self.event.element()
    }

    /// The attribute that changed.
    pub fn attribute(&self) -> Option<&'static str> {
        self.event.attribute()
    }

    /// The underlying model event.
    pub fn event(&self) -> &ModelEvent {
        &self.event
    }

    /// Elements traversed from the root's child down to the changed element.
    /// Empty when the change happened on the root itself.
    pub fn trail(&self) -> &[ElementId] {
        &self.trail
    }

    /// The direct child of the root under which the change happened.
    pub fn child(&self) -> Option<ElementId> {
        self.trail.first().copied()
    }

    /// Returns `true` if the change is to the root's own collection
    /// membership or order.
    pub fn is_structural(&self) -> bool {
        self.trail.is_empty() && self.event.is_structural()
    }
}

struct Registration {
    path: Arc<PathPattern>,
    handler: WatchHandler,
}

struct WatchState {
    root: ElementId,
    registrations: Vec<Registration>,
    released: AtomicBool,
}

impl WatchState {
    fn dispatch(&self, model: &Model, event: &ModelEvent) {
        // One handler shared by several paths runs once per event.
        let mut delivered: Vec<*const ()> = Vec::new();
        for registration in &self.registrations {
            if self.released.load(Ordering::SeqCst) {
                return;
            }
            let key = Arc::as_ptr(&registration.handler) as *const ();
            if delivered.contains(&key) {
                continue;
            }
            let Some(trail) = registration.path.resolve(model, self.root, event) else {
                continue;
            };
            delivered.push(key);
            tracing::trace!(
                target: targets::WATCHER,
                root = ?self.root,
                path = %registration.path,
                ?event,
                "watch matched"
            );
            (registration.handler)(&WatchEvent {
                root: self.root,
                path: registration.path.clone(),
                trail,
                event: event.clone(),
            });
        }
    }
}

/// Collects `(path, handler)` registrations for a [`Watcher`].
pub struct WatcherBuilder {
    model: Model,
    root: ElementId,
    registrations: Vec<Registration>,
    error: Option<WatchError>,
}

impl WatcherBuilder {
    /// Register a handler for one path.
    pub fn watch<F>(self, path: &str, handler: F) -> Self
    where
        F: Fn(&WatchEvent) + Send + Sync + 'static,
    {
        self.watch_shared(path, Arc::new(handler))
    }

    /// Register an already shared handler for one path.
    pub fn watch_shared(mut self, path: &str, handler: WatchHandler) -> Self {
        match PathPattern::parse(path) {
            Ok(pattern) => self.registrations.push(Registration {
                path: Arc::new(pattern),
                handler,
            }),
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
        self
    }

    /// Register one handler for several paths.
    pub fn watch_paths<'a>(
        mut self,
        paths: impl IntoIterator<Item = &'a str>,
        handler: WatchHandler,
    ) -> Self {
        for path in paths {
            self = self.watch_shared(path, handler.clone());
        }
        self
    }

    /// Install every registration as one model subscription.
    ///
    /// Fails without installing anything if a path was invalid or the root
    /// element does not exist.
    pub fn subscribe(self) -> Result<Watcher, WatchError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.model.kind(self.root)?;

        let state = Arc::new(WatchState {
            root: self.root,
            registrations: self.registrations,
            released: AtomicBool::new(false),
        });

        let weak = self.model.downgrade();
        let dispatch_state = state.clone();
        let connection = self.model.events().connect(move |event| {
            if dispatch_state.released.load(Ordering::SeqCst) {
                return;
            }
            if let Some(model) = weak.upgrade() {
                dispatch_state.dispatch(&model, event);
            }
        });

        tracing::debug!(
            target: targets::WATCHER,
            root = ?state.root,
            paths = state.registrations.len(),
            "watcher subscribed"
        );

        Ok(Watcher {
            model: self.model.downgrade(),
            connection,
            state,
        })
    }
}

/// An active set of path subscriptions rooted at one element.
pub struct Watcher {
    model: WeakModel,
    connection: ConnectionId,
    state: Arc<WatchState>,
}

impl Watcher {
    /// Start collecting registrations for `root`.
    pub fn builder(model: &Model, root: ElementId) -> WatcherBuilder {
        WatcherBuilder {
            model: model.clone(),
            root,
            registrations: Vec::new(),
            error: None,
        }
    }

    /// The element this watcher is rooted at.
    pub fn root(&self) -> ElementId {
        self.state.root
    }

    /// Number of registered paths.
    pub fn path_count(&self) -> usize {
        self.state.registrations.len()
    }

    /// Returns `true` until the watcher has been released.
    pub fn is_active(&self) -> bool {
        !self.state.released.load(Ordering::SeqCst)
    }

    /// Release every registration at once.
    ///
    /// No handler runs after this returns, including handlers still pending
    /// in the event being dispatched. Returns `false` if the watcher was
    /// already released.
    pub fn unwatch_all(&mut self) -> bool {
        if self.state.released.swap(true, Ordering::SeqCst) {
            tracing::trace!(target: targets::WATCHER, root = ?self.state.root, "watcher already released");
            return false;
        }
        if let Some(model) = self.model.upgrade() {
            model.events().disconnect(self.connection);
        }
        tracing::debug!(target: targets::WATCHER, root = ?self.state.root, "watcher released");
        true
    }
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("root", &self.state.root)
            .field("paths", &self.path_count())
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        self.unwatch_all();
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::element::ElementKind;

    fn operation_fixture(model: &Model) -> (ElementId, ElementId, ElementId) {
        let class = model.create(ElementKind::Class).unwrap();
        let op = model.create(ElementKind::Operation).unwrap();
        let param = model.create(ElementKind::Parameter).unwrap();
        model.append(class, "ownedOperation", op).unwrap();
        model.append(op, "ownedParameter", param).unwrap();
        (class, op, param)
    }

    #[test]
    fn test_path_validation() {
        assert!(PathPattern::parse("ownedAttribute.name").is_ok());
        assert!(matches!(
            PathPattern::parse(""),
            Err(WatchError::InvalidPath { .. })
        ));
        assert!(matches!(
            PathPattern::parse("ownedAttribute..name"),
            Err(WatchError::InvalidPath { .. })
        ));

        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();
        let result = Watcher::builder(&model, class)
            .watch("ownedAttribute.", |_| {})
            .subscribe();
        assert!(result.is_err());
        assert_eq!(model.events().connection_count(), 0);
    }

    #[test]
    fn test_nested_path_trail() {
        let model = Model::new();
        let (class, op, param) = operation_fixture(&model);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let _watcher = Watcher::builder(&model, class)
            .watch("ownedOperation.ownedParameter.typeValue", move |event| {
                sink.lock().push(event.trail().to_vec());
            })
            .subscribe()
            .unwrap();

        model.set(param, "typeValue", "int").unwrap();
        // Not on the path.
        model.set(param, "lowerValue", "1").unwrap();

        assert_eq!(*seen.lock(), vec![vec![op, param]]);
    }

    #[test]
    fn test_unrelated_elements_ignored() {
        let model = Model::new();
        let (class, _, _) = operation_fixture(&model);
        let (_, other_op, _) = operation_fixture(&model);
        let hits = Arc::new(Mutex::new(0));

        let counter = hits.clone();
        let _watcher = Watcher::builder(&model, class)
            .watch("ownedOperation.name", move |_| *counter.lock() += 1)
            .subscribe()
            .unwrap();

        model.set(other_op, "name", "elsewhere").unwrap();
        assert_eq!(*hits.lock(), 0);
    }

    #[test]
    fn test_registration_order_and_prefix_match() {
        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = order.clone();
        let second = order.clone();
        let _watcher = Watcher::builder(&model, class)
            .watch("ownedAttribute.name", move |event| {
                first.lock().push(("name", event.is_structural()))
            })
            .watch("ownedAttribute.isStatic", move |event| {
                second.lock().push(("isStatic", event.is_structural()))
            })
            .subscribe()
            .unwrap();

        let attr = model.create(ElementKind::Property).unwrap();
        model.append(class, "ownedAttribute", attr).unwrap();

        assert_eq!(*order.lock(), vec![("name", true), ("isStatic", true)]);
    }

    #[test]
    fn test_shared_handler_runs_once() {
        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();
        let hits = Arc::new(Mutex::new(0));

        let counter = hits.clone();
        let handler: WatchHandler = Arc::new(move |_| *counter.lock() += 1);
        let _watcher = Watcher::builder(&model, class)
            .watch_paths(["ownedAttribute.name", "ownedAttribute.isStatic"], handler)
            .subscribe()
            .unwrap();

        let attr = model.create(ElementKind::Property).unwrap();
        model.append(class, "ownedAttribute", attr).unwrap();
        assert_eq!(*hits.lock(), 1);
    }

    #[test]
    fn test_unwatch_all_is_idempotent() {
        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();
        let mut watcher = Watcher::builder(&model, class)
            .watch("name", |_| {})
            .subscribe()
            .unwrap();

        assert_eq!(model.events().connection_count(), 1);
        assert!(watcher.unwatch_all());
        assert!(!watcher.unwatch_all());
        assert!(!watcher.is_active());
        assert_eq!(model.events().connection_count(), 0);
    }

    #[test]
    fn test_drop_releases() {
        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();
        {
            let _watcher = Watcher::builder(&model, class)
                .watch("name", |_| {})
                .subscribe()
                .unwrap();
            assert_eq!(model.events().connection_count(), 1);
        }
        assert_eq!(model.events().connection_count(), 0);
    }

    #[test]
    fn test_missing_root() {
        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();
        model.delete(class).unwrap();

        let result = Watcher::builder(&model, class).watch("name", |_| {}).subscribe();
        assert!(matches!(result, Err(WatchError::Model(_))));
    }
}
