//! Logging and debugging facilities for Horizon Modeler.
//!
//! This module provides:
//! - Target names for filtering `tracing` output by subsystem
//! - Debug visualization for element ownership trees
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Horizon Modeler uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_modeler_core::watcher=trace")
//!         .init();
//! }
//! ```
//!
//! # Debug Visualization
//!
//! Use [`ElementTreeDebug`] to print what a model contains:
//!
//! ```
//! use horizon_modeler_core::{ElementKind, Model};
//! use horizon_modeler_core::logging::ElementTreeDebug;
//!
//! let model = Model::new();
//! let class = model.create(ElementKind::Class)?;
//! model.set(class, "name", "Shape")?;
//!
//! let text = ElementTreeDebug::new().format_all(&model);
//! assert!(text.contains("Shape"));
//! # Ok::<(), horizon_modeler_core::ModelError>(())
//! ```

use std::fmt::Write as FmtWrite;

use crate::element::{AttributeType, ElementId};
use crate::error::ModelResult;
use crate::model::Model;

/// Target names for log filtering.
///
/// Every event and span in this crate is emitted under one of these, so a
/// `tracing` directive can select a single subsystem.
pub mod targets {
    /// Crate-wide prefix; matches every target below.
    pub const CORE: &str = "horizon_modeler_core";
    /// Signal emission.
    pub const SIGNAL: &str = "horizon_modeler_core::signal";
    /// Element store mutations and events.
    pub const MODEL: &str = "horizon_modeler_core::model";
    /// Transaction begin, commit, and rollback.
    pub const TRANSACTION: &str = "horizon_modeler_core::transaction";
    /// Change watcher subscription and dispatch.
    pub const WATCHER: &str = "horizon_modeler_core::watcher";
    /// Thread affinity violations.
    pub const THREAD: &str = "horizon_modeler_core::thread_check";
    /// [`PerfSpan`](super::PerfSpan) timing spans.
    pub const PERF: &str = "horizon_modeler_core::perf";
}

/// Style options for element tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for element tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show element IDs.
    pub show_ids: bool,
    /// Whether to show element kinds.
    pub show_kinds: bool,
    /// Whether to show the collection each element is owned through.
    pub show_collections: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_kinds: true,
            show_collections: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_collections: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_kinds: false,
            show_collections: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing element ownership trees.
#[derive(Debug, Clone, Default)]
pub struct ElementTreeDebug {
    options: TreeFormatOptions,
}

impl ElementTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format every unowned element and its subtree.
    pub fn format_all(&self, model: &Model) -> String {
        let roots = model.roots();
        let mut output = String::new();
        let _ = writeln!(output, "Element Tree ({} total elements):", model.len());

        if roots.is_empty() {
            output.push_str("  (empty)\n");
        } else {
            for root in roots {
                // Roots come from a live snapshot; a failure only truncates output.
                let _ = self.format_subtree_into(model, root, None, 0, true, &mut output);
            }
        }
        output
    }

    /// Format a subtree starting from a specific element.
    pub fn format_subtree(&self, model: &Model, root: ElementId) -> ModelResult<String> {
        let mut output = String::new();
        self.format_subtree_into(model, root, None, 0, true, &mut output)?;
        Ok(output)
    }

    fn format_subtree_into(
        &self,
        model: &Model,
        id: ElementId,
        collection: Option<&'static str>,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) -> ModelResult<()> {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        let kind = model.kind(id)?;
        let name = model.text(id, "name")?;

        output.push_str(&self.build_prefix(depth, is_last));
        if self.options.show_collections {
            if let Some(collection) = collection {
                let _ = write!(output, "{collection}: ");
            }
        }
        output.push_str(name.as_deref().filter(|n| !n.is_empty()).unwrap_or("(unnamed)"));
        if self.options.show_ids {
            let _ = write!(output, " [{:?}]", id);
        }
        if self.options.show_kinds {
            let _ = write!(output, " ({kind})");
        }
        output.push('\n');

        let children: Vec<(&'static str, ElementId)> = kind
            .attributes()
            .filter(|spec| spec.ty == AttributeType::Many)
            .flat_map(|spec| {
                model
                    .members(id, spec.name)
                    .unwrap_or_default()
                    .into_iter()
                    .map(move |member| (spec.name, member))
            })
            .collect();

        let child_count = children.len();
        for (i, (attribute, child)) in children.into_iter().enumerate() {
            self.format_subtree_into(
                model,
                child,
                Some(attribute),
                depth + 1,
                i + 1 == child_count,
                output,
            )?;
        }
        Ok(())
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => (
                "\u{2502}",
                "\u{251c}\u{2500}\u{2500}",
                "\u{2514}\u{2500}\u{2500}",
            ),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            prefix.push_str(&" ".repeat(self.options.indent_size));
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use super::*;
    use crate::element::ElementKind;
    use crate::watcher::Watcher;

    /// Records the target of every event it sees.
    #[derive(Clone, Default)]
    struct TargetRecorder(Arc<Mutex<Vec<String>>>);

    impl<S: tracing::Subscriber> Layer<S> for TargetRecorder {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            self.0.lock().push(event.metadata().target().to_string());
        }
    }

    fn sample() -> (Model, ElementId) {
        let model = Model::new();
        let class = model.create(ElementKind::Class).unwrap();
        model.set(class, "name", "Window").unwrap();
        for name in ["width", "height"] {
            let attr = model.create(ElementKind::Property).unwrap();
            model.set(attr, "name", name).unwrap();
            model.append(class, "ownedAttribute", attr).unwrap();
        }
        let op = model.create(ElementKind::Operation).unwrap();
        model.append(class, "ownedOperation", op).unwrap();
        (model, class)
    }

    #[test]
    fn test_format_subtree() {
        let (model, class) = sample();
        let debug = ElementTreeDebug::with_options(TreeFormatOptions::minimal());
        let output = debug.format_subtree(&model, class).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Window");
        assert!(lines[1].ends_with("width"));
        assert!(lines[3].ends_with("(unnamed)"));
        assert!(lines[3].starts_with('\u{2514}'));
    }

    #[test]
    fn test_format_all_lists_roots() {
        let (model, _) = sample();
        let output = ElementTreeDebug::with_options(TreeFormatOptions::detailed()).format_all(&model);

        assert!(output.starts_with("Element Tree (4 total elements):"));
        assert!(output.contains("ownedAttribute: width"));
        assert!(output.contains("(Operation)"));
    }

    #[test]
    fn test_max_depth() {
        let (model, class) = sample();
        let options = TreeFormatOptions {
            max_depth: Some(0),
            ..TreeFormatOptions::minimal()
        };
        let output = ElementTreeDebug::with_options(options)
            .format_subtree(&model, class)
            .unwrap();
        assert_eq!(output, "Window\n");
    }

    #[test]
    fn test_empty_model() {
        let output = ElementTreeDebug::new().format_all(&Model::new());
        assert!(output.contains("(empty)"));
    }

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
        tracing::debug!(target: targets::PERF, "inside perf span");
    }

    #[test]
    fn test_events_use_declared_targets() {
        let recorder = TargetRecorder::default();
        let subscriber = tracing_subscriber::registry().with(recorder.clone());

        tracing::subscriber::with_default(subscriber, || {
            let (model, class) = sample();
            let watcher = Watcher::builder(&model, class)
                .watch("ownedAttribute.name", |_| {})
                .subscribe()
                .unwrap();

            let tx = model.begin();
            let attr = model.members(class, "ownedAttribute").unwrap()[0];
            model.set(attr, "name", "depth").unwrap();
            tx.rollback();
            model.delete(class).unwrap();
            drop(watcher);
        });

        let declared = [
            targets::SIGNAL,
            targets::MODEL,
            targets::TRANSACTION,
            targets::WATCHER,
            targets::THREAD,
            targets::PERF,
        ];
        let seen = recorder.0.lock();
        for target in seen.iter() {
            assert!(declared.contains(&target.as_str()), "undeclared target {target}");
            assert!(target.starts_with(targets::CORE));
        }
        for target in [targets::MODEL, targets::TRANSACTION, targets::WATCHER, targets::SIGNAL] {
            assert!(seen.iter().any(|seen| seen == target), "nothing logged under {target}");
        }
    }
}
