//! Target names for log filtering.
//!
//! Every event this crate emits uses one of these, so a `tracing` directive
//! such as `horizon_modeler::table=trace` selects a single subsystem.
//! Targets of the element store live in
//! [`horizon_modeler_core::logging::targets`].

/// Crate-wide prefix; matches every target below.
pub const EDITOR: &str = "horizon_modeler";
/// Configuration loading.
pub const CONFIG: &str = "horizon_modeler::config";
/// Message catalog loading.
pub const I18N: &str = "horizon_modeler::i18n";
/// Text notation parsing and rendering.
pub const FORMAT: &str = "horizon_modeler::format";
/// Diagram item presentation.
pub const PRESENTATION: &str = "horizon_modeler::presentation";
/// Collection tables and their edits.
pub const TABLE: &str = "horizon_modeler::table";
/// Row synchronization from model changes.
pub const SYNC: &str = "horizon_modeler::table::sync";
/// Property page lifecycle.
pub const PAGES: &str = "horizon_modeler::pages";

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    use horizon_modeler_core::{ElementKind, Model};
    use parking_lot::Mutex;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use crate::EditorConfig;
    use crate::table::{AttributeRows, EditableTable, RowSynchronizer, TableModel};

    #[derive(Clone, Default)]
    struct TargetRecorder(Arc<Mutex<Vec<String>>>);

    impl<S: tracing::Subscriber> Layer<S> for TargetRecorder {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            self.0.lock().push(event.metadata().target().to_string());
        }
    }

    #[test]
    fn test_table_edits_log_under_declared_targets() {
        let recorder = TargetRecorder::default();
        let subscriber = tracing_subscriber::registry().with(recorder.clone());

        tracing::subscriber::with_default(subscriber, || {
            let model = Model::new();
            let class = model.create(ElementKind::Class).unwrap();
            let table = Arc::new(EditableTable::<AttributeRows>::new(&model, class, &EditorConfig::default()).unwrap());
            let _watcher = RowSynchronizer::watch(&table).unwrap();

            table.set_value(0, 0, "+ width: int").unwrap();
            assert!(table.set_value(0, 0, "width: int[2..").is_err());
        });

        let declared = [CONFIG, I18N, FORMAT, PRESENTATION, TABLE, SYNC, PAGES];
        let seen = recorder.0.lock();
        let ours: Vec<_> = seen
            .iter()
            .filter(|target| !target.starts_with(horizon_modeler_core::logging::targets::CORE))
            .collect();
        for target in &ours {
            assert!(declared.contains(&target.as_str()), "undeclared target {target}");
            assert!(target.starts_with(EDITOR));
        }
        assert!(ours.iter().any(|target| *target == TABLE));
        assert!(ours.iter().any(|target| *target == SYNC));
    }
}
