//! Snapshot capture contract

use std::collections::BTreeSet;
use std::sync::Arc;

use dbdelta_core::{CatalogAndSchema, Database, DatabaseObject, ObjectChangeFilter, ObjectType};

use crate::snapshot::Snapshot;

/// Errors that can occur while capturing a snapshot
#[derive(Debug, Clone, thiserror::Error)]
pub enum SnapshotError {
    /// The underlying metadata query failed (connectivity, permissions,
    /// driver error). Fatal to the capture; never retried by this layer.
    #[error("database access error: {0}")]
    DatabaseAccess(String),

    /// A requested schema cannot be resolved against the database's
    /// capabilities
    #[error("invalid schema example: {0}")]
    InvalidExample(String),
}

/// Callback invoked once per captured object
pub trait SnapshotObserver: Send + Sync {
    fn object_captured(&self, object: &DatabaseObject);
}

/// Options bundled into a capture request
#[derive(Clone, Default)]
pub struct SnapshotOptions {
    /// Restrict capture to these object kinds; empty means all kinds
    pub types: BTreeSet<ObjectType>,

    /// Admission filter applied to every candidate object
    pub change_filter: Option<Arc<dyn ObjectChangeFilter>>,

    /// Observer notified per captured object
    pub observer: Option<Arc<dyn SnapshotObserver>>,
}

impl SnapshotOptions {
    /// Options capturing every object kind with no filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict capture to the given kinds
    pub fn with_types(mut self, types: impl IntoIterator<Item = ObjectType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    /// Install an admission filter
    pub fn with_change_filter(mut self, filter: Arc<dyn ObjectChangeFilter>) -> Self {
        self.change_filter = Some(filter);
        self
    }

    /// Install a capture observer
    pub fn with_observer(mut self, observer: Arc<dyn SnapshotObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Whether `object_type` participates in this capture
    pub fn includes_type(&self, object_type: ObjectType) -> bool {
        self.types.is_empty() || self.types.contains(&object_type)
    }
}

impl std::fmt::Debug for SnapshotOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotOptions")
            .field("types", &self.types)
            .field("change_filter", &self.change_filter.is_some())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Produces snapshots of a database's structural state.
///
/// Capture may block on I/O; cancellation propagates by dropping the
/// returned future. Implementations must honor the quoting strategy in
/// force on `database` at call time: under `QuoteAll` identifiers are
/// captured with literal casing.
#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn create_snapshot(
        &self,
        schemas: &[CatalogAndSchema],
        database: &dyn Database,
        options: &SnapshotOptions,
    ) -> Result<Snapshot, SnapshotError>;
}
