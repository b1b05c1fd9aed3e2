//! In-memory database and snapshot source
//!
//! `MemoryDatabase` plays both collaborator roles over an in-memory object
//! store: it is a `Database` (dialect profile plus a mutable quoting
//! strategy) and a `SnapshotSource` (schema-filtered capture of its own
//! objects). It backs the CLI's snapshot-file replay and every test that
//! needs a database without a connection:
//!
//! ```rust,ignore
//! let db = MemoryDatabase::new(DialectProfile::postgres())
//!     .with_object(DatabaseObject::table(public.clone(), "users"));
//!
//! let snapshot = db
//!     .create_snapshot(&[public], &db, &SnapshotOptions::new())
//!     .await?;
//! ```
//!
//! Capture honors the quoting strategy in force on the passed database:
//! under `QuoteAll`, identifiers keep their literal casing; under any other
//! strategy they are folded to the dialect's unquoted-identifier case, the
//! way an engine's own metadata views would render them. Error injection
//! (`fail_next_capture`) simulates metadata-access failures.

use std::sync::{Mutex, MutexGuard};

use dbdelta_core::{
    CatalogAndSchema, Database, DatabaseObject, DialectProfile, ObjectQuotingStrategy,
};

use crate::snapshot::Snapshot;
use crate::source::{SnapshotError, SnapshotOptions, SnapshotSource};

/// Lock a mutex, recovering the data from a poisoned lock
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Fixture-backed database with no connection behind it
pub struct MemoryDatabase {
    dialect: DialectProfile,
    quoting: Mutex<ObjectQuotingStrategy>,
    objects: Mutex<Vec<DatabaseObject>>,
    fail_capture: Mutex<Option<SnapshotError>>,
}

impl MemoryDatabase {
    /// Create an empty database with the given dialect
    pub fn new(dialect: DialectProfile) -> Self {
        Self {
            dialect,
            quoting: Mutex::new(ObjectQuotingStrategy::default()),
            objects: Mutex::new(Vec::new()),
            fail_capture: Mutex::new(None),
        }
    }

    /// Rebuild a database from a previously captured snapshot; used to
    /// replay serialized snapshots through the normal capture path
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            dialect: snapshot.dialect,
            quoting: Mutex::new(ObjectQuotingStrategy::default()),
            objects: Mutex::new(snapshot.objects),
            fail_capture: Mutex::new(None),
        }
    }

    /// Add an object to the store
    pub fn add_object(&self, object: DatabaseObject) {
        lock(&self.objects).push(object);
    }

    /// Builder-style `add_object`
    pub fn with_object(self, object: DatabaseObject) -> Self {
        self.add_object(object);
        self
    }

    /// Make the next capture fail with `error`
    pub fn fail_next_capture(&self, error: SnapshotError) {
        *lock(&self.fail_capture) = Some(error);
    }

    /// Number of stored objects
    pub fn object_count(&self) -> usize {
        lock(&self.objects).len()
    }
}

/// Render an object the way a non-quoting capture would: every identifier
/// folded to the dialect's unquoted case
fn fold_for_capture(object: &DatabaseObject, dialect: &DialectProfile) -> DatabaseObject {
    let mut folded = object.clone();
    folded.name = dialect.correct_case(&folded.name);
    if let Some(container) = folded.container.take() {
        folded.container = Some(dialect.correct_case(&container));
    }
    if let Some(schema) = folded.schema.take() {
        folded.schema = Some(CatalogAndSchema {
            catalog: schema.catalog.map(|name| dialect.correct_case(&name)),
            schema: schema.schema.map(|name| dialect.correct_case(&name)),
        });
    }
    folded
}

impl Database for MemoryDatabase {
    fn dialect(&self) -> &DialectProfile {
        &self.dialect
    }

    fn object_quoting_strategy(&self) -> ObjectQuotingStrategy {
        *lock(&self.quoting)
    }

    fn set_object_quoting_strategy(&self, strategy: ObjectQuotingStrategy) {
        *lock(&self.quoting) = strategy;
    }
}

#[async_trait::async_trait]
impl SnapshotSource for MemoryDatabase {
    async fn create_snapshot(
        &self,
        schemas: &[CatalogAndSchema],
        database: &dyn Database,
        options: &SnapshotOptions,
    ) -> Result<Snapshot, SnapshotError> {
        if let Some(error) = lock(&self.fail_capture).take() {
            return Err(error);
        }

        let dialect = database.dialect();

        let mut resolved = Vec::with_capacity(schemas.len());
        for schema in schemas {
            let standardized = schema.standardize(dialect);
            let named_namespace = dialect.supports_schemas || dialect.supports_catalogs;
            if named_namespace && standardized.schema.is_none() && standardized.catalog.is_none() {
                return Err(SnapshotError::InvalidExample(format!(
                    "schema {} cannot be resolved against {}",
                    schema, dialect.name
                )));
            }
            resolved.push(standardized);
        }

        let literal = database.object_quoting_strategy() == ObjectQuotingStrategy::QuoteAll;
        let mut snapshot = Snapshot::new(dialect.clone(), resolved.clone());

        for object in lock(&self.objects).iter() {
            if !options.includes_type(object.object_type()) {
                continue;
            }

            if let Some(schema) = &object.schema {
                let in_scope = resolved
                    .iter()
                    .any(|requested| schema.equals_for(requested, dialect));
                if !in_scope {
                    continue;
                }
            }

            if let Some(filter) = &options.change_filter {
                if !filter.include(object, false, dialect) {
                    continue;
                }
            }

            let captured = if literal {
                object.clone()
            } else {
                fold_for_capture(object, dialect)
            };

            if let Some(observer) = &options.observer {
                observer.object_captured(&captured);
            }
            snapshot.add_object(captured);
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SnapshotObserver;
    use dbdelta_core::{ObjectChangeFilter, ObjectType};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn public() -> CatalogAndSchema {
        CatalogAndSchema::schema_only("public")
    }

    fn app() -> CatalogAndSchema {
        CatalogAndSchema::schema_only("app")
    }

    #[tokio::test]
    async fn capture_filters_by_schema() {
        let db = MemoryDatabase::new(DialectProfile::postgres())
            .with_object(DatabaseObject::table(public(), "users"))
            .with_object(DatabaseObject::table(app(), "audit"));

        let snapshot = db
            .create_snapshot(&[public()], &db, &SnapshotOptions::new())
            .await
            .unwrap();

        assert_eq!(snapshot.objects.len(), 1);
        assert_eq!(snapshot.objects[0].name, "users");
    }

    #[tokio::test]
    async fn capture_respects_type_restriction() {
        let db = MemoryDatabase::new(DialectProfile::postgres())
            .with_object(DatabaseObject::table(public(), "users"))
            .with_object(DatabaseObject::column(public(), "users", "id", "bigint"));

        let options = SnapshotOptions::new().with_types([ObjectType::Table]);
        let snapshot = db.create_snapshot(&[public()], &db, &options).await.unwrap();

        assert_eq!(snapshot.objects.len(), 1);
        assert_eq!(snapshot.objects[0].object_type(), ObjectType::Table);
    }

    #[tokio::test]
    async fn capture_folds_case_unless_quote_all() {
        let db = MemoryDatabase::new(DialectProfile::snowflake())
            .with_object(DatabaseObject::table(CatalogAndSchema::schema_only("Public"), "Users"));
        let schemas = [CatalogAndSchema::schema_only("PUBLIC")];

        let folded = db
            .create_snapshot(&schemas, &db, &SnapshotOptions::new())
            .await
            .unwrap();
        assert_eq!(folded.objects[0].name, "USERS");

        db.set_object_quoting_strategy(ObjectQuotingStrategy::QuoteAll);
        let literal = db
            .create_snapshot(&schemas, &db, &SnapshotOptions::new())
            .await
            .unwrap();
        assert_eq!(literal.objects[0].name, "Users");
    }

    #[tokio::test]
    async fn capture_invokes_observer() {
        struct Counter(AtomicUsize);
        impl SnapshotObserver for Counter {
            fn object_captured(&self, _object: &DatabaseObject) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let db = MemoryDatabase::new(DialectProfile::postgres())
            .with_object(DatabaseObject::table(public(), "users"))
            .with_object(DatabaseObject::table(public(), "orders"));

        let options = SnapshotOptions::new().with_observer(counter.clone());
        db.create_snapshot(&[public()], &db, &options).await.unwrap();

        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn capture_applies_change_filter() {
        struct NoTables;
        impl ObjectChangeFilter for NoTables {
            fn include(
                &self,
                object: &DatabaseObject,
                _unexpected: bool,
                _dialect: &DialectProfile,
            ) -> bool {
                object.object_type() != ObjectType::Table
            }
        }

        let db = MemoryDatabase::new(DialectProfile::postgres())
            .with_object(DatabaseObject::table(public(), "users"))
            .with_object(DatabaseObject::sequence(public(), "users_id_seq"));

        let options = SnapshotOptions::new().with_change_filter(Arc::new(NoTables));
        let snapshot = db.create_snapshot(&[public()], &db, &options).await.unwrap();

        assert_eq!(snapshot.objects.len(), 1);
        assert_eq!(snapshot.objects[0].object_type(), ObjectType::Sequence);
    }

    #[tokio::test]
    async fn injected_failure_surfaces_unmodified() {
        let db = MemoryDatabase::new(DialectProfile::postgres());
        db.fail_next_capture(SnapshotError::DatabaseAccess("connection reset".to_string()));

        let result = db.create_snapshot(&[public()], &db, &SnapshotOptions::new()).await;
        assert!(matches!(result, Err(SnapshotError::DatabaseAccess(_))));

        // the injected error is consumed; the next capture succeeds
        assert!(db
            .create_snapshot(&[public()], &db, &SnapshotOptions::new())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn unresolvable_schema_is_an_invalid_example() {
        let db = MemoryDatabase::new(DialectProfile::mysql());

        let result = db
            .create_snapshot(&[CatalogAndSchema::default()], &db, &SnapshotOptions::new())
            .await;
        assert!(matches!(result, Err(SnapshotError::InvalidExample(_))));
    }

    #[tokio::test]
    async fn snapshot_round_trip_through_from_snapshot() {
        let db = MemoryDatabase::new(DialectProfile::postgres())
            .with_object(DatabaseObject::table(public(), "users"));
        db.set_object_quoting_strategy(ObjectQuotingStrategy::QuoteAll);

        let snapshot = db
            .create_snapshot(&[public()], &db, &SnapshotOptions::new())
            .await
            .unwrap();

        let replayed = MemoryDatabase::from_snapshot(snapshot);
        assert_eq!(replayed.object_count(), 1);
        assert_eq!(replayed.dialect().name, "postgres");
    }
}
