//! Per-run output control
//!
//! A `DiffOutputControl` aggregates everything that governs which objects a
//! diff or change-generation pass reports: the schema-inclusion set, name
//! patterns, the pluggable change filter, the quoting strategy forced
//! during capture, and the three already-handled sets that guarantee
//! at-most-once emission across generation passes.
//!
//! Configuration is immutable after construction: build one through
//! `DiffOutputControl::builder()` per run and discard it afterwards. The
//! already-handled sets are working state and are written through the
//! `mark_already_handled_*` methods while generation runs.

use std::path::PathBuf;
use std::sync::Arc;

use dbdelta_core::{
    CatalogAndSchema, DatabaseObject, DialectProfile, ObjectChangeFilter, ObjectQuotingStrategy,
    PermissiveChangeFilter, SchemaComparison,
};

use crate::collection::ObjectCollection;
use crate::filter::{InvalidPatternError, StandardNameFilter};

/// Generation capabilities enabled for this run only.
///
/// This list is owned by the control and read by the orchestrating caller;
/// registering an extension here never affects other runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorExtension {
    /// Emit captured row data for missing tables as external files under
    /// the given directory
    ExternalDataFiles(PathBuf),
}

/// Aggregated output decisions for one diff or change-generation run
pub struct DiffOutputControl {
    include_schemas: Vec<CatalogAndSchema>,
    include_catalog: bool,
    include_schema: bool,
    include_tablespace: bool,
    include_objects: Option<String>,
    exclude_objects: Option<String>,
    name_filter: Option<Arc<StandardNameFilter>>,
    change_filter: Option<Arc<dyn ObjectChangeFilter>>,
    schema_comparisons: Option<Vec<SchemaComparison>>,
    quoting_strategy: Option<ObjectQuotingStrategy>,
    respect_schema_case: bool,
    catalogs_as_schemas: bool,
    context: Option<String>,
    labels: Vec<String>,
    generator_extensions: Vec<GeneratorExtension>,
    handled_missing: ObjectCollection,
    handled_unexpected: ObjectCollection,
    handled_changed: ObjectCollection,
}

impl DiffOutputControl {
    pub fn builder() -> DiffOutputControlBuilder {
        DiffOutputControlBuilder::default()
    }

    /// Whether `object` should appear in output, judged through the lens of
    /// the database that produced it.
    ///
    /// With no schema-inclusion set configured this is always true.
    /// Schema-less objects are never excluded by schema filtering. Otherwise
    /// the object's schema and every inclusion schema are standardized
    /// against `according_to` and the object is admitted on any match.
    pub fn should_output(&self, object: &DatabaseObject, according_to: &DialectProfile) -> bool {
        if self.include_schemas.is_empty() {
            return true;
        }
        let Some(object_schema) = &object.schema else {
            return true;
        };

        let dialect = if self.respect_schema_case {
            according_to.clone().with_exact_casing()
        } else {
            according_to.clone()
        };

        let object_schema = self.alias_catalog(object_schema);
        self.include_schemas
            .iter()
            .any(|included| object_schema.equals_for(&self.alias_catalog(included), &dialect))
    }

    /// Treat a bare catalog name as a schema name when the run is
    /// configured for drivers that report catalogs as schemas.
    fn alias_catalog(&self, schema: &CatalogAndSchema) -> CatalogAndSchema {
        if self.catalogs_as_schemas && schema.schema.is_none() {
            CatalogAndSchema {
                catalog: None,
                schema: schema.catalog.clone(),
            }
        } else {
            schema.clone()
        }
    }

    /// Record that a missing object has been emitted
    pub fn mark_already_handled_missing(&mut self, object: &DatabaseObject) {
        self.handled_missing.add(object);
    }

    /// Whether a missing object was already emitted this run. Membership is
    /// database-independent; `_according_to` is accepted for signature
    /// parity with `should_output` but never consulted.
    pub fn already_handled_missing(
        &self,
        object: &DatabaseObject,
        _according_to: &DialectProfile,
    ) -> bool {
        self.handled_missing
            .contains(object, self.schema_comparisons.as_deref())
    }

    /// Record that an unexpected object has been emitted
    pub fn mark_already_handled_unexpected(&mut self, object: &DatabaseObject) {
        self.handled_unexpected.add(object);
    }

    /// Whether an unexpected object was already emitted this run
    pub fn already_handled_unexpected(
        &self,
        object: &DatabaseObject,
        _according_to: &DialectProfile,
    ) -> bool {
        self.handled_unexpected
            .contains(object, self.schema_comparisons.as_deref())
    }

    /// Record that a changed object has been emitted
    pub fn mark_already_handled_changed(&mut self, object: &DatabaseObject) {
        self.handled_changed.add(object);
    }

    /// Whether a changed object was already emitted this run
    pub fn already_handled_changed(
        &self,
        object: &DatabaseObject,
        _according_to: &DialectProfile,
    ) -> bool {
        self.handled_changed
            .contains(object, self.schema_comparisons.as_deref())
    }

    /// The admission filter in effect: the explicit filter when one was
    /// supplied, else the compiled name-pattern filter, else permissive.
    pub fn effective_change_filter(&self) -> Arc<dyn ObjectChangeFilter> {
        if let Some(filter) = &self.change_filter {
            return Arc::clone(filter);
        }
        if let Some(name_filter) = &self.name_filter {
            return Arc::clone(name_filter) as Arc<dyn ObjectChangeFilter>;
        }
        Arc::new(PermissiveChangeFilter)
    }

    /// The explicitly supplied change filter, if any
    pub fn object_change_filter(&self) -> Option<&Arc<dyn ObjectChangeFilter>> {
        self.change_filter.as_ref()
    }

    /// Quoting strategy forced during capture and used by downstream
    /// generators when rendering identifiers
    pub fn quoting_strategy(&self) -> Option<ObjectQuotingStrategy> {
        self.quoting_strategy
    }

    /// The schema mapping active for already-handled resolution
    pub fn schema_comparisons(&self) -> Option<&[SchemaComparison]> {
        self.schema_comparisons.as_deref()
    }

    pub fn include_catalog(&self) -> bool {
        self.include_catalog
    }

    pub fn include_schema(&self) -> bool {
        self.include_schema
    }

    pub fn include_tablespace(&self) -> bool {
        self.include_tablespace
    }

    pub fn include_objects(&self) -> Option<&str> {
        self.include_objects.as_deref()
    }

    pub fn exclude_objects(&self) -> Option<&str> {
        self.exclude_objects.as_deref()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Extensions enabled for this run
    pub fn generator_extensions(&self) -> &[GeneratorExtension] {
        &self.generator_extensions
    }
}

impl Default for DiffOutputControl {
    fn default() -> Self {
        Self {
            include_schemas: Vec::new(),
            include_catalog: true,
            include_schema: true,
            include_tablespace: true,
            include_objects: None,
            exclude_objects: None,
            name_filter: None,
            change_filter: None,
            schema_comparisons: None,
            quoting_strategy: None,
            respect_schema_case: false,
            catalogs_as_schemas: false,
            context: None,
            labels: Vec::new(),
            generator_extensions: Vec::new(),
            handled_missing: ObjectCollection::new(),
            handled_unexpected: ObjectCollection::new(),
            handled_changed: ObjectCollection::new(),
        }
    }
}

/// Builder for `DiffOutputControl`
#[derive(Default)]
pub struct DiffOutputControlBuilder {
    control: DiffOutputControl,
}

impl DiffOutputControlBuilder {
    pub fn include_catalog(mut self, value: bool) -> Self {
        self.control.include_catalog = value;
        self
    }

    pub fn include_schema(mut self, value: bool) -> Self {
        self.control.include_schema = value;
        self
    }

    pub fn include_tablespace(mut self, value: bool) -> Self {
        self.control.include_tablespace = value;
        self
    }

    /// Add a schema to the inclusion set; adding an equal schema again is a
    /// no-op
    pub fn add_included_schema(mut self, schema: CatalogAndSchema) -> Self {
        if !self.control.include_schemas.contains(&schema) {
            self.control.include_schemas.push(schema);
        }
        self
    }

    /// Name patterns for objects to include (comma-separated regexes,
    /// optional `type:` prefix)
    pub fn include_objects(mut self, patterns: impl Into<String>) -> Self {
        self.control.include_objects = Some(patterns.into());
        self
    }

    /// Name patterns for objects to exclude
    pub fn exclude_objects(mut self, patterns: impl Into<String>) -> Self {
        self.control.exclude_objects = Some(patterns.into());
        self
    }

    /// Install a pluggable admission filter; takes precedence over name
    /// patterns
    pub fn object_change_filter(mut self, filter: Arc<dyn ObjectChangeFilter>) -> Self {
        self.control.change_filter = Some(filter);
        self
    }

    /// Attach the run's schema mapping for already-handled resolution
    pub fn schema_comparisons(mut self, comparisons: Vec<SchemaComparison>) -> Self {
        self.control.schema_comparisons = Some(comparisons);
        self
    }

    /// Store the quoting strategy to force during capture
    pub fn quoting_strategy(mut self, strategy: ObjectQuotingStrategy) -> Self {
        self.control.quoting_strategy = Some(strategy);
        self
    }

    /// Compare schema and catalog names literally instead of folding case
    pub fn respect_schema_case(mut self, value: bool) -> Self {
        self.control.respect_schema_case = value;
        self
    }

    /// Treat catalog names as schema names (for drivers that report
    /// catalogs as schemas)
    pub fn catalogs_as_schemas(mut self, value: bool) -> Self {
        self.control.catalogs_as_schemas = value;
        self
    }

    /// Context expression attached to generated change sets
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.control.context = Some(context.into());
        self
    }

    /// Labels attached to generated change sets
    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.control.labels = labels;
        self
    }

    /// Enable external data-file generation under `data_dir` for this run
    pub fn data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.control
            .generator_extensions
            .push(GeneratorExtension::ExternalDataFiles(data_dir.into()));
        self
    }

    /// Finish the control; fails only on a malformed name pattern
    pub fn build(mut self) -> Result<DiffOutputControl, InvalidPatternError> {
        if self.control.include_objects.is_some() || self.control.exclude_objects.is_some() {
            let filter = StandardNameFilter::new(
                self.control.include_objects.as_deref(),
                self.control.exclude_objects.as_deref(),
            )?;
            self.control.name_filter = Some(Arc::new(filter));
        }
        Ok(self.control)
    }
}
