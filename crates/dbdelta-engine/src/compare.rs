//! Schema mapping for one diff run
//!
//! A `CompareControl` declares what to compare: an ordered list of
//! reference-to-target schema pairs plus an optional object-type
//! restriction. Order defines output ordering of schema-scoped results,
//! not correctness.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use dbdelta_core::{CatalogAndSchema, Database, ObjectType, SchemaComparison};

/// Which side of a diff run a schema list is being derived for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffSide {
    Reference,
    Target,
}

/// Declarative contract for what one diff run compares
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompareControl {
    comparisons: Vec<SchemaComparison>,

    /// Restrict the diff to these object kinds; empty means all kinds
    #[serde(default)]
    snapshot_types: BTreeSet<ObjectType>,
}

impl CompareControl {
    /// Compare the given schema pairs
    pub fn new(comparisons: Vec<SchemaComparison>) -> Self {
        Self {
            comparisons,
            snapshot_types: BTreeSet::new(),
        }
    }

    /// Restrict the diff to the given object kinds
    pub fn with_types(mut self, types: impl IntoIterator<Item = ObjectType>) -> Self {
        self.snapshot_types = types.into_iter().collect();
        self
    }

    /// The declared schema pairs, in mapping order
    pub fn comparisons(&self) -> &[SchemaComparison] {
        &self.comparisons
    }

    /// The object-type restriction set
    pub fn snapshot_types(&self) -> &BTreeSet<ObjectType> {
        &self.snapshot_types
    }

    /// Whether `object_type` participates in this run
    pub fn includes_type(&self, object_type: ObjectType) -> bool {
        self.snapshot_types.is_empty() || self.snapshot_types.contains(&object_type)
    }

    /// Derive the concrete capture schemas for one side.
    ///
    /// With no mapping declared, the side's single default schema is used.
    /// Otherwise each mapping entry yields one schema: engines that support
    /// multiple schemas pair their default catalog with the mapped schema
    /// name; engines that conflate schema and catalog use the name for
    /// both. The result is index-aligned with the mapping.
    pub fn resolved_schemas(&self, database: &dyn Database, side: DiffSide) -> Vec<CatalogAndSchema> {
        if self.comparisons.is_empty() {
            return vec![database.default_schema()];
        }

        let dialect = database.dialect();
        self.comparisons
            .iter()
            .map(|comparison| {
                let mapped = match side {
                    DiffSide::Reference => &comparison.reference,
                    DiffSide::Target => &comparison.comparison,
                };
                let name = mapped.schema.clone().or_else(|| mapped.catalog.clone());

                if dialect.supports_schemas {
                    CatalogAndSchema {
                        catalog: dialect.default_catalog.clone(),
                        schema: name,
                    }
                } else {
                    CatalogAndSchema {
                        catalog: name.clone(),
                        schema: name,
                    }
                }
            })
            .collect()
    }
}
