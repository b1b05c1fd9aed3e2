//! Captured object graphs
//!
//! A `Snapshot` is the immutable result of one capture pass over one
//! database: the objects found under a set of schemas, together with the
//! dialect profile of the engine that produced them. Embedding the profile
//! keeps identity rules (case folding, catalog aliasing) available after a
//! snapshot has been serialized and reloaded elsewhere.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dbdelta_core::{CatalogAndSchema, DatabaseObject, DialectProfile, ObjectType, SchemaComparison};

/// Structural state of a set of schemas on one database at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Capability profile of the source engine
    pub dialect: DialectProfile,

    /// Schemas this snapshot covers, standardized against `dialect`
    pub schemas: Vec<CatalogAndSchema>,

    /// Captured objects
    pub objects: Vec<DatabaseObject>,

    /// Schema mapping attached before comparison, so the diff engine can
    /// resolve cross-schema object equivalence
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub schema_comparisons: Option<Vec<SchemaComparison>>,
}

impl Snapshot {
    /// Create an empty snapshot covering `schemas`
    pub fn new(dialect: DialectProfile, schemas: Vec<CatalogAndSchema>) -> Self {
        Self {
            dialect,
            schemas,
            objects: Vec::new(),
            schema_comparisons: None,
        }
    }

    /// Append a captured object
    pub fn add_object(&mut self, object: DatabaseObject) {
        self.objects.push(object);
    }

    /// Attach the schema mapping used by the comparison pass
    pub fn set_schema_comparisons(&mut self, comparisons: Vec<SchemaComparison>) {
        self.schema_comparisons = Some(comparisons);
    }

    /// Objects of one kind, in capture order
    pub fn objects_of_type(&self, object_type: ObjectType) -> impl Iterator<Item = &DatabaseObject> {
        self.objects
            .iter()
            .filter(move |object| object.object_type() == object_type)
    }

    /// Object counts per kind
    pub fn counts_by_type(&self) -> BTreeMap<ObjectType, usize> {
        let mut counts = BTreeMap::new();
        for object in &self.objects {
            *counts.entry(object.object_type()).or_insert(0) += 1;
        }
        counts
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
