//! Content-addressed object membership set
//!
//! An `ObjectCollection` answers "has this object been seen before" with a
//! canonical, case-sensitive fingerprint of the object's identity. The
//! fingerprint authority is fixed: it never consults the database that
//! produced or queried an object, so membership tests give the same answer
//! no matter which engine supplied either side. Identifiers are expected
//! to be captured under a quote-all strategy, which makes their literal
//! casing meaningful.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use dbdelta_core::{CatalogAndSchema, DatabaseObject, SchemaComparison};

/// Canonical identity fingerprint: object type, catalog, schema, container
/// and name, literal case, NUL-separated.
fn identity_fingerprint(object: &DatabaseObject) -> String {
    let mut hasher = Sha256::new();
    hasher.update(object.object_type().as_str().as_bytes());
    hasher.update([0u8]);
    if let Some(schema) = &object.schema {
        if let Some(catalog) = &schema.catalog {
            hasher.update(catalog.as_bytes());
        }
        hasher.update([0u8]);
        if let Some(name) = &schema.schema {
            hasher.update(name.as_bytes());
        }
    }
    hasher.update([0u8]);
    if let Some(container) = &object.container {
        hasher.update(container.as_bytes());
    }
    hasher.update([0u8]);
    hasher.update(object.name.as_bytes());
    hex::encode(hasher.finalize())
}

/// Case-sensitive membership set of captured objects
#[derive(Debug, Clone, Default)]
pub struct ObjectCollection {
    cache: HashMap<String, Vec<DatabaseObject>>,
}

impl ObjectCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object; inserting an identical object again is a no-op
    pub fn add(&mut self, object: &DatabaseObject) {
        let entries = self.cache.entry(identity_fingerprint(object)).or_default();
        if !entries.iter().any(|existing| existing == object) {
            entries.push(object.clone());
        }
    }

    /// Membership test. When a schema mapping is supplied, an object whose
    /// schema appears on either side of a mapping entry is also looked up
    /// under the opposite side's schema, resolving cross-schema
    /// equivalence before hashing.
    pub fn contains(
        &self,
        object: &DatabaseObject,
        comparisons: Option<&[SchemaComparison]>,
    ) -> bool {
        if self.cache.contains_key(&identity_fingerprint(object)) {
            return true;
        }

        let (Some(comparisons), Some(schema)) = (comparisons, &object.schema) else {
            return false;
        };

        for comparison in comparisons {
            let sides = [
                (&comparison.reference, &comparison.comparison),
                (&comparison.comparison, &comparison.reference),
            ];
            for (from, to) in sides {
                if !schema_names_equal(schema, from) {
                    continue;
                }
                let mut remapped = object.clone();
                remapped.schema = Some(CatalogAndSchema {
                    catalog: to.catalog.clone().or_else(|| schema.catalog.clone()),
                    schema: to.schema.clone().or_else(|| to.catalog.clone()),
                });
                if self.cache.contains_key(&identity_fingerprint(&remapped)) {
                    return true;
                }
            }
        }

        false
    }

    /// Number of distinct identities held
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

fn schema_names_equal(schema: &CatalogAndSchema, side: &CatalogAndSchema) -> bool {
    let object_name = schema.schema.as_deref().or(schema.catalog.as_deref());
    let side_name = side.schema.as_deref().or(side.catalog.as_deref());
    match (object_name, side_name) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbdelta_core::DatabaseObject;

    fn public() -> CatalogAndSchema {
        CatalogAndSchema::schema_only("PUBLIC")
    }

    #[test]
    fn membership_is_at_most_once() {
        let mut collection = ObjectCollection::new();
        let table = DatabaseObject::table(public(), "T1");

        assert!(!collection.contains(&table, None));
        collection.add(&table);
        assert!(collection.contains(&table, None));

        collection.add(&table);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn membership_is_case_sensitive() {
        let mut collection = ObjectCollection::new();
        collection.add(&DatabaseObject::table(public(), "Users"));

        assert!(collection.contains(&DatabaseObject::table(public(), "Users"), None));
        assert!(!collection.contains(&DatabaseObject::table(public(), "USERS"), None));
    }

    #[test]
    fn membership_ignores_kind_payload() {
        let mut collection = ObjectCollection::new();
        collection.add(&DatabaseObject::table(public(), "T1").with_remarks("before"));

        // same identity, different attributes
        assert!(collection.contains(&DatabaseObject::table(public(), "T1").with_remarks("after"), None));
    }

    #[test]
    fn membership_is_insertion_order_independent() {
        // the fingerprint authority never consults a database, so inserting
        // "from" one engine and querying "from" another is symmetric
        let table = DatabaseObject::table(public(), "T1");

        let mut first = ObjectCollection::new();
        first.add(&table);
        let forward = first.contains(&table, None);

        let mut second = ObjectCollection::new();
        second.add(&table.clone());
        let reverse = second.contains(&table, None);

        assert_eq!(forward, reverse);
        assert!(forward);
    }

    #[test]
    fn mapping_resolves_cross_schema_equivalence() {
        let mut collection = ObjectCollection::new();
        collection.add(&DatabaseObject::table(CatalogAndSchema::schema_only("APP"), "T1"));

        let from_reference = DatabaseObject::table(CatalogAndSchema::schema_only("PUBLIC"), "T1");
        let mapping = [SchemaComparison::by_name("PUBLIC", "APP")];

        assert!(!collection.contains(&from_reference, None));
        assert!(collection.contains(&from_reference, Some(&mapping)));
    }

    #[test]
    fn mapping_is_bidirectional() {
        let mut collection = ObjectCollection::new();
        collection.add(&DatabaseObject::table(CatalogAndSchema::schema_only("PUBLIC"), "T1"));

        let from_target = DatabaseObject::table(CatalogAndSchema::schema_only("APP"), "T1");
        let mapping = [SchemaComparison::by_name("PUBLIC", "APP")];

        assert!(collection.contains(&from_target, Some(&mapping)));
    }

    #[test]
    fn distinct_objects_stay_distinct() {
        let mut collection = ObjectCollection::new();
        collection.add(&DatabaseObject::table(public(), "T1"));

        assert!(!collection.contains(&DatabaseObject::table(public(), "T2"), None));
        assert!(!collection.contains(
            &DatabaseObject::view(public(), "T1"),
            None
        ));
    }
}
