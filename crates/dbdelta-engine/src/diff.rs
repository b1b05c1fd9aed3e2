//! Two-snapshot classification
//!
//! Walks a reference snapshot and a target snapshot and classifies every
//! object as missing (reference-only), unexpected (target-only), changed
//! (matched but attributes differ), or unchanged. Identity matching works
//! across engines: schema equivalence is resolved through the run's schema
//! mapping, and names match case-insensitively unless both dialects keep
//! literal identifier case.

use serde::{Deserialize, Serialize};

use dbdelta_catalog::Snapshot;
use dbdelta_core::{
    CatalogAndSchema, DatabaseObject, DialectProfile, FieldDifference, SchemaComparison,
};

use crate::compare::CompareControl;

/// One side of a diff result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideSummary {
    /// Dialect of the captured engine
    pub dialect: DialectProfile,

    /// Schemas the side's snapshot covered
    pub schemas: Vec<CatalogAndSchema>,
}

impl SideSummary {
    fn of(snapshot: &Snapshot) -> Self {
        Self {
            dialect: snapshot.dialect.clone(),
            schemas: snapshot.schemas.clone(),
        }
    }
}

/// A matched object whose attributes differ between the sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangedObject {
    /// Reference-side version of the object
    pub object: DatabaseObject,

    /// Attribute-level differences, reference vs target
    pub differences: Vec<FieldDifference>,
}

/// Classification of every object across two snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    pub reference: SideSummary,
    pub target: SideSummary,

    /// Objects present on the reference side only
    pub missing: Vec<DatabaseObject>,

    /// Objects present on the target side only
    pub unexpected: Vec<DatabaseObject>,

    /// Objects present on both sides with differing attributes
    pub changed: Vec<ChangedObject>,
}

impl DiffResult {
    /// Whether the two sides differ at all
    pub fn has_differences(&self) -> bool {
        !self.missing.is_empty() || !self.unexpected.is_empty() || !self.changed.is_empty()
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Classify every object across `reference` and `target`
pub fn compare(reference: &Snapshot, target: &Snapshot, control: &CompareControl) -> DiffResult {
    let comparisons = if control.comparisons().is_empty() {
        reference.schema_comparisons.as_deref()
    } else {
        Some(control.comparisons())
    };
    let case_sensitive =
        reference.dialect.is_case_sensitive() && target.dialect.is_case_sensitive();

    let mut matched = vec![false; target.objects.len()];
    let mut missing = Vec::new();
    let mut changed = Vec::new();

    for reference_object in &reference.objects {
        if !control.includes_type(reference_object.object_type()) {
            continue;
        }

        let counterpart = target.objects.iter().enumerate().find(|(index, candidate)| {
            !matched[*index]
                && same_identity(
                    reference_object,
                    &reference.dialect,
                    candidate,
                    &target.dialect,
                    comparisons,
                    case_sensitive,
                )
        });

        match counterpart {
            Some((index, target_object)) => {
                matched[index] = true;
                let differences = reference_object.attribute_differences(target_object);
                if !differences.is_empty() {
                    changed.push(ChangedObject {
                        object: reference_object.clone(),
                        differences,
                    });
                }
            }
            None => missing.push(reference_object.clone()),
        }
    }

    let mut unexpected: Vec<DatabaseObject> = target
        .objects
        .iter()
        .enumerate()
        .filter(|(index, object)| {
            !matched[*index] && control.includes_type(object.object_type())
        })
        .map(|(_, object)| object.clone())
        .collect();

    sort_objects(&mut missing);
    sort_objects(&mut unexpected);
    changed.sort_by(|a, b| sort_key(&a.object).cmp(&sort_key(&b.object)));

    DiffResult {
        reference: SideSummary::of(reference),
        target: SideSummary::of(target),
        missing,
        unexpected,
        changed,
    }
}

fn sort_key(object: &DatabaseObject) -> (dbdelta_core::ObjectType, String) {
    (object.object_type(), object.qualified_name())
}

fn sort_objects(objects: &mut [DatabaseObject]) {
    objects.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
}

fn names_match(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.eq_ignore_ascii_case(b)
    }
}

fn same_identity(
    reference: &DatabaseObject,
    reference_dialect: &DialectProfile,
    target: &DatabaseObject,
    target_dialect: &DialectProfile,
    comparisons: Option<&[SchemaComparison]>,
    case_sensitive: bool,
) -> bool {
    if reference.object_type() != target.object_type() {
        return false;
    }
    if !names_match(&reference.name, &target.name, case_sensitive) {
        return false;
    }

    let containers_match = match (&reference.container, &target.container) {
        (None, None) => true,
        (Some(a), Some(b)) => names_match(a, b, case_sensitive),
        _ => false,
    };
    if !containers_match {
        return false;
    }

    schemas_match(
        reference.schema.as_ref(),
        reference_dialect,
        target.schema.as_ref(),
        target_dialect,
        comparisons,
        case_sensitive,
    )
}

fn schemas_match(
    reference: Option<&CatalogAndSchema>,
    reference_dialect: &DialectProfile,
    target: Option<&CatalogAndSchema>,
    target_dialect: &DialectProfile,
    comparisons: Option<&[SchemaComparison]>,
    case_sensitive: bool,
) -> bool {
    let (reference, target) = match (reference, target) {
        (None, None) => return true,
        (Some(a), Some(b)) => (a, b),
        _ => return false,
    };

    // mapping first: each side is judged by its own database's rules
    if let Some(comparisons) = comparisons {
        for comparison in comparisons {
            if reference.equals_for(&comparison.reference, reference_dialect)
                && target.equals_for(&comparison.comparison, target_dialect)
            {
                return true;
            }
        }
    }

    // no mapping entry applies: compare the standardized names directly
    let reference = reference.standardize(reference_dialect);
    let target = target.standardize(target_dialect);

    let schemas_equal = match (&reference.schema, &target.schema) {
        (Some(a), Some(b)) => names_match(a, b, case_sensitive),
        (None, None) => true,
        _ => false,
    };
    let catalogs_equal = match (&reference.catalog, &target.catalog) {
        (Some(a), Some(b)) => names_match(a, b, case_sensitive),
        _ => true,
    };

    schemas_equal && catalogs_equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbdelta_core::SchemaComparison;
    use pretty_assertions::assert_eq;

    fn snapshot(dialect: DialectProfile, schema: &str, objects: Vec<DatabaseObject>) -> Snapshot {
        let mut snapshot = Snapshot::new(dialect, vec![CatalogAndSchema::schema_only(schema)]);
        for object in objects {
            snapshot.add_object(object);
        }
        snapshot
    }

    fn public() -> CatalogAndSchema {
        CatalogAndSchema::schema_only("public")
    }

    #[test]
    fn identical_snapshots_have_no_differences() {
        let objects = vec![
            DatabaseObject::table(public(), "users"),
            DatabaseObject::column(public(), "users", "id", "bigint"),
        ];
        let reference = snapshot(DialectProfile::postgres(), "public", objects.clone());
        let target = snapshot(DialectProfile::postgres(), "public", objects);

        let result = compare(&reference, &target, &CompareControl::default());
        assert!(!result.has_differences());
    }

    #[test]
    fn reference_only_objects_are_missing() {
        let reference = snapshot(
            DialectProfile::postgres(),
            "public",
            vec![DatabaseObject::table(public(), "users")],
        );
        let target = snapshot(DialectProfile::postgres(), "public", vec![]);

        let result = compare(&reference, &target, &CompareControl::default());
        assert_eq!(result.missing.len(), 1);
        assert_eq!(result.missing[0].name, "users");
        assert!(result.unexpected.is_empty());
    }

    #[test]
    fn target_only_objects_are_unexpected() {
        let reference = snapshot(DialectProfile::postgres(), "public", vec![]);
        let target = snapshot(
            DialectProfile::postgres(),
            "public",
            vec![DatabaseObject::table(public(), "audit")],
        );

        let result = compare(&reference, &target, &CompareControl::default());
        assert_eq!(result.unexpected.len(), 1);
        assert_eq!(result.unexpected[0].name, "audit");
    }

    #[test]
    fn matched_objects_with_differing_attributes_are_changed() {
        let reference = snapshot(
            DialectProfile::postgres(),
            "public",
            vec![DatabaseObject::column(public(), "users", "id", "bigint").with_nullable(false)],
        );
        let target = snapshot(
            DialectProfile::postgres(),
            "public",
            vec![DatabaseObject::column(public(), "users", "id", "integer").with_nullable(false)],
        );

        let result = compare(&reference, &target, &CompareControl::default());
        assert_eq!(result.changed.len(), 1);
        assert_eq!(result.changed[0].differences[0].field, "type");
    }

    #[test]
    fn schema_mapping_matches_across_schemas() {
        let control = CompareControl::new(vec![SchemaComparison::by_name("public", "app")]);
        let reference = snapshot(
            DialectProfile::postgres(),
            "public",
            vec![DatabaseObject::table(public(), "users")],
        );
        let target = snapshot(
            DialectProfile::postgres(),
            "app",
            vec![DatabaseObject::table(CatalogAndSchema::schema_only("app"), "users")],
        );

        let result = compare(&reference, &target, &control);
        assert!(!result.has_differences());
    }

    #[test]
    fn names_match_case_insensitively_across_folding_engines() {
        let reference = snapshot(
            DialectProfile::snowflake(),
            "PUBLIC",
            vec![DatabaseObject::table(CatalogAndSchema::schema_only("PUBLIC"), "USERS")],
        );
        let target = snapshot(
            DialectProfile::postgres(),
            "public",
            vec![DatabaseObject::table(CatalogAndSchema::schema_only("public"), "users")],
        );

        let control = CompareControl::new(vec![SchemaComparison::by_name("PUBLIC", "public")]);
        let result = compare(&reference, &target, &control);
        assert!(!result.has_differences());
    }

    #[test]
    fn names_match_literally_when_both_engines_are_case_sensitive() {
        let reference = snapshot(
            DialectProfile::sqlite(),
            "main",
            vec![DatabaseObject::table(CatalogAndSchema::schema_only("main"), "Users")],
        );
        let target = snapshot(
            DialectProfile::sqlite(),
            "main",
            vec![DatabaseObject::table(CatalogAndSchema::schema_only("main"), "users")],
        );

        let result = compare(&reference, &target, &CompareControl::default());
        assert_eq!(result.missing.len(), 1);
        assert_eq!(result.unexpected.len(), 1);
    }

    #[test]
    fn type_restriction_skips_other_kinds() {
        use dbdelta_core::ObjectType;

        let reference = snapshot(
            DialectProfile::postgres(),
            "public",
            vec![
                DatabaseObject::table(public(), "users"),
                DatabaseObject::sequence(public(), "users_id_seq"),
            ],
        );
        let target = snapshot(DialectProfile::postgres(), "public", vec![]);

        let control = CompareControl::default().with_types([ObjectType::Table]);
        let result = compare(&reference, &target, &control);

        assert_eq!(result.missing.len(), 1);
        assert_eq!(result.missing[0].object_type(), ObjectType::Table);
    }

    #[test]
    fn results_are_sorted_by_type_then_name() {
        let reference = snapshot(
            DialectProfile::postgres(),
            "public",
            vec![
                DatabaseObject::sequence(public(), "a_seq"),
                DatabaseObject::table(public(), "zed"),
                DatabaseObject::table(public(), "alpha"),
            ],
        );
        let target = snapshot(DialectProfile::postgres(), "public", vec![]);

        let result = compare(&reference, &target, &CompareControl::default());
        let names: Vec<&str> = result.missing.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zed", "a_seq"]);
    }
}
