//! Schema identities and schema-to-schema mappings
//!
//! A `CatalogAndSchema` names a (catalog, schema) pair. Two values are only
//! comparable after *standardization* against a specific dialect: case
//! folding and catalog/schema aliasing are engine-specific, and the same
//! pair standardizes differently against different engines.

use serde::{Deserialize, Serialize};

use crate::dialect::DialectProfile;

/// A (catalog, schema) pair, immutable once constructed
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogAndSchema {
    /// Catalog name, `None` when unspecified
    pub catalog: Option<String>,

    /// Schema name, `None` when unspecified
    pub schema: Option<String>,
}

impl CatalogAndSchema {
    /// Create a pair with both parts named
    pub fn new(catalog: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            catalog: Some(catalog.into()),
            schema: Some(schema.into()),
        }
    }

    /// Create a pair with only the schema named
    pub fn schema_only(schema: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: Some(schema.into()),
        }
    }

    /// Normalize this pair to one engine's rules:
    ///
    /// - missing parts are filled from the dialect's defaults,
    /// - if the engine conflates schema and catalog, both parts carry the
    ///   same name,
    /// - the catalog is dropped if the engine has no catalog level,
    /// - names are folded to the engine's unquoted-identifier case.
    pub fn standardize(&self, dialect: &DialectProfile) -> CatalogAndSchema {
        let mut catalog = self
            .catalog
            .clone()
            .or_else(|| dialect.default_catalog.clone());
        let mut schema = self
            .schema
            .clone()
            .or_else(|| dialect.default_schema.clone());

        if !dialect.supports_schemas {
            let merged = schema.or(catalog);
            catalog = merged.clone();
            schema = merged;
        }

        if !dialect.supports_catalogs {
            catalog = None;
        }

        CatalogAndSchema {
            catalog: catalog.map(|name| dialect.correct_case(&name)),
            schema: schema.map(|name| dialect.correct_case(&name)),
        }
    }

    /// Equality under one engine's rules: both sides are standardized
    /// independently, then field-matched. A missing catalog on either side
    /// matches any catalog (best-effort wildcard).
    pub fn equals_for(&self, other: &CatalogAndSchema, dialect: &DialectProfile) -> bool {
        let a = self.standardize(dialect);
        let b = other.standardize(dialect);

        let catalogs_match = match (&a.catalog, &b.catalog) {
            (Some(left), Some(right)) => left == right,
            _ => true,
        };

        catalogs_match && a.schema == b.schema
    }
}

impl std::fmt::Display for CatalogAndSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.catalog, &self.schema) {
            (Some(catalog), Some(schema)) => write!(f, "{}.{}", catalog, schema),
            (Some(catalog), None) => write!(f, "{}", catalog),
            (None, Some(schema)) => write!(f, "{}", schema),
            (None, None) => write!(f, "(default)"),
        }
    }
}

/// Declares that objects under `reference` on the reference database
/// correspond to objects under `comparison` on the target database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaComparison {
    /// Schema on the reference database
    pub reference: CatalogAndSchema,

    /// Schema on the target database
    pub comparison: CatalogAndSchema,
}

impl SchemaComparison {
    /// Create a mapping entry
    pub fn new(reference: CatalogAndSchema, comparison: CatalogAndSchema) -> Self {
        Self {
            reference,
            comparison,
        }
    }

    /// Shorthand for a plain schema-name-to-schema-name mapping
    pub fn by_name(reference: impl Into<String>, comparison: impl Into<String>) -> Self {
        Self {
            reference: CatalogAndSchema::schema_only(reference),
            comparison: CatalogAndSchema::schema_only(comparison),
        }
    }
}
