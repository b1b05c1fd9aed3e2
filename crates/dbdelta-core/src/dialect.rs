//! Dialect capability profiles
//!
//! A `DialectProfile` records the identifier-casing and namespace semantics
//! of one database engine. Snapshots embed the profile of the engine they
//! were captured from, so identity rules survive serialization.

use serde::{Deserialize, Serialize};

/// How an engine treats the case of unquoted identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierCasing {
    /// Identifiers are stored exactly as written (case-sensitive)
    Exact,

    /// Unquoted identifiers fold to upper case
    FoldUpper,

    /// Unquoted identifiers fold to lower case
    FoldLower,
}

/// Capability record for one database engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectProfile {
    /// Short engine name (e.g. "postgres")
    pub name: String,

    /// Case handling for unquoted identifiers
    pub casing: IdentifierCasing,

    /// Whether the engine supports multiple schemas within one catalog
    pub supports_schemas: bool,

    /// Whether the engine has a catalog namespace level at all
    pub supports_catalogs: bool,

    /// Default catalog name, when the engine has one
    pub default_catalog: Option<String>,

    /// Default schema name, when the engine has one
    pub default_schema: Option<String>,
}

impl DialectProfile {
    /// PostgreSQL-style: schemas within catalogs, lower-case folding
    pub fn postgres() -> Self {
        Self {
            name: "postgres".to_string(),
            casing: IdentifierCasing::FoldLower,
            supports_schemas: true,
            supports_catalogs: true,
            default_catalog: None,
            default_schema: Some("public".to_string()),
        }
    }

    /// MySQL-style: schema and catalog are the same concept
    pub fn mysql() -> Self {
        Self {
            name: "mysql".to_string(),
            casing: IdentifierCasing::Exact,
            supports_schemas: false,
            supports_catalogs: true,
            default_catalog: None,
            default_schema: None,
        }
    }

    /// Snowflake-style: schemas within catalogs, upper-case folding
    pub fn snowflake() -> Self {
        Self {
            name: "snowflake".to_string(),
            casing: IdentifierCasing::FoldUpper,
            supports_schemas: true,
            supports_catalogs: true,
            default_catalog: None,
            default_schema: Some("PUBLIC".to_string()),
        }
    }

    /// H2-style: schemas within catalogs, upper-case folding
    pub fn h2() -> Self {
        Self {
            name: "h2".to_string(),
            casing: IdentifierCasing::FoldUpper,
            supports_schemas: true,
            supports_catalogs: true,
            default_catalog: None,
            default_schema: Some("PUBLIC".to_string()),
        }
    }

    /// SQLite-style: a single unnamed namespace
    pub fn sqlite() -> Self {
        Self {
            name: "sqlite".to_string(),
            casing: IdentifierCasing::Exact,
            supports_schemas: false,
            supports_catalogs: false,
            default_catalog: None,
            default_schema: None,
        }
    }

    /// Whether unquoted identifiers keep their literal case
    pub fn is_case_sensitive(&self) -> bool {
        self.casing == IdentifierCasing::Exact
    }

    /// Fold an identifier to the engine's unquoted-identifier case
    pub fn correct_case(&self, name: &str) -> String {
        match self.casing {
            IdentifierCasing::Exact => name.to_string(),
            IdentifierCasing::FoldUpper => name.to_uppercase(),
            IdentifierCasing::FoldLower => name.to_lowercase(),
        }
    }

    /// A copy of this profile that preserves literal identifier case.
    /// Used when a diff run is configured to respect schema/catalog case.
    pub fn with_exact_casing(mut self) -> Self {
        self.casing = IdentifierCasing::Exact;
        self
    }

    /// Override the default catalog
    pub fn with_default_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.default_catalog = Some(catalog.into());
        self
    }

    /// Override the default schema
    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }
}
