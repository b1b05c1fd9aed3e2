//! Captured database objects
//!
//! A `DatabaseObject` pairs a kind-independent identity (name, owning
//! schema, owning container) with a kind-specific attribute payload. The
//! identity part is what membership sets and cross-side matching operate
//! on; the payload is only consulted when deciding whether a matched pair
//! has changed.

use serde::{Deserialize, Serialize};

use crate::schema::CatalogAndSchema;

/// Kinds of objects a snapshot can contain
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Table,
    View,
    Column,
    Index,
    PrimaryKey,
    ForeignKey,
    UniqueConstraint,
    Sequence,
}

impl ObjectType {
    /// Stable lower-case identifier, also accepted by `FromStr`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::View => "view",
            Self::Column => "column",
            Self::Index => "index",
            Self::PrimaryKey => "primary_key",
            Self::ForeignKey => "foreign_key",
            Self::UniqueConstraint => "unique_constraint",
            Self::Sequence => "sequence",
        }
    }

    /// Human-readable section label used by report rendering
    pub fn label(&self) -> &'static str {
        match self {
            Self::Table => "Table",
            Self::View => "View",
            Self::Column => "Column",
            Self::Index => "Index",
            Self::PrimaryKey => "Primary Key",
            Self::ForeignKey => "Foreign Key",
            Self::UniqueConstraint => "Unique Constraint",
            Self::Sequence => "Sequence",
        }
    }

    /// All object types, in report order
    pub fn all() -> &'static [ObjectType] {
        &[
            Self::Table,
            Self::View,
            Self::Column,
            Self::Index,
            Self::PrimaryKey,
            Self::ForeignKey,
            Self::UniqueConstraint,
            Self::Sequence,
        ]
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error for an unrecognized object-type name
#[derive(Debug, thiserror::Error)]
#[error("unknown object type: {0}")]
pub struct UnknownObjectType(pub String);

impl std::str::FromStr for ObjectType {
    type Err = UnknownObjectType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "view" => Ok(Self::View),
            "column" => Ok(Self::Column),
            "index" => Ok(Self::Index),
            "primary_key" | "primarykey" => Ok(Self::PrimaryKey),
            "foreign_key" | "foreignkey" => Ok(Self::ForeignKey),
            "unique_constraint" | "uniqueconstraint" => Ok(Self::UniqueConstraint),
            "sequence" => Ok(Self::Sequence),
            other => Err(UnknownObjectType(other.to_string())),
        }
    }
}

/// Kind-specific attributes, compared only after identities match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectDetail {
    Table {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        tablespace: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        remarks: Option<String>,
    },
    View {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        definition: Option<String>,
    },
    Column {
        type_name: String,
        nullable: bool,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        default_value: Option<String>,
        #[serde(default)]
        auto_increment: bool,
    },
    Index {
        columns: Vec<String>,
        unique: bool,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        tablespace: Option<String>,
    },
    PrimaryKey {
        columns: Vec<String>,
    },
    ForeignKey {
        columns: Vec<String>,
        referenced_table: String,
        referenced_columns: Vec<String>,
    },
    UniqueConstraint {
        columns: Vec<String>,
    },
    Sequence {
        start_value: i64,
        increment_by: i64,
    },
}

/// One attribute that differs between two matched objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDifference {
    /// Attribute name
    pub field: String,

    /// Rendered value on the reference side
    pub reference: String,

    /// Rendered value on the target side
    pub target: String,
}

impl FieldDifference {
    fn new(field: &str, reference: impl std::fmt::Display, target: impl std::fmt::Display) -> Self {
        Self {
            field: field.to_string(),
            reference: reference.to_string(),
            target: target.to_string(),
        }
    }
}

fn render_opt(value: &Option<String>) -> String {
    match value {
        Some(v) => v.clone(),
        None => "(none)".to_string(),
    }
}

fn render_list(values: &[String]) -> String {
    values.join(", ")
}

/// A captured database object: identity plus kind payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseObject {
    /// Object name, captured literally
    pub name: String,

    /// Owning schema; `None` for schema-less object kinds
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub schema: Option<CatalogAndSchema>,

    /// Owning relation name for nested objects (columns, indexes, keys)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub container: Option<String>,

    /// Kind-specific attributes
    pub detail: ObjectDetail,
}

impl DatabaseObject {
    /// A table under `schema`
    pub fn table(schema: CatalogAndSchema, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema),
            container: None,
            detail: ObjectDetail::Table {
                tablespace: None,
                remarks: None,
            },
        }
    }

    /// A view under `schema`
    pub fn view(schema: CatalogAndSchema, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema),
            container: None,
            detail: ObjectDetail::View { definition: None },
        }
    }

    /// A column of `table` under `schema`
    pub fn column(
        schema: CatalogAndSchema,
        table: impl Into<String>,
        name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema),
            container: Some(table.into()),
            detail: ObjectDetail::Column {
                type_name: type_name.into(),
                nullable: true,
                default_value: None,
                auto_increment: false,
            },
        }
    }

    /// An index on `table` under `schema`
    pub fn index(
        schema: CatalogAndSchema,
        table: impl Into<String>,
        name: impl Into<String>,
        columns: Vec<String>,
        unique: bool,
    ) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema),
            container: Some(table.into()),
            detail: ObjectDetail::Index {
                columns,
                unique,
                tablespace: None,
            },
        }
    }

    /// The primary key of `table` under `schema`
    pub fn primary_key(
        schema: CatalogAndSchema,
        table: impl Into<String>,
        name: impl Into<String>,
        columns: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema),
            container: Some(table.into()),
            detail: ObjectDetail::PrimaryKey { columns },
        }
    }

    /// A sequence under `schema`
    pub fn sequence(schema: CatalogAndSchema, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema),
            container: None,
            detail: ObjectDetail::Sequence {
                start_value: 1,
                increment_by: 1,
            },
        }
    }

    /// Set the table remarks
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        if let ObjectDetail::Table { remarks: slot, .. } = &mut self.detail {
            *slot = Some(remarks.into());
        }
        self
    }

    /// Set the tablespace (tables and indexes)
    pub fn with_tablespace(mut self, tablespace: impl Into<String>) -> Self {
        match &mut self.detail {
            ObjectDetail::Table { tablespace: slot, .. }
            | ObjectDetail::Index { tablespace: slot, .. } => *slot = Some(tablespace.into()),
            _ => {}
        }
        self
    }

    /// Set column nullability
    pub fn with_nullable(mut self, value: bool) -> Self {
        if let ObjectDetail::Column { nullable, .. } = &mut self.detail {
            *nullable = value;
        }
        self
    }

    /// Set the column default expression
    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        if let ObjectDetail::Column { default_value, .. } = &mut self.detail {
            *default_value = Some(value.into());
        }
        self
    }

    /// Set the view definition text
    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        if let ObjectDetail::View { definition: slot } = &mut self.detail {
            *slot = Some(definition.into());
        }
        self
    }

    /// The kind of this object
    pub fn object_type(&self) -> ObjectType {
        match self.detail {
            ObjectDetail::Table { .. } => ObjectType::Table,
            ObjectDetail::View { .. } => ObjectType::View,
            ObjectDetail::Column { .. } => ObjectType::Column,
            ObjectDetail::Index { .. } => ObjectType::Index,
            ObjectDetail::PrimaryKey { .. } => ObjectType::PrimaryKey,
            ObjectDetail::ForeignKey { .. } => ObjectType::ForeignKey,
            ObjectDetail::UniqueConstraint { .. } => ObjectType::UniqueConstraint,
            ObjectDetail::Sequence { .. } => ObjectType::Sequence,
        }
    }

    /// Schema-qualified display name (`schema.container.name`)
    pub fn qualified_name(&self) -> String {
        let mut parts = Vec::new();
        if let Some(schema) = &self.schema {
            parts.push(schema.to_string());
        }
        if let Some(container) = &self.container {
            parts.push(container.clone());
        }
        parts.push(self.name.clone());
        parts.join(".")
    }

    /// Attribute-level differences against another object of the same
    /// identity. A kind mismatch reports a single `kind` difference.
    pub fn attribute_differences(&self, other: &DatabaseObject) -> Vec<FieldDifference> {
        let mut diffs = Vec::new();

        match (&self.detail, &other.detail) {
            (
                ObjectDetail::Table { tablespace: a_ts, remarks: a_re },
                ObjectDetail::Table { tablespace: b_ts, remarks: b_re },
            ) => {
                if a_ts != b_ts {
                    diffs.push(FieldDifference::new("tablespace", render_opt(a_ts), render_opt(b_ts)));
                }
                if a_re != b_re {
                    diffs.push(FieldDifference::new("remarks", render_opt(a_re), render_opt(b_re)));
                }
            }
            (
                ObjectDetail::View { definition: a_def },
                ObjectDetail::View { definition: b_def },
            ) => {
                if a_def != b_def {
                    diffs.push(FieldDifference::new("definition", render_opt(a_def), render_opt(b_def)));
                }
            }
            (
                ObjectDetail::Column {
                    type_name: a_ty,
                    nullable: a_null,
                    default_value: a_def,
                    auto_increment: a_auto,
                },
                ObjectDetail::Column {
                    type_name: b_ty,
                    nullable: b_null,
                    default_value: b_def,
                    auto_increment: b_auto,
                },
            ) => {
                if a_ty != b_ty {
                    diffs.push(FieldDifference::new("type", a_ty, b_ty));
                }
                if a_null != b_null {
                    diffs.push(FieldDifference::new("nullable", a_null, b_null));
                }
                if a_def != b_def {
                    diffs.push(FieldDifference::new("default_value", render_opt(a_def), render_opt(b_def)));
                }
                if a_auto != b_auto {
                    diffs.push(FieldDifference::new("auto_increment", a_auto, b_auto));
                }
            }
            (
                ObjectDetail::Index { columns: a_cols, unique: a_uni, tablespace: a_ts },
                ObjectDetail::Index { columns: b_cols, unique: b_uni, tablespace: b_ts },
            ) => {
                if a_cols != b_cols {
                    diffs.push(FieldDifference::new("columns", render_list(a_cols), render_list(b_cols)));
                }
                if a_uni != b_uni {
                    diffs.push(FieldDifference::new("unique", a_uni, b_uni));
                }
                if a_ts != b_ts {
                    diffs.push(FieldDifference::new("tablespace", render_opt(a_ts), render_opt(b_ts)));
                }
            }
            (
                ObjectDetail::PrimaryKey { columns: a_cols },
                ObjectDetail::PrimaryKey { columns: b_cols },
            )
            | (
                ObjectDetail::UniqueConstraint { columns: a_cols },
                ObjectDetail::UniqueConstraint { columns: b_cols },
            ) => {
                if a_cols != b_cols {
                    diffs.push(FieldDifference::new("columns", render_list(a_cols), render_list(b_cols)));
                }
            }
            (
                ObjectDetail::ForeignKey {
                    columns: a_cols,
                    referenced_table: a_ref,
                    referenced_columns: a_ref_cols,
                },
                ObjectDetail::ForeignKey {
                    columns: b_cols,
                    referenced_table: b_ref,
                    referenced_columns: b_ref_cols,
                },
            ) => {
                if a_cols != b_cols {
                    diffs.push(FieldDifference::new("columns", render_list(a_cols), render_list(b_cols)));
                }
                if a_ref != b_ref {
                    diffs.push(FieldDifference::new("referenced_table", a_ref, b_ref));
                }
                if a_ref_cols != b_ref_cols {
                    diffs.push(FieldDifference::new(
                        "referenced_columns",
                        render_list(a_ref_cols),
                        render_list(b_ref_cols),
                    ));
                }
            }
            (
                ObjectDetail::Sequence { start_value: a_start, increment_by: a_inc },
                ObjectDetail::Sequence { start_value: b_start, increment_by: b_inc },
            ) => {
                if a_start != b_start {
                    diffs.push(FieldDifference::new("start_value", a_start, b_start));
                }
                if a_inc != b_inc {
                    diffs.push(FieldDifference::new("increment_by", a_inc, b_inc));
                }
            }
            (a, b) => {
                diffs.push(FieldDifference::new(
                    "kind",
                    kind_of(a).as_str(),
                    kind_of(b).as_str(),
                ));
            }
        }

        diffs
    }
}

fn kind_of(detail: &ObjectDetail) -> ObjectType {
    match detail {
        ObjectDetail::Table { .. } => ObjectType::Table,
        ObjectDetail::View { .. } => ObjectType::View,
        ObjectDetail::Column { .. } => ObjectType::Column,
        ObjectDetail::Index { .. } => ObjectType::Index,
        ObjectDetail::PrimaryKey { .. } => ObjectType::PrimaryKey,
        ObjectDetail::ForeignKey { .. } => ObjectType::ForeignKey,
        ObjectDetail::UniqueConstraint { .. } => ObjectType::UniqueConstraint,
        ObjectDetail::Sequence { .. } => ObjectType::Sequence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn public() -> CatalogAndSchema {
        CatalogAndSchema::schema_only("public")
    }

    #[test]
    fn object_type_from_identity() {
        let table = DatabaseObject::table(public(), "users");
        assert_eq!(table.object_type(), ObjectType::Table);

        let column = DatabaseObject::column(public(), "users", "id", "bigint");
        assert_eq!(column.object_type(), ObjectType::Column);
        assert_eq!(column.container.as_deref(), Some("users"));
    }

    #[test]
    fn qualified_name_includes_container() {
        let column = DatabaseObject::column(public(), "users", "id", "bigint");
        assert_eq!(column.qualified_name(), "public.users.id");
    }

    #[test]
    fn column_attribute_differences() {
        let reference = DatabaseObject::column(public(), "users", "id", "bigint")
            .with_nullable(false);
        let target = DatabaseObject::column(public(), "users", "id", "integer");

        let diffs = reference.attribute_differences(&target);
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].field, "type");
        assert_eq!(diffs[0].reference, "bigint");
        assert_eq!(diffs[0].target, "integer");
        assert_eq!(diffs[1].field, "nullable");
    }

    #[test]
    fn kind_mismatch_is_a_single_difference() {
        let table = DatabaseObject::table(public(), "users");
        let view = DatabaseObject::view(public(), "users");

        let diffs = table.attribute_differences(&view);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].field, "kind");
    }

    #[test]
    fn object_type_parsing() {
        assert_eq!("table".parse::<ObjectType>().unwrap(), ObjectType::Table);
        assert_eq!("PRIMARY_KEY".parse::<ObjectType>().unwrap(), ObjectType::PrimaryKey);
        assert!("tabel".parse::<ObjectType>().is_err());
    }

    #[test]
    fn serde_round_trip() {
        let object = DatabaseObject::column(public(), "users", "id", "bigint")
            .with_nullable(false)
            .with_default_value("0");

        let json = serde_json::to_string(&object).unwrap();
        let back: DatabaseObject = serde_json::from_str(&json).unwrap();
        assert_eq!(object, back);
    }
}
