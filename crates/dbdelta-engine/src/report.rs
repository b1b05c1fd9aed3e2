//! Diff report rendering
//!
//! The text renderer writes a human-readable account of a `DiffResult`:
//! side banners, then one Missing/Unexpected/Changed section per object
//! kind. When a `DiffOutputControl` is supplied, every object is vetted
//! through `should_output` and the effective change filter before it is
//! printed — missing and changed objects through the reference database's
//! lens, unexpected objects through the target's. The JSON format is the
//! serde representation of `DiffResult` and bypasses this renderer.

use std::io::{self, Write};

use dbdelta_core::{DatabaseObject, ObjectChangeFilter as _, ObjectType};

use crate::diff::DiffResult;
use crate::output::DiffOutputControl;

/// Output formats for a diff run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Error for an unrecognized format name
#[derive(Debug, thiserror::Error)]
#[error("unknown report format: {0} (expected 'text' or 'json')")]
pub struct UnknownFormat(pub String);

impl std::str::FromStr for ReportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

/// Render `result` as a text report
pub fn render_text(
    result: &DiffResult,
    control: Option<&DiffOutputControl>,
    out: &mut dyn Write,
) -> io::Result<()> {
    let reference_schemas = join_schemas(&result.reference.schemas);
    let target_schemas = join_schemas(&result.target.schemas);

    writeln!(
        out,
        "Reference Database: {} (schemas: {})",
        result.reference.dialect.name, reference_schemas
    )?;
    writeln!(
        out,
        "Comparison Database: {} (schemas: {})",
        result.target.dialect.name, target_schemas
    )?;

    let admits = |object: &DatabaseObject, unexpected: bool| -> bool {
        let Some(control) = control else {
            return true;
        };
        let dialect = if unexpected {
            &result.target.dialect
        } else {
            &result.reference.dialect
        };
        control.should_output(object, dialect)
            && control.effective_change_filter().include(object, unexpected, dialect)
    };

    for object_type in ObjectType::all() {
        let missing: Vec<&DatabaseObject> = result
            .missing
            .iter()
            .filter(|object| object.object_type() == *object_type && admits(object, false))
            .collect();
        write_section(out, "Missing", object_type, &missing, |_| None)?;

        let unexpected: Vec<&DatabaseObject> = result
            .unexpected
            .iter()
            .filter(|object| object.object_type() == *object_type && admits(object, true))
            .collect();
        write_section(out, "Unexpected", object_type, &unexpected, |_| None)?;

        let changed: Vec<&DatabaseObject> = result
            .changed
            .iter()
            .filter(|entry| entry.object.object_type() == *object_type && admits(&entry.object, false))
            .map(|entry| &entry.object)
            .collect();
        write_section(out, "Changed", object_type, &changed, |object| {
            result
                .changed
                .iter()
                .find(|entry| &entry.object == object)
                .map(|entry| &entry.differences)
        })?;
    }

    Ok(())
}

fn join_schemas(schemas: &[dbdelta_core::CatalogAndSchema]) -> String {
    if schemas.is_empty() {
        return "(default)".to_string();
    }
    schemas
        .iter()
        .map(|schema| schema.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_section<'a>(
    out: &mut dyn Write,
    verb: &str,
    object_type: &ObjectType,
    objects: &[&'a DatabaseObject],
    differences_of: impl Fn(&'a DatabaseObject) -> Option<&'a Vec<dbdelta_core::FieldDifference>>,
) -> io::Result<()> {
    if objects.is_empty() {
        writeln!(out, "{} {}(s): NONE", verb, object_type.label())?;
        return Ok(());
    }

    writeln!(out, "{} {}(s):", verb, object_type.label())?;
    for &object in objects {
        writeln!(out, "     {}", object.qualified_name())?;
        if let Some(differences) = differences_of(object) {
            for difference in differences {
                writeln!(
                    out,
                    "          {} changed from '{}' to '{}'",
                    difference.field, difference.reference, difference.target
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::CompareControl;
    use crate::diff::compare;
    use dbdelta_catalog::Snapshot;
    use dbdelta_core::{CatalogAndSchema, DialectProfile};
    use pretty_assertions::assert_eq;

    fn public() -> CatalogAndSchema {
        CatalogAndSchema::schema_only("public")
    }

    fn fixture_result() -> DiffResult {
        let mut reference = Snapshot::new(DialectProfile::postgres(), vec![public()]);
        reference.add_object(DatabaseObject::table(public(), "users").with_remarks("accounts"));
        reference.add_object(DatabaseObject::table(public(), "orders"));

        let mut target = Snapshot::new(DialectProfile::postgres(), vec![public()]);
        target.add_object(DatabaseObject::table(public(), "users").with_remarks("app accounts"));
        target.add_object(DatabaseObject::table(public(), "audit"));

        compare(&reference, &target, &CompareControl::default())
    }

    #[test]
    fn text_report_is_deterministic() {
        let result = fixture_result();

        let mut out = Vec::new();
        render_text(&result, None, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let expected = "\
Reference Database: postgres (schemas: public)
Comparison Database: postgres (schemas: public)
Missing Table(s):
     public.orders
Unexpected Table(s):
     public.audit
Changed Table(s):
     public.users
          remarks changed from 'accounts' to 'app accounts'
Missing View(s): NONE
Unexpected View(s): NONE
Changed View(s): NONE
Missing Column(s): NONE
Unexpected Column(s): NONE
Changed Column(s): NONE
Missing Index(s): NONE
Unexpected Index(s): NONE
Changed Index(s): NONE
Missing Primary Key(s): NONE
Unexpected Primary Key(s): NONE
Changed Primary Key(s): NONE
Missing Foreign Key(s): NONE
Unexpected Foreign Key(s): NONE
Changed Foreign Key(s): NONE
Missing Unique Constraint(s): NONE
Unexpected Unique Constraint(s): NONE
Changed Unique Constraint(s): NONE
Missing Sequence(s): NONE
Unexpected Sequence(s): NONE
Changed Sequence(s): NONE
";
        assert_eq!(text, expected);
    }

    #[test]
    fn output_control_filters_the_report() {
        let result = fixture_result();
        let control = DiffOutputControl::builder()
            .exclude_objects("audit")
            .build()
            .unwrap();

        let mut out = Vec::new();
        render_text(&result, Some(&control), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(!text.contains("public.audit"));
        assert!(text.contains("public.orders"));
    }

    #[test]
    fn format_parsing() {
        assert_eq!("TXT".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("yaml".parse::<ReportFormat>().is_err());
    }
}
