//! Object-name include/exclude filtering
//!
//! Patterns are comma-separated regular expressions, each optionally
//! prefixed with an object type: `table:audit_.*, view:v_tmp.*, scratch.*`.
//! A pattern must match the whole object name (or the whole qualified
//! name). Exclusion wins over inclusion.

use regex::Regex;

use dbdelta_core::{DatabaseObject, DialectProfile, ObjectChangeFilter, ObjectType};

/// A malformed include/exclude pattern
#[derive(Debug, thiserror::Error)]
#[error("invalid object pattern '{pattern}': {source}")]
pub struct InvalidPatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

#[derive(Debug, Clone)]
struct PatternEntry {
    object_type: Option<ObjectType>,
    regex: Regex,
}

impl PatternEntry {
    fn parse(entry: &str) -> Result<Self, InvalidPatternError> {
        let (object_type, pattern) = match entry.split_once(':') {
            Some((prefix, rest)) => match prefix.trim().parse::<ObjectType>() {
                Ok(object_type) => (Some(object_type), rest.trim()),
                Err(_) => (None, entry),
            },
            None => (None, entry),
        };

        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
            InvalidPatternError {
                pattern: entry.to_string(),
                source,
            }
        })?;

        Ok(Self { object_type, regex })
    }

    fn matches(&self, object: &DatabaseObject) -> bool {
        if let Some(object_type) = self.object_type {
            if object.object_type() != object_type {
                return false;
            }
        }
        self.regex.is_match(&object.name) || self.regex.is_match(&object.qualified_name())
    }
}

/// Admission filter driven by name patterns
#[derive(Debug, Clone, Default)]
pub struct StandardNameFilter {
    include: Vec<PatternEntry>,
    exclude: Vec<PatternEntry>,
}

impl StandardNameFilter {
    /// Compile include and exclude pattern lists. `None` or an empty string
    /// leaves that side unrestricted.
    pub fn new(
        include: Option<&str>,
        exclude: Option<&str>,
    ) -> Result<Self, InvalidPatternError> {
        Ok(Self {
            include: Self::parse_entries(include)?,
            exclude: Self::parse_entries(exclude)?,
        })
    }

    fn parse_entries(spec: Option<&str>) -> Result<Vec<PatternEntry>, InvalidPatternError> {
        let Some(spec) = spec else {
            return Ok(Vec::new());
        };
        spec.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(PatternEntry::parse)
            .collect()
    }
}

impl ObjectChangeFilter for StandardNameFilter {
    fn include(&self, object: &DatabaseObject, _unexpected: bool, _dialect: &DialectProfile) -> bool {
        if self.exclude.iter().any(|entry| entry.matches(object)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|entry| entry.matches(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbdelta_core::CatalogAndSchema;

    fn public() -> CatalogAndSchema {
        CatalogAndSchema::schema_only("public")
    }

    fn dialect() -> DialectProfile {
        DialectProfile::postgres()
    }

    #[test]
    fn exclusion_wins() {
        let filter = StandardNameFilter::new(Some(".*"), Some("audit_.*")).unwrap();

        assert!(filter.include(&DatabaseObject::table(public(), "users"), false, &dialect()));
        assert!(!filter.include(&DatabaseObject::table(public(), "audit_log"), false, &dialect()));
    }

    #[test]
    fn include_list_restricts() {
        let filter = StandardNameFilter::new(Some("users|orders"), None).unwrap();

        assert!(filter.include(&DatabaseObject::table(public(), "users"), false, &dialect()));
        assert!(!filter.include(&DatabaseObject::table(public(), "sessions"), false, &dialect()));
    }

    #[test]
    fn type_prefix_scopes_a_pattern() {
        let filter = StandardNameFilter::new(None, Some("table:tmp_.*")).unwrap();

        assert!(!filter.include(&DatabaseObject::table(public(), "tmp_load"), false, &dialect()));
        // same name, different kind: not excluded
        assert!(filter.include(&DatabaseObject::view(public(), "tmp_load"), false, &dialect()));
    }

    #[test]
    fn patterns_must_match_the_whole_name() {
        let filter = StandardNameFilter::new(Some("user"), None).unwrap();

        assert!(!filter.include(&DatabaseObject::table(public(), "users"), false, &dialect()));
    }

    #[test]
    fn malformed_pattern_is_rejected() {
        assert!(StandardNameFilter::new(Some("(unclosed"), None).is_err());
    }

    #[test]
    fn empty_spec_admits_everything() {
        let filter = StandardNameFilter::new(None, Some("  , ")).unwrap();
        assert!(filter.include(&DatabaseObject::table(public(), "anything"), true, &dialect()));
    }
}
