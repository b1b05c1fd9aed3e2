//! Pluggable object admission filter

use crate::dialect::DialectProfile;
use crate::object::DatabaseObject;

/// Decides whether an object participates in diffing at all.
///
/// `unexpected` is true when the object was found on the target side with
/// no reference counterpart. The default (no filter configured) admits
/// everything.
pub trait ObjectChangeFilter: Send + Sync {
    fn include(&self, object: &DatabaseObject, unexpected: bool, dialect: &DialectProfile) -> bool;
}

/// Filter that admits every object
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveChangeFilter;

impl ObjectChangeFilter for PermissiveChangeFilter {
    fn include(&self, _object: &DatabaseObject, _unexpected: bool, _dialect: &DialectProfile) -> bool {
        true
    }
}
