//! dbdelta core
//!
//! Domain model shared by every dbdelta crate: schema identities and their
//! per-dialect standardization, captured database objects, dialect
//! capability profiles, quoting strategies, and the traits the capture and
//! diff layers are written against.

pub mod database;
pub mod dialect;
pub mod filter;
pub mod object;
pub mod quoting;
pub mod schema;

pub use database::Database;
pub use dialect::{DialectProfile, IdentifierCasing};
pub use filter::{ObjectChangeFilter, PermissiveChangeFilter};
pub use object::{DatabaseObject, FieldDifference, ObjectDetail, ObjectType, UnknownObjectType};
pub use quoting::ObjectQuotingStrategy;
pub use schema::{CatalogAndSchema, SchemaComparison};
