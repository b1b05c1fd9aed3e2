//! Live database surface consumed by the capture and diff layers

use crate::dialect::DialectProfile;
use crate::quoting::ObjectQuotingStrategy;
use crate::schema::CatalogAndSchema;

/// A connected database, as seen by the diff engine.
///
/// The quoting strategy is a per-connection mutable: it is read and written
/// through `&self` because the capture layer overrides it for the duration
/// of a snapshot and restores it afterwards. Implementations back it with
/// interior mutability. Concurrent diff runs sharing one `Database` value
/// must be serialized by the caller.
pub trait Database: Send + Sync {
    /// Capability profile of the underlying engine
    fn dialect(&self) -> &DialectProfile;

    /// Current object-quoting strategy
    fn object_quoting_strategy(&self) -> ObjectQuotingStrategy;

    /// Replace the object-quoting strategy
    fn set_object_quoting_strategy(&self, strategy: ObjectQuotingStrategy);

    /// The single default schema of this database
    fn default_schema(&self) -> CatalogAndSchema {
        let dialect = self.dialect();
        CatalogAndSchema {
            catalog: dialect.default_catalog.clone(),
            schema: dialect.default_schema.clone(),
        }
        .standardize(dialect)
    }
}
