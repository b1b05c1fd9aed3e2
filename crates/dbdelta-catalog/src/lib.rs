//! Snapshot capture subsystem
//!
//! This crate owns the capture side of a diff run: the `Snapshot` object
//! graph, the `SnapshotSource` capture contract with its options and
//! per-object observer, and an in-memory database used for snapshot-file
//! replay and testing.

pub mod memory;
pub mod snapshot;
pub mod source;

pub use memory::MemoryDatabase;
pub use snapshot::Snapshot;
pub use source::{SnapshotError, SnapshotObserver, SnapshotOptions, SnapshotSource};
