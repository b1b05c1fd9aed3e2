//! dbdelta engine - diff reconciliation and orchestration
//!
//! This crate implements the core of a diff run:
//! - Schema mapping and per-side schema derivation
//! - Content-addressed object membership sets
//! - Output filtering and at-most-once emission tracking
//! - Two-snapshot classification into missing/unexpected/changed
//! - Orchestration with scoped quoting-strategy overrides
//! - Report rendering

pub mod collection;
pub mod compare;
pub mod diff;
pub mod filter;
pub mod output;
pub mod report;
pub mod runner;

pub use collection::ObjectCollection;
pub use compare::{CompareControl, DiffSide};
pub use diff::{ChangedObject, DiffResult, SideSummary};
pub use filter::{InvalidPatternError, StandardNameFilter};
pub use output::{DiffOutputControl, DiffOutputControlBuilder, GeneratorExtension};
pub use report::{render_text, ReportFormat, UnknownFormat};
pub use runner::{DiffError, DiffRunner, QuotingScope};
