//! Diff orchestration
//!
//! `DiffRunner` turns a declared schema mapping into concrete per-database
//! capture requests, forces quote-all identifier capture on each side for
//! the duration of its snapshot, hands both snapshots plus the mapping to
//! the classification engine, and optionally renders the result. It is
//! stateless across invocations and performs no recovery beyond the
//! guaranteed quoting-strategy restoration.

use std::io::{self, Write};

use dbdelta_catalog::{Snapshot, SnapshotError, SnapshotOptions, SnapshotSource};
use dbdelta_core::{Database, ObjectQuotingStrategy};

use crate::compare::{CompareControl, DiffSide};
use crate::diff::{self, DiffResult};
use crate::output::DiffOutputControl;
use crate::report::{self, ReportFormat};

/// Errors surfaced by a diff run. Capture failures pass through
/// unmodified.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// Scoped override of a database's object-quoting strategy.
///
/// Captures the prior strategy on construction and restores it when the
/// scope is dropped, covering normal returns, error returns, and dropped
/// (cancelled) capture futures alike.
pub struct QuotingScope<'a> {
    database: &'a dyn Database,
    prior: ObjectQuotingStrategy,
}

impl<'a> QuotingScope<'a> {
    /// Force `strategy` on `database` until the scope is dropped
    pub fn force(database: &'a dyn Database, strategy: ObjectQuotingStrategy) -> Self {
        let prior = database.object_quoting_strategy();
        database.set_object_quoting_strategy(strategy);
        Self { database, prior }
    }
}

impl Drop for QuotingScope<'_> {
    fn drop(&mut self) {
        self.database.set_object_quoting_strategy(self.prior);
    }
}

/// Orchestrates one diff between a reference and a target database
pub struct DiffRunner<'a> {
    reference_database: &'a dyn Database,
    reference_source: &'a dyn SnapshotSource,
    target_database: &'a dyn Database,
    target_source: &'a dyn SnapshotSource,
    compare_control: CompareControl,
    snapshot_options: SnapshotOptions,
    output_control: DiffOutputControl,
}

impl<'a> DiffRunner<'a> {
    pub fn new(
        reference_database: &'a dyn Database,
        reference_source: &'a dyn SnapshotSource,
        target_database: &'a dyn Database,
        target_source: &'a dyn SnapshotSource,
    ) -> Self {
        Self {
            reference_database,
            reference_source,
            target_database,
            target_source,
            compare_control: CompareControl::default(),
            snapshot_options: SnapshotOptions::default(),
            output_control: DiffOutputControl::default(),
        }
    }

    /// Convenience constructor for values that are both database and
    /// snapshot source (the in-memory catalog, snapshot-file replays)
    pub fn between<R, T>(reference: &'a R, target: &'a T) -> Self
    where
        R: Database + SnapshotSource,
        T: Database + SnapshotSource,
    {
        Self::new(reference, reference, target, target)
    }

    /// Set the schema mapping and object-type restriction
    pub fn with_compare_control(mut self, compare_control: CompareControl) -> Self {
        self.compare_control = compare_control;
        self
    }

    /// Set capture options passed through to both snapshot requests
    pub fn with_snapshot_options(mut self, snapshot_options: SnapshotOptions) -> Self {
        self.snapshot_options = snapshot_options;
        self
    }

    /// Set the output control consulted during report rendering
    pub fn with_output_control(mut self, output_control: DiffOutputControl) -> Self {
        self.output_control = output_control;
        self
    }

    /// Capture the reference side under a forced quote-all strategy
    pub async fn create_reference_snapshot(&self) -> Result<Snapshot, SnapshotError> {
        self.capture(DiffSide::Reference).await
    }

    /// Capture the target side under a forced quote-all strategy
    pub async fn create_target_snapshot(&self) -> Result<Snapshot, SnapshotError> {
        self.capture(DiffSide::Target).await
    }

    async fn capture(&self, side: DiffSide) -> Result<Snapshot, SnapshotError> {
        let (database, source) = match side {
            DiffSide::Reference => (self.reference_database, self.reference_source),
            DiffSide::Target => (self.target_database, self.target_source),
        };

        let schemas = self.compare_control.resolved_schemas(database, side);
        tracing::debug!(
            database = %database.dialect().name,
            schemas = schemas.len(),
            "capturing snapshot"
        );

        let _scope = QuotingScope::force(database, ObjectQuotingStrategy::QuoteAll);
        source.create_snapshot(&schemas, database, &self.snapshot_options).await
    }

    /// Capture both sides, attach the schema mapping, and classify
    pub async fn create_diff_result(&self) -> Result<DiffResult, DiffError> {
        let mut reference = self.create_reference_snapshot().await?;
        let mut target = self.create_target_snapshot().await?;

        let comparisons = self.compare_control.comparisons();
        if !comparisons.is_empty() {
            reference.set_schema_comparisons(comparisons.to_vec());
            target.set_schema_comparisons(comparisons.to_vec());
        }

        Ok(diff::compare(&reference, &target, &self.compare_control))
    }

    /// Run the diff and render the result in `format`
    pub async fn run(
        &self,
        format: ReportFormat,
        out: &mut dyn Write,
    ) -> Result<DiffResult, DiffError> {
        let result = self.create_diff_result().await?;
        match format {
            ReportFormat::Text => {
                report::render_text(&result, Some(&self.output_control), out)?;
            }
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, &result)?;
                writeln!(out)?;
            }
        }
        Ok(result)
    }
}
