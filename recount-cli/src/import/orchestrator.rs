//! Drives one full import run across all entity types
//!
//! Entity types run in fixed order (SKU, Flota, Auxiliares, Verificadores,
//! Inventario), each fully extracted, mapped, accumulated, and committed
//! before the next begins. Failures are caught at the narrowest scope that
//! preserves forward progress: a missing sheet fails only its entity type,
//! a rejected write group fails only its batch. Only an unreachable store
//! at the start-up probe aborts the whole run.

use std::path::Path;

use anyhow::{Context, Result};

use crate::store::DocumentStore;

use super::batch::{BatchAccumulator, BatchFailure};
use super::clock::Clock;
use super::extract::read_sheet;
use super::mappers::{inventory_baseline, map_row, EntityKind, MapOutcome};
use super::record::Record;

/// Answers the overwrite question before an import touches existing data
pub trait ConfirmationProvider {
    fn confirm_overwrite(&self) -> Result<bool>;
}

/// Terminal prompt implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractiveConfirmation;

impl ConfirmationProvider for InteractiveConfirmation {
    fn confirm_overwrite(&self) -> Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt("The store already contains data. Continue and overwrite?")
            .default(false)
            .interact()
            .context("Failed to read confirmation")
    }
}

/// Run-level options
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Writes per atomic group (clamped to the store's 500 limit)
    pub batch_size: usize,
    /// Skip the existing-data confirmation
    pub force: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            batch_size: super::batch::MAX_BATCH_SIZE,
            force: false,
        }
    }
}

/// Outcome of one entity-type pass
#[derive(Debug, Clone, PartialEq)]
pub enum SheetResult {
    Imported {
        /// Documents in accepted write groups
        imported: usize,
        /// Rows that failed the key-presence rule
        skipped: usize,
        /// Write groups attempted
        batches: usize,
        /// Rejected write groups
        failures: Vec<BatchFailure>,
    },
    /// The source could not be read; the pass never started
    SourceFailed(String),
}

/// One entity type's pass, labelled for reporting
#[derive(Debug, Clone, PartialEq)]
pub struct EntityOutcome {
    pub kind: EntityKind,
    pub result: SheetResult,
}

/// Aggregate of a completed run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub entities: Vec<EntityOutcome>,
}

impl ImportSummary {
    pub fn total_imported(&self) -> usize {
        self.entities
            .iter()
            .map(|e| match &e.result {
                SheetResult::Imported { imported, .. } => *imported,
                SheetResult::SourceFailed(_) => 0,
            })
            .sum()
    }

    /// True when any pass lost a source or a batch
    pub fn has_failures(&self) -> bool {
        self.entities.iter().any(|e| match &e.result {
            SheetResult::Imported { failures, .. } => !failures.is_empty(),
            SheetResult::SourceFailed(_) => true,
        })
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(ImportSummary),
    /// Existing data and the operator declined the overwrite: clean no-op
    Cancelled,
}

/// Sequences one import run against an explicit store handle
pub struct ImportRunner<'a> {
    store: &'a dyn DocumentStore,
    clock: &'a dyn Clock,
    confirmation: &'a dyn ConfirmationProvider,
    options: ImportOptions,
}

impl<'a> ImportRunner<'a> {
    pub fn new(
        store: &'a dyn DocumentStore,
        clock: &'a dyn Clock,
        confirmation: &'a dyn ConfirmationProvider,
        options: ImportOptions,
    ) -> Self {
        Self {
            store,
            clock,
            confirmation,
            options,
        }
    }

    /// Run the full pipeline against a workbook
    ///
    /// Errors only when the store is unreachable before any writes; all
    /// later failures are carried in the summary.
    pub async fn run(&self, workbook: &Path) -> Result<RunOutcome> {
        if !self.options.force {
            let existing = self
                .store
                .get_one(EntityKind::Sku.collection())
                .await
                .context("Store unreachable while probing for existing data")?;

            if existing.is_some() && !self.confirmation.confirm_overwrite()? {
                log::info!("import cancelled by operator");
                return Ok(RunOutcome::Cancelled);
            }
        }

        let mut summary = ImportSummary::default();
        for kind in EntityKind::ALL {
            let result = match kind.sheet() {
                Some(sheet) => self.import_sheet(workbook, kind, sheet).await,
                None => self.import_inventory().await,
            };
            log_result(kind, &result);
            summary.entities.push(EntityOutcome { kind, result });
        }

        Ok(RunOutcome::Completed(summary))
    }

    async fn import_sheet(&self, workbook: &Path, kind: EntityKind, sheet: &str) -> SheetResult {
        match read_sheet(workbook, sheet) {
            Ok(records) => self.import_records(kind, &records).await,
            Err(err) => SheetResult::SourceFailed(format!("{err:#}")),
        }
    }

    /// Map records row by row, filtering skips, and drain them through the
    /// batch accumulator. Exposed to tests so scenarios can bypass Excel.
    pub async fn import_records(&self, kind: EntityKind, records: &[Record]) -> SheetResult {
        let mut accumulator = BatchAccumulator::new(
            self.store,
            kind.collection(),
            kind.label(),
            self.options.batch_size,
        );
        let mut skipped = 0;

        for record in records {
            match map_row(kind, record, self.clock) {
                MapOutcome::Mapped(write) => accumulator.push(write).await,
                MapOutcome::Skip => {
                    log::debug!("{}: row {} skipped (missing key)", kind, record.row);
                    skipped += 1;
                }
            }
        }

        let stats = accumulator.finish().await;
        SheetResult::Imported {
            imported: stats.committed,
            skipped,
            batches: stats.batches,
            failures: stats.failures,
        }
    }

    /// The inventory pass reads committed SKU documents instead of a sheet
    async fn import_inventory(&self) -> SheetResult {
        let sku_docs = match self.store.list(EntityKind::Sku.collection()).await {
            Ok(docs) => docs,
            Err(err) => return SheetResult::SourceFailed(err.to_string()),
        };

        let kind = EntityKind::Inventory;
        let mut accumulator = BatchAccumulator::new(
            self.store,
            kind.collection(),
            kind.label(),
            self.options.batch_size,
        );
        let mut skipped = 0;

        for doc in &sku_docs {
            match inventory_baseline(doc, self.clock) {
                MapOutcome::Mapped(write) => accumulator.push(write).await,
                MapOutcome::Skip => skipped += 1,
            }
        }

        let stats = accumulator.finish().await;
        SheetResult::Imported {
            imported: stats.committed,
            skipped,
            batches: stats.batches,
            failures: stats.failures,
        }
    }
}

fn log_result(kind: EntityKind, result: &SheetResult) {
    match result {
        SheetResult::Imported {
            imported,
            skipped,
            batches,
            failures,
        } => {
            log::info!(
                "{}: {} imported, {} skipped, {} batches, {} failed batches",
                kind,
                imported,
                skipped,
                batches,
                failures.len()
            );
        }
        SheetResult::SourceFailed(reason) => {
            log::error!("{}: source unreadable: {}", kind, reason);
        }
    }
}
