//! One-shot raw JSON uploader
//!
//! Pushes an exported `{collection: {doc_id: fields}}` dump through the
//! same batch-commit primitive as the sheet pipeline, with no
//! transformation beyond field typing.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::import::batch::{BatchAccumulator, BatchFailure};
use crate::store::{value::fields_from_json, DocumentStore, DocumentWrite};

/// Parsed export file: collection name → document id → fields
pub type ExportData = BTreeMap<String, BTreeMap<String, serde_json::Map<String, serde_json::Value>>>;

/// Per-collection upload outcome
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionOutcome {
    pub collection: String,
    pub uploaded: usize,
    pub failures: Vec<BatchFailure>,
}

/// Aggregate of one upload run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadSummary {
    pub collections: Vec<CollectionOutcome>,
}

impl UploadSummary {
    pub fn total_uploaded(&self) -> usize {
        self.collections.iter().map(|c| c.uploaded).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.collections.iter().any(|c| !c.failures.is_empty())
    }
}

/// Read and parse an export file
pub fn read_export(path: &Path) -> Result<ExportData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read export file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid export file: {}", path.display()))
}

/// Upload every document of every collection, batching per collection
pub async fn upload_export(
    store: &dyn DocumentStore,
    data: &ExportData,
    batch_size: usize,
) -> UploadSummary {
    let mut summary = UploadSummary::default();

    for (collection, documents) in data {
        log::info!("uploading collection {} ({} documents)", collection, documents.len());
        let mut accumulator = BatchAccumulator::new(store, collection, collection, batch_size);
        for (doc_id, fields) in documents {
            let write = DocumentWrite::assigned(doc_id.clone(), fields_from_json(fields));
            accumulator.push(write).await;
        }
        let stats = accumulator.finish().await;
        summary.collections.push(CollectionOutcome {
            collection: collection.clone(),
            uploaded: stats.committed,
            failures: stats.failures,
        });
    }

    summary
}
