use std::collections::HashSet;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};
use wellplate_core::{Plate, PlateKind, Sample, WorkflowStatus, ELECTROPHORESIS_BATCH_PREFIX};

use crate::error::BatchError;
use crate::model::{Batch, BatchKind, SourceBatch, WellEntry};
use crate::numbering::BatchNumber;
use crate::store::BatchStore;

/// Operator-supplied header of a batch being finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchMeta {
    pub kind: PlateKind,
    pub batch_number: BatchNumber,
    pub operator: String,
    pub date: NaiveDate,
    /// Electrophoresis batch the rerun samples were loaded from.
    pub source_batch: Option<String>,
}

/// Outcome of the downstream workflow-status notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum StatusUpdate {
    Applied,
    Failed(String),
    /// Rerun plates record provenance only.
    NotRequired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizedBatch {
    pub batch_id: String,
    pub batch_number: String,
    pub sample_count: usize,
    pub status_update: StatusUpdate,
}

/// Status samples move to once their plate is finalized, if any.
#[must_use]
pub fn finalized_status(kind: PlateKind) -> Option<WorkflowStatus> {
    match kind {
        PlateKind::Pcr => Some(WorkflowStatus::PcrBatched),
        PlateKind::Rerun => None,
    }
}

/// Builds the persisted form of `plate` without touching any store.
pub fn build_batch(plate: &Plate, meta: &BatchMeta) -> Result<Batch, BatchError> {
    if plate.is_empty() {
        return Err(BatchError::NoSamples);
    }
    if meta.batch_number.kind() != meta.kind {
        return Err(BatchError::KindMismatch {
            batch_number: meta.batch_number.to_string(),
            kind: meta.kind,
        });
    }

    let number = meta.batch_number.to_string();
    let wells: IndexMap<_, _> = plate
        .occupied()
        .map(|(id, occupant)| {
            let entry = WellEntry {
                occupant: occupant.clone(),
                label: occupant.label().to_string(),
                comment: format!("{number} {}", occupant.sample_type()),
            };
            (id, entry)
        })
        .collect();
    let sample_count = plate.samples().count();

    Ok(Batch {
        id: String::new(),
        batch_number: number,
        kind: BatchKind::from(meta.kind),
        operator: meta.operator.clone(),
        date: meta.date,
        wells,
        sample_count,
        source_batch: meta.source_batch.clone(),
    })
}

/// Drives numbering, finalization and rerun sourcing against a store.
#[derive(Debug)]
pub struct BatchLifecycle<S> {
    store: S,
}

impl<S: BatchStore> BatchLifecycle<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn next_batch_number(&self, kind: PlateKind) -> Result<BatchNumber, BatchError> {
        Ok(self.store.allocate_batch_number(kind).await?)
    }

    /// Persists `plate` as a batch and notifies the workflow.
    ///
    /// The plate is only read; on error the caller still holds the layout and
    /// can retry. A failed status notification does not undo the batch.
    pub async fn finalize(
        &self,
        plate: &Plate,
        meta: &BatchMeta,
    ) -> Result<FinalizedBatch, BatchError> {
        let batch = build_batch(plate, meta)?;
        let lab_numbers: Vec<String> = batch.samples().map(|s| s.lab_number.clone()).collect();
        let sample_count = batch.sample_count;

        let persisted = self.store.persist_batch(batch).await?;
        info!(
            batch_id = %persisted.batch_id,
            batch_number = %persisted.batch_number,
            samples = sample_count,
            "finalized batch"
        );

        let status_update = match finalized_status(meta.kind) {
            None => StatusUpdate::NotRequired,
            Some(_) if lab_numbers.is_empty() => StatusUpdate::NotRequired,
            Some(status) => {
                match self
                    .store
                    .update_workflow_status(&lab_numbers, &status)
                    .await
                {
                    Ok(()) => StatusUpdate::Applied,
                    Err(err) => {
                        warn!(
                            batch_number = %persisted.batch_number,
                            error = %err,
                            "workflow status update failed; batch kept"
                        );
                        StatusUpdate::Failed(err.to_string())
                    }
                }
            }
        };

        Ok(FinalizedBatch {
            batch_id: persisted.batch_id,
            batch_number: persisted.batch_number,
            sample_count,
            status_update,
        })
    }

    /// Batches an operator may load samples from for a plate of `kind`.
    pub async fn eligible_sources(&self, kind: PlateKind) -> Result<Vec<SourceBatch>, BatchError> {
        if kind == PlateKind::Pcr {
            return Ok(Vec::new());
        }
        let batches = self.store.list_batches().await?;
        Ok(batches
            .iter()
            .filter(|b| b.batch_number.starts_with(ELECTROPHORESIS_BATCH_PREFIX))
            .map(SourceBatch::from)
            .collect())
    }

    /// Samples of a chosen electrophoresis batch, controls dropped, in
    /// row-major well order with replicates collapsed.
    pub async fn load_source(&self, batch_id: &str) -> Result<Vec<Sample>, BatchError> {
        let batches = self.store.list_batches().await?;
        let Some(source) = batches.iter().find(|b| b.id == batch_id) else {
            return Err(BatchError::SourceNotFound {
                batch_id: batch_id.to_string(),
            });
        };
        if !source.batch_number.starts_with(ELECTROPHORESIS_BATCH_PREFIX) {
            return Err(BatchError::InvalidSource {
                batch_number: source.batch_number.clone(),
            });
        }

        let mut wells: Vec<_> = self
            .store
            .list_well_occupants(batch_id)
            .await?
            .into_iter()
            .collect();
        wells.sort_by_key(|(id, _)| *id);

        let mut seen = HashSet::new();
        let samples: Vec<Sample> = wells
            .into_iter()
            .flat_map(|(_, occupants)| occupants)
            .filter_map(|occ| occ.as_sample().cloned())
            .filter(|s| seen.insert(s.lab_number.clone()))
            .collect();
        info!(
            source = %source.batch_number,
            samples = samples.len(),
            "loaded rerun source"
        );
        Ok(samples)
    }
}
