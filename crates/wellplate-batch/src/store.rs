use async_trait::async_trait;
use indexmap::IndexMap;
use wellplate_core::{Occupant, PlateKind, WellId, WorkflowStatus};

use crate::error::StoreError;
use crate::model::{Batch, PersistedBatch};
use crate::numbering::BatchNumber;

/// Persistence behind batch finalization and rerun sourcing.
///
/// Implementations must be safe to share between tasks. `persist_batch`
/// must reject a batch whose number already exists rather than overwrite it.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Every persisted batch, in insertion order.
    async fn list_batches(&self) -> Result<Vec<Batch>, StoreError>;

    /// Occupants of one batch keyed by well. A well may carry more than one
    /// entry when the store records replicates.
    async fn list_well_occupants(
        &self,
        batch_id: &str,
    ) -> Result<IndexMap<WellId, Vec<Occupant>>, StoreError>;

    async fn persist_batch(&self, batch: Batch) -> Result<PersistedBatch, StoreError>;

    /// Moves the named samples to `status`. A store may skip lab numbers it
    /// does not track.
    async fn update_workflow_status(
        &self,
        lab_numbers: &[String],
        status: &WorkflowStatus,
    ) -> Result<(), StoreError>;

    /// Next free number of `kind`.
    ///
    /// The default scans a snapshot of `list_batches`, so two callers racing
    /// may be handed the same number; `persist_batch` is the backstop.
    /// Stores that can reserve atomically should override this.
    async fn allocate_batch_number(&self, kind: PlateKind) -> Result<BatchNumber, StoreError> {
        let batches = self.list_batches().await?;
        Ok(BatchNumber::next_after(
            kind,
            batches.iter().map(|b| b.batch_number.as_str()),
        ))
    }
}
