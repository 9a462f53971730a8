use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use indexmap::IndexMap;
use tracing::debug;
use wellplate_core::{Occupant, PlateKind, WellId, WorkflowStatus};

use crate::error::StoreError;
use crate::model::{Batch, PersistedBatch};
use crate::numbering::BatchNumber;
use crate::store::BatchStore;

#[derive(Debug, Default)]
struct State {
    batches: Vec<Batch>,
    statuses: HashMap<String, WorkflowStatus>,
    reserved: HashSet<String>,
    next_id: u64,
    fail_next_persist: Option<String>,
    fail_status_updates: Option<String>,
}

impl State {
    fn assign_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

/// Process-local store. Allocation reserves numbers under the same lock
/// that guards persistence, so concurrent sessions never share a number.
#[derive(Debug, Default)]
pub struct InMemoryBatchStore {
    state: Mutex<State>,
}

impl InMemoryBatchStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing batches; empty ids are assigned.
    #[must_use]
    pub fn with_batches(batches: impl IntoIterator<Item = Batch>) -> Self {
        let store = Self::new();
        {
            let mut state = store.lock();
            for mut batch in batches {
                if batch.id.is_empty() {
                    batch.id = state.assign_id();
                }
                state.batches.push(batch);
            }
        }
        store
    }

    pub fn set_status(&self, lab_number: impl Into<String>, status: WorkflowStatus) {
        self.lock().statuses.insert(lab_number.into(), status);
    }

    #[must_use]
    pub fn status_of(&self, lab_number: &str) -> Option<WorkflowStatus> {
        self.lock().statuses.get(lab_number).cloned()
    }

    /// Makes the next `persist_batch` fail with `message`.
    pub fn fail_next_persist(&self, message: impl Into<String>) {
        self.lock().fail_next_persist = Some(message.into());
    }

    /// Makes every `update_workflow_status` fail with `message`.
    pub fn fail_status_updates(&self, message: impl Into<String>) {
        self.lock().fail_status_updates = Some(message.into());
    }

    #[must_use]
    pub fn batch_count(&self) -> usize {
        self.lock().batches.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl BatchStore for InMemoryBatchStore {
    async fn list_batches(&self) -> Result<Vec<Batch>, StoreError> {
        Ok(self.lock().batches.clone())
    }

    async fn list_well_occupants(
        &self,
        batch_id: &str,
    ) -> Result<IndexMap<WellId, Vec<Occupant>>, StoreError> {
        let state = self.lock();
        let batch = state
            .batches
            .iter()
            .find(|b| b.id == batch_id)
            .ok_or_else(|| StoreError::NotFound {
                batch_id: batch_id.to_string(),
            })?;
        Ok(batch
            .wells
            .iter()
            .map(|(id, entry)| (*id, vec![entry.occupant.clone()]))
            .collect())
    }

    async fn persist_batch(&self, mut batch: Batch) -> Result<PersistedBatch, StoreError> {
        let mut state = self.lock();
        if let Some(message) = state.fail_next_persist.take() {
            return Err(StoreError::Unavailable { message });
        }
        if state
            .batches
            .iter()
            .any(|b| b.batch_number == batch.batch_number)
        {
            return Err(StoreError::DuplicateBatchNumber {
                batch_number: batch.batch_number,
            });
        }
        state.reserved.remove(&batch.batch_number);
        batch.id = state.assign_id();
        let persisted = PersistedBatch {
            batch_id: batch.id.clone(),
            batch_number: batch.batch_number.clone(),
        };
        debug!(batch_id = %persisted.batch_id, batch_number = %persisted.batch_number, "persisted batch");
        state.batches.push(batch);
        Ok(persisted)
    }

    async fn update_workflow_status(
        &self,
        lab_numbers: &[String],
        status: &WorkflowStatus,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        if let Some(message) = &state.fail_status_updates {
            return Err(StoreError::Unavailable {
                message: message.clone(),
            });
        }
        for lab in lab_numbers {
            if let Some(current) = state.statuses.get_mut(lab) {
                *current = status.clone();
            }
        }
        Ok(())
    }

    async fn allocate_batch_number(&self, kind: PlateKind) -> Result<BatchNumber, StoreError> {
        let mut state = self.lock();
        let taken = state
            .batches
            .iter()
            .map(|b| b.batch_number.as_str())
            .chain(state.reserved.iter().map(String::as_str));
        let next = BatchNumber::next_after(kind, taken);
        state.reserved.insert(next.to_string());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allocation_reserves_numbers() {
        let store = InMemoryBatchStore::new();
        let a = store.allocate_batch_number(PlateKind::Pcr).await.unwrap();
        let b = store.allocate_batch_number(PlateKind::Pcr).await.unwrap();
        let rr = store.allocate_batch_number(PlateKind::Rerun).await.unwrap();
        assert_eq!(a.to_string(), "LDS_1");
        assert_eq!(b.to_string(), "LDS_2");
        assert_eq!(rr.to_string(), "LDS_1_RR");
    }

    #[tokio::test]
    async fn unknown_batch_is_not_found() {
        let store = InMemoryBatchStore::new();
        let err = store.list_well_occupants("42").await.unwrap_err();
        assert_eq!(
            err,
            StoreError::NotFound {
                batch_id: "42".into()
            }
        );
    }

    #[tokio::test]
    async fn status_update_only_touches_known_samples() {
        let store = InMemoryBatchStore::new();
        store.set_status("25_1", WorkflowStatus::PcrReady);
        store
            .update_workflow_status(
                &["25_1".to_string(), "25_9".to_string()],
                &WorkflowStatus::PcrBatched,
            )
            .await
            .unwrap();
        assert_eq!(store.status_of("25_1"), Some(WorkflowStatus::PcrBatched));
        assert_eq!(store.status_of("25_9"), None);
    }
}
