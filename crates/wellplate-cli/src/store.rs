use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;
use wellplate_batch::{Batch, BatchStore, PersistedBatch, StoreError};
use wellplate_core::{Occupant, WellId, WorkflowStatus};

const BATCHES_FILE: &str = "batches.json";
const STATUS_FILE: &str = "workflow_status.json";

/// Directory-backed store: `batches.json` holds every batch, and
/// `workflow_status.json` maps lab numbers to their current status.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir).map_err(|e| StoreError::Unavailable {
            message: format!("cannot create store directory {}: {e}", dir.display()),
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    async fn read<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, StoreError> {
        let path = self.dir.join(name);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => {
                return Err(StoreError::Unavailable {
                    message: format!("cannot read {}: {e}", path.display()),
                })
            }
        };
        serde_json::from_str(&raw).map_err(|e| StoreError::Rejected {
            message: format!("{} is not a valid store file: {e}", path.display()),
        })
    }

    async fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let path = self.dir.join(name);
        let raw = serde_json::to_string_pretty(value).map_err(|e| StoreError::Rejected {
            message: e.to_string(),
        })?;
        tokio::fs::write(&path, raw)
            .await
            .map_err(|e| StoreError::Unavailable {
                message: format!("cannot write {}: {e}", path.display()),
            })
    }
}

#[async_trait]
impl BatchStore for JsonFileStore {
    async fn list_batches(&self) -> Result<Vec<Batch>, StoreError> {
        self.read(BATCHES_FILE).await
    }

    async fn list_well_occupants(
        &self,
        batch_id: &str,
    ) -> Result<IndexMap<WellId, Vec<Occupant>>, StoreError> {
        let batches: Vec<Batch> = self.read(BATCHES_FILE).await?;
        let batch = batches
            .into_iter()
            .find(|b| b.id == batch_id)
            .ok_or_else(|| StoreError::NotFound {
                batch_id: batch_id.to_string(),
            })?;
        Ok(batch
            .wells
            .into_iter()
            .map(|(id, entry)| (id, vec![entry.occupant]))
            .collect())
    }

    async fn persist_batch(&self, mut batch: Batch) -> Result<PersistedBatch, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut batches: Vec<Batch> = self.read(BATCHES_FILE).await?;
        if batches.iter().any(|b| b.batch_number == batch.batch_number) {
            return Err(StoreError::DuplicateBatchNumber {
                batch_number: batch.batch_number,
            });
        }
        let next_id = batches
            .iter()
            .filter_map(|b| b.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        batch.id = next_id.to_string();
        let persisted = PersistedBatch {
            batch_id: batch.id.clone(),
            batch_number: batch.batch_number.clone(),
        };
        batches.push(batch);
        self.write(BATCHES_FILE, &batches).await?;
        debug!(dir = %self.dir.display(), batch_id = %persisted.batch_id, "wrote batch");
        Ok(persisted)
    }

    async fn update_workflow_status(
        &self,
        lab_numbers: &[String],
        status: &WorkflowStatus,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut statuses: BTreeMap<String, WorkflowStatus> = self.read(STATUS_FILE).await?;
        for lab in lab_numbers {
            statuses.insert(lab.clone(), status.clone());
        }
        self.write(STATUS_FILE, &statuses).await
    }
}
