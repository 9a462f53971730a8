//! Batch numbering, finalization of filled plates into persisted batches,
//! and loading of electrophoresis batches as rerun sources.

mod error;
mod lifecycle;
mod memory;
mod model;
mod numbering;
mod store;

pub use error::{BatchError, StoreError};
pub use lifecycle::{
    build_batch, finalized_status, BatchLifecycle, BatchMeta, FinalizedBatch, StatusUpdate,
};
pub use memory::InMemoryBatchStore;
pub use model::{Batch, BatchKind, PersistedBatch, SourceBatch, WellEntry};
pub use numbering::{BatchNumber, InvalidBatchNumber};
pub use store::BatchStore;
