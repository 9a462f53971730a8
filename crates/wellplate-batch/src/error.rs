use thiserror::Error;
use wellplate_core::PlateKind;

/// Failures reported by a [`crate::BatchStore`] backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("batch number {batch_number} is already taken")]
    DuplicateBatchNumber { batch_number: String },

    #[error("batch {batch_id} not found")]
    NotFound { batch_id: String },

    #[error("store rejected the request: {message}")]
    Rejected { message: String },

    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("cannot finalize a plate with no samples")]
    NoSamples,

    #[error("batch number {batch_number} does not belong to a {kind} plate")]
    KindMismatch {
        batch_number: String,
        kind: PlateKind,
    },

    #[error("batch number {batch_number} is already taken")]
    DuplicateBatchNumber { batch_number: String },

    #[error("source batch {batch_id} not found")]
    SourceNotFound { batch_id: String },

    #[error("batch {batch_number} is not an electrophoresis batch and cannot seed a rerun")]
    InvalidSource { batch_number: String },

    #[error("failed to persist batch: {message}")]
    Persistence { message: String },
}

impl From<StoreError> for BatchError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateBatchNumber { batch_number } => {
                BatchError::DuplicateBatchNumber { batch_number }
            }
            StoreError::NotFound { batch_id } => BatchError::SourceNotFound { batch_id },
            other => BatchError::Persistence {
                message: other.to_string(),
            },
        }
    }
}
