use thiserror::Error;
use wellplate_core::{GridError, PlateKind, WellId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(
        "not enough space for a group of {required} starting at {start}: only {available} empty wells found"
    )]
    InsufficientSpace {
        start: WellId,
        required: usize,
        available: usize,
    },

    #[error(
        "sample {lab_number} is not eligible for a {kind} plate (status {status}, lab batch {lab_batch})"
    )]
    Ineligible {
        lab_number: String,
        kind: PlateKind,
        status: String,
        lab_batch: String,
    },

    #[error("sample {lab_number} is already on the plate at {well}")]
    SampleAlreadyPlaced { lab_number: String, well: WellId },

    #[error("sample {lab_number} appears more than once in the placement")]
    DuplicateSample { lab_number: String },

    #[error("a family group needs at least one sample")]
    EmptyGroup,
}
