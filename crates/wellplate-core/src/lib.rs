//! Plate grid model and the sample/control data it holds.

mod occupant;
mod plate;
mod well;

use thiserror::Error;

pub use occupant::{
    Control, Occupant, PlateKind, Relation, Sample, WorkflowStatus, ELECTROPHORESIS_BATCH_PREFIX,
};
pub use plate::Plate;
pub use well::{WellId, COLUMNS, ROWS, WELL_COUNT};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("well {well} is already occupied by {occupant}")]
    WellOccupied { well: WellId, occupant: String },

    #[error("\"{id}\" is not a well on a 96-well plate (A01..H12)")]
    InvalidWell { id: String },
}
