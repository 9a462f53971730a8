//! Tab-delimited instrument-import template for finalized plates.

pub mod config;
pub mod naming;
pub mod template;

pub use config::InstrumentConfig;
pub use template::{render_batch, render_plate, render_wells, template_filename};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("batch {batch_number} has no occupied wells to export")]
    EmptyPlate { batch_number: String },

    #[error("{field} {value:?} contains a tab or line break")]
    DelimiterInField { field: String, value: String },

    #[error("reference prefix {prefix:?} does not form a valid pattern: {source}")]
    InvalidReferencePrefix {
        prefix: String,
        #[source]
        source: regex::Error,
    },
}
