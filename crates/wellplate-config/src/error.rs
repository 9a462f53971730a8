use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("unsupported session file extension for {path} (expected .yaml, .yml or .json)")]
    UnsupportedExtension { path: PathBuf },

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("\"{field}\" is invalid: {message}")]
    InvalidField { field: String, message: String },

    #[error("sample {lab_number} is listed more than once")]
    DuplicateSample { lab_number: String },

    #[error("\"{at}\" refers to sample {lab_number}, which is not in the samples list")]
    UnknownSample { at: String, lab_number: String },

    #[error("group refers to case {case_number}, which no sample belongs to")]
    UnknownCase { case_number: String },

    #[error("sample {lab_number} is placed by more than one placement or group")]
    PlacedTwice { lab_number: String },
}
