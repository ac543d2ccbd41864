//! The error taxonomy of the data pipeline.

use std::{io, path::PathBuf, result};
use thiserror::Error as DeriveError;

pub type Result<T> = result::Result<T, Error>;

/// All errors that can occur while building or accessing a dataset.
#[derive(Debug, DeriveError)]
pub enum Error {
    /// Bad or missing dataset configuration, e.g. an empty pathology list or
    /// a pathology naming a column absent from the annotations table.
    #[error("invalid dataset configuration: {reason}")]
    Configuration { reason: String },

    /// The metadata and annotations tables cannot be joined or looked up
    /// consistently.
    #[error("data integrity error: {reason}")]
    DataIntegrity { reason: String },

    /// The image file backing a sample does not exist.
    #[error("image file '{}' not found", path.display())]
    ImageNotFound { path: PathBuf },

    /// The image file exists but its bytes cannot be decoded.
    #[error("cannot decode image file '{}': {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    /// Dataset access with an index outside `[0, size())`.
    #[error("index {index} out of range for dataset of size {size}")]
    OutOfRange { index: usize, size: usize },

    /// Internal consistency fault. Must never occur in correct operation and
    /// is not a recoverable condition.
    #[error("invariant violation: {reason}")]
    InvariantViolation { reason: String },

    #[error("cannot read table: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Tch(#[from] tch::TchError),
}

impl Error {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn data_integrity(reason: impl Into<String>) -> Self {
        Self::DataIntegrity {
            reason: reason.into(),
        }
    }

    pub fn invariant(reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            reason: reason.into(),
        }
    }
}
