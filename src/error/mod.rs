//! Error handling for record-sample loading and year advancement.

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;

/// Specialized error type for record samples
///
/// Every failure is raised synchronously during construction or an explicit
/// state transition; nothing is caught or retried internally. A failed
/// construction yields no usable sample.
#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    /// Input was not supplied in a usable form
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A required variable is absent after column classification
    #[error("schema error: {0}")]
    Schema(String),

    /// A cross-field identity is violated beyond tolerance
    #[error("data consistency error: {0}")]
    DataConsistency(String),

    /// Neither the filesystem nor the packaged data directory has the file
    #[error("resource not found: {}", .0.display())]
    ResourceNotFound(PathBuf),

    /// Column-store lookup for a name outside the schema registry
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// The factor table has no entry for the requested column and year
    #[error("no {name} factor for year {year}")]
    MissingFactor {
        /// Factor column name
        name: String,
        /// Requested calendar year
        year: i64,
    },

    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error processing Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

/// Result type for record-sample operations
pub type Result<T> = std::result::Result<T, RecordsError>;
