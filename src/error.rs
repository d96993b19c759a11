//! Error types for calidad.

use std::path::PathBuf;

/// Result type alias for calidad operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in calidad operations.
///
/// The assessment engine itself never fails: unparseable values, empty
/// series and zero-variance data all degrade to "no issue detected" inside
/// the dimension checkers. Errors surface only at the boundary: loading a
/// dataset, naming a dimension that does not exist, or exporting a report.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        /// The path where the error occurred, if known.
        path: Option<PathBuf>,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Arrow error during data processing.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Unknown dimension name passed to the engine.
    ///
    /// This is a contract error and fails fast rather than degrading.
    #[error("Unknown dimension '{name}' (expected one of: completeness, consistency, accuracy, security, timeliness, usability)")]
    UnknownDimension {
        /// The unrecognized dimension name.
        name: String,
    },

    /// Empty dataset error (no batches to construct a dataset from).
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Schema mismatch between record batches.
    #[error("Schema mismatch: {message}")]
    SchemaMismatch {
        /// Description of the schema mismatch.
        message: String,
    },

    /// Report serialization error.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// Create an I/O error with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: Some(path.into()),
            source,
        }
    }

    /// Create an unknown dimension error.
    pub fn unknown_dimension(name: impl Into<String>) -> Self {
        Self::UnknownDimension { name: name.into() }
    }

    /// Create a schema mismatch error.
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }
}
