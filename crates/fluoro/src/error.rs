//! Error types for the Fluoro library.

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::EngineError;
use crate::property::Property;
use crate::schema::ColumnType;

/// Main error type for Fluoro operations.
#[derive(Debug, Error)]
pub enum FluoroError {
    /// Invalid or incomplete execution settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The identifier column is not declared as a molecule column.
    #[error("Type mismatch: column '{column}' is {declared} instead of SMILES, please type cast")]
    TypeMismatch { column: String, declared: ColumnType },

    /// A row has no identifier and the batch is configured to fail on nulls.
    #[error("Row {row}: SMILES in column '{column}' cannot be empty")]
    NullIdentifier { row: usize, column: String },

    /// The inference engine rejected or could not process an identifier.
    #[error("Row {row}: {property} prediction failed for SMILES '{identifier}': {source}")]
    Inference {
        row: usize,
        identifier: String,
        property: Property,
        #[source]
        source: EngineError,
    },

    /// The host cancelled the batch.
    #[error("Cancelled before row {row}")]
    Cancelled { row: usize },

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to predict on.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error saving or loading settings.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// An internal invariant did not hold.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FluoroError {
    /// Short name of the error kind, for host-side reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            FluoroError::Configuration(_) => "configuration",
            FluoroError::TypeMismatch { .. } => "type_mismatch",
            FluoroError::NullIdentifier { .. } => "null_identifier",
            FluoroError::Inference { .. } => "inference",
            FluoroError::Cancelled { .. } => "cancelled",
            FluoroError::Io { .. }
            | FluoroError::Csv(_)
            | FluoroError::EmptyData(_)
            | FluoroError::Json(_)
            | FluoroError::Persistence(_) => "io",
            FluoroError::Internal(_) => "internal",
        }
    }
}

/// Result type alias for Fluoro operations.
pub type Result<T> = std::result::Result<T, FluoroError>;
