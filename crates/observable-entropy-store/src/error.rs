//! Error types for the store module.

use observable_entropy_core::{CanonicalizationError, SchemaError};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored file is not valid JSON.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be written in canonical form.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A stored document does not have the expected shape.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
