//! Error types for the pipeline.

use observable_entropy_core::{SchemaError, SignError};
use observable_entropy_remote::RemoteError;
use observable_entropy_store::StoreError;
use thiserror::Error;

use crate::retry::RetriesExhausted;

/// Errors that abort a pipeline step.
///
/// Collection failures never appear here; they are absorbed into a
/// [`CollectionReport`](crate::pipeline::CollectionReport).
#[derive(Debug, Error)]
pub enum EntropyError {
    /// Signing failed. Nothing may be published.
    #[error("signing error: {0}")]
    Sign(#[from] SignError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Remote service error.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Document failed schema validation.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, EntropyError>;

/// A source that could not be captured. The source is omitted from the
/// aggregate; the run continues.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("{source_name}: {error}")]
    Exhausted {
        source_name: String,
        error: RetriesExhausted<anyhow::Error>,
    },

    #[error("{source_name}: invalid payload: {error}")]
    InvalidPayload {
        source_name: String,
        error: SchemaError,
    },

    #[error("{source_name}: could not store record: {error}")]
    Store {
        source_name: String,
        error: StoreError,
    },
}

impl CollectionError {
    pub fn source_name(&self) -> &str {
        match self {
            CollectionError::Exhausted { source_name, .. }
            | CollectionError::InvalidPayload { source_name, .. }
            | CollectionError::Store { source_name, .. } => source_name,
        }
    }
}
