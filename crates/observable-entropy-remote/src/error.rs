//! Error types for remote lookups.

use thiserror::Error;

/// Errors from the key registry and artifact clients.
///
/// A missing key record is not an error; `lookup` returns `Ok(None)`.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport failure or unexpected status.
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The registry returned a body that is not a valid key record.
    #[error("invalid key record: {0}")]
    InvalidRecord(String),

    /// The artifact endpoint returned a body that is not JSON.
    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    /// No artifact under the requested key.
    #[error("artifact not found: {0}")]
    NotFound(String),

    /// A base URL that is not an absolute http(s) URL, or a path segment
    /// that cannot be appended to one.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteError::Timeout
        } else {
            RemoteError::Unavailable(e.to_string())
        }
    }
}

/// Result type for remote operations.
pub type Result<T> = std::result::Result<T, RemoteError>;
