//! Error types for Observable Entropy core.

use thiserror::Error;

/// A value has no canonical JSON representation.
///
/// For values that already passed schema validation this is unreachable,
/// so callers on the signing path treat it as fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CanonicalizationError {
    #[error("nesting depth exceeds maximum of {0}")]
    DepthExceeded(usize),

    #[error("non-finite number has no canonical form: {0}")]
    NonFiniteNumber(String),

    #[error("value has no JSON representation: {0}")]
    Unrepresentable(String),
}

/// Low-level failures decoding or checking key and signature material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// An untrusted document failed to parse into its typed form.
///
/// Reports the first invalid field encountered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },
}

impl SchemaError {
    pub(crate) fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that abort signing. An artifact is never produced when one occurs.
#[derive(Debug, Error)]
pub enum SignError {
    #[error("no canonical data: {0}")]
    NoCanonicalData(#[from] CanonicalizationError),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(#[from] CryptoError),
}
