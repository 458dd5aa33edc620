//! Key registry abstraction.
//!
//! The registry maps key handles to self-attested key records. The verifier
//! derives a handle from an artifact's embedded public key and looks it up
//! here; it never trusts the embedded key on its own.

use async_trait::async_trait;
use observable_entropy_core::{KeyHandle, KeyRecord};

use crate::error::Result;

/// Lookup of key records by handle.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait KeyRegistry: Send + Sync {
    /// Look up the record for a handle.
    ///
    /// Returns `Ok(None)` when no record exists. Transport failures are
    /// errors, distinct from absence.
    async fn lookup(&self, handle: &KeyHandle) -> Result<Option<KeyRecord>>;
}
