//! SourceStore trait: the abstract interface for source record persistence.
//!
//! Collectors write one record per source; the combiner reads them all back.
//! Implementations include the filesystem (primary) and in-memory (for tests).

use async_trait::async_trait;
use observable_entropy_core::{SourceName, SourceRecord};

use crate::error::Result;

/// Async interface for source record persistence.
///
/// # Design Notes
///
/// - **One record per name**: `put` overwrites any existing record for the source.
/// - **Unordered listing**: `list` order carries no meaning; canonicalization
///   fixes key order downstream.
/// - **Idempotent clear**: clearing an empty or missing store succeeds.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Store a record, replacing any previous record with the same name.
    async fn put(&self, record: &SourceRecord) -> Result<()>;

    /// Get a record by source name.
    async fn get(&self, name: &SourceName) -> Result<Option<SourceRecord>>;

    /// All stored records.
    async fn list(&self) -> Result<Vec<SourceRecord>>;

    /// Remove every record.
    async fn clear(&self) -> Result<()>;
}
