//! # Observable Entropy Store
//!
//! Storage for the collection side of the pipeline: per-source records,
//! artifact files, and artifact publishing.
//!
//! ## Key Types
//!
//! - [`SourceStore`] - The async trait for source record persistence
//! - [`FsSourceStore`] - One `{name}.json` file per source
//! - [`MemorySourceStore`] - In-memory storage for tests
//! - [`ArtifactPublisher`] - Destination for signed artifacts
//! - [`DirectoryPublisher`] / [`MemoryPublisher`] - Publisher implementations
//!
//! ## Usage
//!
//! ```rust,no_run
//! use observable_entropy_store::{FsSourceStore, SourceStore};
//! use observable_entropy_core::{SourceName, SourceRecord};
//! use serde_json::json;
//!
//! async fn example() -> observable_entropy_store::Result<()> {
//!     let store = FsSourceStore::new("./entropy");
//!     let name = SourceName::new("bitcoin")?;
//!     store.put(&SourceRecord::new(name, json!({"height": 700000}))).await?;
//!     let records = store.list().await?;
//!     assert_eq!(records.len(), 1);
//!     Ok(())
//! }
//! ```

pub mod artifact_file;
pub mod error;
pub mod fs;
pub mod memory;
pub mod publish;
pub mod traits;

pub use artifact_file::{read_aggregate, read_artifact_value, write_aggregate, write_artifact};
pub use error::{Result, StoreError};
pub use fs::FsSourceStore;
pub use memory::MemorySourceStore;
pub use publish::{
    content_key, ArtifactPublisher, DirectoryPublisher, MemoryPublisher, Published, LATEST_KEY,
};
pub use traits::SourceStore;
