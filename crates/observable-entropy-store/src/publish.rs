//! Artifact publishing.
//!
//! Every artifact is published under two keys:
//!
//! - `{hash}.json` - content-addressed, immutable
//! - `latest.json` - overwritten on every publish

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use observable_entropy_core::SignedArtifact;

use crate::error::Result;

/// Key of the mutable pointer to the most recent artifact.
pub const LATEST_KEY: &str = "latest.json";

/// Content-addressed key of an artifact.
pub fn content_key(artifact: &SignedArtifact) -> String {
    format!("{}.json", artifact.hash_hex())
}

/// Keys written by a publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub content_key: String,
    pub latest_key: String,
}

/// Destination for signed artifacts.
#[async_trait]
pub trait ArtifactPublisher: Send + Sync {
    /// Publish the canonical artifact under its content key and `latest.json`.
    async fn publish(&self, artifact: &SignedArtifact) -> Result<Published>;
}

/// Publishes into a local directory, standing in for an object store.
#[derive(Debug, Clone)]
pub struct DirectoryPublisher {
    root: PathBuf,
}

impl DirectoryPublisher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactPublisher for DirectoryPublisher {
    async fn publish(&self, artifact: &SignedArtifact) -> Result<Published> {
        let bytes = artifact.to_canonical_bytes()?;
        tokio::fs::create_dir_all(&self.root).await?;

        let content_key = content_key(artifact);
        let content_path = self.root.join(&content_key);
        if tokio::fs::try_exists(&content_path).await? {
            debug!(key = %content_key, "content key already published");
        } else {
            tokio::fs::write(&content_path, &bytes).await?;
        }
        tokio::fs::write(self.root.join(LATEST_KEY), &bytes).await?;

        info!(hash = %artifact.hash, root = %self.root.display(), "artifact published");
        Ok(Published {
            content_key,
            latest_key: LATEST_KEY.to_string(),
        })
    }
}

/// In-memory publisher for tests.
#[derive(Default)]
pub struct MemoryPublisher {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored under a key.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).cloned()
    }

    /// All stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl ArtifactPublisher for MemoryPublisher {
    async fn publish(&self, artifact: &SignedArtifact) -> Result<Published> {
        let bytes = artifact.to_canonical_bytes()?;
        let content_key = content_key(artifact);

        let mut objects = self.objects.write().await;
        objects
            .entry(content_key.clone())
            .or_insert_with(|| bytes.clone());
        objects.insert(LATEST_KEY.to_string(), bytes);

        Ok(Published {
            content_key,
            latest_key: LATEST_KEY.to_string(),
        })
    }
}
