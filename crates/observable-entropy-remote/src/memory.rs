//! In-memory registry and artifact source for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use url::Url;

use observable_entropy_core::{CanonicalizationError, Environment, KeyHandle, KeyRecord, Keypair};

use crate::artifacts::{parse_base_url, resource_url, ArtifactSource};
use crate::error::{RemoteError, Result};
use crate::registry::KeyRegistry;

/// In-memory key registry.
///
/// Can be switched offline to simulate transport failures.
#[derive(Default)]
pub struct MemoryKeyRegistry {
    records: RwLock<HashMap<String, KeyRecord>>,
    offline: AtomicBool,
}

impl MemoryKeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue and store a self-signed record for a keypair.
    pub async fn attest(
        &self,
        keypair: &Keypair,
        environment: Environment,
    ) -> std::result::Result<KeyRecord, CanonicalizationError> {
        let record = KeyRecord::issue(keypair, environment)?;
        self.insert(record.clone()).await;
        Ok(record)
    }

    /// Store a record under its own `handle` field, as-is.
    pub async fn insert(&self, record: KeyRecord) {
        self.records
            .write()
            .await
            .insert(record.handle.clone(), record);
    }

    /// Store a record under an arbitrary handle.
    pub async fn insert_at(&self, handle: &KeyHandle, record: KeyRecord) {
        self.records
            .write()
            .await
            .insert(handle.as_str().to_string(), record);
    }

    pub async fn remove(&self, handle: &KeyHandle) -> Option<KeyRecord> {
        self.records.write().await.remove(handle.as_str())
    }

    /// Mark the record for a handle expired.
    pub async fn expire(&self, handle: &KeyHandle) -> bool {
        match self.records.write().await.get_mut(handle.as_str()) {
            Some(record) => {
                record.expired = true;
                true
            }
            None => false,
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyRegistry for MemoryKeyRegistry {
    async fn lookup(&self, handle: &KeyHandle) -> Result<Option<KeyRecord>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("registry offline".into()));
        }
        Ok(self.records.read().await.get(handle.as_str()).cloned())
    }
}

/// In-memory artifact source.
pub struct MemoryArtifactSource {
    base: Url,
    latest: RwLock<Option<Value>>,
    by_hash: RwLock<HashMap<String, Value>>,
}

impl MemoryArtifactSource {
    /// `base_uri` is where artifacts would be published; it only shapes
    /// [`ArtifactSource::artifact_uri`].
    pub fn new(base_uri: &str) -> Result<Self> {
        Ok(Self {
            base: parse_base_url(base_uri)?,
            latest: RwLock::new(None),
            by_hash: RwLock::new(HashMap::new()),
        })
    }

    /// Store an artifact under `hash` and make it the latest.
    pub async fn put(&self, hash: impl Into<String>, artifact: Value) {
        self.by_hash
            .write()
            .await
            .insert(hash.into(), artifact.clone());
        *self.latest.write().await = Some(artifact);
    }
}

#[async_trait]
impl ArtifactSource for MemoryArtifactSource {
    async fn fetch_latest(&self) -> Result<Value> {
        self.latest
            .read()
            .await
            .clone()
            .ok_or_else(|| RemoteError::NotFound("latest".into()))
    }

    async fn fetch_by_hash(&self, hash: &str) -> Result<Value> {
        self.by_hash
            .read()
            .await
            .get(hash)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(hash.to_string()))
    }

    fn artifact_uri(&self, hash: &str) -> Result<Url> {
        resource_url(&self.base, hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_attest_and_lookup() {
        let registry = MemoryKeyRegistry::new();
        let keypair = Keypair::from_seed(&[0x61; 32]);
        let handle = KeyHandle::derive(&keypair.public_key());

        assert_eq!(registry.lookup(&handle).await.unwrap(), None);

        let record = registry
            .attest(&keypair, Environment::Production)
            .await
            .unwrap();
        assert_eq!(record.handle, handle.as_str());
        assert_eq!(registry.lookup(&handle).await.unwrap(), Some(record));

        assert!(registry.expire(&handle).await);
        assert!(registry.lookup(&handle).await.unwrap().unwrap().expired);

        registry.remove(&handle).await;
        assert_eq!(registry.lookup(&handle).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_offline_registry() {
        let registry = MemoryKeyRegistry::new();
        let keypair = Keypair::from_seed(&[0x62; 32]);
        registry
            .attest(&keypair, Environment::Staging)
            .await
            .unwrap();
        registry.set_offline(true);

        let handle = KeyHandle::derive(&keypair.public_key());
        assert!(matches!(
            registry.lookup(&handle).await,
            Err(RemoteError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_artifact_source() {
        let source = MemoryArtifactSource::new("https://entropy.example/").unwrap();
        assert!(matches!(source.fetch_latest().await, Err(RemoteError::NotFound(_))));

        source.put("aa", json!({"n": 1})).await;
        source.put("bb", json!({"n": 2})).await;

        assert_eq!(source.fetch_latest().await.unwrap(), json!({"n": 2}));
        assert_eq!(source.fetch_by_hash("aa").await.unwrap(), json!({"n": 1}));
        assert!(source.fetch_by_hash("cc").await.is_err());
        assert_eq!(
            source.artifact_uri("aa").unwrap().as_str(),
            "https://entropy.example/aa"
        );
        assert!(MemoryArtifactSource::new("entropy.example").is_err());
    }
}
