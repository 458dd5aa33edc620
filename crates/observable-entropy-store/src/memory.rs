//! In-memory implementation of the SourceStore trait.
//!
//! This is primarily for testing. Same semantics as the filesystem store,
//! no persistence.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use observable_entropy_core::{SourceName, SourceRecord};

use crate::error::Result;
use crate::traits::SourceStore;

/// In-memory store. All records are lost when the store is dropped.
#[derive(Default)]
pub struct MemorySourceStore {
    records: RwLock<BTreeMap<SourceName, serde_json::Value>>,
}

impl MemorySourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SourceStore for MemorySourceStore {
    async fn put(&self, record: &SourceRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.name.clone(), record.payload.clone());
        Ok(())
    }

    async fn get(&self, name: &SourceName) -> Result<Option<SourceRecord>> {
        let records = self.records.read().await;
        Ok(records
            .get(name)
            .map(|payload| SourceRecord::new(name.clone(), payload.clone())))
    }

    async fn list(&self) -> Result<Vec<SourceRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .map(|(name, payload)| SourceRecord::new(name.clone(), payload.clone()))
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        self.records.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str, payload: serde_json::Value) -> SourceRecord {
        SourceRecord::new(SourceName::new(name).unwrap(), payload)
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemorySourceStore::new();
        store.put(&record("bitcoin", json!({"height": 1}))).await.unwrap();

        let name = SourceName::new("bitcoin").unwrap();
        let got = store.get(&name).await.unwrap().unwrap();
        assert_eq!(got.payload, json!({"height": 1}));
        assert!(store
            .get(&SourceName::new("stellar").unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_memory_store_overwrite_and_clear() {
        let store = MemorySourceStore::new();
        store.put(&record("bitcoin", json!({"height": 1}))).await.unwrap();
        store.put(&record("bitcoin", json!({"height": 2}))).await.unwrap();
        store.put(&record("timestamp", json!({"capturedAt": "x"}))).await.unwrap();
        assert_eq!(store.len().await, 2);

        store.clear().await.unwrap();
        assert!(store.is_empty().await);
        assert!(store.list().await.unwrap().is_empty());
        store.clear().await.unwrap();
    }
}
