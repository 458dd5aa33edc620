//! Collectors: one per entropy source.
//!
//! A collector fetches one source and shapes it into a JSON payload. The
//! pipeline wraps every collector in the same retry policy and stores the
//! result as a source record. Network collectors for third-party APIs
//! implement [`Collector`] outside this crate.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use observable_entropy_core::is_hash_hex;
use observable_entropy_remote::ArtifactSource;

/// A source of entropy.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Source name; becomes the key under `data` and the record file name.
    fn name(&self) -> &str;

    /// Fetch and shape the payload. Called once per attempt.
    async fn collect(&self) -> anyhow::Result<Value>;
}

/// Capture time, `{"capturedAt": "2024-01-01T00:00:00.000Z"}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampCollector;

#[async_trait]
impl Collector for TimestampCollector {
    fn name(&self) -> &str {
        "timestamp"
    }

    async fn collect(&self) -> anyhow::Result<Value> {
        Ok(json!({
            "capturedAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }))
    }
}

/// Hash and URI of the latest published artifact, chaining each run to
/// the one before it.
pub struct PreviousCollector<A> {
    artifacts: A,
}

impl<A: ArtifactSource> PreviousCollector<A> {
    pub fn new(artifacts: A) -> Self {
        Self { artifacts }
    }
}

#[async_trait]
impl<A: ArtifactSource> Collector for PreviousCollector<A> {
    fn name(&self) -> &str {
        "previous"
    }

    async fn collect(&self) -> anyhow::Result<Value> {
        let latest = self.artifacts.fetch_latest().await?;
        let hash = latest
            .get("hash")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("latest artifact has no hash"))?;
        if !is_hash_hex(hash) {
            anyhow::bail!("latest artifact hash is not a sha-256 hex digest");
        }

        let uri = self.artifacts.artifact_uri(hash)?;
        Ok(json!({
            "hash": hash,
            "uri": uri.as_str(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use observable_entropy_core::KnownSource;
    use observable_entropy_remote::MemoryArtifactSource;

    #[tokio::test]
    async fn test_timestamp_shape() {
        let payload = TimestampCollector.collect().await.unwrap();
        let captured = payload["capturedAt"].as_str().unwrap();
        assert!(captured.ends_with('Z'));
        // 2024-01-01T00:00:00.000Z
        assert_eq!(captured.len(), 24);
        assert!(KnownSource::parse("timestamp", &payload).is_ok());
    }

    #[tokio::test]
    async fn test_previous_links_latest() {
        let source = MemoryArtifactSource::new("https://entropy.example").unwrap();
        let hash = "ab".repeat(32);
        source.put(hash.clone(), json!({ "hash": hash })).await;

        let collector = PreviousCollector::new(source);
        let payload = collector.collect().await.unwrap();
        assert_eq!(payload["hash"], json!(hash));
        assert_eq!(payload["uri"], json!(format!("https://entropy.example/{}", hash)));
        assert!(KnownSource::parse("previous", &payload).is_ok());
    }

    #[tokio::test]
    async fn test_previous_fails_without_latest() {
        let source = MemoryArtifactSource::new("https://e.example").unwrap();
        let collector = PreviousCollector::new(source);
        assert!(collector.collect().await.is_err());
    }

    #[tokio::test]
    async fn test_previous_rejects_bad_hash() {
        let source = MemoryArtifactSource::new("https://e.example").unwrap();
        source.put("x", json!({"hash": "not-a-hash"})).await;
        assert!(PreviousCollector::new(source).collect().await.is_err());
    }
}
