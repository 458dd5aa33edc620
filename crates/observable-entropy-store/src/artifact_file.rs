//! Artifact and aggregate files.
//!
//! Both are written as canonical JSON so the bytes on disk are exactly the
//! bytes that would be published.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use observable_entropy_core::{canonicalize, AggregateDocument, SignedArtifact};

use crate::error::{Result, StoreError};

/// Write a signed artifact, creating parent directories as needed.
pub async fn write_artifact(path: impl AsRef<Path>, artifact: &SignedArtifact) -> Result<()> {
    let path = path.as_ref();
    let bytes = artifact.to_canonical_bytes()?;
    write_file(path, &bytes).await?;
    debug!(path = %path.display(), hash = %artifact.hash, "artifact written");
    Ok(())
}

/// Read an artifact file as untyped JSON.
///
/// No validation is done here; the verifier parses the value.
pub async fn read_artifact_value(path: impl AsRef<Path>) -> Result<Value> {
    read_json(path.as_ref()).await
}

/// Write a combined, unsigned document.
pub async fn write_aggregate(path: impl AsRef<Path>, doc: &AggregateDocument) -> Result<()> {
    let path = path.as_ref();
    let bytes = canonicalize(&doc.to_value())?;
    write_file(path, &bytes).await?;
    debug!(path = %path.display(), sources = doc.len(), "aggregate written");
    Ok(())
}

/// Read a combined, unsigned document.
pub async fn read_aggregate(path: impl AsRef<Path>) -> Result<AggregateDocument> {
    let value = read_json(path.as_ref()).await?;
    Ok(AggregateDocument::from_value(&value)?)
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

async fn read_json(path: &Path) -> Result<Value> {
    let bytes = tokio::fs::read(path).await?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use observable_entropy_core::{parse_signed_artifact, sign_artifact, Keypair};
    use serde_json::json;
    use tempfile::TempDir;

    fn doc() -> AggregateDocument {
        let mut doc = AggregateDocument::new();
        doc.insert("timestamp", json!({"capturedAt": "2024-01-01T00:00:00Z"}));
        doc
    }

    #[tokio::test]
    async fn test_artifact_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/entropy.json");
        let keypair = Keypair::from_seed(&[0x31; 32]);
        let artifact = sign_artifact(&doc(), &keypair.private_key()).unwrap();

        write_artifact(&path, &artifact).await.unwrap();
        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(on_disk, artifact.to_canonical_bytes().unwrap());

        let value = read_artifact_value(&path).await.unwrap();
        assert_eq!(parse_signed_artifact(&value, false).unwrap(), artifact);
    }

    #[tokio::test]
    async fn test_aggregate_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entropy.json");
        write_aggregate(&path, &doc()).await.unwrap();
        assert_eq!(read_aggregate(&path).await.unwrap(), doc());
    }

    #[tokio::test]
    async fn test_read_missing_and_invalid() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_artifact_value(dir.path().join("nope.json")).await,
            Err(StoreError::Io(_))
        ));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            read_artifact_value(&path).await,
            Err(StoreError::Json { .. })
        ));

        std::fs::write(&path, r#"{"data": []}"#).unwrap();
        assert!(matches!(read_aggregate(&path).await, Err(StoreError::Schema(_))));
    }
}
