//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::{Arc, Once};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use observable_entropy_core::{
    sign_artifact, AggregateDocument, CanonicalizationError, Ed25519PublicKey, Environment,
    KeyHandle, KeyRecord, Keypair, PrivateKey, SignError, SignedArtifact, SourceName,
    SourceRecord,
};
use observable_entropy_remote::MemoryKeyRegistry;
use observable_entropy_store::{SourceStore, StoreError};

/// A signer with a key registry it can attest itself in.
pub struct TestFixture {
    pub seed: [u8; 32],
    pub keypair: Keypair,
    pub registry: Arc<MemoryKeyRegistry>,
}

impl TestFixture {
    /// Create a new test fixture with a random key.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create with a deterministic key from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::with_registry(seed, Arc::new(MemoryKeyRegistry::new()))
    }

    /// Create with a deterministic key sharing an existing registry.
    pub fn with_registry(seed: [u8; 32], registry: Arc<MemoryKeyRegistry>) -> Self {
        Self {
            seed,
            keypair: Keypair::from_seed(&seed),
            registry,
        }
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    pub fn handle(&self) -> KeyHandle {
        KeyHandle::derive(&self.keypair.public_key())
    }

    pub fn private_key(&self) -> PrivateKey {
        self.keypair.private_key()
    }

    /// The private key as a signer would receive it from its environment.
    pub fn private_key_base64(&self) -> String {
        BASE64.encode(self.seed)
    }

    /// Publish a production key record for this key.
    pub async fn attest(&self) -> Result<KeyRecord, CanonicalizationError> {
        self.registry
            .attest(&self.keypair, Environment::Production)
            .await
    }

    /// Sign a document with this key.
    pub fn sign(&self, doc: &AggregateDocument) -> Result<SignedArtifact, SignError> {
        sign_artifact(doc, &self.keypair.private_key())
    }

    /// Sign the scenario document and return the artifact in wire form.
    pub fn signed_scenario(&self) -> Result<Value, SignError> {
        Ok(self.sign(&scenario_doc())?.to_value())
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple signers attesting in one shared registry.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    let registry = Arc::new(MemoryKeyRegistry::new());
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_registry(seed, Arc::clone(&registry))
        })
        .collect()
}

/// `{"bitcoin": {"height": 700000}, "timestamp": {"capturedAt": "2024-01-01T00:00:00Z"}}`
pub fn scenario_doc() -> AggregateDocument {
    let mut doc = AggregateDocument::new();
    doc.insert("bitcoin", json!({"height": 700000}));
    doc.insert("timestamp", json!({"capturedAt": "2024-01-01T00:00:00Z"}));
    doc
}

/// Source records for every entry in a document.
pub fn records_from(doc: &AggregateDocument) -> Vec<SourceRecord> {
    doc.data
        .iter()
        .filter_map(|(name, payload)| {
            SourceName::new(name.as_str())
                .ok()
                .map(|name| SourceRecord::new(name, payload.clone()))
        })
        .collect()
}

/// Store one record per document entry.
pub async fn populate<S: SourceStore + ?Sized>(
    store: &S,
    doc: &AggregateDocument,
) -> Result<(), StoreError> {
    for record in records_from(doc) {
        store.put(&record).await?;
    }
    Ok(())
}

/// Install a test tracing subscriber once per process.
///
/// Filtered by `RUST_LOG`, `warn` when unset.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use observable_entropy_core::{crypto, decode_private_key};
    use observable_entropy_remote::KeyRegistry;
    use observable_entropy_store::MemorySourceStore;

    #[test]
    fn test_fixture_signs_scenario() {
        let fixture = TestFixture::with_seed([0x42; 32]);
        let artifact = fixture.sign(&scenario_doc()).unwrap();

        assert_eq!(
            artifact.hash_hex(),
            "ed19e0138d4f4c354751c1a5daa9a0fd18106218c793b1b7588f3a47768f721b"
        );
        assert_eq!(fixture.handle().as_str(), "3097e2de");
        assert!(crypto::verify(&fixture.public_key(), &artifact.hash, &artifact.signature));
    }

    #[test]
    fn test_private_key_base64_decodes_to_same_key() {
        let fixture = TestFixture::new();
        let decoded = decode_private_key(&fixture.private_key_base64()).unwrap();
        assert_eq!(decoded.public_key(), fixture.public_key());
    }

    #[tokio::test]
    async fn test_attest_registers_handle() {
        let fixture = TestFixture::new();
        let record = fixture.attest().await.unwrap();

        assert_eq!(record.handle, fixture.handle().as_str());
        let found = fixture.registry.lookup(&fixture.handle()).await.unwrap();
        assert_eq!(found, Some(record));
    }

    #[tokio::test]
    async fn test_multi_party_shares_registry() {
        let parties = multi_party_fixtures(3);
        for party in &parties {
            party.attest().await.unwrap();
        }

        let pks: Vec<_> = parties.iter().map(|p| p.public_key()).collect();
        assert_ne!(pks[0], pks[1]);
        assert_ne!(pks[1], pks[2]);
        assert_ne!(pks[0], pks[2]);

        for party in &parties {
            let found = parties[0].registry.lookup(&party.handle()).await.unwrap();
            assert_eq!(found.map(|r| r.public_key), Some(party.public_key()));
        }
    }

    #[tokio::test]
    async fn test_populate_store() {
        let store = MemorySourceStore::new();
        populate(&store, &scenario_doc()).await.unwrap();

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name.to_string())
            .collect();
        assert_eq!(names, vec!["bitcoin", "timestamp"]);
    }

    #[tokio::test]
    async fn test_populate_fs_store_writes_one_file_per_source() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = observable_entropy_store::FsSourceStore::new(dir.path());
        populate(&store, &scenario_doc()).await.unwrap();

        assert!(dir.path().join("bitcoin.json").is_file());
        assert!(dir.path().join("timestamp.json").is_file());
    }
}
