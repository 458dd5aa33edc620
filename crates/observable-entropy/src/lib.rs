//! # Observable Entropy
//!
//! Aggregate unpredictable public values into one signed, dated document,
//! and let anyone verify it later.
//!
//! ## Overview
//!
//! - **Collect**: each [`Collector`] fetches one source; failures are retried,
//!   then the source is omitted
//! - **Combine**: source records merge into one aggregate document
//! - **Sign**: SHA-256 over canonical JSON, Ed25519 over the hash
//! - **Verify**: schema, registry attestation, hash, signature
//!
//! ## Usage
//!
//! ```rust,no_run
//! use observable_entropy::{EntropyConfig, Pipeline, TimestampCollector};
//! use observable_entropy::{ArtifactInput, Verifier, VerifierConfig};
//! use observable_entropy::core::decode_private_key;
//! use observable_entropy::remote::{HttpKeyRegistry, HttpRemoteConfig};
//! use observable_entropy::store::FsSourceStore;
//!
//! async fn example() -> observable_entropy::Result<()> {
//!     let config = EntropyConfig::from_env()?;
//!     let store = FsSourceStore::new(&config.entropy_dir);
//!     let pipeline = Pipeline::new(store, config).with_collector(TimestampCollector);
//!
//!     let key = decode_private_key("<base64 signing key>")?;
//!     let outcome = pipeline.run(&key).await?;
//!
//!     let registry = HttpKeyRegistry::new(HttpRemoteConfig::new("https://keys.example"))?;
//!     let verifier = Verifier::new(registry, VerifierConfig::default());
//!     let result = verifier.verify(&outcome.artifact.to_value()).await;
//!     assert!(result.ok);
//!
//!     let path = pipeline.config().artifact_file.clone();
//!     let _ = verifier.verify_input(&ArtifactInput::File(path)).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `observable_entropy::core` - Canonical JSON, crypto, documents
//! - `observable_entropy::store` - Source records, artifact files, publishing
//! - `observable_entropy::remote` - Key registry and artifact clients

pub mod collect;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod retry;
pub mod verifier;

// Re-export component crates
pub use observable_entropy_core as core;
pub use observable_entropy_remote as remote;
pub use observable_entropy_store as store;

// Re-export main types for convenience
pub use collect::{Collector, PreviousCollector, TimestampCollector};
pub use config::EntropyConfig;
pub use error::{CollectionError, EntropyError, Result};
pub use pipeline::{CollectionReport, Pipeline, RunOutcome};
pub use retry::{retry_async, RetriesExhausted, RetryPolicy};
pub use verifier::{ArtifactInput, VerificationResult, Verifier, VerifierConfig, VerifyFailure};

// Re-export commonly used core types
pub use observable_entropy_core::{
    AggregateDocument, Ed25519PublicKey, Ed25519Signature, KeyHandle, KeyRecord, Keypair,
    PrivateKey, Sha256Hash, SignedArtifact, SourceName, SourceRecord,
};
