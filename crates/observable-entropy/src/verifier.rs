//! The Verifier: decide whether a published artifact can be trusted.
//!
//! Steps, stopping at the first failure:
//!
//! 1. Schema-validate the artifact
//! 2. Derive the key handle from the embedded public key and look it up
//! 3. Require the registry's key to equal the embedded key
//! 4. Recompute the canonical hash of `data` and compare
//! 5. Check the Ed25519 signature over the hash
//!
//! Failures are values, never errors: every path ends in a
//! [`VerificationResult`]. Nothing is written during verification.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use observable_entropy_core::{
    canonical_data_digest, crypto, is_hash_hex, parse_signed_artifact, KeyHandle, SignedArtifact,
};
use observable_entropy_remote::{ArtifactSource, KeyRegistry};
use observable_entropy_store::read_artifact_value;

/// Configuration for the Verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Upper bound on a registry lookup (default: 5 seconds).
    pub registry_timeout: Duration,
    /// Require every `data` entry to match a known source shape.
    pub strict_sources: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            registry_timeout: Duration::from_secs(5),
            strict_sources: false,
        }
    }
}

/// Why verification failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyFailure {
    /// The artifact is malformed. Rejected before any crypto.
    SchemaError(String),
    /// The artifact could not be fetched or read.
    ArtifactUnavailable(String),
    /// The registry could not be reached or answered garbage.
    RegistryUnavailable,
    /// The registry has no record for the key's handle.
    KeyNotFound,
    /// The registry's key differs from the embedded key.
    KeyMismatch,
    /// `data` does not hash to `hash`.
    HashMismatch,
    /// The signature does not verify.
    BadSignature,
}

impl VerifyFailure {
    /// Bare reason name, e.g. `"HashMismatch"`.
    pub fn reason_code(&self) -> &'static str {
        match self {
            VerifyFailure::SchemaError(_) => "SchemaError",
            VerifyFailure::ArtifactUnavailable(_) => "ArtifactUnavailable",
            VerifyFailure::RegistryUnavailable => "RegistryUnavailable",
            VerifyFailure::KeyNotFound => "KeyNotFound",
            VerifyFailure::KeyMismatch => "KeyMismatch",
            VerifyFailure::HashMismatch => "HashMismatch",
            VerifyFailure::BadSignature => "BadSignature",
        }
    }
}

impl fmt::Display for VerifyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyFailure::SchemaError(detail) | VerifyFailure::ArtifactUnavailable(detail) => {
                write!(f, "{}: {}", self.reason_code(), detail)
            }
            _ => f.write_str(self.reason_code()),
        }
    }
}

/// Verdict on one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub ok: bool,
    pub reason: Option<VerifyFailure>,
}

impl VerificationResult {
    pub fn valid() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub fn invalid(reason: VerifyFailure) -> Self {
        Self {
            ok: false,
            reason: Some(reason),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn reason_code(&self) -> Option<&'static str> {
        self.reason.as_ref().map(VerifyFailure::reason_code)
    }
}

/// Where to get the artifact to verify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactInput {
    /// The most recently published artifact.
    Latest,
    /// The artifact published under this hash: 64 lowercase hex
    /// characters.
    Hash(String),
    /// A local artifact file.
    File(PathBuf),
}

/// Verifies artifacts against a key registry.
///
/// Holds no mutable state; safe to share across tasks.
pub struct Verifier<R: KeyRegistry> {
    registry: Arc<R>,
    artifacts: Option<Arc<dyn ArtifactSource>>,
    config: VerifierConfig,
}

impl<R: KeyRegistry> Verifier<R> {
    pub fn new(registry: R, config: VerifierConfig) -> Self {
        Self::with_shared_registry(Arc::new(registry), config)
    }

    pub fn with_shared_registry(registry: Arc<R>, config: VerifierConfig) -> Self {
        Self {
            registry,
            artifacts: None,
            config,
        }
    }

    /// Source for [`ArtifactInput::Latest`] and [`ArtifactInput::Hash`].
    pub fn with_artifact_source(mut self, artifacts: Arc<dyn ArtifactSource>) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Resolve an input and verify it. All inputs go through [`verify`].
    ///
    /// [`verify`]: Self::verify
    pub async fn verify_input(&self, input: &ArtifactInput) -> VerificationResult {
        let value = match self.resolve(input).await {
            Ok(value) => value,
            Err(detail) => {
                warn!(input = ?input, reason = %detail, "artifact unavailable");
                return VerificationResult::invalid(VerifyFailure::ArtifactUnavailable(detail));
            }
        };
        self.verify(&value).await
    }

    async fn resolve(&self, input: &ArtifactInput) -> std::result::Result<Value, String> {
        match input {
            ArtifactInput::File(path) => read_artifact_value(path).await.map_err(|e| e.to_string()),
            ArtifactInput::Latest => match &self.artifacts {
                Some(artifacts) => artifacts.fetch_latest().await.map_err(|e| e.to_string()),
                None => Err("no artifact source configured".into()),
            },
            ArtifactInput::Hash(hash) => {
                if !is_hash_hex(hash) {
                    return Err(format!("{:?} is not a sha-256 hex digest", hash));
                }
                let artifacts = self
                    .artifacts
                    .as_ref()
                    .ok_or_else(|| "no artifact source configured".to_string())?;
                let value = artifacts.fetch_by_hash(hash).await.map_err(|e| e.to_string())?;
                match value.get("hash").and_then(Value::as_str) {
                    Some(served) if served != hash => Err(format!(
                        "requested artifact {} but the source served {}",
                        hash, served
                    )),
                    _ => Ok(value),
                }
            }
        }
    }

    /// Verify an untyped artifact.
    pub async fn verify(&self, value: &Value) -> VerificationResult {
        // 1. Schema
        let artifact = match parse_signed_artifact(value, self.config.strict_sources) {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!(error = %e, "artifact failed schema validation");
                return VerificationResult::invalid(VerifyFailure::SchemaError(e.to_string()));
            }
        };
        debug!(hash = %artifact.hash, "artifact schema valid");

        let result = match self.verify_parsed(&artifact).await {
            Ok(()) => VerificationResult::valid(),
            Err(reason) => VerificationResult::invalid(reason),
        };
        if result.ok {
            info!(hash = %artifact.hash, "artifact verified");
        }
        result
    }

    /// Verify an already-typed artifact (steps 2 to 5).
    pub async fn verify_artifact(&self, artifact: &SignedArtifact) -> VerificationResult {
        match self.verify_parsed(artifact).await {
            Ok(()) => VerificationResult::valid(),
            Err(reason) => VerificationResult::invalid(reason),
        }
    }

    async fn verify_parsed(
        &self,
        artifact: &SignedArtifact,
    ) -> std::result::Result<(), VerifyFailure> {
        // 2. Registry lookup
        let handle = KeyHandle::derive(&artifact.public_key);
        let timeout = self.config.registry_timeout;
        let lookup = tokio::time::timeout(timeout, self.registry.lookup(&handle)).await;
        let record = match lookup {
            Err(_) => {
                warn!(handle = %handle, timeout = ?timeout, "registry lookup timed out");
                return Err(VerifyFailure::RegistryUnavailable);
            }
            Ok(Err(e)) => {
                warn!(handle = %handle, error = %e, "registry unavailable");
                return Err(VerifyFailure::RegistryUnavailable);
            }
            Ok(Ok(None)) => {
                warn!(handle = %handle, "no registry record for key");
                return Err(VerifyFailure::KeyNotFound);
            }
            Ok(Ok(Some(record))) => record,
        };

        // 3. Registry key must be the embedded key
        if record.public_key != artifact.public_key {
            warn!(handle = %handle, "registry key differs from artifact key");
            return Err(VerifyFailure::KeyMismatch);
        }
        if record.expired {
            warn!(
                handle = %handle,
                environment = ?record.environment,
                "artifact signed with an expired key"
            );
        }
        debug!(handle = %handle, "key attested by registry");

        // 4. Hash
        let digest = canonical_data_digest(&artifact.document.data_value()).map_err(|e| {
            warn!(error = %e, "artifact data has no canonical form");
            VerifyFailure::SchemaError(e.to_string())
        })?;
        if digest != artifact.hash {
            warn!(expected = %artifact.hash, computed = %digest, "hash mismatch");
            return Err(VerifyFailure::HashMismatch);
        }

        // 5. Signature
        if !crypto::verify(&artifact.public_key, &digest, &artifact.signature) {
            warn!(hash = %artifact.hash, "bad signature");
            return Err(VerifyFailure::BadSignature);
        }

        Ok(())
    }
}
