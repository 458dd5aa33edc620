//! Signed artifacts and the Signer.
//!
//! An artifact is an aggregate document plus a detached Ed25519 signature:
//!
//! ```text
//! {
//!   "data": { <source>: <payload>, ... },
//!   "hash": hex(SHA256(canonicalize(data))),
//!   "hashType": "sha-256",
//!   "publicKey": base64(32 bytes),
//!   "signature": base64(Ed25519(hash bytes)),
//!   "signatureType": "ed25519"
//! }
//! ```
//!
//! The hash is lowercase hex without a `0x` prefix, on both the signing
//! and verification paths.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::canonical::canonicalize;
use crate::crypto::{self, Ed25519PublicKey, Ed25519Signature, PrivateKey, Sha256Hash};
use crate::error::{CanonicalizationError, SignError};
use crate::types::AggregateDocument;

/// Literal `hashType` of every artifact.
pub const HASH_TYPE: &str = "sha-256";

/// Literal `signatureType` of every artifact.
pub const SIGNATURE_TYPE: &str = "ed25519";

/// A signed, publishable aggregate document. Identified by its hash.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedArtifact {
    pub document: AggregateDocument,
    pub hash: Sha256Hash,
    pub public_key: Ed25519PublicKey,
    pub signature: Ed25519Signature,
}

/// Wire shape. Parsing rejects unknown and missing fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct SignedArtifactWire {
    pub data: Map<String, Value>,
    pub hash: String,
    pub hash_type: String,
    pub public_key: String,
    pub signature: String,
    pub signature_type: String,
}

impl SignedArtifact {
    pub fn data(&self) -> &AggregateDocument {
        &self.document
    }

    /// Content address, e.g. the `{hash}.json` publish key.
    pub fn hash_hex(&self) -> String {
        self.hash.to_hex()
    }

    /// Render in wire form.
    pub fn to_value(&self) -> Value {
        let mut wire = Map::new();
        wire.insert("data".into(), self.document.data_value());
        wire.insert("hash".into(), Value::String(self.hash.to_hex()));
        wire.insert("hashType".into(), Value::String(HASH_TYPE.into()));
        wire.insert("publicKey".into(), Value::String(self.public_key.to_base64()));
        wire.insert("signature".into(), Value::String(self.signature.to_base64()));
        wire.insert("signatureType".into(), Value::String(SIGNATURE_TYPE.into()));
        Value::Object(wire)
    }

    /// Canonical bytes of the whole artifact, the form written to disk and
    /// published.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, CanonicalizationError> {
        canonicalize(&self.to_value())
    }
}

/// Canonicalize `data` and digest it.
pub fn canonical_data_digest(data: &Value) -> Result<Sha256Hash, CanonicalizationError> {
    let bytes = canonicalize(data)?;
    Ok(crypto::digest(&bytes))
}

/// Decode a base64 private key for signing.
pub fn decode_private_key(encoded: &str) -> Result<PrivateKey, SignError> {
    Ok(PrivateKey::from_base64(encoded)?)
}

/// Sign an aggregate document.
///
/// The private key is used for this call only. Any error aborts signing;
/// no partial artifact is returned.
pub fn sign_artifact(
    doc: &AggregateDocument,
    private_key: &PrivateKey,
) -> Result<SignedArtifact, SignError> {
    // 1. Canonicalize data
    let canonical = canonicalize(&doc.data_value())?;

    // 2. Digest
    let hash = crypto::digest(&canonical);

    // 3. Derive public key
    let public_key = crypto::public_key_from_private_key(private_key);

    // 4. Sign the digest
    let signature = crypto::sign(private_key, &hash);

    // 5. Assemble
    Ok(SignedArtifact {
        document: doc.clone(),
        hash,
        public_key,
        signature,
    })
}
