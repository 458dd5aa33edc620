//! # Observable Entropy Core
//!
//! Pure primitives for Observable Entropy: canonical JSON, digests,
//! signatures, and the documents that flow through the trust pipeline.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`SourceRecord`] - One collector's output
//! - [`AggregateDocument`] - All source payloads under `data`
//! - [`SignedArtifact`] - An aggregate document with hash and signature
//! - [`KeyRecord`] - A registry record attesting a public key
//! - [`KeyHandle`] - Short fingerprint used to look up a key record
//!
//! ## Canonicalization
//!
//! Documents are hashed over RFC 8785 canonical JSON. See [`canonical`].

pub mod artifact;
pub mod canonical;
pub mod combine;
pub mod crypto;
pub mod error;
pub mod key_record;
pub mod sources;
pub mod types;
pub mod validation;

pub use artifact::{canonical_data_digest, decode_private_key, sign_artifact, SignedArtifact};
pub use canonical::{canonicalize, canonicalize_serialize, canonicalize_to_string};
pub use combine::combine;
pub use crypto::{Ed25519PublicKey, Ed25519Signature, Keypair, PrivateKey, Sha256Hash};
pub use error::{CanonicalizationError, CryptoError, SchemaError, SignError};
pub use key_record::{Environment, KeyHandle, KeyRecord};
pub use sources::KnownSource;
pub use types::{AggregateDocument, SourceName, SourceRecord};
pub use validation::{
    is_hash_hex, parse_key_record, parse_signed_artifact, parse_source_record,
    validate_source_payloads,
};
