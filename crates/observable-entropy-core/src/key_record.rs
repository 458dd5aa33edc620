//! Key records: self-attested public keys published by the key registry.
//!
//! The registry is keyed by a [`KeyHandle`], a short fingerprint of the
//! public key. Handles are lookup keys, not secrets.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::canonical::canonicalize;
use crate::crypto::{Ed25519PublicKey, Ed25519Signature, Keypair, Sha256Hash};
use crate::error::{CanonicalizationError, SchemaError};

/// Length of a key handle in hex characters.
pub const HANDLE_LEN: usize = 8;

/// Key type literal carried in key records.
pub const KEY_TYPE_ED25519: &str = "ed25519";

/// An 8-character lowercase hex fingerprint of a public key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct KeyHandle(String);

impl KeyHandle {
    /// `lowercase(hex(SHA256(public_key))[0..8])`
    pub fn derive(public_key: &Ed25519PublicKey) -> Self {
        let hash = Sha256Hash::hash(public_key.as_bytes());
        Self(hash.to_hex()[..HANDLE_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for KeyHandle {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == HANDLE_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !valid {
            return Err(SchemaError::field(
                "handle",
                format!("expected {} lowercase hex characters", HANDLE_LEN),
            ));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyHandle({})", self.0)
    }
}

impl fmt::Display for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deployment environment a key was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// A registry record attesting a public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    pub environment: Environment,
    pub expired: bool,
    pub handle: String,
    pub public_key: Ed25519PublicKey,
    /// Signature by the key over its own unsigned record. Carried, not checked.
    pub self_signature: Vec<u8>,
}

/// Untrusted wire shape of a key record. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyRecordWire {
    environment: Environment,
    expired: bool,
    handle: String,
    public_key: String,
    #[serde(rename = "type")]
    key_type: String,
    self_signature: String,
}

impl Environment {
    /// Wire name, e.g. `"production"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl KeyRecord {
    /// Issue a self-signed record for a keypair.
    pub fn issue(
        keypair: &Keypair,
        environment: Environment,
    ) -> Result<Self, CanonicalizationError> {
        let public_key = keypair.public_key();
        let handle = KeyHandle::derive(&public_key).to_string();
        let mut record = Self {
            environment,
            expired: false,
            handle,
            public_key,
            self_signature: Vec::new(),
        };
        let message = record.unsigned_message()?;
        record.self_signature = keypair.sign(&message).0.to_vec();
        Ok(record)
    }

    /// Parse an untrusted registry response.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let wire: KeyRecordWire = serde_json::from_value(value.clone())
            .map_err(|e| SchemaError::Malformed(e.to_string()))?;

        if wire.handle.is_empty() {
            return Err(SchemaError::field("handle", "must not be empty"));
        }
        if wire.key_type != KEY_TYPE_ED25519 {
            return Err(SchemaError::field(
                "type",
                format!("expected \"{}\", got \"{}\"", KEY_TYPE_ED25519, wire.key_type),
            ));
        }
        let public_key = Ed25519PublicKey::from_base64(&wire.public_key)
            .map_err(|e| SchemaError::field("publicKey", e.to_string()))?;
        let self_signature = decode_base64_field("selfSignature", &wire.self_signature)?;

        Ok(Self {
            environment: wire.environment,
            expired: wire.expired,
            handle: wire.handle,
            public_key,
            self_signature,
        })
    }

    /// Render the record in its wire form.
    pub fn to_value(&self) -> Value {
        use base64::Engine as _;
        let mut wire = self.unsigned_fields();
        wire.insert(
            "selfSignature".into(),
            Value::String(base64::engine::general_purpose::STANDARD.encode(&self.self_signature)),
        );
        Value::Object(wire)
    }

    /// Every wire field except `selfSignature`.
    fn unsigned_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("environment".into(), Value::String(self.environment.as_str().into()));
        fields.insert("expired".into(), Value::Bool(self.expired));
        fields.insert("handle".into(), Value::String(self.handle.clone()));
        fields.insert("publicKey".into(), Value::String(self.public_key.to_base64()));
        fields.insert("type".into(), Value::String(KEY_TYPE_ED25519.into()));
        fields
    }

    /// The message a self-signature covers: the canonical unsigned record.
    fn unsigned_message(&self) -> Result<Vec<u8>, CanonicalizationError> {
        canonicalize(&Value::Object(self.unsigned_fields()))
    }

    /// Whether the record's self-signature is a 64-byte Ed25519 signature by
    /// its own key over the unsigned record.
    ///
    /// Verification does not call this; trust rests on the registry transport.
    pub fn self_signature_valid(&self) -> bool {
        let Ok(bytes) = <[u8; 64]>::try_from(self.self_signature.as_slice()) else {
            return false;
        };
        match self.unsigned_message() {
            Ok(message) => self
                .public_key
                .verify(&message, &Ed25519Signature(bytes))
                .is_ok(),
            Err(_) => false,
        }
    }
}

fn decode_base64_field(field: &str, s: &str) -> Result<Vec<u8>, SchemaError> {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD
        .decode(s)
        .map_err(|e| SchemaError::field(field, format!("not valid base64: {}", e)))
}
