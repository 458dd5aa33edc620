//! Schema validation: untyped JSON into typed documents.
//!
//! Each parse function converts an untrusted `serde_json::Value` into its
//! typed structure or fails with the first invalid field. Nothing here
//! touches signatures; crypto checks happen in the verifier after a
//! document parses.

use serde_json::Value;

use crate::artifact::{SignedArtifact, SignedArtifactWire, HASH_TYPE, SIGNATURE_TYPE};
use crate::crypto::{Ed25519PublicKey, Ed25519Signature, Sha256Hash};
use crate::error::SchemaError;
use crate::key_record::KeyRecord;
use crate::sources::{KnownSource, TIMESTAMP_SOURCE};
use crate::types::{AggregateDocument, SourceName, SourceRecord};

/// Parse a signed artifact.
///
/// Requires exactly the artifact fields; `hash` must be 64 lowercase hex
/// characters. With `strict_sources`, every `data` entry must also match
/// its known source shape and `timestamp` must be present.
pub fn parse_signed_artifact(
    value: &Value,
    strict_sources: bool,
) -> Result<SignedArtifact, SchemaError> {
    if !value.is_object() {
        return Err(SchemaError::Malformed("expected a JSON object".into()));
    }
    let wire: SignedArtifactWire = serde_json::from_value(value.clone())
        .map_err(|e| SchemaError::Malformed(e.to_string()))?;

    // 1. Literal discriminators
    if wire.hash_type != HASH_TYPE {
        return Err(SchemaError::field(
            "hashType",
            format!("expected \"{}\"", HASH_TYPE),
        ));
    }
    if wire.signature_type != SIGNATURE_TYPE {
        return Err(SchemaError::field(
            "signatureType",
            format!("expected \"{}\"", SIGNATURE_TYPE),
        ));
    }

    // 2. Hash encoding
    if !is_hash_hex(&wire.hash) {
        return Err(SchemaError::field(
            "hash",
            "expected 64 lowercase hex characters",
        ));
    }
    let hash = Sha256Hash::from_hex(&wire.hash)
        .map_err(|e| SchemaError::field("hash", e.to_string()))?;

    // 3. Key and signature material
    let public_key = Ed25519PublicKey::from_base64(&wire.public_key)
        .map_err(|e| SchemaError::field("publicKey", e.to_string()))?;
    let signature = Ed25519Signature::from_base64(&wire.signature)
        .map_err(|e| SchemaError::field("signature", e.to_string()))?;

    // 4. Data
    let mut document = AggregateDocument::new();
    for (name, payload) in wire.data {
        document.insert(name, payload);
    }
    if strict_sources {
        validate_source_payloads(&document)?;
    }

    Ok(SignedArtifact {
        document,
        hash,
        public_key,
        signature,
    })
}

/// Check every `data` entry against its known source shape.
pub fn validate_source_payloads(doc: &AggregateDocument) -> Result<(), SchemaError> {
    if doc.get(TIMESTAMP_SOURCE).is_none() {
        return Err(SchemaError::field(
            format!("data.{}", TIMESTAMP_SOURCE),
            "missing",
        ));
    }
    for (name, payload) in &doc.data {
        KnownSource::parse(name, payload)?;
    }
    Ok(())
}

/// Parse a key registry record. Unknown fields are tolerated.
pub fn parse_key_record(value: &Value) -> Result<KeyRecord, SchemaError> {
    KeyRecord::from_value(value)
}

/// Parse a source record from its name and stored payload.
///
/// Only the name is checked; any JSON value is a valid payload.
pub fn parse_source_record(name: &str, payload: Value) -> Result<SourceRecord, SchemaError> {
    let name = SourceName::new(name)?;
    Ok(SourceRecord::new(name, payload))
}

/// The wire form of an artifact hash: 64 lowercase hex characters.
pub fn is_hash_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::sign_artifact;
    use crate::crypto::Keypair;
    use serde_json::json;

    fn artifact_value(doc: &AggregateDocument) -> Value {
        let keypair = Keypair::from_seed(&[0x21; 32]);
        sign_artifact(doc, &keypair.private_key()).unwrap().to_value()
    }

    fn scenario_doc() -> AggregateDocument {
        let mut doc = AggregateDocument::new();
        doc.insert("bitcoin", json!({"height": 700000}));
        doc.insert("timestamp", json!({"capturedAt": "2024-01-01T00:00:00Z"}));
        doc
    }

    #[test]
    fn test_parse_roundtrip() {
        let keypair = Keypair::from_seed(&[0x21; 32]);
        let artifact = sign_artifact(&scenario_doc(), &keypair.private_key()).unwrap();
        let parsed = parse_signed_artifact(&artifact.to_value(), false).unwrap();
        assert_eq!(parsed, artifact);
    }

    #[test]
    fn test_rejects_unknown_and_missing_fields() {
        let mut value = artifact_value(&scenario_doc());
        value["extra"] = json!(true);
        assert!(matches!(
            parse_signed_artifact(&value, false),
            Err(SchemaError::Malformed(_))
        ));

        let mut value = artifact_value(&scenario_doc());
        value.as_object_mut().unwrap().remove("signature");
        assert!(matches!(
            parse_signed_artifact(&value, false),
            Err(SchemaError::Malformed(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_literals() {
        let mut value = artifact_value(&scenario_doc());
        value["hashType"] = json!("sha-512");
        assert!(matches!(
            parse_signed_artifact(&value, false),
            Err(SchemaError::InvalidField { field, .. }) if field == "hashType"
        ));

        let mut value = artifact_value(&scenario_doc());
        value["signatureType"] = json!("rsa");
        assert!(matches!(
            parse_signed_artifact(&value, false),
            Err(SchemaError::InvalidField { field, .. }) if field == "signatureType"
        ));
    }

    #[test]
    fn test_rejects_hash_encodings() {
        let value = artifact_value(&scenario_doc());
        let hash = value["hash"].as_str().unwrap().to_string();

        for bad in [
            format!("0x{}", hash),
            hash.to_uppercase(),
            hash[..62].to_string(),
            "zz".repeat(32),
        ] {
            let mut v = value.clone();
            v["hash"] = json!(bad);
            assert!(matches!(
                parse_signed_artifact(&v, false),
                Err(SchemaError::InvalidField { field, .. }) if field == "hash"
            ));
        }
    }

    #[test]
    fn test_rejects_bad_key_material() {
        let mut value = artifact_value(&scenario_doc());
        value["publicKey"] = json!("AAAA");
        assert!(matches!(
            parse_signed_artifact(&value, false),
            Err(SchemaError::InvalidField { field, .. }) if field == "publicKey"
        ));

        let mut value = artifact_value(&scenario_doc());
        value["signature"] = json!("%%%");
        assert!(matches!(
            parse_signed_artifact(&value, false),
            Err(SchemaError::InvalidField { field, .. }) if field == "signature"
        ));
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(parse_signed_artifact(&json!("artifact"), false).is_err());
        assert!(parse_signed_artifact(&json!(null), false).is_err());
    }

    #[test]
    fn test_strict_sources() {
        // bitcoin payload lacks hash/time/blockIndex
        let value = artifact_value(&scenario_doc());
        assert!(parse_signed_artifact(&value, false).is_ok());
        assert!(parse_signed_artifact(&value, true).is_err());

        let mut doc = AggregateDocument::new();
        doc.insert("timestamp", json!({"capturedAt": "2024-01-01T00:00:00Z"}));
        assert!(parse_signed_artifact(&artifact_value(&doc), true).is_ok());

        let mut no_timestamp = AggregateDocument::new();
        no_timestamp.insert("previous", json!({"hash": "ab", "uri": "https://e.example/ab"}));
        assert!(matches!(
            parse_signed_artifact(&artifact_value(&no_timestamp), true),
            Err(SchemaError::InvalidField { field, .. }) if field == "data.timestamp"
        ));
    }

    #[test]
    fn test_parse_source_record() {
        for payload in [
            json!({"height": 1}),
            json!([1, 2]),
            json!("beacon"),
            json!(1),
            json!(true),
            json!(null),
        ] {
            let record = parse_source_record("nist", payload.clone()).unwrap();
            assert_eq!(record.payload, payload);
        }
        assert!(parse_source_record("bad/name", json!({})).is_err());
    }

    #[test]
    fn test_is_hash_hex() {
        assert!(is_hash_hex(&"0a".repeat(32)));
        assert!(!is_hash_hex(&"0A".repeat(32)));
        assert!(!is_hash_hex(&"0a".repeat(31)));
        assert!(!is_hash_hex(&format!("0x{}", "0a".repeat(31))));
        assert!(!is_hash_hex("../latest"));
    }
}
