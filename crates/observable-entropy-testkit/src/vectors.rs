//! Golden test vectors for deterministic verification.
//!
//! Canonical vectors pin the exact bytes and SHA-256 that RFC 8785
//! canonicalization must produce. Signing vectors pin key handles,
//! public keys and signatures for fixed seeds, so any other
//! implementation can check itself against the same numbers.

use serde_json::Value;

use observable_entropy_core::{
    canonicalize, crypto, sign_artifact, AggregateDocument, KeyHandle, Keypair,
};

/// A canonicalization vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// JSON input text, in arbitrary key order.
    pub input: &'static str,
    /// Expected canonical text.
    pub canonical: &'static str,
    /// Expected SHA-256 of the canonical bytes (lowercase hex).
    pub sha256: &'static str,
}

/// A signing vector over the `data` of an aggregate document.
#[derive(Debug, Clone)]
pub struct SigningVector {
    pub name: &'static str,
    /// Ed25519 seed.
    pub seed: [u8; 32],
    /// JSON text of the `data` map.
    pub data: &'static str,
    /// Expected artifact `hash`.
    pub hash: &'static str,
    /// Expected artifact `publicKey` (standard base64).
    pub public_key: &'static str,
    /// Expected key handle.
    pub handle: &'static str,
    /// Expected artifact `signature` (standard base64).
    pub signature: &'static str,
}

/// Get all canonicalization vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "RFC 8785 key sorting",
            input: "{\"\u{20ac}\":\"Euro Sign\",\"\\r\":\"Carriage Return\",\
                    \"\u{fb33}\":\"Hebrew Letter Dalet With Dagesh\",\"1\":\"One\",\
                    \"\\ud83d\\ude00\":\"Emoji: Grinning Face\",\"\\u0080\":\"Control\",\
                    \"\u{f6}\":\"Latin Small Letter O With Diaeresis\"}",
            canonical: "{\"\\r\":\"Carriage Return\",\"1\":\"One\",\"\u{80}\":\"Control\",\
                        \"\u{f6}\":\"Latin Small Letter O With Diaeresis\",\
                        \"\u{20ac}\":\"Euro Sign\",\"\u{1f600}\":\"Emoji: Grinning Face\",\
                        \"\u{fb33}\":\"Hebrew Letter Dalet With Dagesh\"}",
            sha256: "5e321556d22018a9656991a9e94f77ec175fa193e52a2429d312f8419ec8b08c",
        },
        GoldenVector {
            name: "RFC 8785 sample",
            input: r#"{"numbers":[333333333.33333329,1E30,4.50,2e-3,0.000000000000000000000000001],"string":"\u20ac$\u000F\u000aA'\u0042\u0022\u005c\\\"\/","literals":[null,true,false]}"#,
            canonical: "{\"literals\":[null,true,false],\
                        \"numbers\":[333333333.3333333,1e+30,4.5,0.002,1e-27],\
                        \"string\":\"\u{20ac}$\\u000f\\nA'B\\\"\\\\\\\\\\\"/\"}",
            sha256: "2d5e01a318d0f0879ab568c4be289c8b1f64ef8921a53c6277d5e069978baacb",
        },
        GoldenVector {
            name: "Nested objects and arrays",
            input: r#"{"b":[3,1,2],"a":{"z":null,"y":[true,false]}}"#,
            canonical: r#"{"a":{"y":[true,false],"z":null},"b":[3,1,2]}"#,
            sha256: "4411257ce35888986a18576c3b71ba8514173a1cee6962654727bf671f7b663b",
        },
        GoldenVector {
            name: "Control characters",
            input: r#"{"s":"tab\there\u0001\u001f\"\\/"}"#,
            canonical: r#"{"s":"tab\there\u0001\u001f\"\\/"}"#,
            sha256: "eba08ee2e29576106617d10ba482522ae3e116e35d786d8f4db7c26ee79bf363",
        },
        GoldenVector {
            name: "Integer extremes and whole floats",
            input: r#"{"big":18446744073709551615,"neg":-9223372036854775808,"zero":0,"float":1.5,"whole":2.0}"#,
            canonical: r#"{"big":18446744073709551615,"float":1.5,"neg":-9223372036854775808,"whole":2,"zero":0}"#,
            sha256: "f4bbf6d89af711fedde53babbcb54023e9e39d1ac28389e092ee1e8de3b59cc2",
        },
        GoldenVector {
            name: "Scenario data",
            input: r#"{"timestamp":{"capturedAt":"2024-01-01T00:00:00Z"},"bitcoin":{"height":700000}}"#,
            canonical: r#"{"bitcoin":{"height":700000},"timestamp":{"capturedAt":"2024-01-01T00:00:00Z"}}"#,
            sha256: "ed19e0138d4f4c354751c1a5daa9a0fd18106218c793b1b7588f3a47768f721b",
        },
        GoldenVector {
            name: "Empty object",
            input: "{}",
            canonical: "{}",
            sha256: "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a",
        },
    ]
}

/// Get all signing vectors.
pub fn signing_vectors() -> Vec<SigningVector> {
    const SCENARIO: &str =
        r#"{"bitcoin":{"height":700000},"timestamp":{"capturedAt":"2024-01-01T00:00:00Z"}}"#;
    const SCENARIO_HASH: &str = "ed19e0138d4f4c354751c1a5daa9a0fd18106218c793b1b7588f3a47768f721b";
    const EMPTY_HASH: &str = "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a";

    vec![
        SigningVector {
            name: "Scenario, seed 0x42",
            seed: [0x42; 32],
            data: SCENARIO,
            hash: SCENARIO_HASH,
            public_key: "IVL40Zt5HSRFMkLhXy6rbLfP+ntqXtMAl5YOBpiB2xI=",
            handle: "3097e2de",
            signature: "rs/tEWrygp8zQ0ke9zv5UfGVZhAmeQznF66CG5od2zgi1C0uQPsdUXAmibJ25EDMGDfmnY5PpLYEGQymC0HxCg==",
        },
        SigningVector {
            name: "Empty data, seed 0x42",
            seed: [0x42; 32],
            data: "{}",
            hash: EMPTY_HASH,
            public_key: "IVL40Zt5HSRFMkLhXy6rbLfP+ntqXtMAl5YOBpiB2xI=",
            handle: "3097e2de",
            signature: "C+vgOR5FUuvZLF9Kldzwyj4SXMgviTv99pRBZdzAYhA//Q0AFqEGCf2nn6JyN66YqR83CCtwO1yqV+STRHAYCA==",
        },
        SigningVector {
            name: "Scenario, zero seed",
            seed: [0x00; 32],
            data: SCENARIO,
            hash: SCENARIO_HASH,
            public_key: "O2onvM62pC1io6jQKm8Nc2UyFXcd4kOmOsBIoYtZ2ik=",
            handle: "139e3940",
            signature: "YoYjw7pebveA/9tqXHRmgB5ARrMs4utRR8JgP362pbR5qkSAY4YBF/JL6a1rME21ZTwpcFVHEBk7A8n9SELlCA==",
        },
        SigningVector {
            name: "Empty data, zero seed",
            seed: [0x00; 32],
            data: "{}",
            hash: EMPTY_HASH,
            public_key: "O2onvM62pC1io6jQKm8Nc2UyFXcd4kOmOsBIoYtZ2ik=",
            handle: "139e3940",
            signature: "sTvTL+lvj/BMWZTh/fCEhexBVA6tbzy0KCMnO/J24zCuTWUixhQ5BYJkJBOKPLzla2re974/oogSBWgWc8fyDQ==",
        },
    ]
}

/// Build the aggregate document for a signing vector.
pub fn document_from_vector(vector: &SigningVector) -> Result<AggregateDocument, String> {
    let data: Value = serde_json::from_str(vector.data).map_err(|e| e.to_string())?;
    let wrapped = serde_json::json!({ "data": data });
    AggregateDocument::from_value(&wrapped).map_err(|e| e.to_string())
}

/// Canonicalize one vector's input, returning `(canonical text, sha256 hex)`.
pub fn evaluate_vector(vector: &GoldenVector) -> Result<(String, String), String> {
    let value: Value = serde_json::from_str(vector.input).map_err(|e| e.to_string())?;
    let bytes = canonicalize(&value).map_err(|e| e.to_string())?;
    let sha256 = hex::encode(crypto::digest(&bytes).as_bytes());
    let text = String::from_utf8(bytes).map_err(|e| e.to_string())?;
    Ok((text, sha256))
}

/// Check every vector against this implementation.
///
/// Returns `(name, matches, detail)` per vector, where `detail` is the
/// computed hash or the error that prevented computing it.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let canonical = all_vectors().into_iter().map(|v| match evaluate_vector(&v) {
        Ok((text, sha256)) => {
            let matches = text == v.canonical && sha256 == v.sha256;
            (v.name.to_string(), matches, sha256)
        }
        Err(e) => (v.name.to_string(), false, e),
    });

    let signing = signing_vectors().into_iter().map(|v| {
        let keypair = Keypair::from_seed(&v.seed);
        let signed = document_from_vector(&v)
            .and_then(|doc| sign_artifact(&doc, &keypair.private_key()).map_err(|e| e.to_string()));
        match signed {
            Ok(artifact) => {
                let matches = artifact.hash_hex() == v.hash
                    && artifact.public_key.to_base64() == v.public_key
                    && artifact.signature.to_base64() == v.signature
                    && KeyHandle::derive(&artifact.public_key).as_str() == v.handle;
                (v.name.to_string(), matches, artifact.hash_hex())
            }
            Err(e) => (v.name.to_string(), false, e),
        }
    });

    canonical.chain(signing).collect()
}
