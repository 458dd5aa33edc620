//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Value};

use observable_entropy_core::{
    sign_artifact, AggregateDocument, Keypair, SignedArtifact, SourceName,
};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a valid source name.
pub fn source_name() -> impl Strategy<Value = SourceName> {
    "[A-Za-z0-9_-]{1,24}".prop_filter_map("valid source name", |s| SourceName::new(s).ok())
}

/// Generate a JSON number.
///
/// Floats are multiples of 1/64 so every generated value has an exact,
/// short decimal form.
pub fn json_number() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        (-1_000_000_000i64..1_000_000_000i64).prop_map(|n| Value::from(n as f64 / 64.0)),
    ]
}

/// Generate a JSON scalar.
pub fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        json_number(),
        any::<String>().prop_map(Value::String),
    ]
}

/// Generate an arbitrary JSON value, nested a few levels deep.
pub fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::hash_map(any::<String>(), inner, 0..8)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Generate an object key mixing ASCII, the top of the Basic Multilingual
/// Plane and supplementary-plane characters. UTF-16 and UTF-8 order such
/// keys differently.
pub fn mixed_plane_key() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            prop::char::range('a', 'c'),
            prop::char::range('\u{e000}', '\u{ffff}'),
            prop::char::range('\u{10000}', '\u{10ffff}'),
        ],
        0..4,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Generate distinct object entries in random order.
pub fn object_entries() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::btree_map(
        prop_oneof![mixed_plane_key(), any::<String>()],
        json_value(),
        0..8,
    )
    .prop_map(|m| m.into_iter().collect::<Vec<_>>())
    .prop_shuffle()
}

/// Generate a source payload (always an object).
pub fn payload() -> impl Strategy<Value = Value> {
    prop::collection::hash_map(any::<String>(), json_value(), 0..6)
        .prop_map(|m| Value::Object(m.into_iter().collect()))
}

/// Generate an aggregate document with up to `max_sources` sources.
pub fn aggregate_document(max_sources: usize) -> impl Strategy<Value = AggregateDocument> {
    prop::collection::vec((source_name(), payload()), 0..=max_sources).prop_map(|entries| {
        let mut doc = AggregateDocument::new();
        for (name, payload) in entries {
            doc.insert(name.as_str(), payload);
        }
        doc
    })
}

/// Parameters for generating a signed artifact.
#[derive(Debug, Clone)]
pub struct ArtifactParams {
    pub keypair: Keypair,
    pub document: AggregateDocument,
}

impl Arbitrary for ArtifactParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (keypair(), aggregate_document(6))
            .prop_map(|(keypair, document)| ArtifactParams { keypair, document })
            .boxed()
    }
}

/// Sign the document in `params`.
///
/// Generated documents are always canonicalizable, so `None` indicates a
/// canonicalization bug.
pub fn artifact_from_params(params: &ArtifactParams) -> Option<SignedArtifact> {
    sign_artifact(&params.document, &params.keypair.private_key()).ok()
}
