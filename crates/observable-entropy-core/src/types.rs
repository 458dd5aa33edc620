//! Core document types: source names, source records, aggregate documents.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;

/// Name of an entropy source, e.g. `bitcoin` or `drand-beacon`.
///
/// Non-empty, `[A-Za-z0-9_-]` only, so every name maps to exactly one
/// `{name}.json` file.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceName(String);

impl SourceName {
    pub fn new(name: impl Into<String>) -> Result<Self, SchemaError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SchemaError::field("name", "must not be empty"));
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(SchemaError::field(
                "name",
                format!("invalid character {:?} in source name {:?}", c, name),
            ));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name the record is stored under.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl FromStr for SourceName {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceName({})", self.0)
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The output of one collector: a source name and its JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub name: SourceName,
    pub payload: Value,
}

impl SourceRecord {
    pub fn new(name: SourceName, payload: Value) -> Self {
        Self { name, payload }
    }
}

/// All collected source payloads, keyed by source name.
///
/// A source that failed to collect is absent, never `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateDocument {
    pub data: BTreeMap<String, Value>,
}

impl AggregateDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, payload: Value) {
        self.data.insert(name.into(), payload);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The `data` map as a JSON object.
    pub fn data_value(&self) -> Value {
        Value::Object(
            self.data
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Map<_, _>>(),
        )
    }

    /// `{"data": {...}}`
    pub fn to_value(&self) -> Value {
        let mut root = Map::new();
        root.insert("data".to_string(), self.data_value());
        Value::Object(root)
    }

    /// Parse `{"data": {...}}`. Anything besides `data` is rejected.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let obj = value
            .as_object()
            .ok_or_else(|| SchemaError::Malformed("expected a JSON object".into()))?;
        if let Some(key) = obj.keys().find(|k| k.as_str() != "data") {
            return Err(SchemaError::field(key.clone(), "unknown field"));
        }
        let data = obj
            .get("data")
            .ok_or_else(|| SchemaError::field("data", "missing"))?
            .as_object()
            .ok_or_else(|| SchemaError::field("data", "expected an object"))?;

        Ok(Self {
            data: data.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_name_validation() {
        assert!(SourceName::new("bitcoin").is_ok());
        assert!(SourceName::new("drand-beacon").is_ok());
        assert!(SourceName::new("hacker_news2").is_ok());

        assert!(SourceName::new("").is_err());
        assert!(SourceName::new("../etc").is_err());
        assert!(SourceName::new("a.json").is_err());
        assert!(SourceName::new("with space").is_err());
    }

    #[test]
    fn test_source_name_file_name() {
        let name: SourceName = "nist-beacon".parse().unwrap();
        assert_eq!(name.file_name(), "nist-beacon.json");
    }

    #[test]
    fn test_aggregate_value_shape() {
        let mut doc = AggregateDocument::new();
        doc.insert("timestamp", json!({"capturedAt": "2024-01-01T00:00:00Z"}));
        assert_eq!(
            doc.to_value(),
            json!({"data": {"timestamp": {"capturedAt": "2024-01-01T00:00:00Z"}}})
        );
        assert_eq!(AggregateDocument::from_value(&doc.to_value()).unwrap(), doc);
    }

    #[test]
    fn test_aggregate_from_value_rejects() {
        assert!(AggregateDocument::from_value(&json!([])).is_err());
        assert!(AggregateDocument::from_value(&json!({})).is_err());
        assert!(AggregateDocument::from_value(&json!({"data": 1})).is_err());
        assert!(matches!(
            AggregateDocument::from_value(&json!({"data": {}, "hash": "x"})),
            Err(SchemaError::InvalidField { field, .. }) if field == "hash"
        ));
    }

    #[test]
    fn test_empty_aggregate() {
        let doc = AggregateDocument::new();
        assert!(doc.is_empty());
        assert_eq!(doc.to_value(), json!({"data": {}}));
    }
}
