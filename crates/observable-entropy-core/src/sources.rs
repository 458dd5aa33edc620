//! Payload shapes of the known entropy sources.
//!
//! Strict validation is opt-in: by default any JSON payload is accepted
//! under any source name. In strict mode each `data` entry must be one of
//! the sources below, with exactly the listed fields.
//!
//! - `bitcoin` - latest block header summary
//! - `ethereum` - latest block
//! - `stellar` - latest closed ledger
//! - `nist-beacon` - NIST randomness beacon pulse
//! - `drand-beacon` - drand chain info and latest round
//! - `hacker-news` - current top stories
//! - `previous` - hash of the previously published artifact
//! - `timestamp` - capture time (always required in strict mode)

use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::SchemaError;

/// Source name of the mandatory capture-time record.
pub const TIMESTAMP_SOURCE: &str = "timestamp";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Bitcoin {
    pub block_index: u64,
    pub hash: String,
    pub height: u64,
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ethereum {
    pub hash: String,
    pub height: u64,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stellar {
    pub closed_at: String,
    pub hash: String,
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NistBeacon {
    pub chain_index: u64,
    pub output_value: String,
    pub pulse_index: u64,
    pub time_stamp: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrandMetadata {
    #[serde(rename = "beaconID")]
    pub beacon_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrandChainInfo {
    pub genesis_time: i64,
    #[serde(rename = "groupHash")]
    pub group_hash: String,
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DrandMetadata>,
    pub period: u64,
    pub public_key: String,
    #[serde(rename = "schemeID", default, skip_serializing_if = "Option::is_none")]
    pub scheme_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrandRandomness {
    pub previous_signature: String,
    pub randomness: String,
    pub round: u64,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DrandBeacon {
    pub chain_info: DrandChainInfo,
    pub randomness: DrandRandomness,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HackerNewsStory {
    pub by: String,
    pub id: u64,
    pub time: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HackerNews {
    pub stories: Vec<HackerNewsStory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Previous {
    pub hash: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Timestamp {
    pub captured_at: String,
}

/// A payload parsed into its known source shape.
#[derive(Debug, Clone, PartialEq)]
pub enum KnownSource {
    Bitcoin(Bitcoin),
    Ethereum(Ethereum),
    Stellar(Stellar),
    NistBeacon(NistBeacon),
    DrandBeacon(DrandBeacon),
    HackerNews(HackerNews),
    Previous(Previous),
    Timestamp(Timestamp),
}

impl KnownSource {
    /// Every source name with a known shape.
    pub const NAMES: [&'static str; 8] = [
        "bitcoin",
        "drand-beacon",
        "ethereum",
        "hacker-news",
        "nist-beacon",
        "previous",
        "stellar",
        TIMESTAMP_SOURCE,
    ];

    /// Parse a payload by its source name. Reports the first invalid field,
    /// prefixed with the source name.
    pub fn parse(name: &str, payload: &Value) -> Result<Self, SchemaError> {
        let source = match name {
            "bitcoin" => {
                let p: Bitcoin = typed(name, payload)?;
                check_hex(name, "hash", &p.hash)?;
                Self::Bitcoin(p)
            }
            "ethereum" => {
                let p: Ethereum = typed(name, payload)?;
                check_hex(name, "hash", strip_0x(&p.hash))?;
                check_utc(name, "time", &p.time)?;
                Self::Ethereum(p)
            }
            "stellar" => {
                let p: Stellar = typed(name, payload)?;
                check_hex(name, "hash", &p.hash)?;
                check_utc(name, "closed_at", &p.closed_at)?;
                Self::Stellar(p)
            }
            "nist-beacon" => {
                let p: NistBeacon = typed(name, payload)?;
                check_hex(name, "outputValue", &p.output_value)?;
                check_utc(name, "timeStamp", &p.time_stamp)?;
                check_url(name, "uri", &p.uri)?;
                Self::NistBeacon(p)
            }
            "drand-beacon" => {
                let p: DrandBeacon = typed(name, payload)?;
                check_hex(name, "chainInfo.groupHash", &p.chain_info.group_hash)?;
                check_hex(name, "chainInfo.hash", &p.chain_info.hash)?;
                check_hex(name, "chainInfo.public_key", &p.chain_info.public_key)?;
                check_hex(
                    name,
                    "randomness.previous_signature",
                    &p.randomness.previous_signature,
                )?;
                check_hex(name, "randomness.randomness", &p.randomness.randomness)?;
                check_hex(name, "randomness.signature", &p.randomness.signature)?;
                Self::DrandBeacon(p)
            }
            "hacker-news" => {
                let p: HackerNews = typed(name, payload)?;
                for (i, story) in p.stories.iter().enumerate() {
                    if let Some(url) = &story.url {
                        check_url(name, &format!("stories[{}].url", i), url)?;
                    }
                }
                Self::HackerNews(p)
            }
            "previous" => {
                let p: Previous = typed(name, payload)?;
                check_hex(name, "hash", &p.hash)?;
                check_url(name, "uri", &p.uri)?;
                Self::Previous(p)
            }
            TIMESTAMP_SOURCE => {
                let p: Timestamp = typed(name, payload)?;
                check_utc(name, "capturedAt", &p.captured_at)?;
                Self::Timestamp(p)
            }
            other => {
                return Err(SchemaError::field(
                    format!("data.{}", other),
                    "unknown source",
                ))
            }
        };
        Ok(source)
    }
}

fn typed<T: DeserializeOwned>(name: &str, payload: &Value) -> Result<T, SchemaError> {
    serde_json::from_value(payload.clone())
        .map_err(|e| SchemaError::field(format!("data.{}", name), e.to_string()))
}

fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}

/// Non-empty, even-length hex, either case.
fn check_hex(source: &str, field: &str, value: &str) -> Result<(), SchemaError> {
    let ok = !value.is_empty()
        && value.len() % 2 == 0
        && value.bytes().all(|b| b.is_ascii_hexdigit());
    if ok {
        Ok(())
    } else {
        Err(SchemaError::field(
            format!("data.{}.{}", source, field),
            "expected hex",
        ))
    }
}

/// RFC 3339 with a `Z` (UTC) offset.
fn check_utc(source: &str, field: &str, value: &str) -> Result<(), SchemaError> {
    let parsed = DateTime::parse_from_rfc3339(value);
    match parsed {
        Ok(dt) if dt.offset().local_minus_utc() == 0 && value.ends_with('Z') => Ok(()),
        _ => Err(SchemaError::field(
            format!("data.{}.{}", source, field),
            "expected an ISO 8601 UTC timestamp",
        )),
    }
}

/// Absolute `http` or `https` URL with a host.
fn check_url(source: &str, field: &str, value: &str) -> Result<(), SchemaError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => Ok(()),
        _ => Err(SchemaError::field(
            format!("data.{}.{}", source, field),
            "expected an http(s) URL",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bitcoin() {
        let payload = json!({
            "blockIndex": 0,
            "hash": "00000000000000000008d1e4b5d0a7f8b4a5e2a6a0c2a7c8b4e0d7b9b8e6c1a2",
            "height": 700000,
            "time": 1631333672
        });
        assert!(matches!(
            KnownSource::parse("bitcoin", &payload),
            Ok(KnownSource::Bitcoin(b)) if b.height == 700000
        ));
    }

    #[test]
    fn test_rejects_unknown_field() {
        let payload = json!({"capturedAt": "2024-01-01T00:00:00Z", "extra": 1});
        assert!(KnownSource::parse("timestamp", &payload).is_err());
    }

    #[test]
    fn test_timestamp_must_be_utc() {
        let ok = json!({"capturedAt": "2024-01-01T00:00:00.000Z"});
        assert!(KnownSource::parse("timestamp", &ok).is_ok());

        let offset = json!({"capturedAt": "2024-01-01T02:00:00+02:00"});
        assert!(KnownSource::parse("timestamp", &offset).is_err());

        let garbage = json!({"capturedAt": "yesterday"});
        assert!(KnownSource::parse("timestamp", &garbage).is_err());
    }

    #[test]
    fn test_parse_drand() {
        let payload = json!({
            "chainInfo": {
                "genesis_time": 1595431050,
                "groupHash": "176f93498eac9ca337150b46d21dd58673ea4e3581185f869672e59fa4cb390a",
                "hash": "8990e7a9aaed2ffed73dbd7092123d6f289930540d7651336225dc172e51b2ce",
                "metadata": {"beaconID": "default"},
                "period": 30,
                "public_key": "868f005eb8e6e4ca0a47c8a77ceaa5309a47978a7c71bc5cce96366b5d7a569937c529eeda66c7293784a9402801af31",
                "schemeID": "pedersen-bls-chained"
            },
            "randomness": {
                "previous_signature": "aa",
                "randomness": "bb",
                "round": 2000000,
                "signature": "cc"
            }
        });
        assert!(matches!(
            KnownSource::parse("drand-beacon", &payload),
            Ok(KnownSource::DrandBeacon(_))
        ));
    }

    #[test]
    fn test_hacker_news_url_optional() {
        let payload = json!({"stories": [
            {"by": "pg", "id": 1, "time": 1160418111, "title": "Y Combinator", "url": "http://ycombinator.com"},
            {"by": "someone", "id": 2, "time": 1160418112, "title": "Ask HN"}
        ]});
        assert!(KnownSource::parse("hacker-news", &payload).is_ok());

        let bad = json!({"stories": [
            {"by": "x", "id": 3, "time": 1, "title": "t", "url": "ftp://nope"}
        ]});
        assert!(matches!(
            KnownSource::parse("hacker-news", &bad),
            Err(SchemaError::InvalidField { field, .. })
                if field == "data.hacker-news.stories[0].url"
        ));
    }

    #[test]
    fn test_previous_and_unknown() {
        let payload = json!({"hash": "ab".repeat(32), "uri": "https://entropy.example/abab"});
        assert!(KnownSource::parse("previous", &payload).is_ok());

        assert!(matches!(
            KnownSource::parse("weather", &json!({})),
            Err(SchemaError::InvalidField { field, .. }) if field == "data.weather"
        ));
    }

    #[test]
    fn test_url_fields_must_parse() {
        for bad in [
            "https:// not a url",
            "http://[::1",
            "https://exa mple.com/%zz",
            "https://",
            "mailto:someone@entropy.example",
            "/relative/path",
        ] {
            let payload = json!({"hash": "ab".repeat(32), "uri": bad});
            assert!(
                matches!(
                    KnownSource::parse("previous", &payload),
                    Err(SchemaError::InvalidField { field, .. }) if field == "data.previous.uri"
                ),
                "accepted {:?}",
                bad
            );
        }

        let ok = json!({"hash": "ab".repeat(32), "uri": "http://[::1]:8080/entropy/ab"});
        assert!(KnownSource::parse("previous", &ok).is_ok());
    }

    #[test]
    fn test_ethereum_accepts_prefixed_hash() {
        let payload = json!({"hash": "0xabcdef", "height": 15000000, "time": "2022-06-21T12:00:00.000Z"});
        assert!(KnownSource::parse("ethereum", &payload).is_ok());
    }
}
