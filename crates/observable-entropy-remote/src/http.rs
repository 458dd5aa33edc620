//! HTTP clients for the key registry and the artifact endpoint.
//!
//! - Registry: `GET {base}/{handle}`
//! - Artifacts: `GET {base}/latest` and `GET {base}/{hash}`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use observable_entropy_core::{parse_key_record, KeyHandle, KeyRecord};

use crate::artifacts::{parse_base_url, resource_url, ArtifactSource};
use crate::error::{RemoteError, Result};
use crate::registry::KeyRegistry;

/// Configuration shared by the HTTP clients.
#[derive(Debug, Clone)]
pub struct HttpRemoteConfig {
    /// Base URL; an absolute `http` or `https` URL.
    pub base_url: String,
    /// Timeout for each HTTP request (default: 5 seconds)
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl HttpRemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for HttpRemoteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout: Duration::from_secs(5),
            user_agent: concat!("observable-entropy/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

fn build_client(config: &HttpRemoteConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| RemoteError::Client(e.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Key registry
// ─────────────────────────────────────────────────────────────────────────────

/// Key registry over HTTP.
///
/// `2xx` parses a key record, `404`/`410` is absence, anything else is
/// [`RemoteError::Unavailable`].
pub struct HttpKeyRegistry {
    config: HttpRemoteConfig,
    base: Url,
    http_client: reqwest::Client,
}

impl HttpKeyRegistry {
    pub fn new(config: HttpRemoteConfig) -> Result<Self> {
        let base = parse_base_url(&config.base_url)?;
        let http_client = build_client(&config)?;
        Ok(Self {
            config,
            base,
            http_client,
        })
    }

    pub fn config(&self) -> &HttpRemoteConfig {
        &self.config
    }
}

#[async_trait]
impl KeyRegistry for HttpKeyRegistry {
    async fn lookup(&self, handle: &KeyHandle) -> Result<Option<KeyRecord>> {
        let url = resource_url(&self.base, handle.as_str())?;
        debug!(handle = %handle, url = %url, "looking up key record");

        let response = self
            .http_client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            debug!(handle = %handle, status = %status, "no key record");
            return Ok(None);
        }
        if !status.is_success() {
            warn!(handle = %handle, status = %status, "key registry error status");
            return Err(RemoteError::Unavailable(format!("HTTP {} from {}", status, url)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidRecord(e.to_string()))?;
        let record =
            parse_key_record(&body).map_err(|e| RemoteError::InvalidRecord(e.to_string()))?;
        Ok(Some(record))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Artifacts
// ─────────────────────────────────────────────────────────────────────────────

/// Artifact endpoint over HTTP.
pub struct HttpArtifactSource {
    base: Url,
    http_client: reqwest::Client,
}

impl HttpArtifactSource {
    pub fn new(config: HttpRemoteConfig) -> Result<Self> {
        let base = parse_base_url(&config.base_url)?;
        let http_client = build_client(&config)?;
        Ok(Self { base, http_client })
    }

    async fn fetch(&self, segment: &str) -> Result<Value> {
        let url = resource_url(&self.base, segment)?;
        debug!(url = %url, "fetching artifact");

        let response = self
            .http_client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(RemoteError::Unavailable(format!("HTTP {} from {}", status, url)));
        }

        response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidArtifact(e.to_string()))
    }
}

#[async_trait]
impl ArtifactSource for HttpArtifactSource {
    async fn fetch_latest(&self) -> Result<Value> {
        self.fetch("latest").await
    }

    async fn fetch_by_hash(&self, hash: &str) -> Result<Value> {
        self.fetch(hash).await
    }

    fn artifact_uri(&self, hash: &str) -> Result<Url> {
        resource_url(&self.base, hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use observable_entropy_core::{Environment, Keypair};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record_for(seed: u8) -> (KeyHandle, KeyRecord) {
        let keypair = Keypair::from_seed(&[seed; 32]);
        let record = KeyRecord::issue(&keypair, Environment::Production).unwrap();
        (KeyHandle::derive(&keypair.public_key()), record)
    }

    fn registry(server: &MockServer) -> HttpKeyRegistry {
        HttpKeyRegistry::new(HttpRemoteConfig::new(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_found() {
        let server = MockServer::start().await;
        let (handle, record) = record_for(0x51);
        Mock::given(method("GET"))
            .and(path(format!("/{}", handle)))
            .respond_with(ResponseTemplate::new(200).set_body_json(record.to_value()))
            .mount(&server)
            .await;

        let found = registry(&server).lookup(&handle).await.unwrap();
        assert_eq!(found, Some(record));
    }

    #[tokio::test]
    async fn test_lookup_not_found() {
        let server = MockServer::start().await;
        let (handle, _) = record_for(0x52);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert_eq!(registry(&server).lookup(&handle).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lookup_server_error_is_unavailable() {
        let server = MockServer::start().await;
        let (handle, _) = record_for(0x53);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(matches!(
            registry(&server).lookup(&handle).await,
            Err(RemoteError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_invalid_body() {
        let server = MockServer::start().await;
        let (handle, _) = record_for(0x54);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"handle": "x"})))
            .mount(&server)
            .await;

        assert!(matches!(
            registry(&server).lookup(&handle).await,
            Err(RemoteError::InvalidRecord(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_timeout() {
        let server = MockServer::start().await;
        let (handle, record) = record_for(0x55);
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(record.to_value())
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let config = HttpRemoteConfig {
            request_timeout: Duration::from_millis(50),
            ..HttpRemoteConfig::new(server.uri())
        };
        let registry = HttpKeyRegistry::new(config).unwrap();
        assert!(matches!(registry.lookup(&handle).await, Err(RemoteError::Timeout)));
    }

    #[tokio::test]
    async fn test_lookup_connection_refused() {
        // Nothing listens on port 9 of localhost.
        let registry = HttpKeyRegistry::new(HttpRemoteConfig::new("http://127.0.0.1:9")).unwrap();
        let (handle, _) = record_for(0x56);
        assert!(registry.lookup(&handle).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_artifacts() {
        let server = MockServer::start().await;
        let body = json!({"data": {}, "hash": "ab"});
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = HttpArtifactSource::new(HttpRemoteConfig::new(server.uri())).unwrap();
        assert_eq!(source.fetch_latest().await.unwrap(), body);
        assert!(matches!(
            source.fetch_by_hash("missing").await,
            Err(RemoteError::NotFound(_))
        ));
        assert_eq!(
            source.artifact_uri("abcd").unwrap().as_str(),
            format!("{}/abcd", server.uri())
        );
    }

    #[tokio::test]
    async fn test_base_url_under_a_path() {
        let server = MockServer::start().await;
        let (handle, record) = record_for(0x57);
        Mock::given(method("GET"))
            .and(path(format!("/keys/{}", handle)))
            .respond_with(ResponseTemplate::new(200).set_body_json(record.to_value()))
            .mount(&server)
            .await;

        let registry =
            HttpKeyRegistry::new(HttpRemoteConfig::new(format!("{}/keys", server.uri()))).unwrap();
        assert_eq!(registry.lookup(&handle).await.unwrap(), Some(record));
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        for bad in ["", "entropy.example", "ftp://entropy.example", "http://[::1"] {
            assert!(matches!(
                HttpKeyRegistry::new(HttpRemoteConfig::new(bad)),
                Err(RemoteError::InvalidUrl(_))
            ));
            assert!(matches!(
                HttpArtifactSource::new(HttpRemoteConfig::new(bad)),
                Err(RemoteError::InvalidUrl(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_fetch_non_json_artifact() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let source = HttpArtifactSource::new(HttpRemoteConfig::new(server.uri())).unwrap();
        assert!(matches!(
            source.fetch_latest().await,
            Err(RemoteError::InvalidArtifact(_))
        ));
    }
}
