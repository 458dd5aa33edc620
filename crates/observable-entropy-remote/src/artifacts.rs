//! Retrieval of published artifacts.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::{RemoteError, Result};

/// A place artifacts are published to and fetched from.
///
/// Fetches return untyped JSON; the verifier does all validation.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// The most recently published artifact.
    async fn fetch_latest(&self) -> Result<Value>;

    /// The artifact published under a hash.
    async fn fetch_by_hash(&self, hash: &str) -> Result<Value>;

    /// Public URI of the artifact with the given hash.
    fn artifact_uri(&self, hash: &str) -> Result<Url>;
}

/// Parse a service base URL. Only absolute `http` and `https` URLs are
/// accepted.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| RemoteError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(RemoteError::InvalidUrl(format!(
            "{}: expected an http(s) base URL",
            raw
        )));
    }
    Ok(url)
}

/// `base` with one more path segment. The segment is percent-encoded, so
/// `/`, `?` and `#` stay inside it.
pub fn resource_url(base: &Url, segment: &str) -> Result<Url> {
    if segment.is_empty() || segment == "." || segment == ".." {
        return Err(RemoteError::InvalidUrl(format!(
            "invalid path segment {:?}",
            segment
        )));
    }
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| RemoteError::InvalidUrl(format!("{} cannot be a base", base)))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}
