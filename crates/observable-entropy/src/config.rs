//! Pipeline configuration.
//!
//! Paths are explicit values handed to the pipeline; there is no global
//! entropy directory.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{EntropyError, Result};
use crate::retry::RetryPolicy;

pub const ENV_ENTROPY_DIR: &str = "ENTROPY_DIR";
pub const ENV_ENTROPY_FILE: &str = "ENTROPY_FILE";
pub const ENV_RETRY_ATTEMPTS: &str = "ENTROPY_RETRY_ATTEMPTS";
pub const ENV_RETRY_DELAY_MS: &str = "ENTROPY_RETRY_DELAY_MS";

/// Configuration for a [`Pipeline`](crate::Pipeline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntropyConfig {
    /// Directory holding one `{source}.json` per collected source. Read by
    /// [`Pipeline::from_config`](crate::Pipeline::from_config).
    pub entropy_dir: PathBuf,
    /// Where the combined document, then the signed artifact, is written.
    pub artifact_file: PathBuf,
    /// Retry policy applied to every collector.
    pub retry: RetryPolicy,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            entropy_dir: PathBuf::from("./entropy"),
            artifact_file: PathBuf::from("./entropy.json"),
            retry: RetryPolicy::default(),
        }
    }
}

impl EntropyConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_ENTROPY_DIR) {
            config.entropy_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup(ENV_ENTROPY_FILE) {
            config.artifact_file = PathBuf::from(file);
        }

        let attempts = match lookup(ENV_RETRY_ATTEMPTS) {
            Some(raw) => parse_number(ENV_RETRY_ATTEMPTS, &raw)?,
            None => u64::from(config.retry.max_attempts),
        };
        let delay_ms = match lookup(ENV_RETRY_DELAY_MS) {
            Some(raw) => parse_number(ENV_RETRY_DELAY_MS, &raw)?,
            None => config.retry.delay.as_millis() as u64,
        };
        let attempts = u32::try_from(attempts)
            .map_err(|_| EntropyError::Config(format!("{} out of range", ENV_RETRY_ATTEMPTS)))?;
        config.retry = RetryPolicy::new(attempts, Duration::from_millis(delay_ms));

        Ok(config)
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.trim().parse().map_err(|_| {
        EntropyError::Config(format!(
            "{} must be a non-negative integer, got {:?}",
            key, raw
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EntropyConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EntropyConfig::default());
        assert_eq!(config.entropy_dir, PathBuf::from("./entropy"));
        assert_eq!(config.artifact_file, PathBuf::from("./entropy.json"));
    }

    #[test]
    fn test_overrides() {
        let config = EntropyConfig::from_lookup(lookup(&[
            (ENV_ENTROPY_DIR, "/tmp/e"),
            (ENV_ENTROPY_FILE, "/tmp/e.json"),
            (ENV_RETRY_ATTEMPTS, "5"),
            (ENV_RETRY_DELAY_MS, "250"),
        ]))
        .unwrap();
        assert_eq!(config.entropy_dir, PathBuf::from("/tmp/e"));
        assert_eq!(config.artifact_file, PathBuf::from("/tmp/e.json"));
        assert_eq!(config.retry, RetryPolicy::new(5, Duration::from_millis(250)));
    }

    #[test]
    fn test_malformed_numbers() {
        assert!(matches!(
            EntropyConfig::from_lookup(lookup(&[(ENV_RETRY_ATTEMPTS, "three")])),
            Err(EntropyError::Config(_))
        ));
        assert!(matches!(
            EntropyConfig::from_lookup(lookup(&[(ENV_RETRY_DELAY_MS, "-1")])),
            Err(EntropyError::Config(_))
        ));
        assert!(matches!(
            EntropyConfig::from_lookup(lookup(&[(ENV_RETRY_ATTEMPTS, "99999999999")])),
            Err(EntropyError::Config(_))
        ));
    }
}
