//! Client configuration: base URL and request deadline.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Deserializer};

use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub const BASE_URL_ENV: &str = "OLLAMA_BASE_URL";
pub const TIMEOUT_ENV: &str = "OLLAMA_TIMEOUT_MS";

/// Recognised construction options for an [`OllamaClient`](crate::OllamaClient).
///
/// Deserializes from `{ "base_url": "...", "timeout_ms": 30000 }`; either key
/// may be omitted.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(rename = "timeout_ms", deserialize_with = "millis")]
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Reads `OLLAMA_BASE_URL` and `OLLAMA_TIMEOUT_MS`, falling back to the
    /// defaults for whichever is unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Client`] if `OLLAMA_TIMEOUT_MS` is not an integer.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::Client(format!("Invalid {}: {}", TIMEOUT_ENV, e)))?;
            config.timeout = Duration::from_millis(millis);
        }
        Ok(config)
    }

    /// Base URL with every trailing slash removed, checked to be an absolute URL.
    pub(crate) fn normalized_base_url(&self) -> Result<String> {
        let base_url = normalize_base_url(&self.base_url);
        Url::parse(base_url).map_err(|e| Error::Client(format!("Invalid base URL: {}", e)))?;
        Ok(base_url.to_string())
    }
}

pub(crate) fn normalize_base_url(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

fn millis<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}
