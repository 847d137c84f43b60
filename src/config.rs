//! Client configuration
//!
//! Describes how to reach one service endpoint, in YAML form. A loaded
//! [`ClientConfig`] turns into the transport's [`HttpClientConfig`].

use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClient, HttpClientConfig};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

// ============================================================================
// Top-Level Client Config
// ============================================================================

/// Connection settings for one service endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service endpoint, e.g. `https://image.example.com/v2`
    pub endpoint: String,

    /// Auth token sent as `X-Auth-Token`
    #[serde(default)]
    pub token: Option<String>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

/// Retry backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::default(),
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60_000
}

// ============================================================================
// Loading
// ============================================================================

impl ClientConfig {
    /// Config for an endpoint with every other setting at its default
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: None,
            user_agent: None,
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffConfig::default(),
            headers: HashMap::new(),
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Check that the config describes a usable endpoint
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::config("endpoint cannot be empty"));
        }

        let url = Url::parse(&self.endpoint)
            .map_err(|e| Error::config(format!("invalid endpoint '{}': {e}", self.endpoint)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "endpoint must be http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(Error::config("timeout_seconds must be positive"));
        }

        if self.retry_backoff.initial_ms > self.retry_backoff.max_ms {
            return Err(Error::config(
                "retry_backoff.initial_ms cannot exceed retry_backoff.max_ms",
            ));
        }

        Ok(())
    }

    /// Transport settings described by this config
    pub fn to_http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(self.endpoint.clone())
            .timeout(Duration::from_secs(self.timeout_seconds))
            .max_retries(self.max_retries)
            .backoff(
                self.retry_backoff.backoff_type,
                Duration::from_millis(self.retry_backoff.initial_ms),
                Duration::from_millis(self.retry_backoff.max_ms),
            );

        if let Some(ref token) = self.token {
            builder = builder.auth_token(token.clone());
        }
        if let Some(ref agent) = self.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        for (key, value) in &self.headers {
            builder = builder.header(key.clone(), value.clone());
        }

        builder.build()
    }

    /// Build a client for this endpoint
    pub fn client(&self) -> Result<HttpClient> {
        HttpClient::with_config(self.to_http_config())
    }
}
