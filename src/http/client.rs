//! HTTP client with retry
//!
//! Provides the request/response collaborator the decoding layer relies on:
//! - Automatic retries with configurable backoff
//! - Token and default headers on every request
//! - Responses wrapped in result envelopes instead of early errors
//! - Page fetching for linked list traversal

use crate::envelope::{ErrResult, ResultEnvelope};
use crate::error::{is_retryable_status, Error, Result, TransportError};
use crate::extract::extract_all_stream;
use crate::pagination::{page_stream, LinkPage, Page};
use crate::types::BackoffType;
use futures::stream::{BoxStream, StreamExt};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Header carrying the auth token
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for relative request paths
    pub base_url: Option<String>,
    /// Auth token sent as `X-Auth-Token`
    pub auth_token: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            auth_token: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            default_headers: HashMap::new(),
            user_agent: format!("stacklink/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the auth token
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.config.auth_token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: HashMap<String, String>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<Value>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
    /// Override max retries for this request
    pub max_retries: Option<u32>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set max retries
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }
}

/// HTTP client with retry
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(TransportError::from)?;

        Ok(Self { client, config })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Envelope requests
    // ------------------------------------------------------------------------

    /// Make a GET request
    pub async fn get(&self, url: &str) -> ResultEnvelope {
        self.send(Method::GET, url, RequestConfig::default()).await
    }

    /// Make a GET request with config
    pub async fn get_with_config(&self, url: &str, config: RequestConfig) -> ResultEnvelope {
        self.send(Method::GET, url, config).await
    }

    /// Make a POST request
    pub async fn post(&self, url: &str, body: Value) -> ResultEnvelope {
        self.send(Method::POST, url, RequestConfig::default().json(body))
            .await
    }

    /// Make a PUT request
    pub async fn put(&self, url: &str, body: Value) -> ResultEnvelope {
        self.send(Method::PUT, url, RequestConfig::default().json(body))
            .await
    }

    /// Make a PATCH request
    pub async fn patch(&self, url: &str, body: Value) -> ResultEnvelope {
        self.send(Method::PATCH, url, RequestConfig::default().json(body))
            .await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str) -> ErrResult {
        self.send(Method::DELETE, url, RequestConfig::default())
            .await
            .into()
    }

    /// Make a request and wrap the outcome, success or failure
    pub async fn send(&self, method: Method, url: &str, config: RequestConfig) -> ResultEnvelope {
        let response = match self.request(method, url, config).await {
            Ok(response) => response,
            Err(e) => return ResultEnvelope::from_error(e),
        };

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        match response.bytes().await {
            Ok(body) => ResultEnvelope::from_response(status, headers, body),
            Err(e) => ResultEnvelope::from_error(e.into()),
        }
    }

    // ------------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------------

    /// Fetch one page of a list endpoint
    pub async fn fetch_page(&self, url: &str) -> Result<LinkPage> {
        let page_url = Url::parse(&self.build_url(url))?;
        let envelope = self.get(page_url.as_str()).await;
        if let Some(e) = envelope.err() {
            return Err(Error::Transport(e.clone()));
        }
        Ok(LinkPage::new(page_url, envelope.body().clone()))
    }

    /// Stream the typed pages of a list endpoint, one request per pull
    pub fn list<'a, P>(&'a self, url: &str) -> Result<BoxStream<'a, Result<P>>>
    where
        P: Page + Send + 'a,
    {
        let start = Url::parse(&self.build_url(url))?;
        Ok(page_stream(start, move |next: Url| async move {
            self.fetch_page(next.as_str()).await
        })
        .boxed())
    }

    /// Fetch every page of a list endpoint and decode all entities
    pub async fn list_all<P>(&self, url: &str) -> Result<Vec<P::Item>>
    where
        P: Page + Send,
    {
        extract_all_stream(self.list::<P>(url)?).await
    }

    // ------------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------------

    /// Make a request, retrying transient failures
    ///
    /// Error statuses come back as `TransportError::Status` once retries are
    /// spent, with the response body as the message.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> std::result::Result<Response, TransportError> {
        let full_url = self.build_url(url);
        let max_retries = config.max_retries.unwrap_or(self.config.max_retries);
        let timeout = config.timeout.unwrap_or(self.config.timeout);

        let mut attempt = 0;
        loop {
            let outcome = self
                .build_request(method.clone(), &full_url, &config, timeout)
                .send()
                .await;

            let failure = match outcome {
                Ok(response)
                    if !response.status().is_client_error()
                        && !response.status().is_server_error() =>
                {
                    debug!("{} {} -> {}", method, full_url, response.status());
                    return Ok(response);
                }
                Ok(response) => Attempt::Status(response),
                Err(e) if e.is_timeout() => Attempt::Timeout,
                Err(e) if e.is_connect() => Attempt::Connect(e),
                Err(e) => return Err(e.into()),
            };

            if attempt >= max_retries || !failure.is_retryable() {
                return Err(failure.into_error(timeout).await);
            }

            let delay = match &failure {
                Attempt::Status(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    extract_retry_after(response).unwrap_or_else(|| self.calculate_backoff(attempt))
                }
                _ => self.calculate_backoff(attempt),
            };
            warn!(
                "{} {} failed ({}), attempt {}/{}, retrying in {:?}",
                method,
                full_url,
                failure,
                attempt + 1,
                max_retries + 1,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    fn build_request(
        &self,
        method: Method,
        url: &str,
        config: &RequestConfig,
        timeout: Duration,
    ) -> RequestBuilder {
        let mut req = self.client.request(method, url).timeout(timeout);

        for (key, value) in self.config.default_headers.iter().chain(&config.headers) {
            req = req.header(key.as_str(), value.as_str());
        }
        if let Some(ref token) = self.config.auth_token {
            req = req.header(AUTH_TOKEN_HEADER, token.as_str());
        }
        if !config.query.is_empty() {
            req = req.query(&config.query);
        }
        if let Some(ref body) = config.body {
            req = req.json(body);
        }
        req
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff * factor
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("has_auth_token", &self.config.auth_token.is_some())
            .field("max_retries", &self.config.max_retries)
            .finish_non_exhaustive()
    }
}

/// A failed attempt, kept until the retry decision is made
enum Attempt {
    Status(Response),
    Timeout,
    Connect(reqwest::Error),
}

impl Attempt {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Status(response) => is_retryable_status(response.status().as_u16()),
            Self::Timeout | Self::Connect(_) => true,
        }
    }

    async fn into_error(self, timeout: Duration) -> TransportError {
        match self {
            Self::Status(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                TransportError::status(status, body)
            }
            Self::Timeout => TransportError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            },
            Self::Connect(e) => e.into(),
        }
    }
}

impl std::fmt::Display for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(response) => write!(f, "HTTP {}", response.status().as_u16()),
            Self::Timeout => f.write_str("timeout"),
            Self::Connect(_) => f.write_str("connection error"),
        }
    }
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
}
