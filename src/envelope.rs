//! Result envelopes
//!
//! Wraps the outcome of one request: either the raw response, or the
//! transport failure that prevented one. Decoding happens lazily, on every
//! `extract*` call, straight from the stored body.

use crate::decode::{decode_entity, decode_into, decode_into_at, Entity};
use crate::error::{Error, Result, TransportError};
use crate::types::RawBody;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

/// Outcome of a Get/Create/Update style request
#[derive(Debug, Clone, Default)]
pub struct ResultEnvelope {
    body: RawBody,
    status: Option<u16>,
    headers: HeaderMap,
    error: Option<TransportError>,
}

impl ResultEnvelope {
    /// Wrap a body received without further response details
    pub fn from_body(body: impl Into<RawBody>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    /// Wrap a complete response
    pub fn from_response(status: u16, headers: HeaderMap, body: impl Into<RawBody>) -> Self {
        Self {
            body: body.into(),
            status: Some(status),
            headers,
            error: None,
        }
    }

    /// Wrap a failed exchange
    pub fn from_error(error: TransportError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }

    /// Raw response body (empty on transport failure)
    pub fn body(&self) -> &RawBody {
        &self.body
    }

    /// HTTP status, when a response was received
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Single header value as text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Transport failure, if the exchange failed
    pub fn err(&self) -> Option<&TransportError> {
        self.error.as_ref()
    }

    /// Check if the exchange succeeded
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn check(&self) -> Result<()> {
        match &self.error {
            Some(e) => Err(Error::Transport(e.clone())),
            None => Ok(()),
        }
    }

    /// Decode the response into an entity, custom properties included
    pub fn extract<E: Entity>(&self) -> Result<E> {
        self.check()?;
        decode_entity(&self.body)
    }

    /// Decode the response into an arbitrary serde shape
    pub fn extract_into<T: DeserializeOwned>(&self) -> Result<T> {
        self.check()?;
        decode_into(&self.body)
    }

    /// Decode the value under one top-level key into an arbitrary serde shape
    pub fn extract_into_at<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.check()?;
        decode_into_at(&self.body, key)
    }
}

impl From<TransportError> for ResultEnvelope {
    fn from(error: TransportError) -> Self {
        Self::from_error(error)
    }
}

/// Outcome of a request whose only interesting result is failure (Delete)
#[derive(Debug, Clone, Default)]
pub struct ErrResult {
    inner: ResultEnvelope,
}

impl ErrResult {
    /// Surface the transport failure, if any
    pub fn extract_err(&self) -> Result<()> {
        self.inner.check()
    }

    /// The wrapped envelope
    pub fn envelope(&self) -> &ResultEnvelope {
        &self.inner
    }
}

impl From<ResultEnvelope> for ErrResult {
    fn from(inner: ResultEnvelope) -> Self {
        Self { inner }
    }
}
