//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all resource pages.

use crate::decode::{decode_into, decode_into_at, parse_object, Entity};
use crate::error::Result;
use crate::extract::extract_page;
use crate::types::{JsonObject, RawBody};
use serde::de::DeserializeOwned;
use url::Url;

/// One page of a list response, as received
#[derive(Debug, Clone)]
pub struct LinkPage {
    url: Url,
    body: RawBody,
}

impl LinkPage {
    /// Create a page from its request URL and body
    pub fn new(url: Url, body: impl Into<RawBody>) -> Self {
        Self {
            url,
            body: body.into(),
        }
    }

    /// URL the page was requested from
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Raw page body
    pub fn body(&self) -> &RawBody {
        &self.body
    }

    /// Parse the body as a JSON object
    pub fn parse_object(&self) -> Result<JsonObject> {
        parse_object(&self.body)
    }

    /// Decode the body into an arbitrary serde shape
    pub fn extract_into<T: DeserializeOwned>(&self) -> Result<T> {
        decode_into(&self.body)
    }

    /// Decode the value under one top-level key into an arbitrary serde shape
    pub fn extract_into_at<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        decode_into_at(&self.body, key)
    }
}

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Another page lives at this URL
    Continue {
        /// Absolute URL of the next page
        url: Url,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation to a URL
    pub fn with_url(url: Url) -> Self {
        Self::Continue { url }
    }

    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }

    /// Next page URL, if any
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Continue { url } => Some(url),
            Self::Done => None,
        }
    }

    /// Take the next page URL, if any
    pub fn into_url(self) -> Option<Url> {
        match self {
            Self::Continue { url } => Some(url),
            Self::Done => None,
        }
    }
}

/// Reads the next-page reference out of a page body
pub trait LinkStrategy: Send + Sync {
    /// Determine where the page after `page` lives
    fn next_page(&self, page: &LinkPage) -> Result<NextPage>;
}

/// A typed page of one resource kind
///
/// `is_empty` and `extract` go through the same collection extraction, so an
/// empty check never disagrees with the entities actually decoded.
pub trait Page: Sized {
    /// Entity embedded in the page
    type Item: Entity;

    /// Key of the array holding the page's entities
    const COLLECTION_KEY: &'static str;

    /// Wrap a fetched page
    fn from_link_page(page: LinkPage) -> Self;

    /// The underlying page
    fn link_page(&self) -> &LinkPage;

    /// Where the next page lives
    fn next_page(&self) -> Result<NextPage>;

    /// Check if the page carries no entities
    fn is_empty(&self) -> Result<bool> {
        Ok(self.extract()?.is_empty())
    }

    /// Decode every entity on the page
    fn extract(&self) -> Result<Vec<Self::Item>> {
        extract_page(self)
    }
}
