//! Link strategy implementations
//!
//! Each strategy handles one way a list response embeds its next page.

use super::types::{LinkPage, LinkStrategy, NextPage};
use crate::error::{Error, Result};
use crate::types::{json_type_name, JsonValue, Link, OptionStringExt};
use url::Url;

// ============================================================================
// Next URL
// ============================================================================

/// Next page reference in a top-level string field
///
/// Common patterns:
/// - `{ "images": [...], "next": "/v2/images?marker=abc" }`
/// - `{ "next": "https://image.example.com/v2/images?marker=abc" }`
#[derive(Debug, Clone)]
pub struct NextUrlLink {
    /// Field holding the next reference
    pub field: String,
}

impl Default for NextUrlLink {
    fn default() -> Self {
        Self {
            field: "next".to_string(),
        }
    }
}

impl NextUrlLink {
    /// Create a next URL strategy reading `field`
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl LinkStrategy for NextUrlLink {
    fn next_page(&self, page: &LinkPage) -> Result<NextPage> {
        let object = page.parse_object()?;
        let next = match object.get(&self.field) {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) => s.clone().none_if_empty(),
            Some(other) => {
                return Err(Error::pagination(format!(
                    "'{}' must be a string, found {}",
                    self.field,
                    json_type_name(other)
                )))
            }
        };

        match next {
            Some(next) => Ok(NextPage::with_url(resolve_next(page.url(), &next)?)),
            None => Ok(NextPage::Done),
        }
    }
}

// ============================================================================
// Links Array
// ============================================================================

/// Next page reference in a `<resource>_links` list of `{rel, href}` pairs
///
/// Format: `{ "volumes_links": [{"rel": "next", "href": "https://..."}] }`
#[derive(Debug, Clone)]
pub struct LinksArray {
    /// Field holding the links list
    pub field: String,
    /// Rel value to follow (default: "next")
    pub rel: String,
}

impl LinksArray {
    /// Create a links strategy following `rel="next"`
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rel: "next".to_string(),
        }
    }

    /// Follow a different rel
    #[must_use]
    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = rel.into();
        self
    }
}

impl LinkStrategy for LinksArray {
    fn next_page(&self, page: &LinkPage) -> Result<NextPage> {
        let object = page.parse_object()?;
        let links: Vec<Link> = match object.get(&self.field) {
            None | Some(JsonValue::Null) => return Ok(NextPage::Done),
            Some(value @ JsonValue::Array(_)) => serde_json::from_value(value.clone())
                .map_err(|e| Error::pagination(format!("malformed '{}': {e}", self.field)))?,
            Some(other) => {
                return Err(Error::pagination(format!(
                    "'{}' must be an array, found {}",
                    self.field,
                    json_type_name(other)
                )))
            }
        };

        match find_link(&links, &self.rel) {
            Some(href) => Ok(NextPage::with_url(resolve_next(page.url(), href)?)),
            None => Ok(NextPage::Done),
        }
    }
}

/// Find the href of the first link with the given rel
fn find_link<'a>(links: &'a [Link], rel: &str) -> Option<&'a str> {
    links
        .iter()
        .find(|link| link.rel == rel)
        .map(|link| link.href.as_str())
        .filter(|href| !href.is_empty())
}

// ============================================================================
// URL Resolution
// ============================================================================

/// Resolve a next reference against the URL of the current page
///
/// Absolute URLs pass through. An absolute path keeps the service prefix of
/// the current URL: `https://host/image/v2/images` with `/v2/images?marker=x`
/// gives `https://host/image/v2/images?marker=x`. Anything else is joined as a
/// plain relative reference.
pub fn resolve_next(current: &Url, next: &str) -> Result<Url> {
    if let Ok(absolute) = Url::parse(next) {
        return Ok(absolute);
    }

    if let Some(rest) = next.strip_prefix('/') {
        let first = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if !first.is_empty() {
            let current_path = format!("{}/", current.path());
            if let Some(pos) = current_path.find(&format!("/{first}/")) {
                let prefix = &current_path[..pos];
                return Ok(current.join(&format!("{prefix}{next}"))?);
            }
        }
    }

    Ok(current.join(next)?)
}
