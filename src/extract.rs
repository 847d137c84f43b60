//! Collection extraction
//!
//! Decodes the entities embedded in a list response, for one page or for a
//! whole traversal. All-or-nothing: one undecodable element fails the call.

use crate::decode::{decode_entity_value, parse_object, Entity};
use crate::error::{Error, Result};
use crate::pagination::Page;
use crate::types::{json_type_name, JsonValue};
use futures::{Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Decode every entity in the array under `key`
///
/// An absent or `null` array is an empty collection.
pub fn extract_collection<E: Entity>(body: &[u8], key: &str) -> Result<Vec<E>> {
    let object = parse_object(body)?;
    match object.get(key) {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(JsonValue::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                decode_entity_value(item).inspect_err(|e| {
                    debug!("Element {} of '{}' failed to decode: {}", i, key, e);
                })
            })
            .collect(),
        Some(other) => Err(Error::type_mismatch(key, json_type_name(other))),
    }
}

/// Decode the array under `key` into arbitrary serde shapes
pub fn extract_collection_into<T: DeserializeOwned>(body: &[u8], key: &str) -> Result<Vec<T>> {
    let mut object = parse_object(body)?;
    match object.remove(key) {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(value @ JsonValue::Array(_)) => serde_json::from_value(value)
            .map_err(|e| Error::malformed(format!("Failed to decode '{key}': {e}"))),
        Some(other) => Err(Error::type_mismatch(key, json_type_name(&other))),
    }
}

/// Decode the entities of one page
pub fn extract_page<P: Page>(page: &P) -> Result<Vec<P::Item>> {
    extract_collection(page.link_page().body(), P::COLLECTION_KEY)
}

/// Decode the entities of every page, concatenated in page order
pub fn extract_all<P, I>(pages: I) -> Result<Vec<P::Item>>
where
    P: Page,
    I: IntoIterator<Item = Result<P>>,
{
    let mut items = Vec::new();
    for page in pages {
        items.extend(page?.extract()?);
    }
    Ok(items)
}

/// Async counterpart of [`extract_all`]
pub async fn extract_all_stream<P, S>(pages: S) -> Result<Vec<P::Item>>
where
    P: Page,
    S: Stream<Item = Result<P>>,
{
    pages
        .try_fold(Vec::new(), |mut items, page| async move {
            items.extend(page.extract()?);
            Ok::<_, Error>(items)
        })
        .await
}
