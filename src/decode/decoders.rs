//! Entity decoding
//!
//! Turns a raw JSON body into a typed entity plus the residual custom
//! properties the entity does not model.

use super::time::TimeLayout;
use super::types::{Entity, KnownFieldSet};
use crate::error::{Error, Result};
use crate::types::{json_type_name, JsonObject, JsonValue, PropertyMap, ValueMap};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::trace;

// ============================================================================
// Field Reader
// ============================================================================

/// Typed, wire-name based access to the attributes of one JSON object
///
/// Absent and `null` fields read as the zero value of the requested type.
/// A present field of the wrong JSON type fails with `TypeMismatch`.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    object: &'a JsonObject,
    path: Option<&'a str>,
}

impl<'a> FieldReader<'a> {
    /// Create a reader over a top-level object
    pub fn new(object: &'a JsonObject) -> Self {
        Self { object, path: None }
    }

    /// Create a reader over a nested object, reporting fields under `path`
    pub fn nested(object: &'a JsonObject, path: &'a str) -> Self {
        Self {
            object,
            path: Some(path),
        }
    }

    /// The underlying object
    pub fn object(&self) -> &'a JsonObject {
        self.object
    }

    /// Present, non-null value of a field
    pub fn get(&self, name: &str) -> Option<&'a JsonValue> {
        self.object.get(name).filter(|v| !v.is_null())
    }

    /// Check if a field is present and non-null
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn field_path(&self, name: &str) -> String {
        match self.path {
            Some(path) => format!("{path}.{name}"),
            None => name.to_string(),
        }
    }

    fn mismatch(&self, name: &str, value: &JsonValue) -> Error {
        Error::type_mismatch(self.field_path(name), json_type_name(value))
    }

    /// Read a string field
    pub fn string(&self, name: &str) -> Result<String> {
        match self.get(name) {
            None => Ok(String::new()),
            Some(JsonValue::String(s)) => Ok(s.clone()),
            Some(other) => Err(self.mismatch(name, other)),
        }
    }

    /// Read a boolean field
    pub fn bool(&self, name: &str) -> Result<bool> {
        match self.get(name) {
            None => Ok(false),
            Some(JsonValue::Bool(b)) => Ok(*b),
            Some(other) => Err(self.mismatch(name, other)),
        }
    }

    /// Read an integer field that may arrive as an integer or a float
    ///
    /// Floats are truncated toward zero.
    pub fn int(&self, name: &str) -> Result<i64> {
        match self.get(name) {
            None => Ok(0),
            Some(JsonValue::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    Ok(i)
                } else if let Some(u) = n.as_u64() {
                    Ok(i64::try_from(u).unwrap_or(i64::MAX))
                } else if let Some(f) = n.as_f64() {
                    Ok(f.trunc() as i64)
                } else {
                    Err(self.mismatch(name, &JsonValue::Number(n.clone())))
                }
            }
            Some(other) => Err(self.mismatch(name, other)),
        }
    }

    /// Read a list of strings
    pub fn string_list(&self, name: &str) -> Result<Vec<String>> {
        match self.get(name) {
            None => Ok(Vec::new()),
            Some(JsonValue::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    JsonValue::String(s) => Ok(s.clone()),
                    other => Err(Error::type_mismatch(
                        format!("{}[{i}]", self.field_path(name)),
                        json_type_name(other),
                    )),
                })
                .collect(),
            Some(other) => Err(self.mismatch(name, other)),
        }
    }

    /// Read an object whose values are all strings
    pub fn string_map(&self, name: &str) -> Result<HashMap<String, String>> {
        match self.get(name) {
            None => Ok(HashMap::new()),
            Some(JsonValue::Object(map)) => map
                .iter()
                .map(|(k, v)| match v {
                    JsonValue::String(s) => Ok((k.clone(), s.clone())),
                    other => Err(Error::type_mismatch(
                        format!("{}.{k}", self.field_path(name)),
                        json_type_name(other),
                    )),
                })
                .collect(),
            Some(other) => Err(self.mismatch(name, other)),
        }
    }

    /// Read an object with arbitrary JSON values
    pub fn value_map(&self, name: &str) -> Result<ValueMap> {
        match self.get(name) {
            None => Ok(HashMap::new()),
            Some(JsonValue::Object(map)) => Ok(map
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()),
            Some(other) => Err(self.mismatch(name, other)),
        }
    }

    /// Read a timestamp field in the given layout
    ///
    /// An absent field is `None`; a present but unparseable one fails with
    /// `TimestampParse`.
    pub fn timestamp(&self, name: &str, layout: TimeLayout) -> Result<Option<DateTime<Utc>>> {
        match self.get(name) {
            None => Ok(None),
            Some(JsonValue::String(raw)) => layout
                .parse(raw)
                .map(Some)
                .ok_or_else(|| Error::timestamp(self.field_path(name), raw.clone())),
            Some(other) => Err(self.mismatch(name, other)),
        }
    }

    /// Read a list of nested records, each decoded by `decode`
    pub fn objects<T, F>(&self, name: &str, decode: F) -> Result<Vec<T>>
    where
        F: Fn(&FieldReader<'_>) -> Result<T>,
    {
        match self.get(name) {
            None => Ok(Vec::new()),
            Some(JsonValue::Array(items)) => {
                let base = self.field_path(name);
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let path = format!("{base}[{i}]");
                        match item {
                            JsonValue::Object(obj) => decode(&FieldReader::nested(obj, &path)),
                            other => Err(Error::type_mismatch(path, json_type_name(other))),
                        }
                    })
                    .collect()
            }
            Some(other) => Err(self.mismatch(name, other)),
        }
    }
}

// ============================================================================
// Entity Decoding
// ============================================================================

/// Parse a raw body that must be a JSON object
pub fn parse_object(body: &[u8]) -> Result<JsonObject> {
    let value: JsonValue = serde_json::from_slice(body)
        .map_err(|e| Error::malformed(format!("Failed to parse JSON: {e}")))?;
    match value {
        JsonValue::Object(object) => Ok(object),
        other => Err(Error::malformed(format!(
            "expected a JSON object, found {}",
            json_type_name(&other)
        ))),
    }
}

/// Decode a raw body into an entity
///
/// Descends into `E::ENVELOPE_KEY` first when the entity declares one.
pub fn decode_entity<E: Entity>(body: &[u8]) -> Result<E> {
    let object = parse_object(body)?;
    match E::ENVELOPE_KEY {
        Some(key) => match object.get(key) {
            Some(JsonValue::Object(inner)) => decode_entity_object(inner),
            Some(other) => Err(Error::malformed(format!(
                "expected object under '{key}', found {}",
                json_type_name(other)
            ))),
            None => Err(Error::malformed(format!("missing '{key}' object"))),
        },
        None => decode_entity_object(&object),
    }
}

/// Decode one already-parsed JSON value (e.g. a collection element)
pub fn decode_entity_value<E: Entity>(value: &JsonValue) -> Result<E> {
    match value {
        JsonValue::Object(object) => decode_entity_object(object),
        other => Err(Error::malformed(format!(
            "expected a JSON object, found {}",
            json_type_name(other)
        ))),
    }
}

/// Decode an entity from its JSON object
pub fn decode_entity_object<E: Entity>(object: &JsonObject) -> Result<E> {
    let mut entity = E::decode_fields(&FieldReader::new(object))?;
    if let Some(properties) = entity.properties_mut() {
        *properties = extract_custom_properties(object, E::known_fields());
    }
    Ok(entity)
}

/// Collect the top-level string values whose keys are not modeled
///
/// Non-string leftovers are dropped.
pub fn extract_custom_properties(object: &JsonObject, known: &KnownFieldSet) -> PropertyMap {
    object
        .iter()
        .filter(|(key, _)| !known.contains(key))
        .filter_map(|(key, value)| match value {
            JsonValue::String(s) => Some((key.clone(), s.clone())),
            other => {
                trace!(
                    "Dropping custom property '{}' of type {}",
                    key,
                    json_type_name(other)
                );
                None
            }
        })
        .collect()
}

// ============================================================================
// Sub-projection Decoding
// ============================================================================

/// Decode a raw body into an arbitrary serde shape
///
/// No custom-property extraction happens on this path.
pub fn decode_into<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| Error::malformed(format!("Failed to decode: {e}")))
}

/// Decode the value under one top-level key into an arbitrary serde shape
pub fn decode_into_at<T: DeserializeOwned>(body: &[u8], key: &str) -> Result<T> {
    let mut object = parse_object(body)?;
    let value = object.remove(key).unwrap_or(JsonValue::Null);
    serde_json::from_value(value)
        .map_err(|e| Error::malformed(format!("Failed to decode '{key}': {e}")))
}
