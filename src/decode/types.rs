//! Decoder types and traits
//!
//! Defines the entity abstraction every resource kind implements.

use super::decoders::FieldReader;
use crate::error::Result;
use crate::types::PropertyMap;
use std::collections::HashSet;

/// Wire names an entity type explicitly models
///
/// Built once per entity type (usually behind a `LazyLock`) from the entity's
/// own wire names plus the wire names of any transient shape used while
/// decoding it. Never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct KnownFieldSet {
    fields: HashSet<&'static str>,
}

impl KnownFieldSet {
    /// Create a field set from the entity's base wire names
    pub fn new(base: &[&'static str]) -> Self {
        Self {
            fields: base.iter().copied().collect(),
        }
    }

    /// Add the wire names of a transient decode shape
    #[must_use]
    pub fn with_transient(mut self, transient: &[&'static str]) -> Self {
        self.fields.extend(transient.iter().copied());
        self
    }

    /// Check if a wire name is modeled
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    /// Number of distinct wire names
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no wire names are modeled
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over the wire names (unordered)
    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().copied()
    }
}

/// A typed domain record decoded from one JSON object
///
/// Implementations read their modeled attributes through a [`FieldReader`].
/// Entities that expose a property slot get every unmodeled top-level string
/// value copied into it after the modeled attributes are decoded.
pub trait Entity: Sized {
    /// Key wrapping a single entity in Get/Create/Update responses
    /// (e.g. `{"volume": {...}}`). `None` when the entity is the body itself.
    const ENVELOPE_KEY: Option<&'static str> = None;

    /// Wire names this entity models
    fn known_fields() -> &'static KnownFieldSet;

    /// Decode the modeled attributes
    fn decode_fields(fields: &FieldReader<'_>) -> Result<Self>;

    /// Slot receiving custom top-level properties, if the entity has one
    fn properties_mut(&mut self) -> Option<&mut PropertyMap> {
        None
    }
}
