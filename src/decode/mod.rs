//! Entity decoder module
//!
//! Supports: typed attribute decoding, flexible numerics and timestamps,
//! custom top-level property extraction, serde sub-projections
//!
//! # Overview
//!
//! Each resource kind implements [`Entity`]: it declares the wire names it
//! models and reads them through a [`FieldReader`]. Every top-level string
//! value outside that set lands in the entity's property map, when it has one.

mod decoders;
pub mod time;
mod types;

pub use decoders::{
    decode_entity, decode_entity_object, decode_entity_value, decode_into, decode_into_at,
    extract_custom_properties, parse_object, FieldReader,
};
pub use time::TimeLayout;
pub use types::{Entity, KnownFieldSet};

#[cfg(test)]
mod tests;
