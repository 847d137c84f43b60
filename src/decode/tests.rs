//! Tests for decoder module

use super::*;
use crate::error::{Error, Result};
use crate::types::PropertyMap;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use std::sync::LazyLock;
use test_case::test_case;

// ============================================================================
// Test Entity
// ============================================================================

static WIDGET_FIELDS: LazyLock<KnownFieldSet> = LazyLock::new(|| {
    KnownFieldSet::new(&["id", "size", "tags"]).with_transient(&["created_at"])
});

#[derive(Debug, Default, PartialEq)]
struct Widget {
    id: String,
    size: i64,
    tags: Vec<String>,
    created_at: Option<chrono::DateTime<Utc>>,
    properties: PropertyMap,
}

impl Entity for Widget {
    fn known_fields() -> &'static KnownFieldSet {
        &WIDGET_FIELDS
    }

    fn decode_fields(fields: &FieldReader<'_>) -> Result<Self> {
        Ok(Self {
            id: fields.string("id")?,
            size: fields.int("size")?,
            tags: fields.string_list("tags")?,
            created_at: fields.timestamp("created_at", TimeLayout::Rfc3339)?,
            properties: PropertyMap::new(),
        })
    }

    fn properties_mut(&mut self) -> Option<&mut PropertyMap> {
        Some(&mut self.properties)
    }
}

#[derive(Debug, PartialEq)]
struct Gadget {
    id: String,
}

static GADGET_FIELDS: LazyLock<KnownFieldSet> = LazyLock::new(|| KnownFieldSet::new(&["id"]));

impl Entity for Gadget {
    const ENVELOPE_KEY: Option<&'static str> = Some("gadget");

    fn known_fields() -> &'static KnownFieldSet {
        &GADGET_FIELDS
    }

    fn decode_fields(fields: &FieldReader<'_>) -> Result<Self> {
        Ok(Self {
            id: fields.string("id")?,
        })
    }
}

// ============================================================================
// KnownFieldSet Tests
// ============================================================================

#[test]
fn test_known_field_set_includes_transient_names() {
    let set = KnownFieldSet::new(&["id", "size"]).with_transient(&["size", "created_at"]);
    assert_eq!(set.len(), 3);
    assert!(set.contains("id"));
    assert!(set.contains("created_at"));
    assert!(!set.contains("owner"));
}

// ============================================================================
// Malformed Payload Tests
// ============================================================================

#[test_case(b"not json" ; "invalid json")]
#[test_case(b"[1, 2, 3]" ; "array body")]
#[test_case(b"\"text\"" ; "string body")]
fn test_decode_rejects_non_objects(body: &[u8]) {
    let err = decode_entity::<Widget>(body).unwrap_err();
    assert!(matches!(err, Error::MalformedPayload { .. }));
}

#[test]
fn test_absent_fields_take_zero_values() {
    let widget: Widget = decode_entity(b"{}").unwrap();
    assert_eq!(widget, Widget::default());
}

// ============================================================================
// Numeric Flexibility Tests
// ============================================================================

#[test_case(json!(1073741824) ; "integer")]
#[test_case(json!(1073741824.0) ; "float")]
#[test_case(json!(1073741824.9) ; "float truncated")]
fn test_size_accepts_integer_and_float(size: serde_json::Value) {
    let body = serde_json::to_vec(&json!({"id": "w1", "size": size})).unwrap();
    let widget: Widget = decode_entity(&body).unwrap();
    assert_eq!(widget.size, 1_073_741_824);
}

#[test]
fn test_null_size_is_zero() {
    let widget: Widget = decode_entity(br#"{"size": null}"#).unwrap();
    assert_eq!(widget.size, 0);
}

#[test_case(json!("1024"), "string" ; "string")]
#[test_case(json!(true), "boolean" ; "boolean")]
#[test_case(json!([1]), "array" ; "array")]
fn test_size_rejects_other_types(size: serde_json::Value, observed_type: &str) {
    let body = serde_json::to_vec(&json!({"size": size})).unwrap();
    match decode_entity::<Widget>(&body).unwrap_err() {
        Error::TypeMismatch { field, observed } => {
            assert_eq!(field, "size");
            assert_eq!(observed, observed_type);
        }
        other => panic!("Expected TypeMismatch, got {other:?}"),
    }
}

#[test]
fn test_string_list_reports_element_path() {
    let err = decode_entity::<Widget>(br#"{"tags": ["a", 2]}"#).unwrap_err();
    match err {
        Error::TypeMismatch { field, observed } => {
            assert_eq!(field, "tags[1]");
            assert_eq!(observed, "number");
        }
        other => panic!("Expected TypeMismatch, got {other:?}"),
    }
}

// ============================================================================
// Timestamp Tests
// ============================================================================

#[test]
fn test_timestamp_present_and_valid() {
    let widget: Widget = decode_entity(br#"{"created_at": "2024-03-01T12:30:00Z"}"#).unwrap();
    assert_eq!(
        widget.created_at,
        Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap())
    );
}

#[test]
fn test_timestamp_with_offset_is_normalized_to_utc() {
    let widget: Widget =
        decode_entity(br#"{"created_at": "2024-03-01T14:30:00+02:00"}"#).unwrap();
    assert_eq!(
        widget.created_at,
        Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap())
    );
}

#[test]
fn test_timestamp_malformed_fails() {
    let err = decode_entity::<Widget>(br#"{"id": "w", "created_at": "last tuesday"}"#).unwrap_err();
    match err {
        Error::TimestampParse { field, value } => {
            assert_eq!(field, "created_at");
            assert_eq!(value, "last tuesday");
        }
        other => panic!("Expected TimestampParse, got {other:?}"),
    }
}

#[test]
fn test_timestamp_absent_is_tolerated() {
    let widget: Widget = decode_entity(br#"{"id": "w"}"#).unwrap();
    assert_eq!(widget.created_at, None);
}

#[test]
fn test_milli_no_z_layout() {
    let parsed = TimeLayout::Rfc3339MilliNoZ.parse("2016-12-08T11:58:22.026490").unwrap();
    assert_eq!(parsed.timestamp_subsec_micros(), 26_490);
    assert_eq!(
        TimeLayout::Rfc3339MilliNoZ.format(&parsed),
        "2016-12-08T11:58:22.026490"
    );

    let whole = TimeLayout::Rfc3339MilliNoZ.parse("2016-12-08T11:58:22").unwrap();
    assert_eq!(whole, Utc.with_ymd_and_hms(2016, 12, 8, 11, 58, 22).unwrap());

    assert!(TimeLayout::Rfc3339.parse("2016-12-08T11:58:22.026490").is_none());
}

// ============================================================================
// Custom Property Tests
// ============================================================================

#[test]
fn test_custom_properties_exclude_known_fields() {
    let body = br#"{
        "id": "w1",
        "size": 10,
        "created_at": "2024-03-01T12:30:00Z",
        "hw_disk_bus": "scsi",
        "architecture": "x86_64"
    }"#;
    let widget: Widget = decode_entity(body).unwrap();

    let mut expected = PropertyMap::new();
    expected.insert("hw_disk_bus".to_string(), "scsi".to_string());
    expected.insert("architecture".to_string(), "x86_64".to_string());
    assert_eq!(widget.properties, expected);
}

#[test]
fn test_custom_properties_drop_non_string_values() {
    let body = br#"{"id": "w1", "os_distro": "ubuntu", "cores": 4, "extra": {"a": "b"}, "flag": true}"#;
    let widget: Widget = decode_entity(body).unwrap();
    assert_eq!(widget.properties.len(), 1);
    assert_eq!(widget.properties["os_distro"], "ubuntu");
}

#[test]
fn test_known_string_field_never_in_properties() {
    let body = br#"{"id": "w1", "tags": [], "created_at": "2024-03-01T12:30:00Z"}"#;
    let widget: Widget = decode_entity(body).unwrap();
    for key in Widget::known_fields().iter() {
        assert!(!widget.properties.contains_key(key));
    }
}

#[test]
fn test_entity_without_property_slot_ignores_extras() {
    let gadget: Gadget = decode_entity(br#"{"gadget": {"id": "g1", "color": "red"}}"#).unwrap();
    assert_eq!(gadget.id, "g1");
}

// ============================================================================
// Envelope Key Tests
// ============================================================================

#[test]
fn test_envelope_key_missing_is_malformed() {
    let err = decode_entity::<Gadget>(br#"{"id": "g1"}"#).unwrap_err();
    assert!(matches!(err, Error::MalformedPayload { .. }));
}

#[test]
fn test_envelope_key_wrong_type_is_malformed() {
    let err = decode_entity::<Gadget>(br#"{"gadget": [1]}"#).unwrap_err();
    assert!(matches!(err, Error::MalformedPayload { .. }));
}

// ============================================================================
// FieldReader Tests
// ============================================================================

#[test]
fn test_field_reader_nested_objects() {
    let object = parse_object(
        br#"{"items": [{"name": "a", "at": "2024-01-01T00:00:00"}, {"name": "b", "at": "bad"}]}"#,
    )
    .unwrap();
    let reader = FieldReader::new(&object);

    let err = reader
        .objects("items", |item| {
            Ok((
                item.string("name")?,
                item.timestamp("at", TimeLayout::Rfc3339MilliNoZ)?,
            ))
        })
        .unwrap_err();

    match err {
        Error::TimestampParse { field, .. } => assert_eq!(field, "items[1].at"),
        other => panic!("Expected TimestampParse, got {other:?}"),
    }
}

#[test]
fn test_field_reader_maps() {
    let object = parse_object(br#"{"meta": {"k": "v"}, "any": {"n": 1}, "bad": {"n": 1}}"#).unwrap();
    let reader = FieldReader::new(&object);

    assert_eq!(reader.string_map("meta").unwrap()["k"], "v");
    assert_eq!(reader.value_map("any").unwrap()["n"], json!(1));
    assert!(reader.string_map("bad").is_err());
    assert!(reader.string_map("missing").unwrap().is_empty());
}

#[test]
fn test_field_reader_null_is_absent() {
    let object = parse_object(br#"{"name": null, "flag": null}"#).unwrap();
    let reader = FieldReader::new(&object);
    assert!(!reader.contains("name"));
    assert_eq!(reader.string("name").unwrap(), "");
    assert!(!reader.bool("flag").unwrap());
}

// ============================================================================
// Sub-projection Tests
// ============================================================================

#[derive(Debug, Deserialize, PartialEq)]
struct NextOnly {
    #[serde(default)]
    next: String,
}

#[test]
fn test_decode_into_projection() {
    let next: NextOnly = decode_into(br#"{"images": [], "next": "/v2/images?marker=x"}"#).unwrap();
    assert_eq!(next.next, "/v2/images?marker=x");
}

#[test]
fn test_decode_into_at_key() {
    let ids: Vec<String> = decode_into_at(br#"{"ids": ["a", "b"]}"#, "ids").unwrap();
    assert_eq!(ids, vec!["a", "b"]);

    let err = decode_into_at::<Vec<String>>(br#"{"ids": "a"}"#, "ids").unwrap_err();
    assert!(matches!(err, Error::MalformedPayload { .. }));
}
