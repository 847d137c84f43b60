//! Image service v2 images
//!
//! Image records carry caller-defined properties as top-level keys, so the
//! decoder folds every unmodeled string value into [`Image::properties`].

use crate::decode::time::rfc3339;
use crate::decode::{Entity, FieldReader, KnownFieldSet, TimeLayout};
use crate::error::Result;
use crate::pagination::{LinkPage, LinkStrategy, NextPage, NextUrlLink, Page};
use crate::types::PropertyMap;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Wire names of the image shape itself
const IMAGE_FIELDS: &[&str] = &[
    "id",
    "name",
    "status",
    "tags",
    "container_format",
    "disk_format",
    "min_disk",
    "min_ram",
    "owner",
    "protected",
    "visibility",
    "checksum",
    "size",
    "metadata",
    "properties",
    "file",
    "schema",
    "virtual_size",
    "self",
    "direct_url",
    "locations",
];

/// Wire names read through custom parsing (flexible size, timestamps)
const IMAGE_TRANSIENT_FIELDS: &[&str] = &["size", "created_at", "updated_at"];

static KNOWN_FIELDS: LazyLock<KnownFieldSet> =
    LazyLock::new(|| KnownFieldSet::new(IMAGE_FIELDS).with_transient(IMAGE_TRANSIENT_FIELDS));

// ============================================================================
// Status / Visibility
// ============================================================================

/// Lifecycle state of an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    Queued,
    Saving,
    Active,
    Killed,
    Deleted,
    PendingDelete,
    Deactivated,
    Importing,
    /// Any value this version does not know, kept verbatim
    Other(String),
}

impl ImageStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Saving => "saving",
            Self::Active => "active",
            Self::Killed => "killed",
            Self::Deleted => "deleted",
            Self::PendingDelete => "pending_delete",
            Self::Deactivated => "deactivated",
            Self::Importing => "importing",
            Self::Other(s) => s,
        }
    }
}

impl Default for ImageStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for ImageStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "queued" => Self::Queued,
            "saving" => Self::Saving,
            "active" => Self::Active,
            "killed" => Self::Killed,
            "deleted" => Self::Deleted,
            "pending_delete" => Self::PendingDelete,
            "deactivated" => Self::Deactivated,
            "importing" => Self::Importing,
            _ => Self::Other(s),
        }
    }
}

impl Serialize for ImageStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Who can see and use an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageVisibility {
    Public,
    Private,
    Shared,
    Community,
    Other(String),
}

impl ImageVisibility {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Shared => "shared",
            Self::Community => "community",
            Self::Other(s) => s,
        }
    }
}

impl Default for ImageVisibility {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for ImageVisibility {
    fn from(s: String) -> Self {
        match s.as_str() {
            "public" => Self::Public,
            "private" => Self::Private,
            "shared" => Self::Shared,
            "community" => Self::Community,
            _ => Self::Other(s),
        }
    }
}

impl Serialize for ImageVisibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// Image
// ============================================================================

/// Image metadata, as returned by list and get calls
///
/// Does not include the image data itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Image {
    pub id: String,
    pub name: String,
    pub status: ImageStatus,
    pub tags: Vec<String>,
    pub container_format: String,
    pub disk_format: String,
    /// Disk space in GB required to boot the image
    #[serde(rename = "min_disk")]
    pub min_disk_gigabytes: i64,
    /// RAM in MB required to boot the image
    #[serde(rename = "min_ram")]
    pub min_ram_megabytes: i64,
    pub owner: String,
    /// Whether the image is protected from deletion
    pub protected: bool,
    pub visibility: ImageVisibility,
    pub checksum: String,
    #[serde(rename = "size")]
    pub size_bytes: i64,
    pub metadata: HashMap<String, String>,
    /// Custom key/value properties found at the top level of the record
    #[serde(flatten)]
    pub properties: PropertyMap,
    #[serde(serialize_with = "rfc3339::serialize")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "rfc3339::serialize")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Path after the image endpoint where the image data lives
    pub file: String,
    pub schema: String,
    pub virtual_size: i64,
    #[serde(rename = "self")]
    pub self_link: String,
    pub direct_url: String,
    pub locations: Vec<String>,
}

impl Entity for Image {
    fn known_fields() -> &'static KnownFieldSet {
        &KNOWN_FIELDS
    }

    fn decode_fields(fields: &FieldReader<'_>) -> Result<Self> {
        Ok(Self {
            id: fields.string("id")?,
            name: fields.string("name")?,
            status: fields.string("status")?.into(),
            tags: fields.string_list("tags")?,
            container_format: fields.string("container_format")?,
            disk_format: fields.string("disk_format")?,
            min_disk_gigabytes: fields.int("min_disk")?,
            min_ram_megabytes: fields.int("min_ram")?,
            owner: fields.string("owner")?,
            protected: fields.bool("protected")?,
            visibility: fields.string("visibility")?.into(),
            checksum: fields.string("checksum")?,
            size_bytes: fields.int("size")?,
            metadata: fields.string_map("metadata")?,
            properties: PropertyMap::new(),
            created_at: fields.timestamp("created_at", TimeLayout::Rfc3339)?,
            updated_at: fields.timestamp("updated_at", TimeLayout::Rfc3339)?,
            file: fields.string("file")?,
            schema: fields.string("schema")?,
            virtual_size: fields.int("virtual_size")?,
            self_link: fields.string("self")?,
            direct_url: fields.string("direct_url")?,
            locations: fields.string_list("locations")?,
        })
    }

    fn properties_mut(&mut self) -> Option<&mut PropertyMap> {
        Some(&mut self.properties)
    }
}

/// One page of an image list, linked by a `next` field
#[derive(Debug, Clone)]
pub struct ImagePage {
    page: LinkPage,
}

impl Page for ImagePage {
    type Item = Image;
    const COLLECTION_KEY: &'static str = "images";

    fn from_link_page(page: LinkPage) -> Self {
        Self { page }
    }

    fn link_page(&self) -> &LinkPage {
        &self.page
    }

    fn next_page(&self) -> Result<NextPage> {
        NextUrlLink::new("next").next_page(&self.page)
    }
}
