//! Block storage v2 volumes

use crate::decode::time::rfc3339_milli_no_z;
use crate::decode::{Entity, FieldReader, KnownFieldSet, TimeLayout};
use crate::error::Result;
use crate::pagination::{LinkPage, LinkStrategy, LinksArray, NextPage, Page};
use crate::types::ValueMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

const VOLUME_FIELDS: &[&str] = &[
    "id",
    "status",
    "size",
    "availability_zone",
    "created_at",
    "updated_at",
    "attachments",
    "name",
    "description",
    "volume_type",
    "snapshot_id",
    "source_volid",
    "metadata",
    "user_id",
    "bootable",
    "encrypted",
    "replication_status",
    "consistencygroup_id",
    "multiattach",
    "volume_image_metadata",
];

static KNOWN_FIELDS: LazyLock<KnownFieldSet> = LazyLock::new(|| KnownFieldSet::new(VOLUME_FIELDS));

/// Server attachment of a volume
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attachment {
    #[serde(serialize_with = "rfc3339_milli_no_z::serialize")]
    pub attached_at: Option<DateTime<Utc>>,
    pub attachment_id: String,
    pub device: String,
    pub host_name: String,
    pub id: String,
    pub server_id: String,
    pub volume_id: String,
}

impl Attachment {
    fn decode_fields(fields: &FieldReader<'_>) -> Result<Self> {
        Ok(Self {
            attached_at: fields.timestamp("attached_at", TimeLayout::Rfc3339MilliNoZ)?,
            attachment_id: fields.string("attachment_id")?,
            device: fields.string("device")?,
            host_name: fields.string("host_name")?,
            id: fields.string("id")?,
            server_id: fields.string("server_id")?,
            volume_id: fields.string("volume_id")?,
        })
    }
}

/// Everything the block storage API reports about one volume
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Volume {
    pub id: String,
    pub status: String,
    /// Size in GB
    pub size: i64,
    pub availability_zone: String,
    #[serde(serialize_with = "rfc3339_milli_no_z::serialize")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "rfc3339_milli_no_z::serialize")]
    pub updated_at: Option<DateTime<Utc>>,
    pub attachments: Vec<Attachment>,
    pub name: String,
    pub description: String,
    pub volume_type: String,
    pub snapshot_id: String,
    #[serde(rename = "source_volid")]
    pub source_vol_id: String,
    /// Arbitrary key/value pairs set by the user
    pub metadata: HashMap<String, String>,
    pub user_id: String,
    /// "true" or "false", as a string on the wire
    pub bootable: String,
    pub encrypted: bool,
    pub replication_status: String,
    #[serde(rename = "consistencygroup_id")]
    pub consistency_group_id: String,
    pub multiattach: bool,
    pub volume_image_metadata: ValueMap,
}

impl Entity for Volume {
    const ENVELOPE_KEY: Option<&'static str> = Some("volume");

    fn known_fields() -> &'static KnownFieldSet {
        &KNOWN_FIELDS
    }

    fn decode_fields(fields: &FieldReader<'_>) -> Result<Self> {
        Ok(Self {
            id: fields.string("id")?,
            status: fields.string("status")?,
            size: fields.int("size")?,
            availability_zone: fields.string("availability_zone")?,
            created_at: fields.timestamp("created_at", TimeLayout::Rfc3339MilliNoZ)?,
            updated_at: fields.timestamp("updated_at", TimeLayout::Rfc3339MilliNoZ)?,
            attachments: fields.objects("attachments", Attachment::decode_fields)?,
            name: fields.string("name")?,
            description: fields.string("description")?,
            volume_type: fields.string("volume_type")?,
            snapshot_id: fields.string("snapshot_id")?,
            source_vol_id: fields.string("source_volid")?,
            metadata: fields.string_map("metadata")?,
            user_id: fields.string("user_id")?,
            bootable: fields.string("bootable")?,
            encrypted: fields.bool("encrypted")?,
            replication_status: fields.string("replication_status")?,
            consistency_group_id: fields.string("consistencygroup_id")?,
            multiattach: fields.bool("multiattach")?,
            volume_image_metadata: fields.value_map("volume_image_metadata")?,
        })
    }
}

/// One page of a volume list, linked through `volumes_links`
#[derive(Debug, Clone)]
pub struct VolumePage {
    page: LinkPage,
}

impl Page for VolumePage {
    type Item = Volume;
    const COLLECTION_KEY: &'static str = "volumes";

    fn from_link_page(page: LinkPage) -> Self {
        Self { page }
    }

    fn link_page(&self) -> &LinkPage {
        &self.page
    }

    fn next_page(&self) -> Result<NextPage> {
        LinksArray::new("volumes_links").next_page(&self.page)
    }
}
