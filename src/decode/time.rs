//! Timestamp layouts used on the wire
//!
//! Every layout decodes to `DateTime<Utc>`, whatever the wire variant.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Zone-less layout with optional fractional seconds
const MILLI_NO_Z_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Wire layout of a timestamp field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeLayout {
    /// `2006-01-02T15:04:05Z07:00`
    #[default]
    Rfc3339,
    /// `2006-01-02T15:04:05.999999`, no zone, read as UTC
    Rfc3339MilliNoZ,
}

impl TimeLayout {
    /// Parse a raw wire value
    pub fn parse(self, raw: &str) -> Option<DateTime<Utc>> {
        match self {
            Self::Rfc3339 => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Self::Rfc3339MilliNoZ => NaiveDateTime::parse_from_str(raw, MILLI_NO_Z_FORMAT)
                .ok()
                .map(|naive| naive.and_utc()),
        }
    }

    /// Format a timestamp back into this layout
    pub fn format(self, dt: &DateTime<Utc>) -> String {
        match self {
            Self::Rfc3339 => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Self::Rfc3339MilliNoZ => dt.naive_utc().format(MILLI_NO_Z_FORMAT).to_string(),
        }
    }
}

/// Serde helper writing `Option<DateTime<Utc>>` in the RFC3339 layout
pub mod rfc3339 {
    use super::TimeLayout;
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&TimeLayout::Rfc3339.format(dt)),
            None => serializer.serialize_none(),
        }
    }
}

/// Serde helper writing `Option<DateTime<Utc>>` in the zone-less layout
pub mod rfc3339_milli_no_z {
    use super::TimeLayout;
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&TimeLayout::Rfc3339MilliNoZ.format(dt)),
            None => serializer.serialize_none(),
        }
    }
}
