///! CCSDS Orbit Ephemeris Message (OEM) data types
///!
///! Field names follow the upstream XML elements so that serialising a value
///! to JSON reproduces the document's own shape: the `units` attribute comes
///! out as `@units` and element text as `#text`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Timestamp layout of `EPOCH`, e.g. "2024-047T12:00:00.000Z" (year, day of year).
pub const EPOCH_FORMAT: &str = "%Y-%jT%H:%M:%S%.fZ";

/// A numeric element with an optional `units` attribute, e.g. `<X units="km">-4.5</X>`.
///
/// The text is kept verbatim; upstream occasionally publishes non-numeric values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    #[serde(rename = "@units", default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(rename(deserialize = "$text", serialize = "#text"), default)]
    pub text: String,
}

impl Quantity {
    pub fn new(text: impl Into<String>, units: Option<&str>) -> Self {
        Self {
            units: units.map(str::to_string),
            text: text.into(),
        }
    }

    pub fn value(&self) -> Result<f64, TrackerError> {
        self.text
            .trim()
            .parse::<f64>()
            .map_err(|_| TrackerError::NonNumeric(self.text.clone()))
    }
}

/// One epoch: position (km) and velocity (km/s) in the ECI frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    #[serde(rename = "EPOCH")]
    pub epoch: String,
    #[serde(rename = "X")]
    pub x: Quantity,
    #[serde(rename = "Y")]
    pub y: Quantity,
    #[serde(rename = "Z")]
    pub z: Quantity,
    #[serde(rename = "X_DOT")]
    pub x_dot: Quantity,
    #[serde(rename = "Y_DOT")]
    pub y_dot: Quantity,
    #[serde(rename = "Z_DOT")]
    pub z_dot: Quantity,
}

impl StateVector {
    pub fn epoch_time(&self) -> Result<NaiveDateTime, TrackerError> {
        parse_epoch(&self.epoch)
    }

    pub fn position(&self) -> Result<[f64; 3], TrackerError> {
        Ok([self.x.value()?, self.y.value()?, self.z.value()?])
    }

    pub fn velocity(&self) -> Result<[f64; 3], TrackerError> {
        Ok([self.x_dot.value()?, self.y_dot.value()?, self.z_dot.value()?])
    }
}

pub fn parse_epoch(epoch: &str) -> Result<NaiveDateTime, TrackerError> {
    NaiveDateTime::parse_from_str(epoch.trim(), EPOCH_FORMAT)
        .map_err(|_| TrackerError::InvalidEpoch(epoch.to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "CREATION_DATE", default)]
    pub creation_date: String,
    #[serde(rename = "ORIGINATOR", default)]
    pub originator: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "OBJECT_NAME", default)]
    pub object_name: String,
    #[serde(rename = "OBJECT_ID", default)]
    pub object_id: String,
    #[serde(rename = "CENTER_NAME", default)]
    pub center_name: String,
    #[serde(rename = "REF_FRAME", default)]
    pub ref_frame: String,
    #[serde(rename = "TIME_SYSTEM", default)]
    pub time_system: String,
    #[serde(rename = "START_TIME", default)]
    pub start_time: String,
    #[serde(rename = "STOP_TIME", default)]
    pub stop_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentData {
    #[serde(rename = "COMMENT", default)]
    pub comment: Vec<String>,
    #[serde(rename = "stateVector", default)]
    pub state_vector: Vec<StateVector>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub data: SegmentData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub segment: Segment,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Oem {
    #[serde(default)]
    pub header: Header,
    pub body: Body,
}

/// Root `<ndm>` element of the feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OemDocument {
    pub oem: Oem,
}

impl OemDocument {
    pub fn header(&self) -> &Header {
        &self.oem.header
    }

    pub fn metadata(&self) -> &Metadata {
        &self.oem.body.segment.metadata
    }

    pub fn comments(&self) -> &[String] {
        &self.oem.body.segment.data.comment
    }

    pub fn state_vectors(&self) -> &[StateVector] {
        &self.oem.body.segment.data.state_vector
    }

    /// Look up a single epoch, reporting the feed length when out of range.
    pub fn state_vector(&self, index: usize) -> Result<&StateVector, TrackerError> {
        let vectors = self.state_vectors();
        vectors.get(index).ok_or(TrackerError::IndexOutOfRange {
            index,
            len: vectors.len(),
        })
    }
}
