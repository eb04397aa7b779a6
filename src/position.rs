//! Decoding of the per-tab position blob.
//!
//! Safari stores the ordering metadata of every cloud tab as zlib-compressed
//! JSON shaped like:
//!
//! ```json
//! {"sortValues": [{"sortValue": 1024, "deviceIdentifier": "..."}]}
//! ```
//!
//! Only `sortValues[0].sortValue` matters for ordering; any other field is
//! ignored.

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use thiserror::Error;

/// Ordering key of a tab within its device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortValue(pub i64);

impl fmt::Display for SortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("zlib decompression failed: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("position descriptor is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("position descriptor has an empty sortValues list")]
    MissingSortValue,
}

/// Decoded position descriptor.
///
/// Entries of `sortValues` stay raw JSON. Only the first one is ever read,
/// so later entries may carry any shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionDescriptor {
    #[serde(rename = "sortValues")]
    pub sort_values: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortValueEntry {
    #[serde(rename = "sortValue")]
    pub sort_value: SortValue,
}

impl PositionDescriptor {
    /// The sort value that orders the tab: the first entry of `sortValues`.
    pub fn first_sort_value(&self) -> Result<SortValue, DecodeError> {
        let first = self
            .sort_values
            .first()
            .ok_or(DecodeError::MissingSortValue)?;
        let entry = SortValueEntry::deserialize(first)?;
        Ok(entry.sort_value)
    }
}

/// Decompress and parse a position blob.
pub fn decode_position(blob: &[u8]) -> Result<PositionDescriptor, DecodeError> {
    let mut json = Vec::new();
    ZlibDecoder::new(blob)
        .read_to_end(&mut json)
        .map_err(DecodeError::Decompress)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Extract the sort value of a position blob. Never falls back to a default.
pub fn decode_sort_value(blob: &[u8]) -> Result<SortValue, DecodeError> {
    decode_position(blob)?.first_sort_value()
}

/// Build a position blob in the format Safari writes.
pub fn encode_position(sort_value: SortValue) -> std::io::Result<Vec<u8>> {
    let descriptor = PositionDescriptor {
        sort_values: vec![serde_json::to_value(SortValueEntry { sort_value })?],
    };
    let json = serde_json::to_vec(&descriptor)?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    encoder.finish()
}
