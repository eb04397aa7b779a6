//! Core data types for the cloud tabs export.
//!
//! The two raw relations read from `CloudTabs.db` ([`Device`], [`Tab`]), the
//! per-tab output record ([`TabRecord`]), the device-keyed views built from
//! them ([`AggregatedTabs`], [`DerivedUrlsView`]) and the crate error type.

use crate::position::{DecodeError, SortValue};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// A row of `cloud_tab_devices`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Opaque unique identifier assigned by iCloud
    pub uuid: String,
    /// Display name, not guaranteed to be unique
    pub name: String,
}

impl Device {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
        }
    }
}

/// A row of `cloud_tabs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub device_uuid: String,
    pub title: String,
    pub url: String,
    /// zlib-compressed JSON position descriptor, see [`crate::position`]
    pub position_blob: Vec<u8>,
}

/// One tab in a device bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRecord {
    pub title: String,
    pub url: String,
    #[serde(rename = "sortValue")]
    pub sort_value: SortValue,
}

/// Ordered device name → items mapping.
///
/// Buckets keep the order in which their device name was first pushed and
/// are only created when the first item arrives, so an empty bucket never
/// exists. Lookup by name is O(1) through a side index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceBuckets<T> {
    buckets: Vec<(String, Vec<T>)>,
    index: HashMap<String, usize>,
}

/// Tabs grouped by device name, each bucket ascending by sort value.
pub type AggregatedTabs = DeviceBuckets<TabRecord>;

/// URLs grouped by device name, index-aligned with [`AggregatedTabs`].
pub type DerivedUrlsView = DeviceBuckets<String>;

impl<T> Default for DeviceBuckets<T> {
    fn default() -> Self {
        Self {
            buckets: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> DeviceBuckets<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` to the bucket for `device_name`, creating it on first use.
    pub fn push(&mut self, device_name: &str, item: T) {
        match self.index.get(device_name) {
            Some(&slot) => self.buckets[slot].1.push(item),
            None => {
                self.index
                    .insert(device_name.to_string(), self.buckets.len());
                self.buckets.push((device_name.to_string(), vec![item]));
            }
        }
    }

    pub fn get(&self, device_name: &str) -> Option<&[T]> {
        self.index
            .get(device_name)
            .map(|&slot| self.buckets[slot].1.as_slice())
    }

    /// Buckets in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.buckets
            .iter()
            .map(|(name, items)| (name.as_str(), items.as_slice()))
    }

    pub fn device_names(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|(name, _)| name.as_str())
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of items across all buckets
    pub fn total_items(&self) -> usize {
        self.buckets.iter().map(|(_, items)| items.len()).sum()
    }

    /// Stable-sort every bucket by `key`.
    pub fn sort_buckets_by_key<K, F>(&mut self, mut key: F)
    where
        K: Ord,
        F: FnMut(&T) -> K,
    {
        for (_, items) in &mut self.buckets {
            items.sort_by_key(&mut key);
        }
    }

    /// Build a new view with the same buckets, mapping every item.
    pub fn map<U, F>(&self, mut f: F) -> DeviceBuckets<U>
    where
        F: FnMut(&T) -> U,
    {
        DeviceBuckets {
            buckets: self
                .buckets
                .iter()
                .map(|(name, items)| (name.clone(), items.iter().map(&mut f).collect()))
                .collect(),
            index: self.index.clone(),
        }
    }
}

impl<T> FromIterator<(String, T)> for DeviceBuckets<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut buckets = Self::new();
        for (device_name, item) in iter {
            buckets.push(&device_name, item);
        }
        buckets
    }
}

impl<T: Serialize> Serialize for DeviceBuckets<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (name, items) in &self.buckets {
            map.serialize_entry(name, items)?;
        }
        map.end()
    }
}

/// Errors produced while reading, aggregating or exporting cloud tabs.
#[derive(Error, Debug)]
pub enum CloudTabsError {
    /// The database could not be opened or queried
    #[error("CloudTabs database unavailable at {}: {source}", path.display())]
    DataSourceUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A tab's position blob could not be decoded
    #[error("Malformed position for tab {url} (device {device_uuid}): {source}")]
    Decode {
        device_uuid: String,
        url: String,
        #[source]
        source: DecodeError,
    },

    /// A tab points at a device uuid missing from `cloud_tab_devices`
    #[error("Tab {url} references unknown device {device_uuid}")]
    UnresolvedDeviceReference { device_uuid: String, url: String },

    /// An export artifact could not be written
    #[error("Failed to write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// The OS refused to open a URL
    #[error("Failed to open {url}: {source}")]
    BrowserLaunch {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CloudTabsError>;
