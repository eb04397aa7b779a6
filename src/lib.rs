//! Cloud Tabs - export the Safari tabs of every iCloud-connected device.
//!
//! Safari keeps the tabs that other devices have open in a local SQLite
//! database (`~/Library/Safari/CloudTabs.db`). This crate reads it, rebuilds
//! the ordered tab list of each device and exports the result.
//!
//! # Quick Start
//!
//! ```no_run
//! use cloud_tabs::{CloudTabsExtractor, Config};
//! use std::path::Path;
//!
//! let config = Config::load();
//! let extractor = CloudTabsExtractor::from_config(&config);
//!
//! for (device, tabs) in extractor.get_tabs()?.iter() {
//!     println!("{}: {} tabs", device, tabs.len());
//! }
//!
//! extractor.export(Path::new("/tmp/tabs"), &config.export)?;
//! # Ok::<(), cloud_tabs::CloudTabsError>(())
//! ```
//!
//! # Modules
//!
//! - [`position`]: decoding of the compressed per-tab position blob
//! - [`aggregate`]: device-tab join, bucketing and sorting, URL projection
//! - [`source`]: read-only access to the CloudTabs database
//! - [`export`]: JSON and text exports
//! - [`clipboard`], [`identity`], [`launcher`]: clipboard delivery and
//!   opening tabs in the local browser
//! - [`extractor`]: the [`CloudTabsExtractor`] facade
//! - [`config`]: TOML configuration

pub mod aggregate;
pub mod clipboard;
pub mod config;
pub mod export;
pub mod extractor;
pub mod identity;
pub mod launcher;
pub mod position;
pub mod source;
pub mod types;

pub use aggregate::{aggregate_tabs, aggregate_tabs_with, project_urls, MalformedTabPolicy};
pub use config::Config;
pub use extractor::{CloudTabsExtractor, ExportReport};
pub use position::{decode_sort_value, DecodeError, SortValue};
pub use types::{
    AggregatedTabs, CloudTabsError, DerivedUrlsView, Device, DeviceBuckets, Tab, TabRecord,
};
