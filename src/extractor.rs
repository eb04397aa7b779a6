//! High-level API over the CloudTabs database.
//!
//! Every call reads the database again; nothing is cached between calls.

use crate::aggregate::{aggregate_tabs_with, project_urls, MalformedTabPolicy};
use crate::clipboard::{copy_to_clipboard, ClipboardStatus};
use crate::config::{Config, ExportConfig};
use crate::export::{
    render_tabs_json, render_url_text, write_artifact, write_tabs_json, write_url_text,
};
use crate::identity::LocalIdentity;
use crate::launcher::{open_tabs, UrlOpener};
use crate::source::load_snapshot;
use crate::types::{AggregatedTabs, DerivedUrlsView, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Reads the tabs of all iCloud devices from a CloudTabs database.
#[derive(Debug, Clone)]
pub struct CloudTabsExtractor {
    db_path: PathBuf,
    policy: MalformedTabPolicy,
}

/// Summary of [`CloudTabsExtractor::export`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub tabs_path: PathBuf,
    pub urls_path: PathBuf,
    pub device_count: usize,
    pub tab_count: usize,
    /// `None` when no clipboard copy was requested
    pub clipboard: Option<ClipboardStatus>,
}

impl CloudTabsExtractor {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            policy: MalformedTabPolicy::Abort,
        }
    }

    /// Use the database path and malformed-tab policy from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.source.resolved_db_path()).with_policy(config.source.malformed_tabs)
    }

    pub fn with_policy(mut self, policy: MalformedTabPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Tabs of every device, grouped by device name and in tab order.
    pub fn get_tabs(&self) -> Result<AggregatedTabs> {
        let snapshot = load_snapshot(&self.db_path)?;
        let outcome = aggregate_tabs_with(&snapshot.devices, &snapshot.tabs, self.policy)?;
        if outcome.skipped > 0 {
            warn!("Skipped {} malformed tabs", outcome.skipped);
        }
        Ok(outcome.tabs)
    }

    /// URLs of every device, in the same order as [`Self::get_tabs`].
    pub fn get_tab_urls(&self) -> Result<DerivedUrlsView> {
        Ok(project_urls(&self.get_tabs()?))
    }

    /// Write the JSON export into `output_dir`.
    pub fn export_tabs(&self, output_dir: &Path, config: &ExportConfig) -> Result<PathBuf> {
        write_tabs_json(output_dir, config, &self.get_tabs()?)
    }

    /// Write the URL list into `output_dir`, copying it to the clipboard if
    /// configured.
    pub fn export_tab_urls(&self, output_dir: &Path, config: &ExportConfig) -> Result<PathBuf> {
        let urls = self.get_tab_urls()?;
        let path = write_url_text(output_dir, config, &urls)?;
        if config.copy_to_clipboard {
            copy_to_clipboard(&render_url_text(&urls));
        }
        Ok(path)
    }

    /// Read the database once and write both exports.
    ///
    /// Both documents are rendered before either file is touched, so a
    /// decoding or serialization failure leaves earlier exports in place.
    pub fn export(&self, output_dir: &Path, config: &ExportConfig) -> Result<ExportReport> {
        let tabs = self.get_tabs()?;
        let urls = project_urls(&tabs);

        let json = render_tabs_json(&tabs)?;
        let text = render_url_text(&urls);

        let tabs_path = write_artifact(output_dir, &config.tabs_file_name, json.as_bytes())?;
        let urls_path = write_artifact(output_dir, &config.urls_file_name, text.as_bytes())?;

        let clipboard = config
            .copy_to_clipboard
            .then(|| copy_to_clipboard(&text));

        info!(
            "Exported {} tabs from {} devices to {:?}",
            tabs.total_items(),
            tabs.len(),
            output_dir
        );

        Ok(ExportReport {
            tabs_path,
            urls_path,
            device_count: tabs.len(),
            tab_count: tabs.total_items(),
            clipboard,
        })
    }

    /// Open the tabs of the other devices in the default browser.
    pub fn open_tabs(
        &self,
        identity: &dyn LocalIdentity,
        opener: &dyn UrlOpener,
        exclude_this_device: bool,
    ) -> Result<usize> {
        open_tabs(&self.get_tab_urls()?, identity, opener, exclude_this_device)
    }
}
