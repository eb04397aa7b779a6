//! Configuration management for cloud-tabs.
//!
//! Loads configuration from a TOML file and provides runtime defaults. Every
//! section is optional; missing keys fall back to the defaults below.

use crate::aggregate::MalformedTabPolicy;
use crate::types::{CloudTabsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub open: OpenConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when RUST_LOG is not set (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to Safari's CloudTabs database, `~/` is expanded
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// What to do with tabs whose position or device cannot be resolved
    #[serde(default)]
    pub malformed_tabs: MalformedTabPolicy,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            malformed_tabs: MalformedTabPolicy::default(),
        }
    }
}

impl SourceConfig {
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_home(&self.db_path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// File name of the JSON export inside the output directory
    #[serde(default = "default_tabs_file_name")]
    pub tabs_file_name: String,

    /// File name of the URL list inside the output directory
    #[serde(default = "default_urls_file_name")]
    pub urls_file_name: String,

    /// Also copy the URL list to the clipboard
    #[serde(default)]
    pub copy_to_clipboard: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            tabs_file_name: default_tabs_file_name(),
            urls_file_name: default_urls_file_name(),
            copy_to_clipboard: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenConfig {
    /// Skip the tabs of the machine the tool runs on
    #[serde(default = "default_true")]
    pub exclude_this_device: bool,
}

impl Default for OpenConfig {
    fn default() -> Self {
        Self {
            exclude_this_device: true,
        }
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_db_path() -> String {
    "~/Library/Safari/CloudTabs.db".to_string()
}

fn default_tabs_file_name() -> String {
    "iCloud_Tabs.json".to_string()
}

fn default_urls_file_name() -> String {
    "iCloud_Tab_Urls.txt".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Self {
        Self::load_from_path(Self::default_config_path())
    }

    /// Load configuration from a specific path, using defaults if it is
    /// missing or unparsable
    pub fn load_from_path(path: PathBuf) -> Self {
        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config file: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config file found at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    /// Load configuration from a path the user asked for explicitly. Unlike
    /// [`Config::load_from_path`], a missing or broken file is an error.
    pub fn try_load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CloudTabsError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| CloudTabsError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cloud-tabs")
            .join("config.toml")
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.source.db_path, "~/Library/Safari/CloudTabs.db");
        assert_eq!(config.source.malformed_tabs, MalformedTabPolicy::Abort);
        assert_eq!(config.export.tabs_file_name, "iCloud_Tabs.json");
        assert_eq!(config.export.urls_file_name, "iCloud_Tab_Urls.txt");
        assert!(!config.export.copy_to_clipboard);
        assert!(config.open.exclude_this_device);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[source]
db_path = "/tmp/CloudTabs.db"
malformed_tabs = "skip"

[export]
tabs_file_name = "tabs.json"
copy_to_clipboard = true

[open]
exclude_this_device = false
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.source.resolved_db_path(), PathBuf::from("/tmp/CloudTabs.db"));
        assert_eq!(config.source.malformed_tabs, MalformedTabPolicy::Skip);
        assert_eq!(config.export.tabs_file_name, "tabs.json");
        assert_eq!(config.export.urls_file_name, "iCloud_Tab_Urls.txt");
        assert!(config.export.copy_to_clipboard);
        assert!(!config.open.exclude_this_device);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_try_load_reports_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[source\ndb_path = 1").unwrap();

        let err = Config::try_load_from_path(&path).unwrap_err();
        assert!(matches!(err, CloudTabsError::Config { .. }), "got {:?}", err);

        let missing = dir.path().join("missing.toml");
        assert!(Config::try_load_from_path(&missing).is_err());
    }

    #[test]
    fn test_load_from_path_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_path(dir.path().join("missing.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/var/db.sqlite"), PathBuf::from("/var/db.sqlite"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home("~/Library/Safari/CloudTabs.db"),
                home.join("Library/Safari/CloudTabs.db")
            );
        }
    }
}
