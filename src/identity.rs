//! Names under which this machine shows up in the device list.
//!
//! Used by the browser-open action to leave out the local device's own tabs.

use std::process::Command;
use tracing::debug;

/// Source of the local machine's device names.
///
/// A device bucket belongs to this machine when its name equals one of
/// these exactly.
pub trait LocalIdentity {
    fn names(&self) -> Vec<String>;
}

/// macOS identity: `LocalHostName` and `ComputerName` from `scutil`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScutilIdentity;

impl ScutilIdentity {
    fn get(key: &str) -> Option<String> {
        let output = match Command::new("scutil").args(["--get", key]).output() {
            Ok(output) => output,
            Err(e) => {
                debug!("scutil --get {} failed: {}", key, e);
                return None;
            }
        };
        if !output.status.success() {
            debug!("scutil --get {} exited with {}", key, output.status);
            return None;
        }
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!value.is_empty()).then_some(value)
    }
}

impl LocalIdentity for ScutilIdentity {
    fn names(&self) -> Vec<String> {
        ["LocalHostName", "ComputerName"]
            .iter()
            .filter_map(|key| Self::get(key))
            .collect()
    }
}

/// Portable identity from the OS hostname, with and without its domain part.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostnameIdentity;

impl LocalIdentity for HostnameIdentity {
    fn names(&self) -> Vec<String> {
        let Ok(hostname) = hostname::get() else {
            return Vec::new();
        };
        let full = hostname.to_string_lossy().to_string();
        let mut names = Vec::new();
        if let Some(short) = full.split('.').next() {
            if !short.is_empty() && short != full {
                names.push(short.to_string());
            }
        }
        if !full.is_empty() {
            names.push(full);
        }
        names
    }
}

/// Fixed list of names.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(pub Vec<String>);

impl LocalIdentity for StaticIdentity {
    fn names(&self) -> Vec<String> {
        self.0.clone()
    }
}

/// The identity provider for the current platform.
pub fn system_identity() -> Box<dyn LocalIdentity> {
    if cfg!(target_os = "macos") {
        Box::new(ScutilIdentity)
    } else {
        Box::new(HostnameIdentity)
    }
}
