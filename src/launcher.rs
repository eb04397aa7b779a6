//! Opening tabs from other devices in the local default browser.

use crate::identity::LocalIdentity;
use crate::types::{CloudTabsError, DerivedUrlsView, Result};
use std::process::Command;
use tracing::{debug, info};

/// Something that can hand a URL to a browser.
pub trait UrlOpener {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Opens URLs through the platform's default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open(&self, url: &str) -> std::io::Result<()> {
        let status = platform_command(url)?.status()?;
        if status.success() {
            Ok(())
        } else {
            Err(std::io::Error::other(format!(
                "opener exited with {}",
                status
            )))
        }
    }
}

#[cfg(target_os = "macos")]
fn platform_command(url: &str) -> std::io::Result<Command> {
    let mut command = Command::new("open");
    command.arg(url);
    Ok(command)
}

#[cfg(target_os = "windows")]
fn platform_command(url: &str) -> std::io::Result<Command> {
    let mut command = Command::new("rundll32");
    command.args(["url.dll,FileProtocolHandler", url]);
    Ok(command)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn platform_command(url: &str) -> std::io::Result<Command> {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    Ok(command)
}

#[cfg(not(any(unix, target_os = "windows")))]
fn platform_command(_url: &str) -> std::io::Result<Command> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "no URL opener on this platform",
    ))
}

/// Open every URL in `urls`, device by device.
///
/// With `exclude_this_device`, buckets named like the local machine are left
/// out. Returns the number of URLs handed to the opener. Stops at the first
/// URL the opener rejects.
pub fn open_tabs(
    urls: &DerivedUrlsView,
    identity: &dyn LocalIdentity,
    opener: &dyn UrlOpener,
    exclude_this_device: bool,
) -> Result<usize> {
    let local_names = if exclude_this_device {
        identity.names()
    } else {
        Vec::new()
    };

    let mut opened = 0;
    for (device_name, device_urls) in urls.iter() {
        if local_names.iter().any(|name| name == device_name) {
            debug!("Skipping tabs of this device ({})", device_name);
            continue;
        }
        for url in device_urls {
            opener
                .open(url)
                .map_err(|source| CloudTabsError::BrowserLaunch {
                    url: url.clone(),
                    source,
                })?;
            opened += 1;
        }
    }

    info!("Opened {} tabs", opened);
    Ok(opened)
}
