//! Read-only access to Safari's `CloudTabs.db`.
//!
//! Two tables are needed:
//! - `cloud_tab_devices` with `device_uuid`, `device_name`
//! - `cloud_tabs` with `device_uuid`, `title`, `url`, `position`
//!
//! The connection lives inside [`CloudTabsDb`] and is closed when it drops,
//! so [`load_snapshot`] releases it on every path, including query failures.

use crate::types::{CloudTabsError, Device, Result, Tab};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::debug;

const DEVICES_QUERY: &str = "SELECT device_uuid, device_name FROM cloud_tab_devices";
const TABS_QUERY: &str = "SELECT device_uuid, title, url, position FROM cloud_tabs";

/// Both relations, fetched together.
#[derive(Debug, Clone, Default)]
pub struct CloudTabsSnapshot {
    pub devices: Vec<Device>,
    pub tabs: Vec<Tab>,
}

/// Read-only handle on a CloudTabs database
pub struct CloudTabsDb {
    conn: Connection,
    path: PathBuf,
}

#[cfg(test)]
impl CloudTabsDb {
    /// Wrap an existing connection (for testing only)
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            path: PathBuf::from(":memory:"),
        }
    }
}

impl CloudTabsDb {
    /// Open the database at `path` read-only. Never creates the file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| CloudTabsError::DataSourceUnavailable {
            path: path.clone(),
            source,
        })?;

        debug!("Opened CloudTabs database at {:?}", path);
        Ok(Self { conn, path })
    }

    /// All rows of `cloud_tab_devices`.
    pub fn fetch_devices(&self) -> Result<Vec<Device>> {
        let query = || -> rusqlite::Result<Vec<Device>> {
            let mut stmt = self.conn.prepare(DEVICES_QUERY)?;
            let rows = stmt.query_map([], |row| {
                Ok(Device {
                    uuid: row.get(0)?,
                    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                })
            })?;
            rows.collect()
        };
        query().map_err(|source| self.unavailable(source))
    }

    /// All rows of `cloud_tabs`.
    ///
    /// NULL titles and urls read as empty strings. A NULL position reads as
    /// an empty blob, which the position decoder rejects.
    pub fn fetch_tabs(&self) -> Result<Vec<Tab>> {
        let query = || -> rusqlite::Result<Vec<Tab>> {
            let mut stmt = self.conn.prepare(TABS_QUERY)?;
            let rows = stmt.query_map([], |row| {
                Ok(Tab {
                    device_uuid: row.get(0)?,
                    title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    url: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    position_blob: row.get::<_, Option<Vec<u8>>>(3)?.unwrap_or_default(),
                })
            })?;
            rows.collect()
        };
        query().map_err(|source| self.unavailable(source))
    }

    pub fn snapshot(&self) -> Result<CloudTabsSnapshot> {
        let devices = self.fetch_devices()?;
        let tabs = self.fetch_tabs()?;
        debug!(
            "Fetched {} devices and {} tabs from {:?}",
            devices.len(),
            tabs.len(),
            self.path
        );
        Ok(CloudTabsSnapshot { devices, tabs })
    }

    fn unavailable(&self, source: rusqlite::Error) -> CloudTabsError {
        CloudTabsError::DataSourceUnavailable {
            path: self.path.clone(),
            source,
        }
    }
}

/// Open the database, read both relations and close it again.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<CloudTabsSnapshot> {
    let db = CloudTabsDb::open(path)?;
    db.snapshot()
}
