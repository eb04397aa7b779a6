//! Device-tab aggregation.
//!
//! Joins the tab relation to device names and rebuilds, per device, the
//! ordered list of open tabs. The join goes through a uuid → name hash map
//! built once over the devices, so the whole call is a single linear pass
//! over the tabs instead of a nested comparison between both relations.

use crate::position::decode_sort_value;
use crate::types::{
    AggregatedTabs, CloudTabsError, DerivedUrlsView, Device, Result, Tab, TabRecord,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// What to do with a tab that cannot be decoded or resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedTabPolicy {
    /// Fail the whole aggregation
    #[default]
    Abort,
    /// Log a warning and leave the tab out
    Skip,
}

/// Result of [`aggregate_tabs_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationOutcome {
    pub tabs: AggregatedTabs,
    /// Tabs dropped under [`MalformedTabPolicy::Skip`]
    pub skipped: usize,
}

/// Group `tabs` by device name and sort each group by sort value.
///
/// Any tab with a malformed position blob or an unknown device uuid fails
/// the whole call; there is no partial result. An empty tab list yields an
/// empty result.
pub fn aggregate_tabs(devices: &[Device], tabs: &[Tab]) -> Result<AggregatedTabs> {
    aggregate_tabs_with(devices, tabs, MalformedTabPolicy::Abort).map(|outcome| outcome.tabs)
}

/// [`aggregate_tabs`] with an explicit policy for malformed tabs.
pub fn aggregate_tabs_with(
    devices: &[Device],
    tabs: &[Tab],
    policy: MalformedTabPolicy,
) -> Result<AggregationOutcome> {
    let device_names: HashMap<&str, &str> = devices
        .iter()
        .map(|device| (device.uuid.as_str(), device.name.as_str()))
        .collect();

    let mut aggregated = AggregatedTabs::new();
    let mut skipped = 0;

    for tab in tabs {
        match resolve_tab(&device_names, tab) {
            Ok((device_name, record)) => aggregated.push(device_name, record),
            Err(err) => match policy {
                MalformedTabPolicy::Abort => return Err(err),
                MalformedTabPolicy::Skip => {
                    warn!("Skipping tab {}: {}", tab.url, err);
                    skipped += 1;
                }
            },
        }
    }

    aggregated.sort_buckets_by_key(|record| record.sort_value);

    debug!(
        "Aggregated {} tabs from {} devices into {} buckets ({} skipped)",
        aggregated.total_items(),
        devices.len(),
        aggregated.len(),
        skipped
    );

    Ok(AggregationOutcome {
        tabs: aggregated,
        skipped,
    })
}

fn resolve_tab<'d>(
    device_names: &HashMap<&str, &'d str>,
    tab: &Tab,
) -> Result<(&'d str, TabRecord)> {
    let device_name = device_names
        .get(tab.device_uuid.as_str())
        .copied()
        .ok_or_else(|| CloudTabsError::UnresolvedDeviceReference {
            device_uuid: tab.device_uuid.clone(),
            url: tab.url.clone(),
        })?;

    let sort_value =
        decode_sort_value(&tab.position_blob).map_err(|source| CloudTabsError::Decode {
            device_uuid: tab.device_uuid.clone(),
            url: tab.url.clone(),
            source,
        })?;

    Ok((
        device_name,
        TabRecord {
            title: tab.title.clone(),
            url: tab.url.clone(),
            sort_value,
        },
    ))
}

/// Project the URL of every tab, keeping bucket and tab order.
pub fn project_urls(tabs: &AggregatedTabs) -> DerivedUrlsView {
    tabs.map(|record| record.url.clone())
}
