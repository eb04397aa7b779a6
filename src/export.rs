//! Export sinks: the JSON tab document and the plain-text URL list.
//!
//! Files are written next to their destination under a temporary name and
//! renamed into place, so a failed run never leaves a half-written export.

use crate::config::ExportConfig;
use crate::types::{AggregatedTabs, CloudTabsError, DerivedUrlsView, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Pretty-printed JSON object keyed by device name, two-space indented.
pub fn render_tabs_json(tabs: &AggregatedTabs) -> Result<String> {
    Ok(serde_json::to_string_pretty(tabs)?)
}

/// One `----- <device> -----` header per device, followed by its URLs and a
/// blank line.
pub fn render_url_text(urls: &DerivedUrlsView) -> String {
    let mut output = String::new();
    for (device_name, device_urls) in urls.iter() {
        output.push_str("----- ");
        output.push_str(device_name);
        output.push_str(" -----\n");
        output.push_str(&device_urls.join("\n"));
        output.push_str("\n\n");
    }
    output
}

/// Write the JSON export into `output_dir`.
pub fn write_tabs_json(
    output_dir: &Path,
    config: &ExportConfig,
    tabs: &AggregatedTabs,
) -> Result<PathBuf> {
    let json = render_tabs_json(tabs)?;
    write_artifact(output_dir, &config.tabs_file_name, json.as_bytes())
}

/// Write the URL list into `output_dir`.
pub fn write_url_text(
    output_dir: &Path,
    config: &ExportConfig,
    urls: &DerivedUrlsView,
) -> Result<PathBuf> {
    let text = render_url_text(urls);
    write_artifact(output_dir, &config.urls_file_name, text.as_bytes())
}

/// Atomically replace `output_dir/file_name` with `contents`.
pub(crate) fn write_artifact(
    output_dir: &Path,
    file_name: &str,
    contents: &[u8],
) -> Result<PathBuf> {
    let path = output_dir.join(file_name);
    let output_error = |source| CloudTabsError::OutputWrite {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(output_dir).map_err(output_error)?;

    let tmp = output_dir.join(format!(".{}.tmp", file_name));
    if let Err(e) = fs::write(&tmp, contents).and_then(|_| fs::rename(&tmp, &path)) {
        let _ = fs::remove_file(&tmp);
        return Err(output_error(e));
    }

    info!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::SortValue;
    use crate::types::TabRecord;
    use pretty_assertions::assert_eq;

    fn example_tabs() -> AggregatedTabs {
        vec![
            ("MacBook", "B", "http://b", 1),
            ("MacBook", "A", "http://a", 2),
            ("iPhone", "C", "http://c", 5),
        ]
        .into_iter()
        .map(|(device, title, url, sort_value)| {
            (
                device.to_string(),
                TabRecord {
                    title: title.to_string(),
                    url: url.to_string(),
                    sort_value: SortValue(sort_value),
                },
            )
        })
        .collect()
    }

    #[test]
    fn test_render_tabs_json() {
        let json = render_tabs_json(&example_tabs()).unwrap();
        let expected = r#"{
  "MacBook": [
    {
      "title": "B",
      "url": "http://b",
      "sortValue": 1
    },
    {
      "title": "A",
      "url": "http://a",
      "sortValue": 2
    }
  ],
  "iPhone": [
    {
      "title": "C",
      "url": "http://c",
      "sortValue": 5
    }
  ]
}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_tabs_json(&AggregatedTabs::new()).unwrap(), "{}");
        assert_eq!(render_url_text(&DerivedUrlsView::new()), "");
    }

    #[test]
    fn test_render_url_text() {
        let urls = example_tabs().map(|r| r.url.clone());
        assert_eq!(
            render_url_text(&urls),
            "----- MacBook -----\nhttp://b\nhttp://a\n\n----- iPhone -----\nhttp://c\n\n"
        );
    }

    #[test]
    fn test_non_ascii_titles_are_kept() {
        let tabs: AggregatedTabs = vec![(
            "Jürgens iPhone".to_string(),
            TabRecord {
                title: "Straße – Übersicht".to_string(),
                url: "https://example.de".to_string(),
                sort_value: SortValue(0),
            },
        )]
        .into_iter()
        .collect();

        let json = render_tabs_json(&tabs).unwrap();
        assert!(json.contains("Jürgens iPhone"));
        assert!(json.contains("Straße – Übersicht"));
    }

    #[test]
    fn test_write_files_into_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::default();
        let tabs = example_tabs();

        let json_path = write_tabs_json(dir.path(), &config, &tabs).unwrap();
        let text_path = write_url_text(dir.path(), &config, &tabs.map(|r| r.url.clone())).unwrap();

        assert_eq!(json_path, dir.path().join("iCloud_Tabs.json"));
        assert_eq!(text_path, dir.path().join("iCloud_Tab_Urls.txt"));
        assert_eq!(
            fs::read_to_string(&json_path).unwrap(),
            render_tabs_json(&tabs).unwrap()
        );
        assert!(fs::read_to_string(&text_path)
            .unwrap()
            .starts_with("----- MacBook -----\n"));

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_overwrites_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::default();
        fs::write(dir.path().join("iCloud_Tabs.json"), "stale").unwrap();

        write_tabs_json(dir.path(), &config, &AggregatedTabs::new()).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("iCloud_Tabs.json")).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_unwritable_destination_is_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();

        let err = write_tabs_json(&blocker, &ExportConfig::default(), &example_tabs()).unwrap_err();

        assert!(matches!(err, CloudTabsError::OutputWrite { .. }), "got {:?}", err);
    }
}
