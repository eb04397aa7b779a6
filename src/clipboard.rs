//! System clipboard delivery of the URL list.

use arboard::Clipboard;
use tracing::{info, warn};

/// Outcome of a clipboard copy. A missing clipboard is not an export failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardStatus {
    Copied,
    Unavailable(String),
}

/// Copy `text` to the system clipboard.
pub fn copy_to_clipboard(text: &str) -> ClipboardStatus {
    let result = Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string()));
    match result {
        Ok(()) => {
            info!("Copied {} bytes to the clipboard", text.len());
            ClipboardStatus::Copied
        }
        Err(e) => {
            warn!("Clipboard copy functionality unavailable: {}", e);
            ClipboardStatus::Unavailable(e.to_string())
        }
    }
}
