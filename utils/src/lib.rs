//! Shared infrastructure utilities for Quill.
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename)
//! - **`export`**: Clipboard copy and file download of generated documents

pub mod atomic_write;
pub mod export;

pub use atomic_write::{PersistMode, atomic_write};
pub use export::{
    ClipboardSink, DEFAULT_DOWNLOAD_NAME, ExportError, SystemClipboard, copy_to_clipboard,
    download, download_file_name,
};
