//! Export a document's text: clipboard copy and file download.
//!
//! Both paths hand the text over unchanged; nothing here normalizes line endings or
//! trims content.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::atomic_write::{PersistMode, atomic_write};

/// File name used when no project name is known.
pub const DEFAULT_DOWNLOAD_NAME: &str = "README.md";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(#[from] arboard::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Destination for clipboard copies.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), ExportError>;
}

/// The desktop clipboard.
pub struct SystemClipboard(arboard::Clipboard);

impl SystemClipboard {
    pub fn open() -> Result<Self, ExportError> {
        Ok(Self(arboard::Clipboard::new()?))
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ExportError> {
        self.0.set_text(text.to_owned())?;
        Ok(())
    }
}

pub fn copy_to_clipboard(sink: &mut impl ClipboardSink, text: &str) -> Result<(), ExportError> {
    sink.set_text(text)?;
    tracing::debug!(bytes = text.len(), "Copied document to clipboard");
    Ok(())
}

/// `<project>_README.md`, or `README.md` when the project name is blank.
///
/// Path separators and control characters in the project name are replaced with `_`.
#[must_use]
pub fn download_file_name(project_name: Option<&str>) -> String {
    let name = project_name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return DEFAULT_DOWNLOAD_NAME.to_string();
    }
    let safe: String = name
        .chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':') || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("{safe}_README.md")
}

/// Write `text` into `dir` under [`download_file_name`], creating `dir` if needed.
pub fn download(
    dir: &Path,
    project_name: Option<&str>,
    text: &str,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(download_file_name(project_name));
    atomic_write(&path, text.as_bytes(), PersistMode::Default).map_err(|source| {
        ExportError::Write {
            path: path.clone(),
            source,
        }
    })?;

    tracing::info!(path = %path.display(), bytes = text.len(), "Downloaded document");
    Ok(path)
}
