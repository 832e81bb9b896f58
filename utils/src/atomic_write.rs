//! Crash-safe file replacement for session files and downloaded documents.
//!
//! Content is staged in a sibling temp file, flushed, then renamed over the target. Readers
//! see the old file or the new one, never a torn write.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, PersistError};

/// Permissions applied to the staged file before it becomes visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistMode {
    /// Inherit the process umask. Used for exported documents.
    #[default]
    Default,
    /// Owner read/write only (0o600 on Unix). Used for credentials.
    SensitiveOwnerOnly,
}

/// Atomically replace `path` with `bytes`.
pub fn atomic_write(path: impl AsRef<Path>, bytes: &[u8], mode: PersistMode) -> io::Result<()> {
    let path = path.as_ref();
    let staged = stage(staging_dir(path), bytes, mode)?;
    match staged.persist(path) {
        Ok(_) => Ok(()),
        Err(err) => replace_existing(err, path),
    }
}

fn staging_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn stage(dir: &Path, bytes: &[u8], mode: PersistMode) -> io::Result<NamedTempFile> {
    let mut staged = NamedTempFile::new_in(dir)?;

    #[cfg(unix)]
    if mode == PersistMode::SensitiveOwnerOnly {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staged.path(), fs::Permissions::from_mode(0o600))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    Ok(staged)
}

/// Rename-over-existing fails on Windows. Move the old file aside, retry, and restore it if
/// the retry also fails.
fn replace_existing(err: PersistError, path: &Path) -> io::Result<()> {
    if !path.exists() {
        return Err(err.error);
    }

    let backup = backup_path(path);
    let _ = fs::remove_file(&backup);
    fs::rename(path, &backup)?;

    if let Err(retry) = err.file.persist(path) {
        let _ = fs::rename(&backup, path);
        return Err(retry.error);
    }

    if let Err(e) = fs::remove_file(&backup) {
        tracing::warn!(path = %backup.display(), "Failed to remove backup after replace: {e}");
    }
    Ok(())
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}
