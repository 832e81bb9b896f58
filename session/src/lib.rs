//! Session store: the single home of the authentication credential.
//!
//! The gateway reads the store before every request; only the auth flow (and the
//! unauthorized-response policy) writes to it. [`SessionStore`] is a trait so callers can
//! inject [`MemorySessionStore`] in tests and [`FileSessionStore`] in the application.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use quill_types::Credential;
use quill_utils::{PersistMode, atomic_write};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to persist session at {}: {source}", path.display())]
    Persist { path: PathBuf, source: io::Error },
    #[error("failed to remove session at {}: {source}", path.display())]
    Remove { path: PathBuf, source: io::Error },
    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Holds at most one live credential.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<Credential>;

    /// Replace the current credential.
    fn set(&self, credential: Credential) -> Result<(), SessionError>;

    /// Drop the current credential. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), SessionError>;

    fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }
}

/// Process-local store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    credential: RwLock<Option<Credential>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: RwLock::new(Some(credential)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<Credential> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, credential: Credential) -> Result<(), SessionError> {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credential);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct SessionFile {
    token: Credential,
}

/// Store backed by an owner-only JSON file that survives restarts.
///
/// The file is read once at [`FileSessionStore::open`]; afterwards the in-memory copy is
/// authoritative and every change is written through.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    credential: RwLock<Option<Credential>>,
}

impl FileSessionStore {
    /// Open the store at `path`. A missing or unreadable file yields an empty session.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let credential = load_credential(&path);
        tracing::debug!(
            path = %path.display(),
            authenticated = credential.is_some(),
            "Session store opened"
        );
        Self {
            path,
            credential: RwLock::new(credential),
        }
    }
}

fn load_credential(path: &Path) -> Option<Credential> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to read session file: {e}");
            return None;
        }
    };

    match serde_json::from_str::<SessionFile>(&content) {
        Ok(file) => Some(file.token),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Ignoring malformed session file: {e}");
            None
        }
    }
}

/// Create the session directory, tightening it to 0o700 if we own it.
fn ensure_private_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::{MetadataExt, PermissionsExt};
        let metadata = fs::metadata(dir)?;
        // Only modify permissions if we own the directory
        let our_uid = unsafe { libc::getuid() };
        if metadata.uid() == our_uid {
            let mode = metadata.permissions().mode() & 0o777;
            if mode & 0o077 != 0 {
                fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
            }
        }
    }
    Ok(())
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<Credential> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, credential: Credential) -> Result<(), SessionError> {
        let persist_err = |source| SessionError::Persist {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            ensure_private_dir(parent).map_err(persist_err)?;
        }

        let body = serde_json::to_vec(&SessionFile {
            token: credential.clone(),
        })?;
        atomic_write(&self.path, &body, PersistMode::SensitiveOwnerOnly).map_err(persist_err)?;

        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credential);
        tracing::info!(path = %self.path.display(), "Session credential stored");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;

        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Session credential cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
