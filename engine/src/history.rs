//! Browsing previously generated documents.

use thiserror::Error;
use uuid::Uuid;

use quill_gateway::{Gateway, GatewayError};
use quill_types::HistoryEntry;

use crate::credential_policy::CredentialPolicy;

pub const HISTORY_FAILED: &str = "Failed to load history";

#[derive(Debug, Error)]
#[error("{message}")]
pub struct HistoryError {
    pub message: String,
    #[source]
    pub source: GatewayError,
}

impl HistoryError {
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.source.is_unauthorized()
    }
}

/// Cached listing of the caller's history plus the entry being viewed.
#[derive(Debug)]
pub struct HistoryBrowser {
    gateway: Gateway,
    policy: CredentialPolicy,
    entries: Vec<HistoryEntry>,
    selected: Option<Uuid>,
}

impl HistoryBrowser {
    #[must_use]
    pub fn new(gateway: Gateway, clear_on_unauthorized: bool) -> Self {
        let policy = CredentialPolicy::new(gateway.session().clone(), clear_on_unauthorized);
        Self {
            gateway,
            policy,
            entries: Vec::new(),
            selected: None,
        }
    }

    /// Fetch the listing, newest first as the service orders it.
    ///
    /// On failure the previous listing is kept.
    pub async fn list(&mut self) -> Result<&[HistoryEntry], HistoryError> {
        match self.gateway.list_history().await {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "History loaded");
                self.entries = entries;
                if let Some(id) = self.selected
                    && !self.entries.iter().any(|entry| entry.id == id)
                {
                    self.selected = None;
                }
                Ok(&self.entries)
            }
            Err(source) => {
                tracing::warn!(error = %source, "Failed to load history");
                self.policy.observe(&source);
                Err(HistoryError {
                    message: source.user_message(HISTORY_FAILED),
                    source,
                })
            }
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Select an entry from the current listing. An unknown id clears the selection.
    pub fn select(&mut self, id: Uuid) -> Option<&HistoryEntry> {
        let index = self.entries.iter().position(|entry| entry.id == id);
        self.selected = index.map(|_| id);
        index.map(|index| &self.entries[index])
    }

    #[must_use]
    pub fn selected(&self) -> Option<&HistoryEntry> {
        let id = self.selected?;
        self.entries.iter().find(|entry| entry.id == id)
    }
}
