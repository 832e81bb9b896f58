use std::sync::Arc;

use quill_gateway::GatewayError;
use quill_session::SessionStore;

/// What to do with the stored credential when the service rejects it.
#[derive(Clone)]
pub struct CredentialPolicy {
    session: Arc<dyn SessionStore>,
    clear_on_unauthorized: bool,
}

impl std::fmt::Debug for CredentialPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPolicy")
            .field("clear_on_unauthorized", &self.clear_on_unauthorized)
            .finish_non_exhaustive()
    }
}

impl CredentialPolicy {
    #[must_use]
    pub fn new(session: Arc<dyn SessionStore>, clear_on_unauthorized: bool) -> Self {
        Self {
            session,
            clear_on_unauthorized,
        }
    }

    /// Forget the credential if `err` says the service no longer accepts it.
    ///
    /// Returns whether the session was cleared.
    pub fn observe(&self, err: &GatewayError) -> bool {
        if !self.clear_on_unauthorized || !err.is_unauthorized() {
            return false;
        }
        if !self.session.is_authenticated() {
            return false;
        }
        match self.session.clear() {
            Ok(()) => {
                tracing::info!(status = ?err.status(), "Credential rejected; session cleared");
                true
            }
            Err(e) => {
                tracing::warn!("Failed to clear rejected credential: {e}");
                false
            }
        }
    }
}
