//! Application wiring: config to session store to gateway to components.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use quill_config::{ConfigError, QuillConfig};
use quill_gateway::{Gateway, GatewayError};
use quill_session::{FileSessionStore, MemorySessionStore, SessionStore};

use crate::auth::AuthFlow;
use crate::controller::GenerationController;
use crate::credential_policy::CredentialPolicy;
use crate::history::HistoryBrowser;

#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Every component of a running client, sharing one session store.
pub struct App {
    session: Arc<dyn SessionStore>,
    gateway: Gateway,
    auth: AuthFlow,
    controller: GenerationController<Gateway>,
    history: HistoryBrowser,
    download_dir: PathBuf,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("gateway", &self.gateway)
            .field("controller", &self.controller)
            .field("download_dir", &self.download_dir)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Build from `config`, opening the durable session store it names.
    pub fn new(config: &QuillConfig) -> Result<Self, InitError> {
        let session: Arc<dyn SessionStore> = match config.session_path() {
            Some(path) => Arc::new(FileSessionStore::open(path)),
            None => {
                tracing::warn!("No home directory; session will not persist");
                Arc::new(MemorySessionStore::new())
            }
        };
        Self::with_session(config, session)
    }

    /// Build from `config` around an existing session store.
    pub fn with_session(
        config: &QuillConfig,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, InitError> {
        let base_url = config.base_url()?;
        let clear_on_unauthorized = config.clear_session_on_unauthorized();
        let gateway = Gateway::new(base_url, Arc::clone(&session), config.request_timeout())?;
        tracing::debug!(base_url = %gateway.base_url(), "Client initialized");

        let policy = CredentialPolicy::new(Arc::clone(&session), clear_on_unauthorized);
        Ok(Self {
            auth: AuthFlow::new(gateway.clone(), clear_on_unauthorized),
            controller: GenerationController::new(gateway.clone())
                .with_credential_policy(policy),
            history: HistoryBrowser::new(gateway.clone(), clear_on_unauthorized),
            download_dir: config.download_dir(),
            session,
            gateway,
        })
    }

    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    #[must_use]
    pub fn auth(&self) -> &AuthFlow {
        &self.auth
    }

    #[must_use]
    pub fn controller(&self) -> &GenerationController<Gateway> {
        &self.controller
    }

    #[must_use]
    pub fn history(&self) -> &HistoryBrowser {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryBrowser {
        &mut self.history
    }

    /// Directory that downloads are written into.
    #[must_use]
    pub fn download_dir(&self) -> &std::path::Path {
        &self.download_dir
    }
}
