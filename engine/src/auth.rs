//! Sign-in, registration and sign-out.
//!
//! The auth flow is the only component that stores a credential. Sign-out is purely local:
//! the service keeps no session state to revoke.

use thiserror::Error;

use quill_gateway::{Gateway, GatewayError, RegisterResponse};
use quill_session::SessionError;
use quill_types::{Identity, ValidationError, require};

use crate::credential_policy::CredentialPolicy;

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const IDENTITY_FAILED: &str = "Failed to load account";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The service refused the exchange; `message` is ready for display.
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: GatewayError,
    },
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Passwords are taken verbatim: only an empty one is missing.
fn require_password(password: &str) -> Result<&str, ValidationError> {
    if password.is_empty() {
        Err(ValidationError::MissingField("Password"))
    } else {
        Ok(password)
    }
}

impl AuthError {
    fn rejected(source: GatewayError, fallback: &str) -> Self {
        Self::Rejected {
            message: source.user_message(fallback),
            source,
        }
    }
}

/// How a successful registration ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The service issued a credential, which is now stored.
    SignedIn,
    /// The account exists but the caller still has to sign in.
    Registered(Identity),
}

#[derive(Debug, Clone)]
pub struct AuthFlow {
    gateway: Gateway,
    policy: CredentialPolicy,
}

impl AuthFlow {
    #[must_use]
    pub fn new(gateway: Gateway, clear_on_unauthorized: bool) -> Self {
        let policy = CredentialPolicy::new(gateway.session().clone(), clear_on_unauthorized);
        Self { gateway, policy }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.gateway.session().is_authenticated()
    }

    /// Exchange credentials for a token and store it.
    ///
    /// On failure the session is left exactly as it was.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = require("Email", email)?;
        let password = require_password(password)?;

        let token = self
            .gateway
            .login(&email, password)
            .await
            .map_err(|e| AuthError::rejected(e, LOGIN_FAILED))?;

        self.gateway.session().set(token.access_token)?;
        tracing::info!("Signed in");
        Ok(())
    }

    /// Create an account. A confirmation that differs from `password` is rejected locally.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<RegisterOutcome, AuthError> {
        let name = require("Name", name)?;
        let email = require("Email", email)?;
        let password = require_password(password)?;
        if password != confirmation {
            return Err(ValidationError::PasswordMismatch.into());
        }

        let response = self
            .gateway
            .register(&name, &email, password)
            .await
            .map_err(|e| AuthError::rejected(e, REGISTRATION_FAILED))?;

        match response {
            RegisterResponse::Token(token) => {
                self.gateway.session().set(token.access_token)?;
                tracing::info!("Registered and signed in");
                Ok(RegisterOutcome::SignedIn)
            }
            RegisterResponse::Account(identity) => {
                tracing::info!(account = %identity.id, "Registered");
                Ok(RegisterOutcome::Registered(identity))
            }
        }
    }

    /// Drop the stored credential. No remote call.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.gateway.session().clear()?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// The account behind the stored credential.
    pub async fn current_identity(&self) -> Result<Identity, AuthError> {
        self.gateway.current_identity().await.map_err(|e| {
            self.policy.observe(&e);
            AuthError::rejected(e, IDENTITY_FAILED)
        })
    }
}
