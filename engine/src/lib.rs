//! Client engine for Quill: authentication, README generation and history browsing.
//!
//! This crate owns the client-side state machines and has no terminal dependencies.
//! [`App`] wires them together from a [`QuillConfig`]; each component can also be built
//! on its own around a [`Gateway`].

mod auth;
mod controller;
mod credential_policy;
mod history;
mod init;
mod progress;
mod service;

pub use auth::{
    AuthError, AuthFlow, IDENTITY_FAILED, LOGIN_FAILED, REGISTRATION_FAILED, RegisterOutcome,
};
pub use controller::{
    ControllerEvent, ControllerState, GENERATION_CANCELLED, GENERATION_FAILED, GenerateError,
    GenerationController,
};
pub use credential_policy::CredentialPolicy;
pub use history::{HISTORY_FAILED, HistoryBrowser, HistoryError};
pub use init::{App, InitError};
pub use service::ReadmeService;

pub use quill_config::QuillConfig;
pub use quill_gateway::{Gateway, GatewayError};
pub use quill_session::{FileSessionStore, MemorySessionStore, SessionError, SessionStore};
pub use quill_types::{
    Credential, FormField, GENERATING_LABEL, GenerationForm, GenerationMode, GenerationRequest,
    GenerationResult, HistoryEntry, Identity, ProgressStage, ValidationError,
};
