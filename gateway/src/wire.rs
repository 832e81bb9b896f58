//! Request and response bodies exchanged with the service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_types::{Credential, Identity};

#[derive(Debug, Serialize)]
pub(crate) struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterBody<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Credential issued by a login or register exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Credential,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

/// The service either signs the new account in directly or returns the created account.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RegisterResponse {
    Token(TokenResponse),
    Account(Identity),
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub readme: String,
    #[serde(default)]
    pub project_id: Option<Uuid>,
}
