//! Shared test utilities and fixtures
//!
//! A wiremock stand-in for the remote service, plus helpers that wire an [`App`] to it.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use quill_engine::{App, MemorySessionStore, QuillConfig, SessionStore};
use quill_types::Credential;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "integration-token";
pub const ENTRY_ID: &str = "3f0c2a9e-5d7b-4e8a-9c1d-6b2f4e8a0c13";

/// Config pointing at `server`, downloading into `download_dir`.
pub fn config_for(server: &MockServer, download_dir: &Path) -> QuillConfig {
    QuillConfig::parse(&format!(
        "[api]\nbase_url = \"{}\"\ntimeout_secs = 10\n\n[export]\ndownload_dir = \"{}\"\n",
        server.uri(),
        download_dir.display()
    ))
    .expect("test config parses")
}

pub fn app_for(server: &MockServer, download_dir: &Path, session: Arc<dyn SessionStore>) -> App {
    App::with_session(&config_for(server, download_dir), session).expect("app builds")
}

pub fn empty_session() -> Arc<dyn SessionStore> {
    Arc::new(MemorySessionStore::new())
}

pub fn signed_in_session() -> Arc<dyn SessionStore> {
    Arc::new(MemorySessionStore::with_credential(
        Credential::new(TOKEN).expect("token is non-empty"),
    ))
}

pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": TOKEN,
            "token_type": "bearer"
        })))
        .mount(server)
        .await;
}

pub async fn mount_generate(server: &MockServer, readme: &str) {
    Mock::given(method("POST"))
        .and(path("/projects/generate-readme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "readme": readme
        })))
        .mount(server)
        .await;
}

pub async fn mount_history(server: &MockServer, entries: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/projects/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries))
        .mount(server)
        .await;
}

/// Authorization header of the `index`th recorded request, if any.
pub async fn authorization_of(server: &MockServer, index: usize) -> Option<String> {
    let requests = server.received_requests().await.expect("recording enabled");
    requests
        .get(index)
        .and_then(|request| request.headers.get("authorization"))
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}
