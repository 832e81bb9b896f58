//! History listing and export of stored documents.

use quill_utils::{download, download_file_name};
use uuid::Uuid;
use wiremock::MockServer;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{
    ENTRY_ID, app_for, authorization_of, mount_history, signed_in_session,
};

const STORED: &str = "# Stored\r\n\nTabs\tand trailing space \n\u{2014} unicode ✓";

fn listing() -> serde_json::Value {
    serde_json::json!([
        {
            "id": ENTRY_ID,
            "project_name": "Stored",
            "generated_readme": STORED,
            "created_at": "2024-05-01T12:30:00.123456",
            "tech_stack": "Rust"
        },
        {
            "id": "0d9e8f7a-6b5c-4d3e-8f1a-2b3c4d5e6f70",
            "project_name": "Empty",
            "generated_readme": null,
            "created_at": "2024-04-01T09:00:00Z"
        }
    ])
}

#[tokio::test]
async fn logout_then_list_sends_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/history"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(serde_json::json!({"detail": "Not authenticated"})),
        )
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_for(&server, dir.path(), signed_in_session());

    app.auth().logout().unwrap();
    let err = app.history_mut().list().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(authorization_of(&server, 0).await, None);
}

#[tokio::test]
async fn selected_entry_exports_byte_identical() {
    let server = MockServer::start().await;
    mount_history(&server, listing()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_for(&server, dir.path(), signed_in_session());

    app.history_mut().list().await.unwrap();
    let entry = app
        .history_mut()
        .select(Uuid::parse_str(ENTRY_ID).unwrap())
        .cloned()
        .unwrap();
    assert_eq!(entry.readme(), STORED);

    let saved = download(app.download_dir(), Some(&entry.project_name), entry.readme()).unwrap();
    assert_eq!(saved.file_name().unwrap(), "Stored_README.md");
    assert_eq!(std::fs::read(&saved).unwrap(), STORED.as_bytes());
}

#[tokio::test]
async fn null_document_exports_empty_file() {
    let server = MockServer::start().await;
    mount_history(&server, listing()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_for(&server, dir.path(), signed_in_session());

    let entries = app.history_mut().list().await.unwrap().to_vec();
    let empty = &entries[1];
    assert_eq!(empty.readme(), "");

    let saved = download(app.download_dir(), Some(&empty.project_name), empty.readme()).unwrap();
    assert!(std::fs::read(&saved).unwrap().is_empty());
}

#[test]
fn download_name_falls_back_without_project() {
    assert_eq!(download_file_name(None), "README.md");
    assert_eq!(download_file_name(Some("  ")), "README.md");
}
