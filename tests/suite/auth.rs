//! Account flows against the mock service, with a durable session.

use std::sync::Arc;

use quill_engine::{AuthError, FileSessionStore, SessionStore, ValidationError};
use wiremock::MockServer;

use crate::common::{TOKEN, app_for, mount_login};

#[tokio::test]
async fn login_persists_across_restarts() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let session_path = dir.path().join("session.json");

    let session: Arc<dyn SessionStore> = Arc::new(FileSessionStore::open(&session_path));
    let app = app_for(&server, dir.path(), session);
    app.auth().login("a@b.c", "pw").await.unwrap();

    let reopened = FileSessionStore::open(&session_path);
    assert_eq!(reopened.get().unwrap().expose_secret(), TOKEN);

    let app = app_for(&server, dir.path(), Arc::new(reopened));
    app.auth().logout().unwrap();
    assert!(!session_path.exists());
    assert!(FileSessionStore::open(&session_path).get().is_none());
}

#[tokio::test]
async fn mismatched_confirmation_never_reaches_service() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app_for(&server, dir.path(), crate::common::empty_session());

    let err = app
        .auth()
        .register("Ada", "ada@example.com", "secret", "secrte")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AuthError::Validation(ValidationError::PasswordMismatch)
    ));
    assert_eq!(err.to_string(), "Passwords do not match");
    assert!(server.received_requests().await.unwrap().is_empty());
}
