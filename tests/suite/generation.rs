//! Sign in, then generate against the mock service.

use quill_engine::{ControllerEvent, ControllerState, GenerateError, GenerationMode, ProgressStage};
use quill_types::{FormField, GenerationForm};
use wiremock::MockServer;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{TOKEN, app_for, authorization_of, empty_session, mount_generate, mount_login};

fn form(mode: GenerationMode) -> GenerationForm {
    GenerationForm::new()
        .with(FormField::ProjectName, "X")
        .with(FormField::Description, "A tool")
        .with(FormField::TechStack, "Rust")
        .with(FormField::Features, "Fast")
        .with(FormField::InstallationSteps, "cargo install x")
        .with_mode(mode)
}

#[tokio::test]
async fn login_then_basic_generation_succeeds_with_bearer() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_generate(&server, "# X").await;
    let dir = tempfile::tempdir().unwrap();
    let app = app_for(&server, dir.path(), empty_session());

    app.auth().login("a@b.c", "pw").await.unwrap();
    let result = app
        .controller()
        .generate_form(&form(GenerationMode::Basic))
        .await
        .unwrap();

    assert_eq!(result.readme(), "# X");
    assert_eq!(app.controller().state(), ControllerState::Succeeded);
    assert_eq!(app.controller().result().unwrap().readme(), "# X");
    assert_eq!(
        authorization_of(&server, 1).await.as_deref(),
        Some(format!("Bearer {TOKEN}").as_str())
    );
}

#[tokio::test]
async fn generation_posts_every_field_and_mode() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/projects/generate-readme"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(body_json(serde_json::json!({
            "project_name": "X",
            "description": "A tool",
            "tech_stack": "Rust",
            "features": "Fast",
            "installation_steps": "cargo install x",
            "extra_notes": "MIT licensed",
            "mode": "advanced"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "readme": "# X\n\nAdvanced.\n"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let app = app_for(&server, dir.path(), empty_session());
    app.auth().login("a@b.c", "pw").await.unwrap();

    let mut events = app.controller().subscribe();
    let form = form(GenerationMode::Advanced).with(FormField::ExtraNotes, "MIT licensed");
    let result = app.controller().generate_form(&form).await.unwrap();
    assert_eq!(result.readme(), "# X\n\nAdvanced.\n");

    assert_eq!(
        events.try_recv().unwrap(),
        ControllerEvent::StateChanged(ControllerState::Submitting {
            mode: GenerationMode::Advanced,
            stage: Some(ProgressStage::Analyzing),
        })
    );
    assert_eq!(
        events.try_recv().unwrap(),
        ControllerEvent::StateChanged(ControllerState::Succeeded)
    );
}

#[tokio::test]
async fn rejected_credential_fails_and_signs_out() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/projects/generate-readme"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"detail": "Could not validate credentials"})),
        )
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let app = app_for(&server, dir.path(), empty_session());
    app.auth().login("a@b.c", "pw").await.unwrap();

    let err = app
        .controller()
        .generate_form(&form(GenerationMode::Basic))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerateError::Failed { .. }));
    assert_eq!(
        app.controller().state(),
        ControllerState::Failed {
            message: "Could not validate credentials".to_string()
        }
    );
    assert!(app.controller().result().is_none());
    assert!(!app.auth().is_authenticated());
}

#[tokio::test]
async fn service_error_detail_reaches_failed_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects/generate-readme"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "detail": "Rate limit exceeded. Please wait a few minutes and try again, or use Basic mode."
        })))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let app = app_for(&server, dir.path(), crate::common::signed_in_session());

    let err = app
        .controller()
        .generate_form(&form(GenerationMode::Advanced))
        .await
        .unwrap_err();

    assert_eq!(
        err.user_message(),
        "Rate limit exceeded. Please wait a few minutes and try again, or use Basic mode."
    );
    assert!(app.auth().is_authenticated());
}
