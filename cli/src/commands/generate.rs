use anyhow::Result;
use tokio::sync::broadcast::error::RecvError;

use quill_engine::{App, ControllerEvent, ControllerState, FormField, GenerationForm};

use crate::GenerateArgs;

pub async fn run(app: &App, args: GenerateArgs) -> Result<()> {
    if !app.auth().is_authenticated() {
        eprintln!("Not signed in; the service may reject this request. Run `quill login` first.");
    }

    let form = GenerationForm::new()
        .with(FormField::ProjectName, args.project_name)
        .with(FormField::Description, args.description)
        .with(FormField::TechStack, args.tech_stack)
        .with(FormField::Features, args.features)
        .with(FormField::InstallationSteps, args.installation_steps)
        .with(FormField::ExtraNotes, args.extra_notes)
        .with_mode(args.mode);
    let request = form.to_request()?;
    eprintln!("Mode: {}", request.mode().display_name());

    let controller = app.controller();
    let mut events = controller.subscribe();
    let progress = async {
        loop {
            match events.recv().await {
                Ok(ControllerEvent::StateChanged(state)) => {
                    if let Some(label) = state.status_label() {
                        eprintln!("{label}");
                    }
                    if state.is_terminal() || state == ControllerState::Idle {
                        break;
                    }
                }
                Ok(ControllerEvent::Stage(stage)) => eprintln!("{stage}"),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    };

    let (outcome, ()) = tokio::join!(controller.generate(request), progress);
    let result = outcome?;
    if let Some(id) = result.project_id() {
        eprintln!("Saved to history as {id}");
    }

    print!("{}", result.readme());
    if !result.readme().ends_with('\n') {
        println!();
    }

    // Fresh generations save as plain `README.md`; history entries carry the project name.
    super::export(&args.export, app.download_dir(), None, result.readme())
}
