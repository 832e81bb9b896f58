//! Generation controller: one submission at a time, with staged progress for advanced mode.
//!
//! # State machine
//!
//! ```text
//! Idle ──generate──▶ Submitting ──ok──▶ Succeeded
//!                        │
//!                        └──err/cancel──▶ Failed
//! ```
//!
//! `Succeeded` and `Failed` accept a new submission. A call made while `Submitting` is
//! rejected with [`GenerateError::Busy`] and never reaches the network.
//!
//! Observers either poll [`GenerationController::state`] or [`subscribe`] to a broadcast of
//! [`ControllerEvent`]s. Every event for a submission is sent from inside the `generate`
//! future, so no stage can be observed after the terminal state change.
//!
//! [`subscribe`]: GenerationController::subscribe

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::broadcast;

use quill_gateway::GatewayError;
use quill_types::{
    GENERATING_LABEL, GenerationForm, GenerationMode, GenerationRequest, GenerationResult,
    ProgressStage, StageSchedule, ValidationError,
};

use crate::credential_policy::CredentialPolicy;
use crate::progress::ProgressTicker;
use crate::service::ReadmeService;

pub const GENERATION_FAILED: &str = "Generation failed";
pub const GENERATION_CANCELLED: &str = "Generation cancelled";

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Submitting {
        mode: GenerationMode,
        /// Current stage for advanced submissions; `None` shows the generic label.
        stage: Option<ProgressStage>,
    },
    Succeeded,
    Failed {
        message: String,
    },
}

impl ControllerState {
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting { .. })
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed { .. })
    }

    /// Label to show while a submission is in flight.
    #[must_use]
    pub fn status_label(&self) -> Option<&'static str> {
        match self {
            Self::Submitting { stage, .. } => {
                Some(stage.map_or(GENERATING_LABEL, ProgressStage::label))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    StateChanged(ControllerState),
    /// An advanced submission moved to a later stage.
    Stage(ProgressStage),
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("a generation is already in progress")]
    Busy,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: GatewayError,
    },
}

impl GenerateError {
    /// Text suitable for the failure banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Failed { source, .. } if source.is_unauthorized())
    }
}

#[derive(Debug)]
struct Slot {
    state: ControllerState,
    result: Option<GenerationResult>,
}

#[derive(Debug)]
struct Shared {
    slot: Mutex<Slot>,
    events: broadcast::Sender<ControllerEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: ControllerEvent) {
        // No receivers is fine; observers are optional.
        let _ = self.events.send(event);
    }

    fn begin(&self, mode: GenerationMode) -> Result<(), GenerateError> {
        let state = {
            let mut slot = self.lock();
            if slot.state.is_submitting() {
                return Err(GenerateError::Busy);
            }
            slot.state = ControllerState::Submitting {
                mode,
                stage: StageSchedule::for_mode(mode).initial(),
            };
            slot.result = None;
            slot.state.clone()
        };
        self.emit(ControllerEvent::StateChanged(state));
        Ok(())
    }

    fn advance(&self, stage: ProgressStage) {
        {
            let mut slot = self.lock();
            let ControllerState::Submitting { stage: current, .. } = &mut slot.state else {
                return;
            };
            *current = Some(stage);
        }
        self.emit(ControllerEvent::Stage(stage));
    }

    fn finish(&self, outcome: Result<GenerationResult, String>) {
        let state = {
            let mut slot = self.lock();
            match outcome {
                Ok(result) => {
                    slot.state = ControllerState::Succeeded;
                    slot.result = Some(result);
                }
                Err(message) => {
                    slot.state = ControllerState::Failed { message };
                    slot.result = None;
                }
            }
            slot.state.clone()
        };
        self.emit(ControllerEvent::StateChanged(state));
    }
}

/// Marks an in-flight submission failed if its future is dropped before completing.
struct InFlight<'a> {
    shared: &'a Shared,
    armed: bool,
}

impl InFlight<'_> {
    fn complete(mut self, outcome: Result<GenerationResult, String>) {
        self.armed = false;
        self.shared.finish(outcome);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!("Generation dropped before completion");
            self.shared.finish(Err(GENERATION_CANCELLED.to_string()));
        }
    }
}

pub struct GenerationController<S> {
    service: S,
    policy: Option<CredentialPolicy>,
    shared: Shared,
}

impl<S> std::fmt::Debug for GenerationController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationController")
            .field("state", &self.shared.lock().state)
            .finish_non_exhaustive()
    }
}

impl<S: ReadmeService> GenerationController<S> {
    #[must_use]
    pub fn new(service: S) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            service,
            policy: None,
            shared: Shared {
                slot: Mutex::new(Slot {
                    state: ControllerState::Idle,
                    result: None,
                }),
                events,
            },
        }
    }

    /// Apply `policy` to authentication failures.
    #[must_use]
    pub fn with_credential_policy(mut self, policy: CredentialPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.shared.events.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.shared.lock().state.clone()
    }

    /// The last successful result. Empty unless the state is `Succeeded`.
    #[must_use]
    pub fn result(&self) -> Option<GenerationResult> {
        self.shared.lock().result.clone()
    }

    /// Return to `Idle`, dropping any held result. Ignored while a submission is in flight.
    pub fn discard(&self) {
        let changed = {
            let mut slot = self.shared.lock();
            if slot.state.is_submitting() || slot.state == ControllerState::Idle {
                false
            } else {
                slot.state = ControllerState::Idle;
                slot.result = None;
                true
            }
        };
        if changed {
            self.shared
                .emit(ControllerEvent::StateChanged(ControllerState::Idle));
        }
    }

    /// Validate `form` and submit it. Invalid input never changes state.
    pub async fn generate_form(
        &self,
        form: &GenerationForm,
    ) -> Result<GenerationResult, GenerateError> {
        let request = form.to_request()?;
        self.generate(request).await
    }

    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, GenerateError> {
        let mode = request.mode();
        if let Err(err) = self.shared.begin(mode) {
            tracing::warn!(%mode, "Rejected generation: another submission is in flight");
            return Err(err);
        }
        let in_flight = InFlight {
            shared: &self.shared,
            armed: true,
        };
        tracing::info!(project = request.project_name(), %mode, "Generation started");

        let outcome = {
            let mut ticker = ProgressTicker::start(StageSchedule::for_mode(mode));
            let call = self.service.generate_readme(&request);
            tokio::pin!(call);

            loop {
                tokio::select! {
                    biased;
                    outcome = &mut call => break outcome,
                    Some(stage) = ticker.next_stage(), if !ticker.is_finished() => {
                        tracing::debug!(%stage, "Generation stage");
                        self.shared.advance(stage);
                    }
                }
            }
        };

        match outcome {
            Ok(response) => {
                let result = GenerationResult::new(response.readme, response.project_id, request);
                tracing::info!(
                    project = result.request().project_name(),
                    bytes = result.readme().len(),
                    "Generation succeeded"
                );
                in_flight.complete(Ok(result.clone()));
                Ok(result)
            }
            Err(source) => {
                let message = source.user_message(GENERATION_FAILED);
                tracing::warn!(error = %source, "Generation failed");
                if let Some(policy) = &self.policy {
                    policy.observe(&source);
                }
                in_flight.complete(Err(message.clone()));
                Err(GenerateError::Failed { message, source })
            }
        }
    }
}
