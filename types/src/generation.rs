//! Generation inputs and outputs.
//!
//! A [`GenerationRequest`] can only be obtained through validation, so every request that
//! reaches the controller already has its required fields filled in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{NonEmptyString, ValidationError, require};

/// How the service should produce the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Single-pass template fill.
    #[default]
    Basic,
    /// Multi-step generation, presented with staged progress labels.
    Advanced,
}

impl GenerationMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Advanced => "advanced",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Basic => "Basic README",
            Self::Advanced => "Advanced AI Architect",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown generation mode `{0}` (expected `basic` or `advanced`)")]
pub struct ModeParseError(String);

impl FromStr for GenerationMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "advanced" => Ok(Self::Advanced),
            _ => Err(ModeParseError(s.to_string())),
        }
    }
}

/// The six free-text inputs of the generation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    ProjectName,
    Description,
    TechStack,
    Features,
    InstallationSteps,
    ExtraNotes,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::ProjectName,
        FormField::Description,
        FormField::TechStack,
        FormField::Features,
        FormField::InstallationSteps,
        FormField::ExtraNotes,
    ];

    /// Human-readable name, used in validation messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ProjectName => "Project Name",
            Self::Description => "Project Description",
            Self::TechStack => "Tech Stack",
            Self::Features => "Features",
            Self::InstallationSteps => "Installation Steps",
            Self::ExtraNotes => "Extra Notes",
        }
    }

    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::ExtraNotes)
    }
}

/// Editable form state. Fields may be blank until [`GenerationForm::to_request`] is called.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationForm {
    project_name: String,
    description: String,
    tech_stack: String,
    features: String,
    installation_steps: String,
    extra_notes: String,
    mode: GenerationMode,
}

impl GenerationForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    #[must_use]
    pub fn with(mut self, field: FormField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    #[must_use]
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::ProjectName => &self.project_name,
            FormField::Description => &self.description,
            FormField::TechStack => &self.tech_stack,
            FormField::Features => &self.features,
            FormField::InstallationSteps => &self.installation_steps,
            FormField::ExtraNotes => &self.extra_notes,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn mode(&self) -> GenerationMode {
        self.mode
    }

    /// Fields that are required but currently blank, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<FormField> {
        FormField::ALL
            .into_iter()
            .filter(|field| field.is_required() && self.get(*field).trim().is_empty())
            .collect()
    }

    /// Snapshot the current values into an immutable request.
    ///
    /// Fails on the first blank required field.
    pub fn to_request(&self) -> Result<GenerationRequest, ValidationError> {
        Ok(GenerationRequest {
            project_name: require(FormField::ProjectName.label(), &self.project_name)?,
            description: require(FormField::Description.label(), &self.description)?,
            tech_stack: require(FormField::TechStack.label(), &self.tech_stack)?,
            features: require(FormField::Features.label(), &self.features)?,
            installation_steps: require(
                FormField::InstallationSteps.label(),
                &self.installation_steps,
            )?,
            extra_notes: self.extra_notes.clone(),
            mode: self.mode,
        })
    }

    fn slot_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::ProjectName => &mut self.project_name,
            FormField::Description => &mut self.description,
            FormField::TechStack => &mut self.tech_stack,
            FormField::Features => &mut self.features,
            FormField::InstallationSteps => &mut self.installation_steps,
            FormField::ExtraNotes => &mut self.extra_notes,
        }
    }
}

/// Immutable, validated payload for `POST /projects/generate-readme`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    project_name: NonEmptyString,
    description: NonEmptyString,
    tech_stack: NonEmptyString,
    features: NonEmptyString,
    installation_steps: NonEmptyString,
    extra_notes: String,
    mode: GenerationMode,
}

impl GenerationRequest {
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn tech_stack(&self) -> &str {
        &self.tech_stack
    }

    #[must_use]
    pub fn features(&self) -> &str {
        &self.features
    }

    #[must_use]
    pub fn installation_steps(&self) -> &str {
        &self.installation_steps
    }

    #[must_use]
    pub fn extra_notes(&self) -> &str {
        &self.extra_notes
    }

    #[must_use]
    pub const fn mode(&self) -> GenerationMode {
        self.mode
    }
}

/// A generated document together with the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    readme: String,
    project_id: Option<Uuid>,
    request: GenerationRequest,
}

impl GenerationResult {
    #[must_use]
    pub fn new(readme: String, project_id: Option<Uuid>, request: GenerationRequest) -> Self {
        Self {
            readme,
            project_id,
            request,
        }
    }

    #[must_use]
    pub fn readme(&self) -> &str {
        &self.readme
    }

    /// Server-side record id, when the service reported one.
    #[must_use]
    pub const fn project_id(&self) -> Option<Uuid> {
        self.project_id
    }

    #[must_use]
    pub const fn request(&self) -> &GenerationRequest {
        &self.request
    }
}
