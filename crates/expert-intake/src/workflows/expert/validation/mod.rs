//! Pure per-step validators.
//!
//! Each step decides on its own whether its section of the draft is acceptable. The
//! functions here take section data and return a [`StepValidation`] without touching the
//! controller, so views can call them on every keystroke and tests can call them directly.

mod rules;

pub use rules::{
    validate_credentials, validate_personal_info, validate_portfolio,
    validate_professional_background, validate_references, validate_sample_review,
    validate_skills, MAX_FEEDBACK_CHARS, MAX_SUMMARY_CHARS, MIN_FEEDBACK_CHARS,
    MIN_SUMMARY_CHARS,
};

use serde::Serialize;

use super::domain::ApplicationDraft;
use super::steps::WizardStep;

/// One rejected field and the message to show next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Outcome of validating one step: `valid` is true exactly when `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepValidation {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl StepValidation {
    pub fn ok() -> Self {
        Self::from_errors(Vec::new())
    }

    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }
}

/// Validate the section of `draft` that belongs to `step`.
pub fn validate_step(step: WizardStep, draft: &ApplicationDraft) -> StepValidation {
    match step {
        WizardStep::Welcome => StepValidation::ok(),
        WizardStep::PersonalInfo => validate_personal_info(&draft.personal_info),
        WizardStep::ProfessionalBackground => {
            validate_professional_background(&draft.professional_background)
        }
        WizardStep::Skills => validate_skills(&draft.skills),
        WizardStep::Portfolio => validate_portfolio(&draft.portfolio),
        WizardStep::Credentials => validate_credentials(&draft.credentials),
        WizardStep::References => {
            validate_references(&draft.references, &draft.personal_info.email)
        }
        WizardStep::SampleReview => validate_sample_review(&draft.sample_review),
    }
}

/// Validate every step at once; field names are prefixed with the step key.
pub fn validate_for_submission(draft: &ApplicationDraft) -> StepValidation {
    let errors = WizardStep::ALL
        .iter()
        .flat_map(|step| {
            validate_step(*step, draft)
                .errors
                .into_iter()
                .map(move |error| FieldError {
                    field: format!("{}.{}", step.key(), error.field),
                    message: error.message,
                })
        })
        .collect();

    StepValidation::from_errors(errors)
}
