//! Expert application wizard: a fixed sequence of steps that gates forward progress on
//! per-step validity, accumulates answers into one draft, and submits it to the expert
//! applications API in two calls.

pub mod api;
pub mod autosave;
pub mod controller;
pub mod domain;
mod progress;
pub mod sandbox;
mod steps;
pub mod validation;

#[cfg(test)]
mod tests;

pub use api::{
    ApiError, ApplicationApi, ApplicationResource, CreateApplicationRequest,
    HttpApplicationApi, SubmitApplicationRequest, GENERIC_SUBMISSION_MESSAGE,
};
pub use autosave::{AutoSaver, DraftStore, FileDraftStore, MemoryDraftStore, SaveOutcome, StoreError};
pub use controller::{
    ApplicationWizardController, SubmissionError, SubmitPhase, Transition, WizardSnapshot,
    WizardStatus,
};
pub use domain::{
    ApplicationDraft, ApplicationId, CertificationEntry, Credentials, EducationEntry,
    EmploymentEntry, EntryId, ListItem, ListSection, PersonalInfo, PersonalInfoPatch,
    PortfolioItem, Proficiency, ProfessionalBackground, ProfessionalBackgroundPatch,
    ReferenceEntry, SampleReviewFeedback, SampleReviewPatch, SectionKey, SectionUpdate,
    SkillEntry,
};
pub use progress::WizardProgress;
pub use sandbox::{sandbox_router, SandboxBackend, SandboxError, SandboxStatus, StoredApplication};
pub use steps::{WizardStep, STEP_COUNT};
pub use validation::{validate_for_submission, validate_step, FieldError, StepValidation};
