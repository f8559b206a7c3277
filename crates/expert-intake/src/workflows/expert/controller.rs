use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::api::{
    ApiError, ApplicationApi, CreateApplicationRequest, SubmitApplicationRequest,
};
use super::domain::{
    ApplicationDraft, ApplicationId, EntryId, ListItem, ListSection, SectionKey, SectionUpdate,
};
use super::progress::WizardProgress;
use super::steps::WizardStep;
use super::validation::{validate_step, StepValidation};

/// Lifecycle of a wizard session beyond the step pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WizardStatus {
    InProgress,
    Submitted { application_id: ApplicationId },
    Error { message: String },
}

/// What a call to [`ApplicationWizardController::advance`] or `retreat` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Advanced {
        from: WizardStep,
        to: WizardStep,
        celebrate: bool,
    },
    Retreated {
        from: WizardStep,
        to: WizardStep,
    },
    /// The precondition did not hold; nothing changed.
    Blocked { step: WizardStep },
    Submitted { application_id: ApplicationId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPhase {
    CreateDraft,
    SubmitDraft,
}

impl SubmitPhase {
    pub const fn label(self) -> &'static str {
        match self {
            SubmitPhase::CreateDraft => "create draft",
            SubmitPhase::SubmitDraft => "submit draft",
        }
    }
}

/// Error surfaced once per failed `submit()`; its display text is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("{}", .source.user_message())]
    Failed {
        phase: SubmitPhase,
        #[source]
        source: ApiError,
    },
    #[error("application {0} has already been submitted")]
    AlreadySubmitted(ApplicationId),
}

impl SubmissionError {
    pub fn phase(&self) -> Option<SubmitPhase> {
        match self {
            SubmissionError::Failed { phase, .. } => Some(*phase),
            SubmissionError::AlreadySubmitted(_) => None,
        }
    }
}

/// Serialisable state handed to the local draft store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardSnapshot {
    pub draft: ApplicationDraft,
    pub progress: WizardProgress,
    pub revision: u64,
    #[serde(default)]
    pub pending_application: Option<ApplicationId>,
}

/// Drives one applicant through the wizard.
///
/// Owns the step pointer, the validity flag reported by the active step, the draft, and the
/// dirty revision counter read by the auto-saver. Submission goes through the injected
/// [`ApplicationApi`] in two sequential calls.
pub struct ApplicationWizardController<A> {
    api: A,
    draft: ApplicationDraft,
    progress: WizardProgress,
    step_valid: bool,
    status: WizardStatus,
    revision: u64,
    saved_revision: u64,
    pending_application: Option<ApplicationId>,
}

impl<A> ApplicationWizardController<A>
where
    A: ApplicationApi,
{
    pub fn new(api: A) -> Self {
        Self::starting_at(api, Utc::now())
    }

    pub fn starting_at(api: A, started_at: DateTime<Utc>) -> Self {
        Self {
            api,
            draft: ApplicationDraft::default(),
            progress: WizardProgress::new(started_at),
            step_valid: false,
            status: WizardStatus::InProgress,
            revision: 0,
            saved_revision: 0,
            pending_application: None,
        }
    }

    /// Rebuild a session from a locally stored snapshot. The restored state counts as saved.
    pub fn resume(api: A, snapshot: WizardSnapshot) -> Self {
        info!(
            step = snapshot.progress.current().number(),
            revision = snapshot.revision,
            "resuming expert application draft"
        );
        Self {
            api,
            draft: snapshot.draft,
            progress: snapshot.progress,
            step_valid: false,
            status: WizardStatus::InProgress,
            revision: snapshot.revision,
            saved_revision: snapshot.revision,
            pending_application: snapshot.pending_application,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn current_step(&self) -> WizardStep {
        self.progress.current()
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub fn progress(&self) -> &WizardProgress {
        &self.progress
    }

    pub fn status(&self) -> &WizardStatus {
        &self.status
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.status, WizardStatus::Submitted { .. })
    }

    pub fn last_error(&self) -> Option<&str> {
        match &self.status {
            WizardStatus::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn pending_application(&self) -> Option<&ApplicationId> {
        self.pending_application.as_ref()
    }

    /// Whether the active step may be left going forward.
    pub fn can_advance(&self) -> bool {
        self.step_valid || self.current_step().is_always_valid()
    }

    pub fn set_step_valid(&mut self, is_valid: bool) {
        self.step_valid = is_valid;
    }

    /// Run the active step's validator over the draft and report the result.
    pub fn validate_current_step(&mut self) -> StepValidation {
        let validation = validate_step(self.current_step(), &self.draft);
        self.set_step_valid(validation.valid);
        validation
    }

    pub fn completion_percent(&self) -> u8 {
        self.progress.completion_percent()
    }

    pub fn estimated_minutes_remaining(&self, now: DateTime<Utc>) -> u32 {
        self.progress.estimated_minutes_remaining(now)
    }

    /// Move forward one step, or submit when already on the last step.
    pub async fn advance(&mut self) -> Result<Transition, SubmissionError> {
        let step = self.current_step();

        if self.is_submitted() {
            return Ok(Transition::Blocked { step });
        }

        if !self.can_advance() {
            debug!(step = step.number(), "advance blocked by step validation");
            return Ok(Transition::Blocked { step });
        }

        if step == WizardStep::last() {
            let application_id = self.submit().await?;
            return Ok(Transition::Submitted { application_id });
        }

        let Some(change) = self.progress.step_forward() else {
            return Ok(Transition::Blocked { step });
        };

        self.step_valid = false;
        self.bump_revision();
        info!(
            from = change.from.number(),
            to = change.to.number(),
            celebrate = change.celebrate,
            "wizard advanced"
        );

        Ok(Transition::Advanced {
            from: change.from,
            to: change.to,
            celebrate: change.celebrate,
        })
    }

    /// Move back one step. Completed marks are kept.
    pub fn retreat(&mut self) -> Transition {
        let from = self.current_step();

        if self.is_submitted() {
            return Transition::Blocked { step: from };
        }

        let Some(to) = self.progress.step_back() else {
            return Transition::Blocked { step: from };
        };

        self.step_valid = false;
        self.clear_error();
        self.bump_revision();
        info!(from = from.number(), to = to.number(), "wizard retreated");

        Transition::Retreated { from, to }
    }

    pub fn update_draft_section(&mut self, update: SectionUpdate) {
        if self.is_submitted() {
            return;
        }
        let section = update.section();
        self.draft.apply(update);
        self.touch(section);
    }

    /// Returns `false` when the section is already full.
    pub fn add_list_item(&mut self, item: ListItem) -> bool {
        if self.is_submitted() {
            return false;
        }
        let section = item.section();
        if !self.draft.push_item(item) {
            debug!(
                section = section.key().label(),
                "list item ignored, section at capacity"
            );
            return false;
        }
        self.touch(section.key());
        true
    }

    /// Returns `false` when no entry has `id`.
    pub fn remove_list_item(&mut self, section: ListSection, id: &EntryId) -> bool {
        if self.is_submitted() || !self.draft.remove_item(section, id) {
            return false;
        }
        self.touch(section.key());
        true
    }

    /// Replace an existing entry in place, matched by id.
    pub fn replace_list_item(&mut self, item: ListItem) -> bool {
        if self.is_submitted() {
            return false;
        }
        let section = item.section();
        if !self.draft.replace_item(item) {
            return false;
        }
        self.touch(section.key());
        true
    }

    fn touch(&mut self, section: SectionKey) {
        self.clear_error();
        self.bump_revision();
        debug!(
            section = section.label(),
            revision = self.revision,
            "draft updated"
        );
    }

    /// Step moves and the phase 1 id are snapshot state as well as draft edits.
    fn bump_revision(&mut self) {
        self.revision += 1;
    }

    fn clear_error(&mut self) {
        if matches!(self.status, WizardStatus::Error { .. }) {
            self.status = WizardStatus::InProgress;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            draft: self.draft.clone(),
            progress: self.progress.clone(),
            revision: self.revision,
            pending_application: self.pending_application.clone(),
        }
    }

    /// Record that the snapshot taken at `revision` has been persisted. Later edits keep the
    /// controller dirty.
    pub fn mark_saved(&mut self, revision: u64) {
        let revision = revision.min(self.revision);
        if revision > self.saved_revision {
            self.saved_revision = revision;
        }
    }

    /// Explicit exit: throw away the draft and start over.
    pub fn discard(&mut self) {
        info!("discarding expert application draft");
        self.draft = ApplicationDraft::default();
        self.progress = WizardProgress::new(Utc::now());
        self.step_valid = false;
        self.status = WizardStatus::InProgress;
        self.pending_application = None;
        self.revision += 1;
        self.saved_revision = self.revision;
    }

    /// Create the application, then submit it.
    ///
    /// A failure in either phase leaves the draft intact and puts the controller into the
    /// error state. When phase 1 succeeded on an earlier attempt its id is reused, so a retry
    /// only repeats phase 2.
    pub async fn submit(&mut self) -> Result<ApplicationId, SubmissionError> {
        if let WizardStatus::Submitted { application_id } = &self.status {
            return Err(SubmissionError::AlreadySubmitted(application_id.clone()));
        }

        match self.run_submission().await {
            Ok(application_id) => {
                info!(%application_id, "expert application submitted");
                self.progress.complete_last();
                self.status = WizardStatus::Submitted {
                    application_id: application_id.clone(),
                };
                self.pending_application = None;
                self.draft = ApplicationDraft::default();
                self.step_valid = false;
                self.revision += 1;
                self.saved_revision = self.revision;
                Ok(application_id)
            }
            Err(err) => {
                warn!(
                    phase = ?err.phase(),
                    error = %err,
                    "expert application submission failed"
                );
                self.status = WizardStatus::Error {
                    message: err.to_string(),
                };
                Err(err)
            }
        }
    }

    async fn run_submission(&mut self) -> Result<ApplicationId, SubmissionError> {
        let application_id = if let Some(existing) = self.pending_application.clone() {
            info!(application_id = %existing, "reusing application created by an earlier attempt");
            existing
        } else {
            let request = CreateApplicationRequest {
                email: self.draft.personal_info.email.trim().to_string(),
                full_name: self.draft.personal_info.full_name.trim().to_string(),
                application_data: self.draft.clone(),
            };
            let created = self
                .api
                .create_draft(&request)
                .await
                .map_err(|source| SubmissionError::Failed {
                    phase: SubmitPhase::CreateDraft,
                    source,
                })?;
            debug!(application_id = %created.id, "draft application created");
            self.pending_application = Some(created.id.clone());
            self.bump_revision();
            created.id
        };

        let request = SubmitApplicationRequest {
            application_data: self.draft.clone(),
        };
        self.api
            .submit_draft(&application_id, &request)
            .await
            .map_err(|source| SubmissionError::Failed {
                phase: SubmitPhase::SubmitDraft,
                source,
            })?;

        Ok(application_id)
    }
}
