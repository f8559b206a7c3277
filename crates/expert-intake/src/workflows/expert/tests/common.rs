use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::workflows::expert::api::{
    ApiError, ApplicationApi, ApplicationResource, CreateApplicationRequest,
    SubmitApplicationRequest,
};
use crate::workflows::expert::controller::{ApplicationWizardController, Transition};
use crate::workflows::expert::domain::{
    ApplicationDraft, ApplicationId, CertificationEntry, Credentials, EducationEntry,
    EmploymentEntry, EntryId, ListItem, PersonalInfo, PersonalInfoPatch, PortfolioItem,
    Proficiency, ProfessionalBackground, ProfessionalBackgroundPatch, ReferenceEntry,
    SampleReviewFeedback, SampleReviewPatch, SectionUpdate, SkillEntry,
};
use crate::workflows::expert::steps::WizardStep;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum ApiCall {
    Create(CreateApplicationRequest),
    Submit(ApplicationId, SubmitApplicationRequest),
}

/// Records every call and replays scripted responses; unscripted calls succeed.
#[derive(Default)]
pub(super) struct RecordingApi {
    calls: Mutex<Vec<ApiCall>>,
    create_results: Mutex<VecDeque<Result<ApplicationResource, ApiError>>>,
    submit_results: Mutex<VecDeque<Result<ApplicationResource, ApiError>>>,
}

impl RecordingApi {
    pub(super) fn issuing(id: u64) -> Arc<Self> {
        let api = Self::default();
        api.script_create(Ok(ApplicationResource::new(id).with_status("draft")));
        Arc::new(api)
    }

    pub(super) fn script_create(&self, result: Result<ApplicationResource, ApiError>) {
        self.create_results
            .lock()
            .expect("script mutex poisoned")
            .push_back(result);
    }

    pub(super) fn script_submit(&self, result: Result<ApplicationResource, ApiError>) {
        self.submit_results
            .lock()
            .expect("script mutex poisoned")
            .push_back(result);
    }

    pub(super) fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }
}

#[async_trait]
impl ApplicationApi for RecordingApi {
    async fn create_draft(
        &self,
        request: &CreateApplicationRequest,
    ) -> Result<ApplicationResource, ApiError> {
        self.record(ApiCall::Create(request.clone()));
        self.create_results
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(ApplicationResource::new(1u64).with_status("draft")))
    }

    async fn submit_draft(
        &self,
        id: &ApplicationId,
        request: &SubmitApplicationRequest,
    ) -> Result<ApplicationResource, ApiError> {
        self.record(ApiCall::Submit(id.clone(), request.clone()));
        self.submit_results
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Ok(ApplicationResource {
                    id: id.clone(),
                    status: Some("submitted".to_string()),
                    fields: Default::default(),
                })
            })
    }
}

pub(super) type TestWizard = ApplicationWizardController<Arc<RecordingApi>>;

pub(super) fn session_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn wizard(api: Arc<RecordingApi>) -> TestWizard {
    ApplicationWizardController::starting_at(api, session_start())
}

pub(super) fn skill(name: &str) -> SkillEntry {
    SkillEntry {
        id: EntryId::generate(),
        name: name.to_string(),
        proficiency: Proficiency::Advanced,
        years: 6,
    }
}

pub(super) fn portfolio_item(title: &str) -> PortfolioItem {
    PortfolioItem {
        id: EntryId::generate(),
        title: title.to_string(),
        url: format!("https://portfolio.example.com/{}", title.to_lowercase().replace(' ', "-")),
        description: "Annotated walkthrough of the engagement and its results.".to_string(),
    }
}

pub(super) fn reference(name: &str, email: &str) -> ReferenceEntry {
    ReferenceEntry {
        id: EntryId::generate(),
        name: name.to_string(),
        email: email.to_string(),
        relationship: "Former manager".to_string(),
        company: Some("Analytical Engines Ltd".to_string()),
    }
}

pub(super) fn personal_info() -> PersonalInfo {
    PersonalInfo {
        full_name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: Some("+44 20 7946 0958".to_string()),
        location: "London, UK".to_string(),
        linkedin_url: Some("https://www.linkedin.com/in/ada".to_string()),
    }
}

pub(super) fn professional_background() -> ProfessionalBackground {
    ProfessionalBackground {
        current_title: "Principal Analyst".to_string(),
        current_company: Some("Analytical Engines Ltd".to_string()),
        years_experience: 12,
        industries: vec!["Computing".to_string(), "Research".to_string()],
        summary: "Twelve years designing numerical programs and reviewing technical \
                  proposals for engine builders across Europe."
            .to_string(),
    }
}

pub(super) fn credentials() -> Credentials {
    Credentials {
        education: vec![EducationEntry {
            id: EntryId::generate(),
            institution: "University of London".to_string(),
            degree: "BSc".to_string(),
            field_of_study: "Mathematics".to_string(),
            graduation_year: Some(2011),
        }],
        certifications: vec![CertificationEntry {
            id: EntryId::generate(),
            name: "Certified Reviewer".to_string(),
            issuer: "Royal Society".to_string(),
            year: Some(2019),
        }],
        employment: vec![EmploymentEntry {
            id: EntryId::generate(),
            company: "Analytical Engines Ltd".to_string(),
            title: "Principal Analyst".to_string(),
            start_year: 2012,
            end_year: None,
        }],
    }
}

pub(super) fn sample_review() -> SampleReviewFeedback {
    SampleReviewFeedback {
        rating: Some(4),
        strengths: "Clear structure and well chosen worked examples.".to_string(),
        improvements: "The edge cases around carry propagation need more tests.".to_string(),
    }
}

/// A draft that passes every step validator.
pub(super) fn complete_draft() -> ApplicationDraft {
    ApplicationDraft {
        personal_info: personal_info(),
        professional_background: professional_background(),
        skills: vec![skill("Numerical analysis"), skill("Technical writing")],
        portfolio: vec![
            portfolio_item("Bernoulli Notes"),
            portfolio_item("Engine Tables"),
            portfolio_item("Loom Patterns"),
        ],
        credentials: credentials(),
        references: vec![
            reference("Charles Babbage", "charles@example.com"),
            reference("Mary Somerville", "mary@example.com"),
            reference("Augustus De Morgan", "augustus@example.com"),
        ],
        sample_review: sample_review(),
    }
}

/// Fill the controller's draft through its public editing operations.
pub(super) fn populate(wizard: &mut TestWizard) {
    let draft = complete_draft();
    let info = draft.personal_info;
    wizard.update_draft_section(SectionUpdate::PersonalInfo(PersonalInfoPatch {
        full_name: Some(info.full_name),
        email: Some(info.email),
        phone: info.phone,
        location: Some(info.location),
        linkedin_url: info.linkedin_url,
    }));

    let background = draft.professional_background;
    wizard.update_draft_section(SectionUpdate::ProfessionalBackground(
        ProfessionalBackgroundPatch {
            current_title: Some(background.current_title),
            current_company: background.current_company,
            years_experience: Some(background.years_experience),
            industries: Some(background.industries),
            summary: Some(background.summary),
        },
    ));

    let review = draft.sample_review;
    wizard.update_draft_section(SectionUpdate::SampleReview(SampleReviewPatch {
        rating: review.rating,
        strengths: Some(review.strengths),
        improvements: Some(review.improvements),
    }));

    let items = draft
        .skills
        .into_iter()
        .map(ListItem::Skill)
        .chain(draft.portfolio.into_iter().map(ListItem::Portfolio))
        .chain(draft.credentials.education.into_iter().map(ListItem::Education))
        .chain(
            draft
                .credentials
                .certifications
                .into_iter()
                .map(ListItem::Certification),
        )
        .chain(draft.credentials.employment.into_iter().map(ListItem::Employment))
        .chain(draft.references.into_iter().map(ListItem::Reference));
    for item in items {
        assert!(wizard.add_list_item(item), "fixture fits within section caps");
    }
}

/// Validate and advance until the wizard sits on the last step.
pub(super) async fn walk_to_last_step(wizard: &mut TestWizard) {
    while wizard.current_step() != WizardStep::last() {
        let validation = wizard.validate_current_step();
        assert!(
            validation.valid,
            "step {:?} rejected: {:?}",
            wizard.current_step(),
            validation.errors
        );
        let transition = wizard.advance().await.expect("advancing never submits here");
        assert!(matches!(transition, Transition::Advanced { .. }));
    }
}
