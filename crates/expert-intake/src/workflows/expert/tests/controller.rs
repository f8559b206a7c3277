use super::common::*;
use std::sync::Arc;

use crate::workflows::expert::api::{
    ApiError, CreateApplicationRequest, SubmitApplicationRequest, GENERIC_SUBMISSION_MESSAGE,
};
use crate::workflows::expert::controller::{SubmissionError, SubmitPhase, Transition, WizardStatus};
use crate::workflows::expert::domain::{
    ApplicationDraft, ApplicationId, EntryId, ListSection, PersonalInfoPatch, SectionUpdate,
};
use crate::workflows::expert::steps::{WizardStep, STEP_COUNT};

#[tokio::test]
async fn welcome_step_advances_to_personal_info() {
    let mut wizard = wizard(Arc::new(RecordingApi::default()));
    assert_eq!(wizard.current_step().number(), 1);
    assert!(wizard.progress().completed().is_empty());
    assert!(!wizard.is_dirty());

    wizard.set_step_valid(true);
    let transition = wizard.advance().await.expect("no submission involved");

    assert_eq!(
        transition,
        Transition::Advanced {
            from: WizardStep::Welcome,
            to: WizardStep::PersonalInfo,
            celebrate: false,
        }
    );
    assert_eq!(wizard.current_step().number(), 2);
    assert_eq!(
        wizard.progress().completed().iter().copied().collect::<Vec<_>>(),
        vec![WizardStep::Welcome]
    );
}

#[tokio::test]
async fn welcome_step_needs_no_validity_report() {
    let mut wizard = wizard(Arc::new(RecordingApi::default()));
    let transition = wizard.advance().await.expect("no submission involved");
    assert!(matches!(transition, Transition::Advanced { .. }));
    assert_eq!(wizard.current_step(), WizardStep::PersonalInfo);
}

#[tokio::test]
async fn advance_is_blocked_while_step_is_invalid() {
    let mut wizard = wizard(Arc::new(RecordingApi::default()));
    wizard.advance().await.expect("welcome advances");
    let before = wizard.progress().clone();

    let transition = wizard.advance().await.expect("blocked, not failed");

    assert_eq!(
        transition,
        Transition::Blocked {
            step: WizardStep::PersonalInfo
        }
    );
    assert_eq!(wizard.progress(), &before);

    wizard.set_step_valid(false);
    assert_eq!(
        wizard.advance().await.expect("blocked, not failed"),
        Transition::Blocked {
            step: WizardStep::PersonalInfo
        }
    );
}

#[tokio::test]
async fn advance_from_every_step_marks_it_completed() {
    let mut wizard = wizard(Arc::new(RecordingApi::default()));

    for number in 1..STEP_COUNT {
        assert_eq!(wizard.current_step().number(), number);
        wizard.set_step_valid(true);
        wizard.advance().await.expect("no submission before last step");
        assert_eq!(wizard.current_step().number(), number + 1);
        let step = WizardStep::from_number(number).expect("step in range");
        assert!(wizard.progress().is_completed(step));
    }

    assert_eq!(wizard.current_step(), WizardStep::last());
    assert!(wizard.api().calls().is_empty());
}

#[tokio::test]
async fn validity_resets_after_each_transition() {
    let mut wizard = wizard(Arc::new(RecordingApi::default()));
    wizard.advance().await.expect("welcome advances");
    wizard.set_step_valid(true);
    wizard.advance().await.expect("personal info advances");

    assert!(!wizard.can_advance());
    assert!(matches!(
        wizard.advance().await.expect("blocked, not failed"),
        Transition::Blocked { .. }
    ));
}

#[tokio::test]
async fn retreat_moves_back_and_keeps_completion() {
    let mut wizard = wizard(Arc::new(RecordingApi::default()));

    assert_eq!(
        wizard.retreat(),
        Transition::Blocked {
            step: WizardStep::Welcome
        }
    );
    assert_eq!(wizard.current_step(), WizardStep::Welcome);

    for _ in 0..3 {
        wizard.set_step_valid(true);
        wizard.advance().await.expect("advances");
    }
    assert_eq!(wizard.current_step().number(), 4);

    for expected in (1..4).rev() {
        let from = wizard.current_step();
        let transition = wizard.retreat();
        assert_eq!(wizard.current_step().number(), expected);
        assert_eq!(
            transition,
            Transition::Retreated {
                from,
                to: wizard.current_step()
            }
        );
    }
    assert_eq!(wizard.progress().completed().len(), 3);
}

#[tokio::test]
async fn halfway_celebration_fires_exactly_once() {
    let mut wizard = wizard(Arc::new(RecordingApi::default()));
    let mut celebrations = 0;

    for _ in 0..3 {
        wizard.set_step_valid(true);
        if let Transition::Advanced { celebrate: true, .. } =
            wizard.advance().await.expect("advances")
        {
            celebrations += 1;
        }
    }
    assert_eq!(wizard.current_step(), WizardStep::midpoint());
    assert_eq!(celebrations, 1);
    assert!(wizard.progress().celebration_shown());

    wizard.retreat();
    wizard.set_step_valid(true);
    let transition = wizard.advance().await.expect("advances");
    assert_eq!(
        transition,
        Transition::Advanced {
            from: WizardStep::ProfessionalBackground,
            to: WizardStep::Skills,
            celebrate: false,
        }
    );
    assert!(wizard.progress().celebration_shown());
}

#[tokio::test]
async fn validate_current_step_gates_advance() {
    let mut wizard = wizard(Arc::new(RecordingApi::default()));
    wizard.advance().await.expect("welcome advances");

    let validation = wizard.validate_current_step();
    assert!(!validation.valid);
    assert!(validation.message_for("email").is_some());
    assert!(!wizard.can_advance());

    populate(&mut wizard);
    assert!(wizard.validate_current_step().valid);
    assert!(wizard.can_advance());
}

#[tokio::test]
async fn final_advance_creates_then_submits() {
    let api = RecordingApi::issuing(42);
    let mut wizard = wizard(api.clone());
    populate(&mut wizard);
    walk_to_last_step(&mut wizard).await;
    let draft = wizard.draft().clone();

    wizard.set_step_valid(true);
    let transition = wizard.advance().await.expect("submission succeeds");

    let id = ApplicationId("42".to_string());
    assert_eq!(
        transition,
        Transition::Submitted {
            application_id: id.clone()
        }
    );
    assert_eq!(
        api.calls(),
        vec![
            ApiCall::Create(CreateApplicationRequest {
                email: "ada@example.com".to_string(),
                full_name: "Ada Lovelace".to_string(),
                application_data: draft.clone(),
            }),
            ApiCall::Submit(
                id.clone(),
                SubmitApplicationRequest {
                    application_data: draft
                }
            ),
        ]
    );
    assert_eq!(
        wizard.status(),
        &WizardStatus::Submitted { application_id: id }
    );
    assert!(wizard.progress().is_completed(WizardStep::last()));
    assert_eq!(wizard.completion_percent(), 100);
}

#[tokio::test]
async fn successful_submission_discards_the_draft() {
    let api = RecordingApi::issuing(7);
    let mut wizard = wizard(api);
    populate(&mut wizard);
    walk_to_last_step(&mut wizard).await;
    wizard.set_step_valid(true);
    wizard.advance().await.expect("submission succeeds");

    assert_eq!(wizard.draft(), &ApplicationDraft::default());
    assert!(!wizard.is_dirty());
    assert!(wizard.pending_application().is_none());
}

#[tokio::test]
async fn create_rejection_surfaces_detail_and_skips_submit() {
    let api = Arc::new(RecordingApi::default());
    api.script_create(Err(ApiError::rejected(409, "email already used")));
    let mut wizard = wizard(api.clone());
    populate(&mut wizard);
    walk_to_last_step(&mut wizard).await;
    let draft = wizard.draft().clone();

    wizard.set_step_valid(true);
    let err = wizard.advance().await.expect_err("create rejected");

    assert_eq!(err.to_string(), "email already used");
    assert_eq!(err.phase(), Some(SubmitPhase::CreateDraft));
    assert_eq!(wizard.current_step(), WizardStep::last());
    assert_eq!(wizard.draft(), &draft);
    assert_eq!(wizard.last_error(), Some("email already used"));
    assert_eq!(api.calls().len(), 1);
    assert!(matches!(api.calls()[0], ApiCall::Create(_)));
}

#[tokio::test]
async fn transport_failure_uses_generic_message() {
    let api = Arc::new(RecordingApi::default());
    api.script_create(Err(ApiError::Transport("connection reset".to_string())));
    let mut wizard = wizard(api);
    populate(&mut wizard);

    let err = wizard.submit().await.expect_err("transport failure");
    assert_eq!(err.to_string(), GENERIC_SUBMISSION_MESSAGE);
    assert_eq!(
        wizard.status(),
        &WizardStatus::Error {
            message: GENERIC_SUBMISSION_MESSAGE.to_string()
        }
    );
}

#[tokio::test]
async fn retry_after_submit_failure_reuses_created_application() {
    let api = RecordingApi::issuing(42);
    api.script_submit(Err(ApiError::Status {
        status: 503,
        detail: None,
    }));
    let mut wizard = wizard(api.clone());
    populate(&mut wizard);
    walk_to_last_step(&mut wizard).await;

    wizard.set_step_valid(true);
    let err = wizard.advance().await.expect_err("phase 2 fails");
    assert_eq!(err.phase(), Some(SubmitPhase::SubmitDraft));
    assert_eq!(
        wizard.pending_application(),
        Some(&ApplicationId("42".to_string()))
    );

    let id = wizard.submit().await.expect("retry succeeds");
    assert_eq!(id, ApplicationId("42".to_string()));

    let calls = api.calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(calls[0], ApiCall::Create(_)));
    assert!(matches!(&calls[1], ApiCall::Submit(id, _) if id.0 == "42"));
    assert!(matches!(&calls[2], ApiCall::Submit(id, _) if id.0 == "42"));
}

#[tokio::test]
async fn retreat_leaves_error_state() {
    let api = Arc::new(RecordingApi::default());
    api.script_create(Err(ApiError::rejected(422, "full_name is required")));
    let mut wizard = wizard(api);
    populate(&mut wizard);
    walk_to_last_step(&mut wizard).await;
    wizard.set_step_valid(true);
    wizard.advance().await.expect_err("create rejected");

    let transition = wizard.retreat();

    assert_eq!(
        transition,
        Transition::Retreated {
            from: WizardStep::SampleReview,
            to: WizardStep::References,
        }
    );
    assert_eq!(wizard.status(), &WizardStatus::InProgress);
    assert_eq!(wizard.last_error(), None);
}

#[tokio::test]
async fn editing_after_a_failed_submit_clears_the_error() {
    let api = Arc::new(RecordingApi::default());
    api.script_create(Err(ApiError::rejected(409, "email already used")));
    let mut wizard = wizard(api);
    populate(&mut wizard);
    wizard.submit().await.expect_err("create rejected");
    assert_eq!(wizard.last_error(), Some("email already used"));

    wizard.update_draft_section(SectionUpdate::PersonalInfo(PersonalInfoPatch {
        email: Some("ada.lovelace@example.com".to_string()),
        ..PersonalInfoPatch::default()
    }));

    assert_eq!(wizard.status(), &WizardStatus::InProgress);
    assert_eq!(wizard.last_error(), None);
}

#[tokio::test]
async fn rejected_edits_keep_the_error() {
    let api = Arc::new(RecordingApi::default());
    api.script_create(Err(ApiError::rejected(409, "email already used")));
    let mut wizard = wizard(api);
    populate(&mut wizard);
    wizard.submit().await.expect_err("create rejected");

    assert!(!wizard.remove_list_item(ListSection::Skills, &EntryId::from("missing")));
    assert_eq!(wizard.last_error(), Some("email already used"));
}

#[tokio::test]
async fn submitted_wizard_is_terminal() {
    let api = RecordingApi::issuing(5);
    let mut wizard = wizard(api.clone());
    populate(&mut wizard);
    let id = wizard.submit().await.expect("submission succeeds");

    match wizard.submit().await {
        Err(SubmissionError::AlreadySubmitted(existing)) => assert_eq!(existing, id),
        other => panic!("expected already submitted, got {other:?}"),
    }
    assert!(matches!(
        wizard.advance().await.expect("blocked"),
        Transition::Blocked { .. }
    ));
    assert!(matches!(wizard.retreat(), Transition::Blocked { .. }));
    assert!(!wizard.add_list_item(crate::workflows::expert::domain::ListItem::Skill(skill(
        "Late addition"
    ))));
    assert_eq!(api.calls().len(), 2);
}
