use crate::infra::render_validation;
use chrono::Utc;
use clap::Args;
use expert_intake::config::AppConfig;
use expert_intake::error::AppError;
use expert_intake::telemetry;
use expert_intake::workflows::expert::{
    ApplicationWizardController, AutoSaver, CertificationEntry, EducationEntry, EmploymentEntry,
    EntryId, FileDraftStore, HttpApplicationApi, ListItem, PersonalInfoPatch, PortfolioItem,
    Proficiency, ProfessionalBackgroundPatch, ReferenceEntry, SampleReviewPatch, SaveOutcome,
    SectionUpdate, SkillEntry, Transition, WizardStep,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct WalkthroughArgs {
    /// Base URL of the expert applications API (defaults to EXPERT_API_URL)
    #[arg(long)]
    pub(crate) api_url: Option<String>,
    /// Where the in-progress draft is auto-saved (defaults to EXPERT_DRAFT_PATH)
    #[arg(long)]
    pub(crate) draft_path: Option<PathBuf>,
    /// Email the scripted applicant applies with
    #[arg(long, default_value = "grace.hopper@example.org")]
    pub(crate) email: String,
    /// Start over instead of resuming a saved draft
    #[arg(long)]
    pub(crate) fresh: bool,
}

type Wizard = ApplicationWizardController<HttpApplicationApi>;

pub(crate) async fn run_walkthrough(args: WalkthroughArgs) -> Result<(), AppError> {
    let WalkthroughArgs {
        api_url,
        draft_path,
        email,
        fresh,
    } = args;

    let mut config = AppConfig::load()?;
    if let Some(api_url) = api_url {
        config.api.base_url = api_url;
    }
    if let Some(draft_path) = draft_path {
        config.autosave.draft_path = draft_path;
    }
    telemetry::init(&config.telemetry)?;

    let api = HttpApplicationApi::from_config(&config.api)?;
    let mut saver = AutoSaver::from_config(
        FileDraftStore::new(config.autosave.draft_path.clone()),
        &config.autosave,
    );

    let restored = if fresh {
        None
    } else {
        saver.restore(api.clone())?
    };
    let mut wizard = match restored {
        Some(wizard) => {
            println!(
                "Resuming saved draft at step {} ({})",
                wizard.current_step().number(),
                wizard.current_step().label()
            );
            wizard
        }
        None => {
            let mut wizard = ApplicationWizardController::new(api);
            saver.discard(&mut wizard)?;
            wizard
        }
    };

    println!("Expert application walkthrough against {}", config.api.base_url);
    fill_in_applicant(&mut wizard, &email);

    loop {
        let step = wizard.current_step();
        let validation = wizard.validate_current_step();
        println!(
            "\n[{}/{}] {} | {}% complete | ~{} min left",
            step.number(),
            WizardStep::last().number(),
            step.label(),
            wizard.completion_percent(),
            wizard.estimated_minutes_remaining(Utc::now())
        );
        if !validation.valid {
            render_validation(&validation);
        }

        match wizard.advance().await {
            Ok(Transition::Advanced { celebrate, .. }) => {
                if celebrate {
                    println!("  Halfway there, keep going!");
                }
            }
            Ok(Transition::Submitted { application_id }) => {
                println!("\nApplication {application_id} submitted");
                break;
            }
            Ok(Transition::Blocked { step }) => {
                println!("  Step {} is incomplete; draft kept for later", step.label());
                saver.flush(&mut wizard, Utc::now())?;
                return Ok(());
            }
            Ok(Transition::Retreated { .. }) => {}
            Err(err) => {
                let phase = err.phase().map(|phase| phase.label()).unwrap_or("submit");
                println!("  Submission failed during {phase}: {err}");
                saver.flush(&mut wizard, Utc::now())?;
                println!(
                    "  Draft saved to {}; rerun to retry",
                    saver.store().path().display()
                );
                return Ok(());
            }
        }

        if let SaveOutcome::Saved { revision } = saver.tick(&mut wizard, Utc::now())? {
            println!("  Draft auto-saved (revision {revision})");
        }
    }

    if saver.flush(&mut wizard, Utc::now())? == SaveOutcome::Cleared {
        println!("Local draft removed");
    }
    Ok(())
}

/// Answers every page the way a reviewer applicant would, skipping sections already filled.
fn fill_in_applicant(wizard: &mut Wizard, email: &str) {
    if wizard.draft().personal_info.email.is_empty() {
        wizard.update_draft_section(SectionUpdate::PersonalInfo(PersonalInfoPatch {
            full_name: Some("Grace Hopper".to_string()),
            email: Some(email.to_string()),
            phone: Some("+1 703 555 0142".to_string()),
            location: Some("Arlington, VA".to_string()),
            linkedin_url: None,
        }));
    }

    if wizard.draft().professional_background.summary.is_empty() {
        wizard.update_draft_section(SectionUpdate::ProfessionalBackground(
            ProfessionalBackgroundPatch {
                current_title: Some("Compiler Engineer".to_string()),
                current_company: Some("Remington Rand".to_string()),
                years_experience: Some(30),
                industries: Some(vec!["Computing".to_string(), "Defense".to_string()]),
                summary: Some(
                    "Three decades building compilers and reviewing language standards for \
                     business data processing teams."
                        .to_string(),
                ),
            },
        ));
    }

    if wizard.draft().skills.is_empty() {
        for (name, proficiency, years) in [
            ("COBOL", Proficiency::Expert, 25),
            ("Compiler design", Proficiency::Expert, 30),
            ("Technical review", Proficiency::Advanced, 15),
        ] {
            wizard.add_list_item(ListItem::Skill(SkillEntry {
                id: EntryId::generate(),
                name: name.to_string(),
                proficiency,
                years,
            }));
        }
    }

    if wizard.draft().portfolio.is_empty() {
        for (title, slug) in [
            ("A-0 System", "a-0"),
            ("FLOW-MATIC", "flow-matic"),
            ("COBOL 60 Report", "cobol-60"),
        ] {
            wizard.add_list_item(ListItem::Portfolio(PortfolioItem {
                id: EntryId::generate(),
                title: title.to_string(),
                url: format!("https://archive.example.org/{slug}"),
                description: format!("{title} design notes and review history."),
            }));
        }
    }

    let credentials = &wizard.draft().credentials;
    if credentials.education.is_empty() && credentials.employment.is_empty() {
        wizard.add_list_item(ListItem::Education(EducationEntry {
            id: EntryId::generate(),
            institution: "Yale University".to_string(),
            degree: "PhD".to_string(),
            field_of_study: "Mathematics".to_string(),
            graduation_year: Some(1934),
        }));
        wizard.add_list_item(ListItem::Certification(CertificationEntry {
            id: EntryId::generate(),
            name: "Naval Reserve Commission".to_string(),
            issuer: "US Navy".to_string(),
            year: Some(1943),
        }));
        wizard.add_list_item(ListItem::Employment(EmploymentEntry {
            id: EntryId::generate(),
            company: "Remington Rand".to_string(),
            title: "Senior Mathematician".to_string(),
            start_year: 1949,
            end_year: Some(1967),
        }));
    }

    if wizard.draft().references.is_empty() {
        for (name, reference_email) in [
            ("Howard Aiken", "howard.aiken@example.org"),
            ("John Mauchly", "john.mauchly@example.org"),
            ("Jean Sammet", "jean.sammet@example.org"),
        ] {
            wizard.add_list_item(ListItem::Reference(ReferenceEntry {
                id: EntryId::generate(),
                name: name.to_string(),
                email: reference_email.to_string(),
                relationship: "Colleague".to_string(),
                company: None,
            }));
        }
    }

    if wizard.draft().sample_review.rating.is_none() {
        wizard.update_draft_section(SectionUpdate::SampleReview(SampleReviewPatch {
            rating: Some(4),
            strengths: Some("Well organised and the examples match the claims.".to_string()),
            improvements: Some("Add error handling guidance for the edge cases.".to_string()),
        }));
    }
}
