use clap::Args;
use expert_intake::error::AppError;
use expert_intake::workflows::expert::{
    validate_step, ApplicationDraft, StepValidation, WizardSnapshot, WizardStep,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Draft JSON, either a bare application draft or an auto-saved snapshot
    pub(crate) path: PathBuf,
}

/// Auto-saved snapshots carry progress; hand-written files may hold only the draft.
#[derive(Deserialize)]
#[serde(untagged)]
enum DraftFile {
    Snapshot(WizardSnapshot),
    Draft(ApplicationDraft),
}

pub(crate) fn load_draft(path: &Path) -> Result<ApplicationDraft, AppError> {
    let raw = fs::read_to_string(path)?;
    let draft = match serde_json::from_str::<DraftFile>(&raw)? {
        DraftFile::Snapshot(snapshot) => snapshot.draft,
        DraftFile::Draft(draft) => draft,
    };
    Ok(draft)
}

pub(crate) fn step_report(draft: &ApplicationDraft) -> Vec<(WizardStep, StepValidation)> {
    WizardStep::ALL
        .iter()
        .map(|step| (*step, validate_step(*step, draft)))
        .collect()
}

pub(crate) fn render_validation(validation: &StepValidation) {
    for error in &validation.errors {
        println!("    - {}: {}", error.field, error.message);
    }
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let draft = load_draft(&args.path)?;
    let report = step_report(&draft);

    println!("Draft check for {}", args.path.display());
    for (step, validation) in &report {
        let verdict = if validation.valid { "ok" } else { "needs work" };
        println!("- {} {}: {}", step.number(), step.label(), verdict);
        render_validation(validation);
    }

    let blocking = report
        .iter()
        .filter(|(_, validation)| !validation.valid)
        .count();
    if blocking == 0 {
        println!("Ready to submit");
    } else {
        println!("{blocking} step(s) must be fixed before submitting");
    }
    Ok(())
}
