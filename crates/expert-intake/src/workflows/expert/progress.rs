use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::steps::{WizardStep, STEP_COUNT};

/// Where the applicant is in the wizard and what they have already finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardProgress {
    current: WizardStep,
    completed: BTreeSet<WizardStep>,
    celebration_shown: bool,
    started_at: DateTime<Utc>,
}

/// Result of moving forward one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StepChange {
    pub from: WizardStep,
    pub to: WizardStep,
    pub celebrate: bool,
}

impl WizardProgress {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            current: WizardStep::first(),
            completed: BTreeSet::new(),
            celebration_shown: false,
            started_at,
        }
    }

    pub fn current(&self) -> WizardStep {
        self.current
    }

    pub fn completed(&self) -> &BTreeSet<WizardStep> {
        &self.completed
    }

    pub fn is_completed(&self, step: WizardStep) -> bool {
        self.completed.contains(&step)
    }

    pub fn celebration_shown(&self) -> bool {
        self.celebration_shown
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Complete the current step and move to the next one. `None` on the last step.
    pub(crate) fn step_forward(&mut self) -> Option<StepChange> {
        let from = self.current;
        let to = from.next()?;

        self.completed.insert(from);
        self.current = to;

        let celebrate = to == WizardStep::midpoint() && !self.celebration_shown;
        if celebrate {
            self.celebration_shown = true;
        }

        Some(StepChange {
            from,
            to,
            celebrate,
        })
    }

    pub(crate) fn step_back(&mut self) -> Option<WizardStep> {
        let to = self.current.previous()?;
        self.current = to;
        Some(to)
    }

    /// Marks the final step as done once the application has been accepted.
    pub(crate) fn complete_last(&mut self) {
        if self.current == WizardStep::last() {
            self.completed.insert(WizardStep::last());
        }
    }

    pub fn completion_percent(&self) -> u8 {
        let done = self.completed.len() as u32;
        (done * 100 / u32::from(STEP_COUNT)) as u8
    }

    /// Remaining minutes, extrapolated from the observed pace once at least one step is done.
    pub fn estimated_minutes_remaining(&self, now: DateTime<Utc>) -> u32 {
        let remaining: Vec<WizardStep> = WizardStep::ALL
            .iter()
            .copied()
            .filter(|step| !self.completed.contains(step))
            .collect();

        if remaining.is_empty() {
            return 0;
        }

        let elapsed_seconds = (now - self.started_at).num_seconds();
        // No pace to extrapolate from without completed steps or elapsed time.
        if self.completed.is_empty() || elapsed_seconds <= 0 {
            return remaining.iter().map(|step| step.estimated_minutes()).sum();
        }

        let elapsed_minutes = elapsed_seconds as f64 / 60.0;
        let per_step = elapsed_minutes / self.completed.len() as f64;
        (per_step * remaining.len() as f64).ceil() as u32
    }
}
