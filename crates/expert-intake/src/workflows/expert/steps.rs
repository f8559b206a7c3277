use serde::{Deserialize, Serialize};

/// Number of pages in the wizard.
pub const STEP_COUNT: u8 = 8;

/// Fixed, ordered pages of the expert application wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Welcome,
    PersonalInfo,
    ProfessionalBackground,
    Skills,
    Portfolio,
    Credentials,
    References,
    SampleReview,
}

impl WizardStep {
    pub const ALL: [WizardStep; STEP_COUNT as usize] = [
        WizardStep::Welcome,
        WizardStep::PersonalInfo,
        WizardStep::ProfessionalBackground,
        WizardStep::Skills,
        WizardStep::Portfolio,
        WizardStep::Credentials,
        WizardStep::References,
        WizardStep::SampleReview,
    ];

    pub const fn first() -> Self {
        WizardStep::Welcome
    }

    pub const fn last() -> Self {
        WizardStep::SampleReview
    }

    /// Step reached at the halfway mark, `ceil(N / 2)`.
    pub fn midpoint() -> Self {
        Self::ALL[usize::from((STEP_COUNT + 1) / 2) - 1]
    }

    /// One-based position within the wizard.
    pub const fn number(self) -> u8 {
        match self {
            WizardStep::Welcome => 1,
            WizardStep::PersonalInfo => 2,
            WizardStep::ProfessionalBackground => 3,
            WizardStep::Skills => 4,
            WizardStep::Portfolio => 5,
            WizardStep::Credentials => 6,
            WizardStep::References => 7,
            WizardStep::SampleReview => 8,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        let index = usize::from(number).checked_sub(1)?;
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        Self::from_number(self.number() - 1)
    }

    pub const fn key(self) -> &'static str {
        match self {
            WizardStep::Welcome => "welcome",
            WizardStep::PersonalInfo => "personal_info",
            WizardStep::ProfessionalBackground => "professional_background",
            WizardStep::Skills => "skills",
            WizardStep::Portfolio => "portfolio",
            WizardStep::Credentials => "credentials",
            WizardStep::References => "references",
            WizardStep::SampleReview => "sample_review",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            WizardStep::Welcome => "Welcome",
            WizardStep::PersonalInfo => "Personal Information",
            WizardStep::ProfessionalBackground => "Professional Background",
            WizardStep::Skills => "Skills & Expertise",
            WizardStep::Portfolio => "Portfolio",
            WizardStep::Credentials => "Credentials",
            WizardStep::References => "References",
            WizardStep::SampleReview => "Sample Review",
        }
    }

    /// The intro page needs no input and never blocks progress.
    pub const fn is_always_valid(self) -> bool {
        matches!(self, WizardStep::Welcome)
    }

    /// Static time estimate used before any pace has been observed.
    pub const fn estimated_minutes(self) -> u32 {
        match self {
            WizardStep::Welcome => 1,
            WizardStep::PersonalInfo => 3,
            WizardStep::ProfessionalBackground => 5,
            WizardStep::Skills => 4,
            WizardStep::Portfolio => 6,
            WizardStep::Credentials => 6,
            WizardStep::References => 4,
            WizardStep::SampleReview => 10,
        }
    }
}
