use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub const MIN_SKILLS: usize = 1;
pub const MAX_SKILLS: usize = 10;
pub const MIN_PORTFOLIO_ITEMS: usize = 3;
pub const MAX_PORTFOLIO_ITEMS: usize = 5;
pub const REQUIRED_REFERENCES: usize = 3;

/// Client-generated identifier used to edit or remove list entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque server-issued identifier for a persisted application.
///
/// The API may hand back either a JSON string or a number; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl<'de> Deserialize<'de> for ApplicationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(value) => Self(value),
            RawId::Unsigned(value) => Self(value.to_string()),
            RawId::Signed(value) => Self(value.to_string()),
        })
    }
}

impl From<u64> for ApplicationId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for ApplicationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulated, not-yet-submitted answers collected by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationDraft {
    pub personal_info: PersonalInfo,
    pub professional_background: ProfessionalBackground,
    pub skills: Vec<SkillEntry>,
    pub portfolio: Vec<PortfolioItem>,
    pub credentials: Credentials,
    pub references: Vec<ReferenceEntry>,
    pub sample_review: SampleReviewFeedback,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: String,
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfessionalBackground {
    pub current_title: String,
    pub current_company: Option<String>,
    pub years_experience: u8,
    pub industries: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub id: EntryId,
    pub name: String,
    pub proficiency: Proficiency,
    pub years: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Proficiency {
    pub const fn label(self) -> &'static str {
        match self {
            Proficiency::Beginner => "beginner",
            Proficiency::Intermediate => "intermediate",
            Proficiency::Advanced => "advanced",
            Proficiency::Expert => "expert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: EntryId,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// Education, certification, and employment history grouped on one wizard step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub education: Vec<EducationEntry>,
    pub certifications: Vec<CertificationEntry>,
    pub employment: Vec<EmploymentEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub id: EntryId,
    pub institution: String,
    pub degree: String,
    #[serde(default)]
    pub field_of_study: String,
    #[serde(default)]
    pub graduation_year: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationEntry {
    pub id: EntryId,
    pub name: String,
    pub issuer: String,
    #[serde(default)]
    pub year: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentEntry {
    pub id: EntryId,
    pub company: String,
    pub title: String,
    pub start_year: u16,
    #[serde(default)]
    pub end_year: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub id: EntryId,
    pub name: String,
    pub email: String,
    pub relationship: String,
    #[serde(default)]
    pub company: Option<String>,
}

/// Feedback the applicant writes after reviewing the sample submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleReviewFeedback {
    pub rating: Option<u8>,
    pub strengths: String,
    pub improvements: String,
}

/// Names every sub-record of the draft, for logging and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    PersonalInfo,
    ProfessionalBackground,
    Skills,
    Portfolio,
    Education,
    Certifications,
    Employment,
    References,
    SampleReview,
}

impl SectionKey {
    pub const fn label(self) -> &'static str {
        match self {
            SectionKey::PersonalInfo => "personal_info",
            SectionKey::ProfessionalBackground => "professional_background",
            SectionKey::Skills => "skills",
            SectionKey::Portfolio => "portfolio",
            SectionKey::Education => "education",
            SectionKey::Certifications => "certifications",
            SectionKey::Employment => "employment",
            SectionKey::References => "references",
            SectionKey::SampleReview => "sample_review",
        }
    }
}

/// List-valued sections of the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListSection {
    Skills,
    Portfolio,
    Education,
    Certifications,
    Employment,
    References,
}

impl ListSection {
    /// Hard cap applied while editing; `None` means unbounded.
    pub const fn max_items(self) -> Option<usize> {
        match self {
            ListSection::Skills => Some(MAX_SKILLS),
            ListSection::Portfolio => Some(MAX_PORTFOLIO_ITEMS),
            ListSection::References => Some(REQUIRED_REFERENCES),
            ListSection::Education | ListSection::Certifications | ListSection::Employment => None,
        }
    }

    pub const fn key(self) -> SectionKey {
        match self {
            ListSection::Skills => SectionKey::Skills,
            ListSection::Portfolio => SectionKey::Portfolio,
            ListSection::Education => SectionKey::Education,
            ListSection::Certifications => SectionKey::Certifications,
            ListSection::Employment => SectionKey::Employment,
            ListSection::References => SectionKey::References,
        }
    }
}

/// Partial update for the personal info record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfoPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfessionalBackgroundPatch {
    pub current_title: Option<String>,
    pub current_company: Option<String>,
    pub years_experience: Option<u8>,
    pub industries: Option<Vec<String>>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleReviewPatch {
    pub rating: Option<u8>,
    pub strengths: Option<String>,
    pub improvements: Option<String>,
}

/// A partial record addressed to one of the scalar sections of the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", content = "data", rename_all = "snake_case")]
pub enum SectionUpdate {
    PersonalInfo(PersonalInfoPatch),
    ProfessionalBackground(ProfessionalBackgroundPatch),
    SampleReview(SampleReviewPatch),
}

impl SectionUpdate {
    pub const fn section(&self) -> SectionKey {
        match self {
            SectionUpdate::PersonalInfo(_) => SectionKey::PersonalInfo,
            SectionUpdate::ProfessionalBackground(_) => SectionKey::ProfessionalBackground,
            SectionUpdate::SampleReview(_) => SectionKey::SampleReview,
        }
    }
}

/// One entry destined for a list-valued section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", content = "item", rename_all = "snake_case")]
pub enum ListItem {
    Skill(SkillEntry),
    Portfolio(PortfolioItem),
    Education(EducationEntry),
    Certification(CertificationEntry),
    Employment(EmploymentEntry),
    Reference(ReferenceEntry),
}

impl ListItem {
    pub const fn section(&self) -> ListSection {
        match self {
            ListItem::Skill(_) => ListSection::Skills,
            ListItem::Portfolio(_) => ListSection::Portfolio,
            ListItem::Education(_) => ListSection::Education,
            ListItem::Certification(_) => ListSection::Certifications,
            ListItem::Employment(_) => ListSection::Employment,
            ListItem::Reference(_) => ListSection::References,
        }
    }

    pub fn id(&self) -> &EntryId {
        match self {
            ListItem::Skill(entry) => &entry.id,
            ListItem::Portfolio(entry) => &entry.id,
            ListItem::Education(entry) => &entry.id,
            ListItem::Certification(entry) => &entry.id,
            ListItem::Employment(entry) => &entry.id,
            ListItem::Reference(entry) => &entry.id,
        }
    }
}

trait Identified {
    fn entry_id(&self) -> &EntryId;
}

macro_rules! identified {
    ($($entry:ty),+ $(,)?) => {
        $(impl Identified for $entry {
            fn entry_id(&self) -> &EntryId {
                &self.id
            }
        })+
    };
}

identified!(
    SkillEntry,
    PortfolioItem,
    EducationEntry,
    CertificationEntry,
    EmploymentEntry,
    ReferenceEntry,
);

fn remove_by_id<T: Identified>(entries: &mut Vec<T>, id: &EntryId) -> bool {
    match entries.iter().position(|entry| entry.entry_id() == id) {
        Some(index) => {
            entries.remove(index);
            true
        }
        None => false,
    }
}

fn replace_by_id<T: Identified>(entries: &mut [T], replacement: T) -> bool {
    match entries
        .iter_mut()
        .find(|entry| entry.entry_id() == replacement.entry_id())
    {
        Some(slot) => {
            *slot = replacement;
            true
        }
        None => false,
    }
}

impl PersonalInfo {
    pub fn apply(&mut self, patch: PersonalInfoPatch) {
        if let Some(full_name) = patch.full_name {
            self.full_name = full_name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone);
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(linkedin_url) = patch.linkedin_url {
            self.linkedin_url = Some(linkedin_url);
        }
    }
}

impl ProfessionalBackground {
    pub fn apply(&mut self, patch: ProfessionalBackgroundPatch) {
        if let Some(current_title) = patch.current_title {
            self.current_title = current_title;
        }
        if let Some(current_company) = patch.current_company {
            self.current_company = Some(current_company);
        }
        if let Some(years_experience) = patch.years_experience {
            self.years_experience = years_experience;
        }
        if let Some(industries) = patch.industries {
            self.industries = industries;
        }
        if let Some(summary) = patch.summary {
            self.summary = summary;
        }
    }
}

impl SampleReviewFeedback {
    pub fn apply(&mut self, patch: SampleReviewPatch) {
        if let Some(rating) = patch.rating {
            self.rating = Some(rating);
        }
        if let Some(strengths) = patch.strengths {
            self.strengths = strengths;
        }
        if let Some(improvements) = patch.improvements {
            self.improvements = improvements;
        }
    }
}

impl ApplicationDraft {
    /// Merge a partial record into its section. Last write wins.
    pub fn apply(&mut self, update: SectionUpdate) {
        match update {
            SectionUpdate::PersonalInfo(patch) => self.personal_info.apply(patch),
            SectionUpdate::ProfessionalBackground(patch) => {
                self.professional_background.apply(patch)
            }
            SectionUpdate::SampleReview(patch) => self.sample_review.apply(patch),
        }
    }

    pub fn list_len(&self, section: ListSection) -> usize {
        match section {
            ListSection::Skills => self.skills.len(),
            ListSection::Portfolio => self.portfolio.len(),
            ListSection::Education => self.credentials.education.len(),
            ListSection::Certifications => self.credentials.certifications.len(),
            ListSection::Employment => self.credentials.employment.len(),
            ListSection::References => self.references.len(),
        }
    }

    /// Append an entry unless its section is already at capacity.
    pub fn push_item(&mut self, item: ListItem) -> bool {
        let section = item.section();
        if let Some(max) = section.max_items() {
            if self.list_len(section) >= max {
                return false;
            }
        }

        match item {
            ListItem::Skill(entry) => self.skills.push(entry),
            ListItem::Portfolio(entry) => self.portfolio.push(entry),
            ListItem::Education(entry) => self.credentials.education.push(entry),
            ListItem::Certification(entry) => self.credentials.certifications.push(entry),
            ListItem::Employment(entry) => self.credentials.employment.push(entry),
            ListItem::Reference(entry) => self.references.push(entry),
        }
        true
    }

    pub fn remove_item(&mut self, section: ListSection, id: &EntryId) -> bool {
        match section {
            ListSection::Skills => remove_by_id(&mut self.skills, id),
            ListSection::Portfolio => remove_by_id(&mut self.portfolio, id),
            ListSection::Education => remove_by_id(&mut self.credentials.education, id),
            ListSection::Certifications => remove_by_id(&mut self.credentials.certifications, id),
            ListSection::Employment => remove_by_id(&mut self.credentials.employment, id),
            ListSection::References => remove_by_id(&mut self.references, id),
        }
    }

    /// Swap in a new version of an existing entry, matched by id.
    pub fn replace_item(&mut self, item: ListItem) -> bool {
        match item {
            ListItem::Skill(entry) => replace_by_id(&mut self.skills, entry),
            ListItem::Portfolio(entry) => replace_by_id(&mut self.portfolio, entry),
            ListItem::Education(entry) => replace_by_id(&mut self.credentials.education, entry),
            ListItem::Certification(entry) => {
                replace_by_id(&mut self.credentials.certifications, entry)
            }
            ListItem::Employment(entry) => replace_by_id(&mut self.credentials.employment, entry),
            ListItem::Reference(entry) => replace_by_id(&mut self.references, entry),
        }
    }
}
