use std::sync::OnceLock;

use regex::Regex;

use super::super::domain::{
    Credentials, PersonalInfo, PortfolioItem, ProfessionalBackground, ReferenceEntry,
    SampleReviewFeedback, SkillEntry, MAX_PORTFOLIO_ITEMS, MAX_SKILLS, MIN_PORTFOLIO_ITEMS,
    MIN_SKILLS, REQUIRED_REFERENCES,
};
use super::{FieldError, StepValidation};

pub const MIN_NAME_CHARS: usize = 2;
pub const MAX_NAME_CHARS: usize = 100;
pub const MIN_SUMMARY_CHARS: usize = 50;
pub const MAX_SUMMARY_CHARS: usize = 2000;
pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const MIN_FEEDBACK_CHARS: usize = 20;
pub const MAX_FEEDBACK_CHARS: usize = 1000;
pub const MAX_YEARS_EXPERIENCE: u8 = 60;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\+?[0-9 ()\-]{7,20}$").expect("phone pattern compiles")
    })
}

fn is_email(value: &str) -> bool {
    email_pattern().is_match(value.trim())
}

fn is_http_url(value: &str) -> bool {
    let value = value.trim();
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.contains(char::is_whitespace))
}

fn char_count(value: &str) -> usize {
    value.trim().chars().count()
}

#[derive(Default)]
struct Findings(Vec<FieldError>);

impl Findings {
    fn reject(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    fn require(&mut self, field: &str, value: &str, label: &str) -> bool {
        if value.trim().is_empty() {
            self.reject(field, format!("{label} is required"));
            false
        } else {
            true
        }
    }

    fn length(&mut self, field: &str, value: &str, min: usize, max: usize, label: &str) {
        let count = char_count(value);
        if count < min {
            self.reject(field, format!("{label} must be at least {min} characters"));
        } else if count > max {
            self.reject(field, format!("{label} must be at most {max} characters"));
        }
    }

    fn finish(self) -> StepValidation {
        StepValidation::from_errors(self.0)
    }
}

pub fn validate_personal_info(info: &PersonalInfo) -> StepValidation {
    let mut findings = Findings::default();

    if findings.require("full_name", &info.full_name, "Full name") {
        findings.length(
            "full_name",
            &info.full_name,
            MIN_NAME_CHARS,
            MAX_NAME_CHARS,
            "Full name",
        );
    }

    if findings.require("email", &info.email, "Email") && !is_email(&info.email) {
        findings.reject("email", "Enter a valid email address");
    }

    findings.require("location", &info.location, "Location");

    if let Some(phone) = info.phone.as_deref().filter(|phone| !phone.trim().is_empty()) {
        if !phone_pattern().is_match(phone.trim()) {
            findings.reject("phone", "Enter a valid phone number");
        }
    }

    if let Some(url) = info
        .linkedin_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
    {
        if !is_http_url(url) {
            findings.reject("linkedin_url", "LinkedIn URL must start with http:// or https://");
        }
    }

    findings.finish()
}

pub fn validate_professional_background(background: &ProfessionalBackground) -> StepValidation {
    let mut findings = Findings::default();

    findings.require("current_title", &background.current_title, "Current title");

    if background.years_experience > MAX_YEARS_EXPERIENCE {
        findings.reject(
            "years_experience",
            format!("Years of experience must be at most {MAX_YEARS_EXPERIENCE}"),
        );
    }

    if background
        .industries
        .iter()
        .all(|industry| industry.trim().is_empty())
    {
        findings.reject("industries", "Select at least one industry");
    }

    findings.length(
        "summary",
        &background.summary,
        MIN_SUMMARY_CHARS,
        MAX_SUMMARY_CHARS,
        "Summary",
    );

    findings.finish()
}

pub fn validate_skills(skills: &[SkillEntry]) -> StepValidation {
    let mut findings = Findings::default();

    if skills.len() < MIN_SKILLS {
        findings.reject("skills", format!("Add at least {MIN_SKILLS} skill"));
    } else if skills.len() > MAX_SKILLS {
        findings.reject("skills", format!("Add at most {MAX_SKILLS} skills"));
    }

    for (index, skill) in skills.iter().enumerate() {
        findings.require(&format!("skills[{index}].name"), &skill.name, "Skill name");
        if skill.years > MAX_YEARS_EXPERIENCE {
            findings.reject(
                format!("skills[{index}].years"),
                format!("Years must be at most {MAX_YEARS_EXPERIENCE}"),
            );
        }
    }

    findings.finish()
}

pub fn validate_portfolio(items: &[PortfolioItem]) -> StepValidation {
    let mut findings = Findings::default();

    if items.len() < MIN_PORTFOLIO_ITEMS || items.len() > MAX_PORTFOLIO_ITEMS {
        findings.reject(
            "portfolio",
            format!("Provide between {MIN_PORTFOLIO_ITEMS} and {MAX_PORTFOLIO_ITEMS} portfolio items"),
        );
    }

    for (index, item) in items.iter().enumerate() {
        findings.require(&format!("portfolio[{index}].title"), &item.title, "Title");
        if !is_http_url(&item.url) {
            findings.reject(
                format!("portfolio[{index}].url"),
                "URL must start with http:// or https://",
            );
        }
        if char_count(&item.description) > MAX_DESCRIPTION_CHARS {
            findings.reject(
                format!("portfolio[{index}].description"),
                format!("Description must be at most {MAX_DESCRIPTION_CHARS} characters"),
            );
        }
    }

    findings.finish()
}

pub fn validate_credentials(credentials: &Credentials) -> StepValidation {
    let mut findings = Findings::default();

    if credentials.education.is_empty() && credentials.employment.is_empty() {
        findings.reject(
            "credentials",
            "Add at least one education or employment entry",
        );
    }

    for (index, entry) in credentials.education.iter().enumerate() {
        findings.require(
            &format!("education[{index}].institution"),
            &entry.institution,
            "Institution",
        );
        findings.require(&format!("education[{index}].degree"), &entry.degree, "Degree");
    }

    for (index, entry) in credentials.certifications.iter().enumerate() {
        findings.require(
            &format!("certifications[{index}].name"),
            &entry.name,
            "Certification name",
        );
        findings.require(
            &format!("certifications[{index}].issuer"),
            &entry.issuer,
            "Issuer",
        );
    }

    for (index, entry) in credentials.employment.iter().enumerate() {
        findings.require(
            &format!("employment[{index}].company"),
            &entry.company,
            "Company",
        );
        findings.require(&format!("employment[{index}].title"), &entry.title, "Title");
        if matches!(entry.end_year, Some(end) if end < entry.start_year) {
            findings.reject(
                format!("employment[{index}].end_year"),
                "End year cannot be before start year",
            );
        }
    }

    findings.finish()
}

pub fn validate_references(references: &[ReferenceEntry], applicant_email: &str) -> StepValidation {
    let mut findings = Findings::default();

    if references.len() != REQUIRED_REFERENCES {
        findings.reject(
            "references",
            format!("Provide exactly {REQUIRED_REFERENCES} references"),
        );
    }

    let applicant_email = applicant_email.trim();
    for (index, reference) in references.iter().enumerate() {
        findings.require(&format!("references[{index}].name"), &reference.name, "Name");
        findings.require(
            &format!("references[{index}].relationship"),
            &reference.relationship,
            "Relationship",
        );

        let field = format!("references[{index}].email");
        if !is_email(&reference.email) {
            findings.reject(field, "Enter a valid email address");
        } else if !applicant_email.is_empty()
            && reference.email.trim().eq_ignore_ascii_case(applicant_email)
        {
            findings.reject(field, "A reference cannot use your own email address");
        }
    }

    findings.finish()
}

pub fn validate_sample_review(feedback: &SampleReviewFeedback) -> StepValidation {
    let mut findings = Findings::default();

    match feedback.rating {
        Some(1..=5) => {}
        Some(_) => findings.reject("rating", "Rating must be between 1 and 5"),
        None => findings.reject("rating", "Rating is required"),
    }

    findings.length(
        "strengths",
        &feedback.strengths,
        MIN_FEEDBACK_CHARS,
        MAX_FEEDBACK_CHARS,
        "Strengths",
    );
    findings.length(
        "improvements",
        &feedback.improvements,
        MIN_FEEDBACK_CHARS,
        MAX_FEEDBACK_CHARS,
        "Improvements",
    );

    findings.finish()
}
