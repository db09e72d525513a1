//! Per-type validation of the onboarding form.
//!
//! Rules are pure functions of the candidate record (plus the current year
//! for the founding-year bound). Expected-invalid input never errors out of
//! band: every violated field accumulates its messages in a
//! [`ValidationErrorSet`] and the caller decides what to do with it.

use std::collections::BTreeMap;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::form::{OnboardingForm, UserType};

/// Field path → violation messages, ordered by path. Paths are dot-delimited
/// for nested fields, e.g. `location.city` or `pricing.hourly_rate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorSet {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(path.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with at least one violation.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// All messages for one field, empty if the field passed.
    pub fn field(&self, path: &str) -> &[String] {
        self.errors.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First message for one field — what an inline form error would show.
    pub fn first(&self, path: &str) -> Option<&str> {
        self.field(path).first().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn merge(&mut self, other: ValidationErrorSet) {
        for (path, messages) in other.errors {
            self.errors.entry(path).or_default().extend(messages);
        }
    }

    fn into_result(self) -> Result<(), ValidationErrorSet> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} field(s) failed validation", self.errors.len())
    }
}

/// A form that passed the full schema for its user type. Only obtainable
/// through [`validate`], so submission can demand one and skip re-checking.
#[derive(Debug, Clone)]
pub struct ValidatedProfile {
    user_type: UserType,
    form: OnboardingForm,
}

impl ValidatedProfile {
    pub fn user_type(&self) -> UserType {
        self.user_type
    }

    pub fn form(&self) -> &OnboardingForm {
        &self.form
    }
}

/// Validate the whole record against the schema for `user_type`.
pub fn validate(
    user_type: UserType,
    form: &OnboardingForm,
) -> Result<ValidatedProfile, ValidationErrorSet> {
    let mut errors = ValidationErrorSet::new();

    common_rules(form, &mut errors);
    bio_rule(user_type, form, &mut errors);
    interests_rule(form, &mut errors);
    match user_type {
        UserType::Individual => individual_rules(form, &mut errors),
        UserType::Organization => organization_rules(form, &mut errors),
        UserType::Teacher => teacher_rules(form, &mut errors),
    }

    errors.into_result().map(|()| ValidatedProfile {
        user_type,
        form: form.clone(),
    })
}

/// The type-selection step passes once a type is chosen.
pub fn check_type_chosen(user_type: Option<UserType>) -> ValidationErrorSet {
    let mut errors = ValidationErrorSet::new();
    if user_type.is_none() {
        errors.push("user_type", "Select a user type");
    }
    errors
}

/// Name, email, and location — the basic-info step.
pub fn check_basic_info(form: &OnboardingForm) -> ValidationErrorSet {
    let mut errors = ValidationErrorSet::new();
    common_rules(form, &mut errors);
    errors
}

/// The bio on its own, with the per-type minimum. Short flows collect the
/// bio on the basic-info step; flows with a details step collect it there.
pub fn check_bio(user_type: UserType, form: &OnboardingForm) -> ValidationErrorSet {
    let mut errors = ValidationErrorSet::new();
    bio_rule(user_type, form, &mut errors);
    errors
}

/// The type-specific details step.
pub fn check_details(user_type: UserType, form: &OnboardingForm) -> ValidationErrorSet {
    let mut errors = ValidationErrorSet::new();
    bio_rule(user_type, form, &mut errors);
    match user_type {
        UserType::Individual => individual_rules(form, &mut errors),
        UserType::Organization => organization_rules(form, &mut errors),
        UserType::Teacher => teacher_rules(form, &mut errors),
    }
    errors
}

/// The interests step.
pub fn check_interests(form: &OnboardingForm) -> ValidationErrorSet {
    let mut errors = ValidationErrorSet::new();
    interests_rule(form, &mut errors);
    errors
}

fn common_rules(form: &OnboardingForm, errors: &mut ValidationErrorSet) {
    if form.name.chars().count() < 2 {
        errors.push("name", "Name must be at least 2 characters");
    }
    if !validator::validate_email(&form.email) {
        errors.push("email", "Invalid email address");
    }
    if form.location.city.is_empty() {
        errors.push("location.city", "City is required");
    }
    if form.location.state.is_empty() {
        errors.push("location.state", "State is required");
    }
    if form.location.country.is_empty() {
        errors.push("location.country", "Country is required");
    }
}

fn bio_rule(user_type: UserType, form: &OnboardingForm, errors: &mut ValidationErrorSet) {
    let length = form.bio.chars().count();
    match user_type {
        UserType::Individual => {
            if length < 50 {
                errors.push("bio", "Bio must be at least 50 characters");
            }
        }
        UserType::Organization => {
            if length < 100 {
                errors.push("bio", "Description must be at least 100 characters");
            }
        }
        UserType::Teacher => {
            if length < 100 {
                errors.push("bio", "Bio must be at least 100 characters");
            }
        }
    }
}

fn interests_rule(form: &OnboardingForm, errors: &mut ValidationErrorSet) {
    if form.interests.len() < 2 {
        errors.push("interests", "Select at least 2 interests");
    }
}

fn link_rule(path: &str, value: &str, errors: &mut ValidationErrorSet) {
    if !value.is_empty() && !validator::validate_url(value) {
        errors.push(path, "Invalid URL");
    }
}

fn individual_rules(form: &OnboardingForm, errors: &mut ValidationErrorSet) {
    link_rule("social_links.instagram", &form.social_links.instagram, errors);
    link_rule("social_links.twitter", &form.social_links.twitter, errors);
    link_rule("social_links.linkedin", &form.social_links.linkedin, errors);
}

fn organization_rules(form: &OnboardingForm, errors: &mut ValidationErrorSet) {
    if form.organization.chars().count() < 2 {
        errors.push("organization", "Organization name is required");
    }
    if !validator::validate_url(&form.website) {
        errors.push("website", "Invalid website URL");
    }
    if form.organization_type.is_none() {
        errors.push("organization_type", "Select an organization type");
    }
    if form.founded_year < 1800 {
        errors.push("founded_year", "Founded year must be 1800 or later");
    }
    // Current year is read at call time, never cached.
    if form.founded_year > Utc::now().year() {
        errors.push("founded_year", "Founded year cannot be in the future");
    }
    if form.size.is_none() {
        errors.push("size", "Select an organization size");
    }
    link_rule("social_links.facebook", &form.social_links.facebook, errors);
    link_rule("social_links.instagram", &form.social_links.instagram, errors);
    link_rule("social_links.linkedin", &form.social_links.linkedin, errors);
}

fn teacher_rules(form: &OnboardingForm, errors: &mut ValidationErrorSet) {
    if form.expertise.is_empty() {
        errors.push("expertise", "Select at least one area of expertise");
    }
    if form.experience.years < 0 {
        errors.push("experience.years", "Invalid years of experience");
    }
    if form.experience.languages.is_empty() {
        errors.push("experience.languages", "Select at least one language");
    }
    if form.teaching_style.is_empty() {
        errors.push("teaching_style", "Select at least one teaching style");
    }
    if form.pricing.hourly_rate < Decimal::ZERO {
        errors.push("pricing.hourly_rate", "Invalid hourly rate");
    }
    if form.pricing.group_rate < Decimal::ZERO {
        errors.push("pricing.group_rate", "Invalid group rate");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::form::{
        Certification, Experience, Location, OrgCategory, OrgSize, Pricing,
    };
    use rust_decimal_macros::dec;

    fn valid_individual() -> OnboardingForm {
        OnboardingForm {
            name: "Amara Okafor".to_string(),
            email: "amara@example.com".to_string(),
            location: Location {
                city: "Philadelphia".to_string(),
                state: "PA".to_string(),
                country: "USA".to_string(),
            },
            bio: "Lifelong dancer and drummer exploring diaspora traditions across the city."
                .to_string(),
            interests: vec!["dance".to_string(), "drumming".to_string()],
            ..Default::default()
        }
    }

    fn valid_organization() -> OnboardingForm {
        OnboardingForm {
            organization: "Odunde Cultural Center".to_string(),
            website: "https://odunde.example.org".to_string(),
            bio: "A neighborhood cultural center hosting festivals, workshops, and youth \
                  programs that celebrate African diaspora heritage year round."
                .to_string(),
            organization_type: Some(OrgCategory::Nonprofit),
            founded_year: 1985,
            size: Some(OrgSize::UpTo50),
            ..valid_individual()
        }
    }

    fn valid_teacher() -> OnboardingForm {
        OnboardingForm {
            expertise: vec!["west african drumming".to_string()],
            bio: "Teaching drumming for fifteen years, from first lessons to performance \
                  ensembles, with a focus on rhythm as a shared language between students."
                .to_string(),
            experience: Experience {
                years: 15,
                certifications: vec![Certification {
                    name: "West African Percussion Pedagogy".to_string(),
                    issuer: "Philadelphia Folklore Project".to_string(),
                    year: 2014,
                }],
                languages: vec!["English".to_string()],
            },
            teaching_style: vec!["hands-on".to_string()],
            pricing: Pricing {
                hourly_rate: dec!(40),
                group_rate: dec!(25),
                currency: "USD".to_string(),
            },
            ..valid_individual()
        }
    }

    #[test]
    fn valid_candidates_pass_for_each_type() {
        assert!(validate(UserType::Individual, &valid_individual()).is_ok());
        assert!(validate(UserType::Organization, &valid_organization()).is_ok());
        assert!(validate(UserType::Teacher, &valid_teacher()).is_ok());
    }

    #[test]
    fn validated_profile_carries_type_and_form() {
        let form = valid_individual();
        let profile = validate(UserType::Individual, &form).unwrap();
        assert_eq!(profile.user_type(), UserType::Individual);
        assert_eq!(profile.form().name, "Amara Okafor");
    }

    #[test]
    fn short_name_and_bad_email() {
        let form = OnboardingForm {
            name: "A".to_string(),
            email: "not-an-email".to_string(),
            ..valid_individual()
        };
        let errors = validate(UserType::Individual, &form).unwrap_err();
        assert_eq!(
            errors.first("name"),
            Some("Name must be at least 2 characters")
        );
        assert_eq!(errors.first("email"), Some("Invalid email address"));
    }

    #[test]
    fn location_fields_are_each_required() {
        let form = OnboardingForm {
            location: Location::default(),
            ..valid_individual()
        };
        let errors = validate(UserType::Individual, &form).unwrap_err();
        assert_eq!(errors.first("location.city"), Some("City is required"));
        assert_eq!(errors.first("location.state"), Some("State is required"));
        assert_eq!(
            errors.first("location.country"),
            Some("Country is required")
        );
    }

    #[test]
    fn bio_minimum_varies_by_type() {
        let short_bio = OnboardingForm {
            bio: "Too short".to_string(),
            ..valid_individual()
        };
        let errors = validate(UserType::Individual, &short_bio).unwrap_err();
        assert_eq!(
            errors.first("bio"),
            Some("Bio must be at least 50 characters")
        );

        let org = OnboardingForm {
            bio: "Fifty characters is fine for a person, not an org.".to_string(),
            ..valid_organization()
        };
        let errors = validate(UserType::Organization, &org).unwrap_err();
        assert_eq!(
            errors.first("bio"),
            Some("Description must be at least 100 characters")
        );

        let teacher = OnboardingForm {
            bio: "Fifty characters is fine for a person, not for me.".to_string(),
            ..valid_teacher()
        };
        let errors = validate(UserType::Teacher, &teacher).unwrap_err();
        assert_eq!(
            errors.first("bio"),
            Some("Bio must be at least 100 characters")
        );
    }

    #[test]
    fn one_interest_is_not_enough() {
        let form = OnboardingForm {
            interests: vec!["dance".to_string()],
            ..valid_individual()
        };
        let errors = validate(UserType::Individual, &form).unwrap_err();
        assert_eq!(errors.first("interests"), Some("Select at least 2 interests"));
    }

    #[test]
    fn founded_year_bounds() {
        let too_old = OnboardingForm {
            founded_year: 1750,
            ..valid_organization()
        };
        let errors = validate(UserType::Organization, &too_old).unwrap_err();
        assert_eq!(
            errors.first("founded_year"),
            Some("Founded year must be 1800 or later")
        );

        let future = OnboardingForm {
            founded_year: Utc::now().year() + 1,
            ..valid_organization()
        };
        let errors = validate(UserType::Organization, &future).unwrap_err();
        assert_eq!(
            errors.first("founded_year"),
            Some("Founded year cannot be in the future")
        );

        let this_year = OnboardingForm {
            founded_year: Utc::now().year(),
            ..valid_organization()
        };
        assert!(validate(UserType::Organization, &this_year).is_ok());
    }

    #[test]
    fn negative_hourly_rate_flags_that_field_only() {
        let form = OnboardingForm {
            pricing: Pricing {
                hourly_rate: dec!(-5),
                group_rate: dec!(10),
                currency: "USD".to_string(),
            },
            ..valid_teacher()
        };
        let errors = validate(UserType::Teacher, &form).unwrap_err();
        assert_eq!(errors.first("pricing.hourly_rate"), Some("Invalid hourly rate"));
        assert!(errors.field("pricing.group_rate").is_empty());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn teacher_requires_expertise_languages_and_style() {
        let form = OnboardingForm {
            expertise: Vec::new(),
            experience: Experience {
                years: 3,
                certifications: Vec::new(),
                languages: Vec::new(),
            },
            teaching_style: Vec::new(),
            ..valid_teacher()
        };
        let errors = validate(UserType::Teacher, &form).unwrap_err();
        assert_eq!(
            errors.first("expertise"),
            Some("Select at least one area of expertise")
        );
        assert_eq!(
            errors.first("experience.languages"),
            Some("Select at least one language")
        );
        assert_eq!(
            errors.first("teaching_style"),
            Some("Select at least one teaching style")
        );
    }

    #[test]
    fn organization_requires_category_and_size() {
        let form = OnboardingForm {
            organization_type: None,
            size: None,
            ..valid_organization()
        };
        let errors = validate(UserType::Organization, &form).unwrap_err();
        assert_eq!(
            errors.first("organization_type"),
            Some("Select an organization type")
        );
        assert_eq!(errors.first("size"), Some("Select an organization size"));
    }

    #[test]
    fn social_links_must_be_urls_when_present() {
        let mut form = valid_individual();
        form.social_links.instagram = "not a url".to_string();
        let errors = validate(UserType::Individual, &form).unwrap_err();
        assert_eq!(errors.first("social_links.instagram"), Some("Invalid URL"));

        // Facebook is not part of the individual schema.
        let mut form = valid_individual();
        form.social_links.facebook = "not a url".to_string();
        assert!(validate(UserType::Individual, &form).is_ok());

        // It is part of the organization schema.
        let mut form = valid_organization();
        form.social_links.facebook = "not a url".to_string();
        let errors = validate(UserType::Organization, &form).unwrap_err();
        assert_eq!(errors.first("social_links.facebook"), Some("Invalid URL"));
    }

    #[test]
    fn empty_links_are_fine() {
        let form = valid_individual();
        assert_eq!(form.social_links.instagram, "");
        assert!(validate(UserType::Individual, &form).is_ok());
    }

    #[test]
    fn step_checks_cover_their_fields() {
        let blank = OnboardingForm::default();

        let errors = check_type_chosen(None);
        assert_eq!(errors.first("user_type"), Some("Select a user type"));
        assert!(check_type_chosen(Some(UserType::Individual)).is_empty());

        let errors = check_basic_info(&blank);
        assert!(!errors.field("name").is_empty());
        assert!(errors.field("bio").is_empty(), "basic info leaves bio alone");

        let errors = check_bio(UserType::Individual, &blank);
        assert_eq!(errors.len(), 1);

        let errors = check_details(UserType::Teacher, &blank);
        assert!(!errors.field("expertise").is_empty());
        assert!(errors.field("name").is_empty(), "details leave basics alone");

        let errors = check_interests(&blank);
        assert_eq!(errors.first("interests"), Some("Select at least 2 interests"));
    }

    #[test]
    fn error_set_accumulates_and_merges() {
        let mut a = ValidationErrorSet::new();
        a.push("bio", "first");
        let mut b = ValidationErrorSet::new();
        b.push("bio", "second");
        b.push("name", "third");

        a.merge(b);
        assert_eq!(a.field("bio"), ["first", "second"]);
        assert_eq!(a.first("name"), Some("third"));
        assert_eq!(a.len(), 2);
    }
}
