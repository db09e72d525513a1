//! The onboarding form record and its merge semantics.
//!
//! One superset record backs every onboarding variant; which fields matter is
//! decided by the user type at validation time. Updates go through
//! [`FormPatch`], a top-level shallow merge: a patch that sets a nested
//! struct replaces that struct wholesale. Callers changing one nested field
//! should use the read-then-merge helpers on the store instead of building a
//! partial nested value by hand.

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The onboarding persona. Chosen once per session; decides which extended
/// fields and which validation rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Individual,
    Organization,
    Teacher,
}

impl UserType {
    pub const ALL: [UserType; 3] = [Self::Individual, Self::Organization, Self::Teacher];

    /// Card title shown on the type-selection step.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Individual => "Cultural Enthusiast",
            Self::Organization => "Cultural Organization",
            Self::Teacher => "Cultural Teacher",
        }
    }

    /// Card blurb shown under the title.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Individual => "Join events and connect with like-minded individuals",
            Self::Organization => "Host events and share your cultural heritage",
            Self::Teacher => "Share your knowledge and teach others",
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Individual => "individual",
            Self::Organization => "organization",
            Self::Teacher => "teacher",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: String,
}

/// Profile links. Empty string means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub instagram: String,
    pub twitter: String,
    pub linkedin: String,
    pub facebook: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub event_notifications: bool,
    pub newsletter_subscription: bool,
    pub private_profile: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            event_notifications: true,
            newsletter_subscription: true,
            private_profile: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub year: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub years: i32,
    pub certifications: Vec<Certification>,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub weekdays: bool,
    pub weekends: bool,
    pub evenings: bool,
    pub mornings: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub hourly_rate: Decimal,
    pub group_rate: Decimal,
    pub currency: String,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            hourly_rate: Decimal::ZERO,
            group_rate: Decimal::ZERO,
            currency: "USD".to_string(),
        }
    }
}

/// Organization category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgCategory {
    Nonprofit,
    Education,
    Business,
    Community,
}

impl OrgCategory {
    pub const ALL: [OrgCategory; 4] = [
        Self::Nonprofit,
        Self::Education,
        Self::Business,
        Self::Community,
    ];
}

impl std::fmt::Display for OrgCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Nonprofit => "nonprofit",
            Self::Education => "education",
            Self::Business => "business",
            Self::Community => "community",
        };
        write!(f, "{s}")
    }
}

/// Organization size bracket, named on the wire by its headcount range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrgSize {
    #[serde(rename = "1-10")]
    UpTo10,
    #[serde(rename = "11-50")]
    UpTo50,
    #[serde(rename = "51-200")]
    UpTo200,
    #[serde(rename = "201-500")]
    UpTo500,
    #[serde(rename = "500+")]
    Over500,
}

impl OrgSize {
    pub const ALL: [OrgSize; 5] = [
        Self::UpTo10,
        Self::UpTo50,
        Self::UpTo200,
        Self::UpTo500,
        Self::Over500,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::UpTo10 => "1-10",
            Self::UpTo50 => "11-50",
            Self::UpTo200 => "51-200",
            Self::UpTo500 => "201-500",
            Self::Over500 => "500+",
        }
    }
}

impl std::fmt::Display for OrgSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Everything onboarding can collect, across all personas. Unused fields
/// simply keep their defaults and are ignored by validation for the chosen
/// type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingForm {
    pub name: String,
    pub email: String,
    pub location: Location,
    pub bio: String,
    pub expertise: Vec<String>,
    pub organization: String,
    pub website: String,
    pub interests: Vec<String>,
    pub experience: Experience,
    pub teaching_style: Vec<String>,
    pub availability: Availability,
    pub pricing: Pricing,
    pub social_links: SocialLinks,
    pub preferences: Preferences,
    pub organization_type: Option<OrgCategory>,
    pub founded_year: i32,
    pub size: Option<OrgSize>,
    /// Optional; empty string means "not provided".
    pub tax_id: String,
}

impl Default for OnboardingForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            location: Location::default(),
            bio: String::new(),
            expertise: Vec::new(),
            organization: String::new(),
            website: String::new(),
            interests: Vec::new(),
            experience: Experience::default(),
            teaching_style: Vec::new(),
            availability: Availability::default(),
            pricing: Pricing::default(),
            social_links: SocialLinks::default(),
            preferences: Preferences::default(),
            organization_type: None,
            founded_year: Utc::now().year(),
            size: None,
            tax_id: String::new(),
        }
    }
}

/// A top-level partial update. `Some` replaces the whole field, nested
/// structs included; `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub location: Option<Location>,
    pub bio: Option<String>,
    pub expertise: Option<Vec<String>>,
    pub organization: Option<String>,
    pub website: Option<String>,
    pub interests: Option<Vec<String>>,
    pub experience: Option<Experience>,
    pub teaching_style: Option<Vec<String>>,
    pub availability: Option<Availability>,
    pub pricing: Option<Pricing>,
    pub social_links: Option<SocialLinks>,
    pub preferences: Option<Preferences>,
    pub organization_type: Option<Option<OrgCategory>>,
    pub founded_year: Option<i32>,
    pub size: Option<Option<OrgSize>>,
    pub tax_id: Option<String>,
}

impl OnboardingForm {
    /// Shallow-merge `patch` into the record.
    pub fn apply(&mut self, patch: FormPatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.email {
            self.email = v;
        }
        if let Some(v) = patch.location {
            self.location = v;
        }
        if let Some(v) = patch.bio {
            self.bio = v;
        }
        if let Some(v) = patch.expertise {
            self.expertise = v;
        }
        if let Some(v) = patch.organization {
            self.organization = v;
        }
        if let Some(v) = patch.website {
            self.website = v;
        }
        if let Some(v) = patch.interests {
            self.interests = v;
        }
        if let Some(v) = patch.experience {
            self.experience = v;
        }
        if let Some(v) = patch.teaching_style {
            self.teaching_style = v;
        }
        if let Some(v) = patch.availability {
            self.availability = v;
        }
        if let Some(v) = patch.pricing {
            self.pricing = v;
        }
        if let Some(v) = patch.social_links {
            self.social_links = v;
        }
        if let Some(v) = patch.preferences {
            self.preferences = v;
        }
        if let Some(v) = patch.organization_type {
            self.organization_type = v;
        }
        if let Some(v) = patch.founded_year {
            self.founded_year = v;
        }
        if let Some(v) = patch.size {
            self.size = v;
        }
        if let Some(v) = patch.tax_id {
            self.tax_id = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_match_the_blank_form() {
        let form = OnboardingForm::default();
        assert_eq!(form.name, "");
        assert_eq!(form.interests, Vec::<String>::new());
        assert!(form.preferences.event_notifications);
        assert!(form.preferences.newsletter_subscription);
        assert!(!form.preferences.private_profile);
        assert_eq!(form.pricing.currency, "USD");
        assert_eq!(form.pricing.hourly_rate, Decimal::ZERO);
        assert_eq!(form.founded_year, Utc::now().year());
        assert_eq!(form.organization_type, None);
        assert_eq!(form.size, None);
        assert!(!form.availability.weekdays);
    }

    #[test]
    fn merge_is_additive_across_patches() {
        let mut form = OnboardingForm::default();
        form.apply(FormPatch {
            name: Some("A".to_string()),
            ..Default::default()
        });
        form.apply(FormPatch {
            bio: Some("B".to_string()),
            ..Default::default()
        });
        assert_eq!(form.name, "A");
        assert_eq!(form.bio, "B");
    }

    #[test]
    fn nested_struct_is_replaced_wholesale() {
        let mut form = OnboardingForm::default();
        form.apply(FormPatch {
            pricing: Some(Pricing {
                hourly_rate: dec!(40),
                group_rate: dec!(25),
                currency: "USD".to_string(),
            }),
            ..Default::default()
        });

        // A later patch carrying a fresh Pricing drops the group rate the
        // caller forgot to copy over. That is the shallow-merge contract.
        form.apply(FormPatch {
            pricing: Some(Pricing {
                hourly_rate: dec!(50),
                ..Default::default()
            }),
            ..Default::default()
        });

        assert_eq!(form.pricing.hourly_rate, dec!(50));
        assert_eq!(form.pricing.group_rate, Decimal::ZERO);
    }

    #[test]
    fn none_fields_leave_values_untouched() {
        let mut form = OnboardingForm::default();
        form.apply(FormPatch {
            name: Some("Ayo".to_string()),
            interests: Some(vec!["dance".to_string()]),
            ..Default::default()
        });
        form.apply(FormPatch::default());
        assert_eq!(form.name, "Ayo");
        assert_eq!(form.interests, vec!["dance".to_string()]);
    }

    #[test]
    fn org_size_serializes_as_bracket_label() {
        for size in OrgSize::ALL {
            let json = serde_json::to_string(&size).unwrap();
            assert_eq!(json, format!("\"{}\"", size.label()));
        }
        assert_eq!(
            serde_json::from_str::<OrgSize>("\"500+\"").unwrap(),
            OrgSize::Over500
        );
    }

    #[test]
    fn user_type_display_matches_serde() {
        for user_type in UserType::ALL {
            let display = format!("{user_type}");
            let json = serde_json::to_string(&user_type).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }
}
