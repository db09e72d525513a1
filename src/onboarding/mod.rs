//! Onboarding system — the multi-step profile flow.
//!
//! Onboarding is a short wizard between picking a membership and having a
//! usable profile. A [`StepPlan`] fixes the steps up front from the tier and
//! entry route, a [`FormStore`] accumulates the user's answers across steps,
//! and the final step validates the whole record and submits it atomically.

pub mod flow;
pub mod form;
pub mod store;
pub mod submit;
pub mod validate;

pub use flow::{FlowDeps, OnboardingFlow, OnboardingStep, StepOutcome, StepPlan};
pub use form::{
    Availability, Certification, Experience, FormPatch, Location, OnboardingForm, OrgCategory,
    OrgSize, Preferences, Pricing, SocialLinks, UserType,
};
pub use store::{FormStore, SubmissionStatus, SubmitTicket};
pub use submit::{ProfileSubmitter, SubmissionReceipt};
pub use validate::{ValidatedProfile, ValidationErrorSet, validate};
