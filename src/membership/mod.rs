//! Membership tiers, the plan catalog, and the landing-page selection flow.

pub mod catalog;
pub mod selection;
pub mod tier;

pub use catalog::{MembershipPlan, catalog};
pub use selection::{
    MembershipFlow, MembershipStash, OnboardingRoute, SELECTION_KEY, SelectedMembership,
};
pub use tier::MembershipTier;
