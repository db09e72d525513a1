//! Terminal profile submission.
//!
//! Submission demands an already-validated profile, acquires the store's
//! submission latch before anything else, and performs exactly one backend
//! write. Precondition failures (no signed-in user, no membership selected)
//! resolve the latch without touching the backend; the outcome always lands
//! in the store's status as well as the returned `Result`.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::analytics::{Analytics, AnalyticsEvent};
use crate::auth::AuthProvider;
use crate::backend::{ProfileBackend, ProfileDetails, ProfileUpdate};
use crate::error::SubmitError;
use crate::membership::MembershipTier;
use crate::onboarding::form::{OrgCategory, OrgSize, UserType};
use crate::onboarding::store::FormStore;
use crate::onboarding::validate::ValidatedProfile;

/// Proof of a completed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub user_id: String,
    pub membership_tier: MembershipTier,
    pub submitted_at: DateTime<Utc>,
}

pub struct ProfileSubmitter {
    auth: Arc<dyn AuthProvider>,
    backend: Arc<dyn ProfileBackend>,
    analytics: Analytics,
}

impl ProfileSubmitter {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        backend: Arc<dyn ProfileBackend>,
        analytics: Analytics,
    ) -> Self {
        Self {
            auth,
            backend,
            analytics,
        }
    }

    /// Persist the validated profile under the selected tier.
    ///
    /// Exactly one submission runs at a time per store; a second call while
    /// one is in flight returns [`SubmitError::AlreadyInFlight`] without
    /// touching the latch the first call holds.
    pub async fn submit(
        &self,
        store: &FormStore,
        profile: &ValidatedProfile,
        selection: Option<MembershipTier>,
    ) -> Result<SubmissionReceipt, SubmitError> {
        let Some(ticket) = store.begin_submission() else {
            return Err(SubmitError::AlreadyInFlight);
        };

        let Some(user) = self.auth.current_user() else {
            let err = SubmitError::NoUser;
            ticket.fail(err.to_string());
            return Err(err);
        };

        let Some(tier) = selection else {
            let err = SubmitError::NoMembershipSelected;
            ticket.fail(err.to_string());
            return Err(err);
        };

        let submitted_at = Utc::now();
        let update = build_update(profile, tier, submitted_at);

        match self.backend.update_user(&user.id, update).await {
            Ok(()) => {
                ticket.succeed();
                self.analytics.track(AnalyticsEvent::OnboardingCompleted {
                    membership_tier: tier,
                    user_id: user.id.clone(),
                });
                Ok(SubmissionReceipt {
                    user_id: user.id,
                    membership_tier: tier,
                    submitted_at,
                })
            }
            Err(e) => {
                ticket.fail(e.to_string());
                Err(SubmitError::Backend(e))
            }
        }
    }
}

fn build_update(
    profile: &ValidatedProfile,
    tier: MembershipTier,
    updated_at: DateTime<Utc>,
) -> ProfileUpdate {
    let form = profile.form();

    let details = match profile.user_type() {
        UserType::Individual => ProfileDetails::Individual,
        UserType::Organization => ProfileDetails::Organization {
            organization: form.organization.clone(),
            website: form.website.clone(),
            // Validation guarantees these are set for organizations.
            organization_type: form.organization_type.unwrap_or(OrgCategory::Community),
            founded_year: form.founded_year,
            size: form.size.unwrap_or(OrgSize::UpTo10),
            tax_id: if form.tax_id.is_empty() {
                None
            } else {
                Some(form.tax_id.clone())
            },
        },
        UserType::Teacher => ProfileDetails::Teacher {
            expertise: form.expertise.clone(),
            experience: form.experience.clone(),
            teaching_style: form.teaching_style.clone(),
            availability: form.availability,
            pricing: form.pricing.clone(),
        },
    };

    ProfileUpdate {
        name: form.name.clone(),
        email: form.email.clone(),
        location: form.location.clone(),
        bio: form.bio.clone(),
        membership_tier: tier,
        interests: form.interests.clone(),
        social_links: form.social_links.clone(),
        preferences: form.preferences,
        details,
        updated_at,
    }
}
