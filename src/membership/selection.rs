//! Membership selection — the landing-page handoff into onboarding.
//!
//! Selecting a plan stashes the choice in durable storage (so a reload or a
//! later onboarding page can recover it), mints an anonymous session for
//! free-tier visitors, and reports the selection to analytics. The caller
//! gets back the selection itself, to hand to the onboarding flow directly,
//! plus the route to navigate to; the stash is only the reload fallback.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analytics::{Analytics, AnalyticsEvent};
use crate::auth::AuthProvider;
use crate::error::{MembershipError, StorageError};
use crate::storage::StorageBackend;

use super::tier::MembershipTier;

/// Storage key the selection is stashed under.
pub const SELECTION_KEY: &str = "selectedMembership";

/// A stashed selection, timestamped so stale ones can be ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedMembership {
    pub tier: MembershipTier,
    pub selected_at: DateTime<Utc>,
}

/// Where the host should send the user after a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingRoute {
    Free,
    Paid,
}

impl OnboardingRoute {
    pub fn for_tier(tier: MembershipTier) -> Self {
        if tier.is_free() { Self::Free } else { Self::Paid }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::Free => "/onboarding/free-jawn",
            Self::Paid => "/onboarding/paid",
        }
    }
}

impl std::fmt::Display for OnboardingRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Durable stash for the selected tier.
///
/// Selections older than `max_age` are dropped on read, so an abandoned
/// choice from last week does not silently decide someone's tier.
#[derive(Clone)]
pub struct MembershipStash {
    storage: Arc<dyn StorageBackend>,
    max_age: Duration,
}

impl MembershipStash {
    pub fn new(storage: Arc<dyn StorageBackend>, max_age: Duration) -> Self {
        Self { storage, max_age }
    }

    pub fn save(&self, selection: &SelectedMembership) -> Result<(), StorageError> {
        let raw = serde_json::to_string(selection)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set(SELECTION_KEY, &raw)
    }

    /// Read the stashed selection. Expired or unreadable entries are cleared
    /// and reported as absent.
    pub fn load(&self) -> Result<Option<SelectedMembership>, StorageError> {
        let Some(raw) = self.storage.get(SELECTION_KEY)? else {
            return Ok(None);
        };

        let selection: SelectedMembership = match serde_json::from_str(&raw) {
            Ok(selection) => selection,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable membership stash");
                self.storage.remove(SELECTION_KEY)?;
                return Ok(None);
            }
        };

        // A future timestamp is clock skew; treat it as age zero.
        let age = (Utc::now() - selection.selected_at)
            .to_std()
            .unwrap_or_default();
        if age > self.max_age {
            self.storage.remove(SELECTION_KEY)?;
            return Ok(None);
        }

        Ok(Some(selection))
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(SELECTION_KEY)
    }
}

/// The landing-page selection flow.
pub struct MembershipFlow {
    stash: MembershipStash,
    auth: Arc<dyn AuthProvider>,
    analytics: Analytics,
}

impl MembershipFlow {
    pub fn new(stash: MembershipStash, auth: Arc<dyn AuthProvider>, analytics: Analytics) -> Self {
        Self {
            stash,
            auth,
            analytics,
        }
    }

    /// Handle a plan selection. `tier_id` is the raw id from the page (it may
    /// not name a real tier); `source` tags the analytics event with where
    /// the selection happened. Returns the selection for the host to pass
    /// into `OnboardingFlow::start` along with the route to navigate to.
    ///
    /// Any failure is reported as a `membership_selection_error` event before
    /// being returned.
    pub async fn select(
        &self,
        tier_id: &str,
        source: &str,
    ) -> Result<(SelectedMembership, OnboardingRoute), MembershipError> {
        match self.try_select(tier_id, source).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.analytics.track(AnalyticsEvent::MembershipSelectionError {
                    error: e.to_string(),
                    membership_tier: tier_id.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn try_select(
        &self,
        tier_id: &str,
        source: &str,
    ) -> Result<(SelectedMembership, OnboardingRoute), MembershipError> {
        let tier = MembershipTier::from_str(tier_id)?;

        self.analytics.track(AnalyticsEvent::MembershipSelected {
            membership_tier: tier,
            source: source.to_string(),
        });

        let selection = SelectedMembership {
            tier,
            selected_at: Utc::now(),
        };
        self.stash.save(&selection)?;

        if tier.is_free() {
            self.auth.sign_up_anonymous().await?;
        }

        let route = OnboardingRoute::for_tier(tier);
        Ok((selection, route))
    }
}
