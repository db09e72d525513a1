//! Profile persistence service.
//!
//! One operation matters to this client: update the stored user record by
//! id. The update is a single atomic write of the complete onboarding
//! record — common fields at the top level, persona-specific fields
//! flattened in beside a `user_type` tag.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::membership::MembershipTier;
use crate::onboarding::form::{
    Availability, Experience, Location, OrgCategory, OrgSize, Preferences, Pricing, SocialLinks,
};

/// Persona-specific slice of a profile write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "user_type", rename_all = "snake_case")]
pub enum ProfileDetails {
    Individual,
    Organization {
        organization: String,
        website: String,
        organization_type: OrgCategory,
        founded_year: i32,
        size: OrgSize,
        #[serde(skip_serializing_if = "Option::is_none")]
        tax_id: Option<String>,
    },
    Teacher {
        expertise: Vec<String>,
        experience: Experience,
        teaching_style: Vec<String>,
        availability: Availability,
        pricing: Pricing,
    },
}

/// The complete profile write sent on onboarding completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub location: Location,
    pub bio: String,
    pub membership_tier: MembershipTier,
    pub interests: Vec<String>,
    pub social_links: SocialLinks,
    pub preferences: Preferences,
    #[serde(flatten)]
    pub details: ProfileDetails,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ProfileBackend: Send + Sync {
    /// Atomically replace the stored profile fields for `user_id`.
    async fn update_user(&self, user_id: &str, update: ProfileUpdate) -> Result<(), BackendError>;
}

/// HTTP backend: `PATCH {base_url}/users/{id}` with the update as JSON.
pub struct RestBackend {
    base_url: String,
    client: reqwest::Client,
}

impl RestBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn user_url(&self, user_id: &str) -> String {
        format!("{}/users/{user_id}", self.base_url)
    }
}

#[async_trait]
impl ProfileBackend for RestBackend {
    async fn update_user(&self, user_id: &str, update: ProfileUpdate) -> Result<(), BackendError> {
        let response = self
            .client
            .patch(self.user_url(user_id))
            .json(&update)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            format!("Profile update failed with status {status}")
        } else {
            body
        };
        Err(BackendError::Request { status, message })
    }
}

/// In-memory backend for tests and demos. Records every applied update so
/// callers can assert on what was persisted and how many times.
#[derive(Default)]
pub struct MemoryBackend {
    profiles: Mutex<HashMap<String, ProfileUpdate>>,
    updates: AtomicUsize,
    fail_with: Option<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose updates always fail with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Default::default()
        }
    }

    /// Number of updates applied so far.
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn profile(&self, user_id: &str) -> Option<ProfileUpdate> {
        self.profiles
            .lock()
            .expect("backend lock poisoned")
            .get(user_id)
            .cloned()
    }
}

#[async_trait]
impl ProfileBackend for MemoryBackend {
    async fn update_user(&self, user_id: &str, update: ProfileUpdate) -> Result<(), BackendError> {
        if let Some(message) = &self.fail_with {
            return Err(BackendError::Request {
                status: 500,
                message: message.clone(),
            });
        }

        self.updates.fetch_add(1, Ordering::SeqCst);
        self.profiles
            .lock()
            .expect("backend lock poisoned")
            .insert(user_id.to_string(), update);
        Ok(())
    }
}
