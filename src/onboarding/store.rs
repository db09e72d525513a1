//! In-progress form state plus submission status.
//!
//! The store is the single place the flow reads and writes form answers.
//! Submission status doubles as a mutual-exclusion latch: whoever holds the
//! [`SubmitTicket`] owns the in-flight submission, and a second acquisition
//! attempt fails until the first resolves. The ticket only holds a weak
//! reference back to the store, so a submission that outlives its flow (the
//! user walked away mid-call) resolves into nothing instead of poking a
//! torn-down store.

use std::sync::{Arc, RwLock, Weak};

use super::form::{
    Availability, Experience, FormPatch, Location, OnboardingForm, Preferences, Pricing,
    SocialLinks,
};

/// Submission lifecycle: `Idle -> Submitting -> (Idle | Failed)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    Idle,
    Submitting,
    /// Last attempt failed; the message is shown to the user verbatim.
    Failed(String),
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        Self::Idle
    }
}

#[derive(Debug, Default)]
struct StoreState {
    form: OnboardingForm,
    status: SubmissionStatus,
}

/// Shared handle to the in-progress onboarding record.
#[derive(Clone, Default)]
pub struct FormStore {
    inner: Arc<RwLock<StoreState>>,
}

impl FormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the current record.
    pub fn snapshot(&self) -> OnboardingForm {
        self.inner.read().expect("form store lock poisoned").form.clone()
    }

    /// Shallow-merge a patch into the record. `Some` fields replace their
    /// target wholesale, nested structs included.
    pub fn update(&self, patch: FormPatch) {
        let mut state = self.inner.write().expect("form store lock poisoned");
        state.form.apply(patch);
    }

    pub fn status(&self) -> SubmissionStatus {
        self.inner.read().expect("form store lock poisoned").status.clone()
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.status(), SubmissionStatus::Submitting)
    }

    /// Message from the last failed attempt, if that is the current state.
    pub fn last_error(&self) -> Option<String> {
        match self.status() {
            SubmissionStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Record a failure outside the submission path (e.g. a precondition
    /// rejected before a ticket was ever acquired).
    pub fn set_error(&self, message: impl Into<String>) {
        let mut state = self.inner.write().expect("form store lock poisoned");
        state.status = SubmissionStatus::Failed(message.into());
    }

    /// Acquire the submission latch. Returns `None` if a submission is
    /// already in flight. Acquisition clears any previous failure.
    pub fn begin_submission(&self) -> Option<SubmitTicket> {
        let mut state = self.inner.write().expect("form store lock poisoned");
        if state.status == SubmissionStatus::Submitting {
            return None;
        }
        state.status = SubmissionStatus::Submitting;
        Some(SubmitTicket {
            state: Arc::downgrade(&self.inner),
            released: false,
        })
    }

    // Read-then-merge helpers for nested structs, so changing one nested
    // field cannot silently drop its siblings.

    pub fn update_location(&self, f: impl FnOnce(&mut Location)) {
        let mut state = self.inner.write().expect("form store lock poisoned");
        f(&mut state.form.location);
    }

    pub fn update_pricing(&self, f: impl FnOnce(&mut Pricing)) {
        let mut state = self.inner.write().expect("form store lock poisoned");
        f(&mut state.form.pricing);
    }

    pub fn update_preferences(&self, f: impl FnOnce(&mut Preferences)) {
        let mut state = self.inner.write().expect("form store lock poisoned");
        f(&mut state.form.preferences);
    }

    pub fn update_social_links(&self, f: impl FnOnce(&mut SocialLinks)) {
        let mut state = self.inner.write().expect("form store lock poisoned");
        f(&mut state.form.social_links);
    }

    pub fn update_experience(&self, f: impl FnOnce(&mut Experience)) {
        let mut state = self.inner.write().expect("form store lock poisoned");
        f(&mut state.form.experience);
    }

    pub fn update_availability(&self, f: impl FnOnce(&mut Availability)) {
        let mut state = self.inner.write().expect("form store lock poisoned");
        f(&mut state.form.availability);
    }
}

/// Exclusive hold on an in-flight submission. Resolve it with [`succeed`]
/// or [`fail`]; dropping it unresolved (an abandoned call) releases the
/// latch without recording anything.
///
/// [`succeed`]: SubmitTicket::succeed
/// [`fail`]: SubmitTicket::fail
#[must_use = "dropping the ticket releases the submission latch"]
pub struct SubmitTicket {
    state: Weak<RwLock<StoreState>>,
    released: bool,
}

impl SubmitTicket {
    pub fn succeed(mut self) {
        self.resolve(SubmissionStatus::Idle);
    }

    pub fn fail(mut self, message: impl Into<String>) {
        self.resolve(SubmissionStatus::Failed(message.into()));
    }

    fn resolve(&mut self, status: SubmissionStatus) {
        self.released = true;
        if let Some(state) = self.state.upgrade() {
            state.write().expect("form store lock poisoned").status = status;
        }
    }
}

impl Drop for SubmitTicket {
    fn drop(&mut self) {
        if !self.released {
            self.resolve(SubmissionStatus::Idle);
        }
    }
}
