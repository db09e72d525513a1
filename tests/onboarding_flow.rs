//! Integration tests for the membership → onboarding → submission pipeline.
//!
//! Each test wires the real flow against in-memory collaborators: no network,
//! no disk. The gated backend stub lets a test hold a submission open to
//! exercise the double-submit latch.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};
use tokio::time::timeout;

use sondae::analytics::{Analytics, MemorySink};
use sondae::auth::{AuthProvider, AuthUser, MemoryAuth};
use sondae::backend::{MemoryBackend, ProfileBackend, ProfileUpdate};
use sondae::error::{BackendError, MembershipError, SubmitError};
use sondae::membership::{
    MembershipFlow, MembershipStash, MembershipTier, OnboardingRoute, SELECTION_KEY,
};
use sondae::onboarding::{
    FlowDeps, FormPatch, FormStore, Location, OnboardingFlow, OnboardingStep, ProfileSubmitter,
    StepOutcome, UserType, validate,
};
use sondae::storage::{MemoryStorage, StorageBackend};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Backend stub that parks every call until the test releases the gate.
struct GatedBackend {
    calls: AtomicUsize,
    entered: Notify,
    gate: Semaphore,
}

impl GatedBackend {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            gate: Semaphore::new(0),
        }
    }
}

#[async_trait]
impl ProfileBackend for GatedBackend {
    async fn update_user(
        &self,
        _user_id: &str,
        _update: ProfileUpdate,
    ) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Ok(())
    }
}

fn signed_in_auth(id: &str) -> Arc<MemoryAuth> {
    let auth = Arc::new(MemoryAuth::new());
    auth.sign_in(AuthUser {
        id: id.to_string(),
        email: Some(format!("{id}@example.com")),
    });
    auth
}

fn basic_info_patch() -> FormPatch {
    FormPatch {
        name: Some("Amara Okafor".to_string()),
        email: Some("amara@example.com".to_string()),
        location: Some(Location {
            city: "Philadelphia".to_string(),
            state: "PA".to_string(),
            country: "USA".to_string(),
        }),
        ..Default::default()
    }
}

fn bio_patch() -> FormPatch {
    FormPatch {
        bio: Some(
            "Lifelong dancer and drummer exploring diaspora traditions across the city."
                .to_string(),
        ),
        ..Default::default()
    }
}

fn interests_patch() -> FormPatch {
    FormPatch {
        interests: Some(vec!["dance".to_string(), "drumming".to_string()]),
        ..Default::default()
    }
}

#[tokio::test]
async fn free_membership_end_to_end() {
    let storage = Arc::new(MemoryStorage::new());
    let sink = Arc::new(MemorySink::new());
    let analytics = Analytics::new(sink.clone());
    let auth: Arc<dyn AuthProvider> = Arc::new(MemoryAuth::new());
    let backend = Arc::new(MemoryBackend::new());
    let stash = MembershipStash::new(storage.clone(), Duration::from_secs(3600));

    // Landing page: pick the free tier. That stashes the selection and
    // mints an anonymous session.
    let membership = MembershipFlow::new(stash.clone(), Arc::clone(&auth), analytics.clone());
    let (selection, route) = membership.select("free-jawn", "landing").await.unwrap();
    assert_eq!(route, OnboardingRoute::Free);
    assert_eq!(route.path(), "/onboarding/free-jawn");

    let user = auth.current_user().unwrap();
    assert!(user.email.unwrap().ends_with("@temp.sondae.service"));
    assert!(storage.get(SELECTION_KEY).unwrap().is_some());

    // Onboarding page: the selection is handed over explicitly; the stash
    // stays behind only for reload recovery.
    let deps = FlowDeps {
        stash,
        submitter: ProfileSubmitter::new(Arc::clone(&auth), backend.clone(), analytics.clone()),
        analytics,
    };
    let mut flow = OnboardingFlow::start(selection, Some(UserType::Individual), deps);
    assert_eq!(flow.tier(), MembershipTier::FreeJawn);
    assert_eq!(flow.step_count(), 2);

    let completions = Arc::new(AtomicUsize::new(0));
    let seen = completions.clone();
    flow.on_complete(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let mut patch = basic_info_patch();
    patch.bio = bio_patch().bio;
    flow.store().update(patch);
    match flow.advance().await.unwrap() {
        StepOutcome::Advanced(OnboardingStep::Interests) => {}
        other => panic!("unexpected outcome: {other:?}"),
    }

    flow.store().update(interests_patch());
    let receipt = match flow.advance().await.unwrap() {
        StepOutcome::Completed(receipt) => receipt,
        other => panic!("unexpected outcome: {other:?}"),
    };

    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert_eq!(backend.update_count(), 1);
    let profile = backend.profile(&receipt.user_id).unwrap();
    assert_eq!(profile.name, "Amara Okafor");
    assert_eq!(profile.membership_tier, MembershipTier::FreeJawn);
    assert_eq!(
        storage.get(SELECTION_KEY).unwrap(),
        None,
        "selection stash torn down after success"
    );
    assert_eq!(
        sink.event_names(),
        vec![
            "membership_selected",
            "onboarding_started",
            "onboarding_step_completed",
            "onboarding_completed",
        ]
    );
}

#[tokio::test]
async fn premium_flow_cannot_finish_with_empty_interests() {
    let analytics = Analytics::disabled();
    let auth = signed_in_auth("member-1");
    let backend = Arc::new(MemoryBackend::new());
    let stash = MembershipStash::new(Arc::new(MemoryStorage::new()), Duration::from_secs(3600));

    let membership = MembershipFlow::new(stash.clone(), auth.clone(), analytics.clone());
    let (selection, route) = membership.select("tribe", "landing").await.unwrap();
    assert_eq!(route, OnboardingRoute::Paid);

    let deps = FlowDeps {
        stash,
        submitter: ProfileSubmitter::new(auth, backend.clone(), analytics.clone()),
        analytics,
    };
    let mut flow = OnboardingFlow::start(selection, None, deps);
    assert_eq!(flow.step_count(), 5);

    flow.select_user_type(UserType::Individual).unwrap();
    flow.advance().await.unwrap();
    flow.store().update(basic_info_patch());
    flow.advance().await.unwrap();
    flow.store().update(bio_patch());
    flow.advance().await.unwrap();
    assert_eq!(flow.current_step(), OnboardingStep::Interests);

    // Interests still empty: the step refuses to advance.
    match flow.advance().await.unwrap() {
        StepOutcome::Rejected(errors) => {
            assert_eq!(errors.first("interests"), Some("Select at least 2 interests"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(flow.current_step(), OnboardingStep::Interests);
    assert_eq!(backend.update_count(), 0);

    flow.store().update(interests_patch());
    match flow.advance().await.unwrap() {
        StepOutcome::Advanced(OnboardingStep::Preferences) => {}
        other => panic!("unexpected outcome: {other:?}"),
    }

    // Preferences keep their defaults unless changed; finishing submits.
    match flow.advance().await.unwrap() {
        StepOutcome::Completed(receipt) => {
            assert_eq!(receipt.membership_tier, MembershipTier::Tribe);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(backend.update_count(), 1);
    let profile = backend.profile("member-1").unwrap();
    assert!(profile.preferences.event_notifications);
}

#[tokio::test]
async fn preselected_premium_flow_stops_on_empty_interests() {
    let analytics = Analytics::disabled();
    let auth = signed_in_auth("member-4");
    let backend = Arc::new(MemoryBackend::new());
    let stash = MembershipStash::new(Arc::new(MemoryStorage::new()), Duration::from_secs(3600));

    let membership = MembershipFlow::new(stash.clone(), auth.clone(), analytics.clone());
    let (selection, _) = membership.select("tribe", "landing").await.unwrap();

    // The entry route already knows the persona: the short paid plan applies.
    let deps = FlowDeps {
        stash,
        submitter: ProfileSubmitter::new(auth, backend.clone(), analytics.clone()),
        analytics,
    };
    let mut flow = OnboardingFlow::start(selection, Some(UserType::Individual), deps);
    assert_eq!(
        flow.plan().steps(),
        [
            OnboardingStep::BasicInfo,
            OnboardingStep::Interests,
            OnboardingStep::Preferences,
        ]
    );

    let mut patch = basic_info_patch();
    patch.bio = bio_patch().bio;
    flow.store().update(patch);
    flow.advance().await.unwrap();
    assert_eq!(flow.current_step(), OnboardingStep::Interests);

    // Interests still empty: the step refuses to advance.
    match flow.advance().await.unwrap() {
        StepOutcome::Rejected(errors) => {
            assert_eq!(errors.first("interests"), Some("Select at least 2 interests"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(flow.current_step(), OnboardingStep::Interests);
    assert_eq!(backend.update_count(), 0);

    flow.store().update(interests_patch());
    match flow.advance().await.unwrap() {
        StepOutcome::Advanced(OnboardingStep::Preferences) => {}
        other => panic!("unexpected outcome: {other:?}"),
    }
    match flow.advance().await.unwrap() {
        StepOutcome::Completed(receipt) => {
            assert_eq!(receipt.membership_tier, MembershipTier::Tribe);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(backend.update_count(), 1);
}

#[tokio::test]
async fn overlapping_submissions_persist_exactly_once() {
    let auth = signed_in_auth("member-2");
    let backend = Arc::new(GatedBackend::new());
    let submitter = Arc::new(ProfileSubmitter::new(
        auth,
        backend.clone(),
        Analytics::disabled(),
    ));

    let store = FormStore::new();
    let mut patch = basic_info_patch();
    patch.bio = bio_patch().bio;
    patch.interests = interests_patch().interests;
    store.update(patch);
    let form = store.snapshot();

    let first = tokio::spawn({
        let submitter = Arc::clone(&submitter);
        let store = store.clone();
        let profile = validate(UserType::Individual, &form).unwrap();
        async move {
            submitter
                .submit(&store, &profile, Some(MembershipTier::PowWow))
                .await
        }
    });

    // Wait until the first attempt is inside the backend call, then try
    // again while it is still in flight.
    timeout(TEST_TIMEOUT, backend.entered.notified())
        .await
        .unwrap();
    let profile = validate(UserType::Individual, &form).unwrap();
    let second = submitter
        .submit(&store, &profile, Some(MembershipTier::PowWow))
        .await;
    assert!(matches!(second, Err(SubmitError::AlreadyInFlight)));

    backend.gate.add_permits(1);
    let receipt = timeout(TEST_TIMEOUT, first).await.unwrap().unwrap().unwrap();
    assert_eq!(receipt.user_id, "member-2");
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    assert!(!store.is_submitting(), "latch released after completion");
}

#[tokio::test]
async fn missing_selection_never_reaches_the_backend() {
    let auth = signed_in_auth("member-3");
    let backend = Arc::new(MemoryBackend::new());
    let submitter = ProfileSubmitter::new(auth, backend.clone(), Analytics::disabled());

    let store = FormStore::new();
    let mut patch = basic_info_patch();
    patch.bio = bio_patch().bio;
    patch.interests = interests_patch().interests;
    store.update(patch);
    let profile = validate(UserType::Individual, &store.snapshot()).unwrap();

    let err = submitter.submit(&store, &profile, None).await.unwrap_err();
    assert!(matches!(err, SubmitError::NoMembershipSelected));
    assert_eq!(err.to_string(), "No membership selected");
    assert_eq!(backend.update_count(), 0);
    assert!(!store.is_submitting());
    assert_eq!(store.last_error(), Some("No membership selected".to_string()));

    // The onboarding entry point refuses just as early without a stash.
    let deps = FlowDeps {
        stash: MembershipStash::new(Arc::new(MemoryStorage::new()), Duration::from_secs(3600)),
        submitter,
        analytics: Analytics::disabled(),
    };
    assert!(matches!(
        OnboardingFlow::resume(Some(UserType::Individual), deps),
        Err(MembershipError::SelectionMissing)
    ));
    assert_eq!(backend.update_count(), 0);
}

#[tokio::test]
async fn unknown_tier_is_rejected_without_side_effects() {
    let storage = Arc::new(MemoryStorage::new());
    let sink = Arc::new(MemorySink::new());
    let analytics = Analytics::new(sink.clone());
    let auth: Arc<dyn AuthProvider> = Arc::new(MemoryAuth::new());
    let stash = MembershipStash::new(storage.clone(), Duration::from_secs(3600));

    let membership = MembershipFlow::new(stash, Arc::clone(&auth), analytics);
    let err = membership.select("platinum", "landing").await.unwrap_err();
    assert_eq!(err.to_string(), "Unknown membership tier: platinum");

    assert_eq!(storage.get(SELECTION_KEY).unwrap(), None);
    assert!(auth.current_user().is_none());
    assert_eq!(sink.event_names(), vec!["membership_selection_error"]);
}
