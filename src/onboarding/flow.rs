//! The onboarding flow controller.
//!
//! A flow is a finite sequence of steps decided up front by the membership
//! tier and by whether the user still has to pick a persona. Advancing
//! validates the current step's fields; the final advance re-validates the
//! whole record and hands it to submission. The controller never navigates —
//! on success it fires the host's completion callback exactly once and the
//! host decides where to go.

use serde::{Deserialize, Serialize};

use crate::analytics::{Analytics, AnalyticsEvent};
use crate::error::{FlowError, MembershipError, SubmitError};
use crate::membership::{MembershipStash, MembershipTier, SelectedMembership};
use crate::onboarding::form::UserType;
use crate::onboarding::store::FormStore;
use crate::onboarding::submit::{ProfileSubmitter, SubmissionReceipt};
use crate::onboarding::validate::{
    ValidationErrorSet, check_basic_info, check_bio, check_details, check_interests,
    check_type_chosen, validate,
};

/// The named steps a flow can be built from. `Complete` is the terminal
/// state, never a collecting step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnboardingStep {
    Type,
    BasicInfo,
    Details,
    Interests,
    Preferences,
    Complete,
}

impl OnboardingStep {
    /// Wire name, as reported in analytics payloads.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::BasicInfo => "basic-info",
            Self::Details => "details",
            Self::Interests => "interests",
            Self::Preferences => "preferences",
            Self::Complete => "complete",
        }
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The step sequence for one flow.
///
/// Preselected-persona flows skip the type and details steps; paid tiers
/// append a preferences step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPlan {
    steps: Vec<OnboardingStep>,
}

impl StepPlan {
    pub fn for_flow(tier: MembershipTier, preselected: Option<UserType>) -> Self {
        use OnboardingStep::*;
        let mut steps = match preselected {
            Some(_) => vec![BasicInfo, Interests],
            None => vec![Type, BasicInfo, Details, Interests],
        };
        if !tier.is_free() {
            steps.push(Preferences);
        }
        Self { steps }
    }

    pub fn steps(&self) -> &[OnboardingStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn includes(&self, step: OnboardingStep) -> bool {
        self.steps.contains(&step)
    }
}

/// What a call to [`OnboardingFlow::advance`] did.
#[derive(Debug)]
pub enum StepOutcome {
    /// Moved on; now collecting this step.
    Advanced(OnboardingStep),
    /// Stayed put; these fields need fixing first.
    Rejected(ValidationErrorSet),
    /// Flow finished and the profile was persisted.
    Completed(SubmissionReceipt),
    /// Terminal submission failed; the user may fix and retry.
    Failed(String),
}

/// Collaborators the flow drives.
pub struct FlowDeps {
    pub stash: MembershipStash,
    pub submitter: ProfileSubmitter,
    pub analytics: Analytics,
}

type CompletionCallback = Box<dyn FnOnce(&SubmissionReceipt) + Send>;

pub struct OnboardingFlow {
    tier: MembershipTier,
    plan: StepPlan,
    position: usize,
    user_type: Option<UserType>,
    details_entered: bool,
    store: FormStore,
    deps: FlowDeps,
    completion: Option<CompletionCallback>,
}

impl OnboardingFlow {
    /// Start a flow for an explicit selection, carried over from the
    /// membership page. Pass the persona when the entry route preselects it;
    /// passing `None` prepends the type and details steps.
    pub fn start(
        selection: SelectedMembership,
        user_type: Option<UserType>,
        deps: FlowDeps,
    ) -> Self {
        let tier = selection.tier;
        deps.analytics.track(AnalyticsEvent::OnboardingStarted {
            membership_tier: tier,
        });
        Self {
            tier,
            plan: StepPlan::for_flow(tier, user_type),
            position: 0,
            user_type,
            details_entered: false,
            store: FormStore::new(),
            deps,
            completion: None,
        }
    }

    /// Start from the stashed selection — the page-reload recovery path.
    /// Fails if nothing usable is stashed; the host should send the user
    /// back to the membership page.
    pub fn resume(user_type: Option<UserType>, deps: FlowDeps) -> Result<Self, MembershipError> {
        let selection = deps
            .stash
            .load()?
            .ok_or(MembershipError::SelectionMissing)?;
        Ok(Self::start(selection, user_type, deps))
    }

    /// Register the host's completion callback. Invoked at most once, on
    /// successful submission.
    pub fn on_complete(&mut self, callback: impl FnOnce(&SubmissionReceipt) + Send + 'static) {
        self.completion = Some(Box::new(callback));
    }

    pub fn tier(&self) -> MembershipTier {
        self.tier
    }

    pub fn user_type(&self) -> Option<UserType> {
        self.user_type
    }

    pub fn plan(&self) -> &StepPlan {
        &self.plan
    }

    /// The form store backing this flow; hosts bind inputs through it.
    pub fn store(&self) -> &FormStore {
        &self.store
    }

    pub fn current_step(&self) -> OnboardingStep {
        self.plan
            .steps()
            .get(self.position)
            .copied()
            .unwrap_or(OnboardingStep::Complete)
    }

    pub fn is_complete(&self) -> bool {
        self.position >= self.plan.len()
    }

    /// Zero-based index of the current step.
    pub fn step_index(&self) -> usize {
        self.position.min(self.plan.len())
    }

    pub fn step_count(&self) -> usize {
        self.plan.len()
    }

    /// Choose (or re-choose) the persona. Allowed until a details form has
    /// been entered; re-choosing resets only the type, never the fields
    /// already filled in.
    pub fn select_user_type(&mut self, user_type: UserType) -> Result<(), FlowError> {
        if self.details_entered || !self.plan.includes(OnboardingStep::Type) {
            return Err(FlowError::TypeLocked);
        }
        self.user_type = Some(user_type);
        Ok(())
    }

    /// Step backwards without re-validating. Backing up past the type step
    /// is refused once a details form has been entered.
    pub fn back(&mut self) -> Result<OnboardingStep, FlowError> {
        if self.is_complete() {
            return Err(FlowError::AlreadyComplete);
        }
        if self.position == 0 {
            return Err(FlowError::AtFirstStep);
        }
        let target = self.plan.steps()[self.position - 1];
        if target == OnboardingStep::Type && self.details_entered {
            return Err(FlowError::TypeLocked);
        }
        self.position -= 1;
        Ok(target)
    }

    /// Validate the current step and move forward. On the last step this
    /// re-validates the whole record and runs submission.
    pub async fn advance(&mut self) -> Result<StepOutcome, FlowError> {
        if self.is_complete() {
            return Err(FlowError::AlreadyComplete);
        }

        let step = self.plan.steps()[self.position];
        let errors = self.validate_current(step);
        if !errors.is_empty() {
            return Ok(StepOutcome::Rejected(errors));
        }

        if self.position + 1 < self.plan.len() {
            self.deps
                .analytics
                .track(AnalyticsEvent::OnboardingStepCompleted {
                    step: step.to_string(),
                    membership_tier: self.tier,
                });
            self.position += 1;
            let now_on = self.plan.steps()[self.position];
            if now_on == OnboardingStep::Details {
                self.details_entered = true;
            }
            return Ok(StepOutcome::Advanced(now_on));
        }

        self.complete_flow(step).await
    }

    fn validate_current(&self, step: OnboardingStep) -> ValidationErrorSet {
        let form = self.store.snapshot();
        match step {
            OnboardingStep::Type => check_type_chosen(self.user_type),
            OnboardingStep::BasicInfo => {
                let mut errors = check_basic_info(&form);
                // Short plans have no details step; the bio is collected here.
                if !self.plan.includes(OnboardingStep::Details) {
                    let user_type = self.user_type.unwrap_or(UserType::Individual);
                    errors.merge(check_bio(user_type, &form));
                }
                errors
            }
            OnboardingStep::Details => match self.user_type {
                Some(user_type) => check_details(user_type, &form),
                None => check_type_chosen(None),
            },
            OnboardingStep::Interests => check_interests(&form),
            OnboardingStep::Preferences | OnboardingStep::Complete => ValidationErrorSet::new(),
        }
    }

    async fn complete_flow(&mut self, step: OnboardingStep) -> Result<StepOutcome, FlowError> {
        let Some(user_type) = self.user_type else {
            return Ok(StepOutcome::Rejected(check_type_chosen(None)));
        };

        let form = self.store.snapshot();
        let profile = match validate(user_type, &form) {
            Ok(profile) => profile,
            Err(errors) => return Ok(StepOutcome::Rejected(errors)),
        };

        match self
            .deps
            .submitter
            .submit(&self.store, &profile, Some(self.tier))
            .await
        {
            Ok(receipt) => {
                self.position = self.plan.len();
                if let Err(e) = self.deps.stash.clear() {
                    tracing::warn!("Failed to clear membership stash: {}", e);
                }
                if let Some(on_complete) = self.completion.take() {
                    on_complete(&receipt);
                }
                Ok(StepOutcome::Completed(receipt))
            }
            Err(e) => {
                // The latch guard is not a submission failure; everything
                // else gets reported.
                if !matches!(e, SubmitError::AlreadyInFlight) {
                    self.deps.analytics.track(AnalyticsEvent::OnboardingError {
                        error: e.to_string(),
                        membership_tier: self.tier,
                        step: step.to_string(),
                    });
                }
                Ok(StepOutcome::Failed(e.to_string()))
            }
        }
    }
}
