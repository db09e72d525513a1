//! Product analytics events.
//!
//! Selection and onboarding emit a small fixed vocabulary of events. Emission
//! is fire-and-forget: a sink that fails must swallow the failure itself, so
//! instrumentation can never break the flow it is observing.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::membership::MembershipTier;

/// Everything the client reports. Serialized with an `event` tag plus the
/// payload fields, matching the wire names the analytics service expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    MembershipSelected {
        membership_tier: MembershipTier,
        source: String,
    },
    MembershipSelectionError {
        error: String,
        /// Raw tier string — selection errors include unrecognized tiers.
        membership_tier: String,
    },
    OnboardingStarted {
        membership_tier: MembershipTier,
    },
    OnboardingStepCompleted {
        step: String,
        membership_tier: MembershipTier,
    },
    OnboardingCompleted {
        membership_tier: MembershipTier,
        user_id: String,
    },
    OnboardingError {
        error: String,
        membership_tier: MembershipTier,
        step: String,
    },
}

impl AnalyticsEvent {
    /// Wire name of the event, as the serialized `event` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MembershipSelected { .. } => "membership_selected",
            Self::MembershipSelectionError { .. } => "membership_selection_error",
            Self::OnboardingStarted { .. } => "onboarding_started",
            Self::OnboardingStepCompleted { .. } => "onboarding_step_completed",
            Self::OnboardingCompleted { .. } => "onboarding_completed",
            Self::OnboardingError { .. } => "onboarding_error",
        }
    }
}

/// Destination for analytics events. Implementations must not fail outward.
pub trait AnalyticsSink: Send + Sync {
    fn record(&self, event: &AnalyticsEvent);
}

/// Logs each event through `tracing`.
#[derive(Default)]
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn record(&self, event: &AnalyticsEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => info!(event = event.name(), %payload, "Analytics event"),
            Err(e) => warn!(error = %e, "Failed to serialize analytics event"),
        }
    }
}

/// Discards every event.
#[derive(Default)]
pub struct NullSink;

impl AnalyticsSink for NullSink {
    fn record(&self, _event: &AnalyticsEvent) {}
}

/// Captures events in memory so tests can assert on what was emitted.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().expect("analytics lock poisoned").clone()
    }

    /// Names of captured events, in emission order.
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .expect("analytics lock poisoned")
            .iter()
            .map(AnalyticsEvent::name)
            .collect()
    }
}

impl AnalyticsSink for MemorySink {
    fn record(&self, event: &AnalyticsEvent) {
        self.events
            .lock()
            .expect("analytics lock poisoned")
            .push(event.clone());
    }
}

/// Cloneable handle the rest of the client tracks through.
#[derive(Clone)]
pub struct Analytics {
    sink: Arc<dyn AnalyticsSink>,
    enabled: bool,
}

impl Analytics {
    pub fn new(sink: Arc<dyn AnalyticsSink>) -> Self {
        Self {
            sink,
            enabled: true,
        }
    }

    /// A handle that drops everything, for callers that opted out.
    pub fn disabled() -> Self {
        Self {
            sink: Arc::new(NullSink),
            enabled: false,
        }
    }

    pub fn with_enabled(sink: Arc<dyn AnalyticsSink>, enabled: bool) -> Self {
        Self { sink, enabled }
    }

    pub fn track(&self, event: AnalyticsEvent) {
        if self.enabled {
            self.sink.record(&event);
        }
    }
}

impl Default for Analytics {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}
