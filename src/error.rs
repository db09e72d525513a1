//! Error types for the Sondae client core.

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Membership error: {0}")]
    Membership(#[from] MembershipError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Submission error: {0}")]
    Submit(#[from] SubmitError),
}

/// Durable key-value storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to write key {key}: {reason}")]
    Write { key: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Authentication provider errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Anonymous sign-up failed: {reason}")]
    SignUpFailed { reason: String },
}

/// Persistence/backend service errors.
///
/// Display output is the user-visible message; the submission path surfaces
/// it verbatim without categorization or retry.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{message}")]
    Request { status: u16, message: String },

    #[error("{0}")]
    Network(String),
}

/// Membership selection errors.
#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    #[error("Unknown membership tier: {0}")]
    UnknownTier(String),

    #[error("No membership selected")]
    SelectionMissing,

    #[error("Anonymous session creation failed: {0}")]
    AnonymousSession(#[from] AuthError),

    #[error("Failed to store membership selection: {0}")]
    Stash(#[from] StorageError),
}

/// Flow misuse errors.
///
/// These mark caller mistakes (driving the state machine outside its
/// contract), not user-correctable conditions.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Onboarding is already complete")]
    AlreadyComplete,

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("User type is locked once a details form has been entered")]
    TypeLocked,
}

/// Profile submission errors.
///
/// `NoUser` and `NoMembershipSelected` are blocking preconditions: the flow
/// halts with the message shown and no persistence call is made.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("No user found")]
    NoUser,

    #[error("No membership selected")]
    NoMembershipSelected,

    #[error("A submission is already in progress")]
    AlreadyInFlight,

    #[error("{0}")]
    Backend(#[from] BackendError),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
