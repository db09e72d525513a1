//! Session identity.
//!
//! The client only ever needs two things from the auth service: who is
//! signed in right now, and the ability to mint a throwaway account so a
//! free-tier visitor can start onboarding without a signup form.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::error::AuthError;

/// A signed-in user as the auth service reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// Credentials for a throwaway account. The address is a timestamped alias
/// under a service-owned domain; nothing is ever delivered to it.
pub struct AnonymousCredentials {
    pub email: String,
    pub password: secrecy::SecretString,
}

/// Mint credentials for an anonymous session: millisecond-timestamped email
/// plus an 8-character lowercase alphanumeric password.
pub fn anonymous_credentials() -> AnonymousCredentials {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

    let email = format!("{}@temp.sondae.service", Utc::now().timestamp_millis());
    let mut rng = rand::thread_rng();
    let password: String = (0..8)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    AnonymousCredentials {
        email,
        password: secrecy::SecretString::from(password),
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The current session's user, if any.
    fn current_user(&self) -> Option<AuthUser>;

    /// Create a throwaway account and sign the session into it.
    async fn sign_up_anonymous(&self) -> Result<AuthUser, AuthError>;
}

/// In-memory auth for tests and demos. Holds at most one session.
#[derive(Default)]
pub struct MemoryAuth {
    session: RwLock<Option<AuthUser>>,
    reject_signups: bool,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// An auth service whose sign-ups always fail, for error-path tests.
    pub fn rejecting() -> Self {
        Self {
            session: RwLock::new(None),
            reject_signups: true,
        }
    }

    /// Put a known user into the session directly.
    pub fn sign_in(&self, user: AuthUser) {
        *self.session.write().expect("auth lock poisoned") = Some(user);
    }

    pub fn sign_out(&self) {
        *self.session.write().expect("auth lock poisoned") = None;
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    fn current_user(&self) -> Option<AuthUser> {
        self.session.read().expect("auth lock poisoned").clone()
    }

    async fn sign_up_anonymous(&self) -> Result<AuthUser, AuthError> {
        if self.reject_signups {
            return Err(AuthError::SignUpFailed {
                reason: "sign-ups are disabled".to_string(),
            });
        }

        let credentials = anonymous_credentials();
        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email: Some(credentials.email),
        };
        self.sign_in(user.clone());
        Ok(user)
    }
}
