//! Sondae — membership and onboarding client core.

pub mod analytics;
pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod membership;
pub mod onboarding;
pub mod storage;
