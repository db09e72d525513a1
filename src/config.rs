//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

/// Application configuration for the client core.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the durable key-value store file (localStorage analog).
    pub storage_path: PathBuf,
    /// Maximum age of a stashed membership selection before resume ignores it.
    pub stash_max_age: Duration,
    /// Base URL of the profile backend; `None` selects the in-memory backend.
    pub backend_url: Option<String>,
    /// Whether analytics events are recorded at all.
    pub analytics_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("./data/sondae-client.json"),
            stash_max_age: Duration::from_secs(24 * 3600), // 24 hours
            backend_url: None,
            analytics_enabled: true,
        }
    }
}

impl AppConfig {
    /// Build a config from `SONDAE_*` environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let storage_path = std::env::var("SONDAE_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_path);

        let stash_max_age = std::env::var("SONDAE_STASH_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.stash_max_age);

        let backend_url = std::env::var("SONDAE_BACKEND_URL")
            .ok()
            .map(|s| s.trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        let analytics_enabled = std::env::var("SONDAE_ANALYTICS")
            .map(|s| s != "0" && !s.eq_ignore_ascii_case("off"))
            .unwrap_or(defaults.analytics_enabled);

        Self {
            storage_path,
            stash_max_age,
            backend_url,
            analytics_enabled,
        }
    }
}
