//! Search settings and the per-invocation session.
//!
//! [`SearchSettings`] carries every knob of the search flow (provider
//! parameters, polling bounds, ranking policy). [`SearchSession`] carries
//! the caller's prebuilt auth header and cancellation token into the
//! pipeline entry point.

use std::time::Duration;

use okza_core::{Credentials, UnpricedPolicy};
use tokio_util::sync::CancellationToken;

use crate::client::DEFAULT_TIMEOUT_SECS;

/// Default provider base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.dataforseo.com";
/// Default location sent with every job.
pub const DEFAULT_LOCATION: &str = "France";
/// Default language sent with every job.
pub const DEFAULT_LANGUAGE: &str = "French";
/// Default number of status requests before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;
/// Default item count a job must exceed to be ready.
pub const DEFAULT_READY_THRESHOLD: u64 = 10;
/// Default wait between status requests, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

// ============================================================================
// API Settings
// ============================================================================

/// Provider connection and job parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    /// Provider base URL (scheme and host).
    pub base_url: String,
    /// Location parameter for submitted jobs.
    pub location: String,
    /// Language parameter for submitted jobs.
    pub language: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

// ============================================================================
// Poll Settings
// ============================================================================

/// Bounds of the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Maximum number of status requests (at least 1).
    pub max_attempts: u32,
    /// A job is ready once its item count is strictly above this.
    pub ready_threshold: u64,
    /// Wait between two status requests.
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            ready_threshold: DEFAULT_READY_THRESHOLD,
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

// ============================================================================
// Search Settings
// ============================================================================

/// Settings for one search flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSettings {
    /// Provider parameters.
    pub api: ApiSettings,
    /// Polling bounds.
    pub poll: PollSettings,
    /// Placement of items without a usable price.
    pub unpriced: UnpricedPolicy,
}

impl SearchSettings {
    /// Creates a builder starting from the defaults.
    pub fn builder() -> SearchSettingsBuilder {
        SearchSettingsBuilder::new()
    }
}

/// Builder for constructing [`SearchSettings`].
#[derive(Debug, Clone, Default)]
pub struct SearchSettingsBuilder {
    settings: SearchSettings,
}

impl SearchSettingsBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the provider base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.settings.api.base_url = url.into();
        self
    }

    /// Sets the job location.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.settings.api.location = location.into();
        self
    }

    /// Sets the job language.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.settings.api.language = language.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.api.timeout = timeout;
        self
    }

    /// Sets the maximum number of status requests. Zero is raised to one.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.settings.poll.max_attempts = attempts.max(1);
        self
    }

    /// Sets the readiness threshold.
    pub fn ready_threshold(mut self, threshold: u64) -> Self {
        self.settings.poll.ready_threshold = threshold;
        self
    }

    /// Sets the wait between status requests.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.settings.poll.interval = interval;
        self
    }

    /// Sets the unpriced item policy.
    pub fn unpriced(mut self, policy: UnpricedPolicy) -> Self {
        self.settings.unpriced = policy;
        self
    }

    /// Builds the settings.
    pub fn build(self) -> SearchSettings {
        self.settings
    }
}

// ============================================================================
// Search Session
// ============================================================================

/// Explicit per-invocation context handed to the pipeline.
///
/// Holds the already-built `Authorization` header and the token used to
/// cancel an in-flight search. Nothing in the pipeline keeps state between
/// sessions.
#[derive(Clone)]
pub struct SearchSession {
    auth_header: String,
    cancel: CancellationToken,
}

impl SearchSession {
    /// Creates a session with a fresh cancellation token.
    pub fn new(credentials: &Credentials) -> Self {
        Self::with_cancel(credentials, CancellationToken::new())
    }

    /// Creates a session bound to an existing cancellation token.
    pub fn with_cancel(credentials: &Credentials, cancel: CancellationToken) -> Self {
        Self {
            auth_header: credentials.basic_auth_header(),
            cancel,
        }
    }

    /// Returns the `Authorization` header value.
    pub fn auth_header(&self) -> &str {
        &self.auth_header
    }

    /// Returns the cancellation token.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Requests cancellation of the running search.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = SearchSettings::default();
        assert_eq!(settings.poll.max_attempts, 20);
        assert_eq!(settings.poll.ready_threshold, 10);
        assert_eq!(settings.poll.interval, Duration::from_secs(5));
        assert_eq!(settings.api.location, "France");
        assert_eq!(settings.api.language, "French");
        assert_eq!(settings.unpriced, UnpricedPolicy::AsZero);
    }

    #[test]
    fn test_builder() {
        let settings = SearchSettings::builder()
            .max_attempts(3)
            .ready_threshold(0)
            .interval(Duration::from_millis(10))
            .location("Belgium")
            .unpriced(UnpricedPolicy::Last)
            .build();

        assert_eq!(settings.poll.max_attempts, 3);
        assert_eq!(settings.poll.ready_threshold, 0);
        assert_eq!(settings.api.location, "Belgium");
        assert_eq!(settings.api.language, "French");
        assert_eq!(settings.unpriced, UnpricedPolicy::Last);
    }

    #[test]
    fn test_zero_attempts_raised_to_one() {
        let settings = SearchSettings::builder().max_attempts(0).build();
        assert_eq!(settings.poll.max_attempts, 1);
    }

    #[test]
    fn test_session_cancel_and_debug() {
        let session = SearchSession::new(&Credentials::new("u", "secret"));
        assert!(session.auth_header().starts_with("Basic "));
        assert!(!session.is_cancelled());

        session.cancel();
        assert!(session.is_cancelled());
        assert!(!format!("{session:?}").contains("Basic"));
    }
}
