//! Guidance session settings.

use std::time::Duration;

use crate::routing::RoutingProfile;

/// Default time to wait for a fix before treating the source as failed.
pub const DEFAULT_FIX_TIMEOUT: Duration = Duration::from_secs(30);

/// Default consecutive reroute failures tolerated before giving up.
pub const DEFAULT_MAX_REROUTE_ATTEMPTS: u32 = 3;

/// Default phrase spoken on arrival.
pub const DEFAULT_ARRIVAL_PHRASE: &str = "You have arrived at your destination";

/// Default phrase spoken when leaving the route.
pub const DEFAULT_REROUTING_PHRASE: &str = "Recalculating route";

/// Settings for a [`super::GuidanceSession`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Language tag passed to the announcement sink.
    pub language: String,
    /// Travel mode for reroute requests.
    pub profile: RoutingProfile,
    /// Longest gap between fixes. `None` waits forever.
    pub fix_timeout: Option<Duration>,
    /// Consecutive reroute failures before guidance fails.
    pub max_reroute_attempts: u32,
    /// Spoken on arrival.
    pub arrival_phrase: String,
    /// Spoken on leaving the route.
    pub rerouting_phrase: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            profile: RoutingProfile::default(),
            fix_timeout: Some(DEFAULT_FIX_TIMEOUT),
            max_reroute_attempts: DEFAULT_MAX_REROUTE_ATTEMPTS,
            arrival_phrase: DEFAULT_ARRIVAL_PHRASE.to_string(),
            rerouting_phrase: DEFAULT_REROUTING_PHRASE.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_profile(mut self, profile: RoutingProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_fix_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fix_timeout = timeout;
        self
    }

    /// Set the failure limit. Clamped to at least one attempt.
    pub fn with_max_reroute_attempts(mut self, attempts: u32) -> Self {
        self.max_reroute_attempts = attempts.max(1);
        self
    }

    pub fn with_arrival_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.arrival_phrase = phrase.into();
        self
    }

    pub fn with_rerouting_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.rerouting_phrase = phrase.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.fix_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.max_reroute_attempts, 3);
        assert_eq!(config.rerouting_phrase, "Recalculating route");
    }

    #[test]
    fn test_max_attempts_clamped() {
        let config = SessionConfig::default().with_max_reroute_attempts(0);
        assert_eq!(config.max_reroute_attempts, 1);
    }
}
