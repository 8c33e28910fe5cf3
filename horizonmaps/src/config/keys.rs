//! Typed access to individual configuration settings.
//!
//! Every setting is addressed as `section.key`. [`ConfigKey`] is the single
//! list of settings: loading, saving and the `config` CLI commands all go
//! through it.

use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFile;
use super::ConfigError;

/// A configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    NavigationStepRadius,
    NavigationArrivalRadius,
    NavigationOffRouteThreshold,
    NavigationOffRouteMetric,
    NavigationFixTimeout,
    NavigationMaxRerouteAttempts,
    RoutingBaseUrl,
    RoutingAccessToken,
    RoutingProfile,
    RoutingTimeout,
    AnnouncementsLanguage,
    SimulationSpeed,
    SimulationInterval,
    LoggingLevel,
    LoggingDirectory,
}

const ALL_KEYS: [ConfigKey; 15] = [
    ConfigKey::NavigationStepRadius,
    ConfigKey::NavigationArrivalRadius,
    ConfigKey::NavigationOffRouteThreshold,
    ConfigKey::NavigationOffRouteMetric,
    ConfigKey::NavigationFixTimeout,
    ConfigKey::NavigationMaxRerouteAttempts,
    ConfigKey::RoutingBaseUrl,
    ConfigKey::RoutingAccessToken,
    ConfigKey::RoutingProfile,
    ConfigKey::RoutingTimeout,
    ConfigKey::AnnouncementsLanguage,
    ConfigKey::SimulationSpeed,
    ConfigKey::SimulationInterval,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingDirectory,
];

impl ConfigKey {
    /// All settings, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// Full `section.key` name.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::NavigationStepRadius => "navigation.step_radius_m",
            ConfigKey::NavigationArrivalRadius => "navigation.arrival_radius_m",
            ConfigKey::NavigationOffRouteThreshold => "navigation.off_route_threshold_m",
            ConfigKey::NavigationOffRouteMetric => "navigation.off_route_metric",
            ConfigKey::NavigationFixTimeout => "navigation.fix_timeout_secs",
            ConfigKey::NavigationMaxRerouteAttempts => "navigation.max_reroute_attempts",
            ConfigKey::RoutingBaseUrl => "routing.base_url",
            ConfigKey::RoutingAccessToken => "routing.access_token",
            ConfigKey::RoutingProfile => "routing.profile",
            ConfigKey::RoutingTimeout => "routing.timeout_secs",
            ConfigKey::AnnouncementsLanguage => "announcements.language",
            ConfigKey::SimulationSpeed => "simulation.speed_mps",
            ConfigKey::SimulationInterval => "simulation.interval_ms",
            ConfigKey::LoggingLevel => "logging.level",
            ConfigKey::LoggingDirectory => "logging.directory",
        }
    }

    /// INI section.
    pub fn section(&self) -> &'static str {
        self.name().split_once('.').map(|(s, _)| s).unwrap_or_default()
    }

    /// Key within the section.
    pub fn key_name(&self) -> &'static str {
        self.name().split_once('.').map(|(_, k)| k).unwrap_or_default()
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        let nav = &config.navigation;
        match self {
            ConfigKey::NavigationStepRadius => nav.step_radius_m.to_string(),
            ConfigKey::NavigationArrivalRadius => nav.arrival_radius_m.to_string(),
            ConfigKey::NavigationOffRouteThreshold => nav.off_route_threshold_m.to_string(),
            ConfigKey::NavigationOffRouteMetric => nav.off_route_metric.to_string(),
            ConfigKey::NavigationFixTimeout => nav.fix_timeout_secs.to_string(),
            ConfigKey::NavigationMaxRerouteAttempts => nav.max_reroute_attempts.to_string(),
            ConfigKey::RoutingBaseUrl => config.routing.base_url.clone(),
            ConfigKey::RoutingAccessToken => {
                config.routing.access_token.clone().unwrap_or_default()
            }
            ConfigKey::RoutingProfile => config.routing.profile.to_string(),
            ConfigKey::RoutingTimeout => config.routing.timeout_secs.to_string(),
            ConfigKey::AnnouncementsLanguage => config.announcements.language.clone(),
            ConfigKey::SimulationSpeed => config.simulation.speed_mps.to_string(),
            ConfigKey::SimulationInterval => config.simulation.interval_ms.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Validate and store `value`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: self.name().to_string(),
            value: value.to_string(),
            reason,
        };

        match self {
            ConfigKey::NavigationStepRadius => {
                config.navigation.step_radius_m = positive_f64(value).map_err(invalid)?
            }
            ConfigKey::NavigationArrivalRadius => {
                config.navigation.arrival_radius_m = positive_f64(value).map_err(invalid)?
            }
            ConfigKey::NavigationOffRouteThreshold => {
                config.navigation.off_route_threshold_m = positive_f64(value).map_err(invalid)?
            }
            ConfigKey::NavigationOffRouteMetric => {
                config.navigation.off_route_metric = value.parse().map_err(invalid)?
            }
            ConfigKey::NavigationFixTimeout => {
                config.navigation.fix_timeout_secs = parse_num(value).map_err(invalid)?
            }
            ConfigKey::NavigationMaxRerouteAttempts => {
                let attempts: u32 = parse_num(value).map_err(invalid)?;
                if attempts == 0 {
                    return Err(invalid("must be at least 1".to_string()));
                }
                config.navigation.max_reroute_attempts = attempts;
            }
            ConfigKey::RoutingBaseUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(invalid("must start with http:// or https://".to_string()));
                }
                config.routing.base_url = value.trim_end_matches('/').to_string();
            }
            ConfigKey::RoutingAccessToken => {
                config.routing.access_token = non_empty(value).map(str::to_string)
            }
            ConfigKey::RoutingProfile => config.routing.profile = value.parse().map_err(invalid)?,
            ConfigKey::RoutingTimeout => {
                let secs: u64 = parse_num(value).map_err(invalid)?;
                if secs == 0 {
                    return Err(invalid("must be at least 1".to_string()));
                }
                config.routing.timeout_secs = secs;
            }
            ConfigKey::AnnouncementsLanguage => {
                let Some(language) = non_empty(value) else {
                    return Err(invalid("must not be empty".to_string()));
                };
                config.announcements.language = language.to_string();
            }
            ConfigKey::SimulationSpeed => {
                config.simulation.speed_mps = positive_f64(value).map_err(invalid)?
            }
            ConfigKey::SimulationInterval => {
                let ms: u64 = parse_num(value).map_err(invalid)?;
                if ms == 0 {
                    return Err(invalid("must be at least 1".to_string()));
                }
                config.simulation.interval_ms = ms;
            }
            ConfigKey::LoggingLevel => {
                tracing_subscriber::EnvFilter::try_new(value)
                    .map_err(|e| invalid(format!("not a log filter: {}", e)))?;
                config.logging.level = value.to_string();
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = non_empty(value).map(PathBuf::from)
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_num<T: FromStr>(value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| "expected a whole number".to_string())
}

fn positive_f64(value: &str) -> Result<f64, String> {
    let n: f64 = value.parse().map_err(|_| "expected a number".to_string())?;
    if !n.is_finite() || n <= 0.0 {
        return Err("must be greater than zero".to_string());
    }
    Ok(n)
}
