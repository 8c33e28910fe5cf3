//! INI configuration file.
//!
//! ```ini
//! [navigation]
//! step_radius_m = 30
//! arrival_radius_m = 30
//! off_route_threshold_m = 50
//! off_route_metric = vertex
//! fix_timeout_secs = 30
//! max_reroute_attempts = 3
//!
//! [routing]
//! base_url = https://api.mapbox.com
//! access_token = pk.xxxx
//! profile = driving
//! timeout_secs = 10
//!
//! [announcements]
//! language = es
//!
//! [simulation]
//! speed_mps = 13.9
//! interval_ms = 1000
//!
//! [logging]
//! level = info
//! directory = /var/log/horizonmaps
//! ```
//!
//! Keys that are absent keep their defaults. A missing file is not an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;

use super::keys::ConfigKey;
use super::ConfigError;
use crate::navigation::{
    OffRouteMetric, TrackerConfig, DEFAULT_ARRIVAL_RADIUS_M, DEFAULT_OFF_ROUTE_THRESHOLD_M,
    DEFAULT_STEP_RADIUS_M,
};
use crate::position::SimulationConfig;
use crate::routing::{DirectionsConfig, RoutingProfile, DEFAULT_DIRECTIONS_BASE_URL};
use crate::session::{SessionConfig, DEFAULT_FIX_TIMEOUT, DEFAULT_MAX_REROUTE_ATTEMPTS};

/// Directory name under the platform config directory.
const CONFIG_DIR_NAME: &str = "horizonmaps";

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.ini";

/// Platform config directory for HorizonMaps (e.g. `~/.config/horizonmaps`).
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Default config file location.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// `[navigation]`
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationSettings {
    pub step_radius_m: f64,
    pub arrival_radius_m: f64,
    pub off_route_threshold_m: f64,
    pub off_route_metric: OffRouteMetric,
    /// Zero disables the timeout.
    pub fix_timeout_secs: u64,
    pub max_reroute_attempts: u32,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            step_radius_m: DEFAULT_STEP_RADIUS_M,
            arrival_radius_m: DEFAULT_ARRIVAL_RADIUS_M,
            off_route_threshold_m: DEFAULT_OFF_ROUTE_THRESHOLD_M,
            off_route_metric: OffRouteMetric::default(),
            fix_timeout_secs: DEFAULT_FIX_TIMEOUT.as_secs(),
            max_reroute_attempts: DEFAULT_MAX_REROUTE_ATTEMPTS,
        }
    }
}

/// `[routing]`
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingSettings {
    pub base_url: String,
    pub access_token: Option<String>,
    pub profile: RoutingProfile,
    pub timeout_secs: u64,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DIRECTIONS_BASE_URL.to_string(),
            access_token: None,
            profile: RoutingProfile::default(),
            timeout_secs: DirectionsConfig::default().timeout_secs,
        }
    }
}

/// `[announcements]`
#[derive(Debug, Clone, PartialEq)]
pub struct AnnouncementSettings {
    pub language: String,
}

impl Default for AnnouncementSettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
        }
    }
}

/// `[simulation]`
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub speed_mps: f64,
    pub interval_ms: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        let defaults = SimulationConfig::default();
        Self {
            speed_mps: defaults.speed_mps,
            interval_ms: defaults.interval.as_millis() as u64,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` overrides it.
    pub level: String,
    /// Directory for daily log files. Console only when unset.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub navigation: NavigationSettings,
    pub routing: RoutingSettings,
    pub announcements: AnnouncementSettings,
    pub simulation: SimulationSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from `path`. Returns defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Parse INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<string>"),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|s| s.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        self.to_ini()
            .write_to_file(path)
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        tracing::debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conversions
    // ─────────────────────────────────────────────────────────────────────────

    /// Tracker thresholds.
    pub fn tracker(&self) -> TrackerConfig {
        TrackerConfig::default()
            .with_step_radius_m(self.navigation.step_radius_m)
            .with_arrival_radius_m(self.navigation.arrival_radius_m)
            .with_off_route_threshold_m(self.navigation.off_route_threshold_m)
            .with_off_route_metric(self.navigation.off_route_metric)
    }

    /// Guidance session settings.
    pub fn session(&self) -> SessionConfig {
        let fix_timeout = match self.navigation.fix_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        SessionConfig::default()
            .with_language(self.announcements.language.clone())
            .with_profile(self.routing.profile)
            .with_fix_timeout(fix_timeout)
            .with_max_reroute_attempts(self.navigation.max_reroute_attempts)
    }

    /// Directions client settings.
    pub fn directions(&self) -> DirectionsConfig {
        DirectionsConfig {
            base_url: self.routing.base_url.clone(),
            access_token: self.routing.access_token.clone().unwrap_or_default(),
            language: self.announcements.language.clone(),
            timeout_secs: self.routing.timeout_secs,
        }
    }

    /// Simulated sampler settings.
    pub fn simulation(&self) -> SimulationConfig {
        SimulationConfig {
            speed_mps: self.simulation.speed_mps,
            interval: Duration::from_millis(self.simulation.interval_ms),
            ..SimulationConfig::default()
        }
    }
}
