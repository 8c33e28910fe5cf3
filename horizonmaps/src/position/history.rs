//! Recent position history for heading and speed derivation.
//!
//! Fix sources such as browser geolocation often omit heading, and the map
//! marker still needs to point in the direction of travel. The history keeps
//! a short window of fixes and derives:
//!
//! - heading as the initial bearing from the oldest to the newest fix
//! - ground speed as distance over the timestamp span

use std::collections::VecDeque;

use super::Position;
use crate::geo;

/// Default maximum fixes to retain.
const DEFAULT_MAX_SAMPLES: usize = 10;

/// Minimum displacement for a reliable heading (meters).
///
/// GPS jitter while standing still is a few meters; below this the bearing
/// between fixes is noise.
const DEFAULT_MIN_HEADING_DISTANCE_M: f64 = 5.0;

/// Configuration for position history.
#[derive(Debug, Clone)]
pub struct PositionHistoryConfig {
    /// Maximum fixes to retain.
    pub max_samples: usize,
    /// Minimum displacement before a heading is reported.
    pub min_heading_distance_m: f64,
}

impl Default for PositionHistoryConfig {
    fn default() -> Self {
        Self {
            max_samples: DEFAULT_MAX_SAMPLES,
            min_heading_distance_m: DEFAULT_MIN_HEADING_DISTANCE_M,
        }
    }
}

/// Rolling window of recent fixes (oldest first).
#[derive(Debug)]
pub struct PositionHistory {
    samples: VecDeque<Position>,
    config: PositionHistoryConfig,
}

impl Default for PositionHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionHistory {
    /// Create a history with default configuration.
    pub fn new() -> Self {
        Self::with_config(PositionHistoryConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(config: PositionHistoryConfig) -> Self {
        Self {
            samples: VecDeque::with_capacity(config.max_samples),
            config,
        }
    }

    /// Record a fix.
    ///
    /// Fixes older than the newest recorded one are dropped; returns true if
    /// the fix was recorded.
    pub fn record(&mut self, position: Position) -> bool {
        if let Some(newest) = self.samples.back() {
            if position.timestamp_ms < newest.timestamp_ms {
                return false;
            }
        }

        self.samples.push_back(position);
        while self.samples.len() > self.config.max_samples {
            self.samples.pop_front();
        }
        true
    }

    /// Heading of travel in degrees (0-360, 0 = north).
    ///
    /// `None` with fewer than two fixes or when the window covers too little
    /// ground.
    pub fn heading_deg(&self) -> Option<f64> {
        let (oldest, newest) = self.endpoints()?;
        let (from, to) = (oldest.point(), newest.point());
        if geo::haversine_m(&from, &to) < self.config.min_heading_distance_m {
            return None;
        }
        Some(geo::initial_bearing_deg(&from, &to))
    }

    /// Average ground speed over the window in meters per second.
    pub fn speed_mps(&self) -> Option<f64> {
        let (oldest, newest) = self.endpoints()?;
        let span_ms = newest.timestamp_ms.checked_sub(oldest.timestamp_ms)?;
        if span_ms == 0 {
            return None;
        }
        let distance: f64 = self
            .samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .map(|(a, b)| geo::haversine_m(&a.point(), &b.point()))
            .sum();
        Some(distance / (span_ms as f64 / 1000.0))
    }

    /// Most recent fix.
    pub fn latest(&self) -> Option<&Position> {
        self.samples.back()
    }

    /// Number of fixes in the window.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Forget all fixes (new route, teleport, restart).
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    fn endpoints(&self) -> Option<(&Position, &Position)> {
        if self.samples.len() < 2 {
            return None;
        }
        Some((self.samples.front()?, self.samples.back()?))
    }
}
