//! Progress tracker thresholds.

use std::fmt;
use std::str::FromStr;

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Default radius around an intermediate step target that counts as reached.
pub const DEFAULT_STEP_RADIUS_M: f64 = 30.0;

/// Default radius around the final step target that counts as arrival.
pub const DEFAULT_ARRIVAL_RADIUS_M: f64 = 30.0;

/// Default deviation from the polyline that signals off-route.
pub const DEFAULT_OFF_ROUTE_THRESHOLD_M: f64 = 50.0;

// ─────────────────────────────────────────────────────────────────────────────
// Off-route metric
// ─────────────────────────────────────────────────────────────────────────────

/// How deviation from the route polyline is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffRouteMetric {
    /// Distance to the nearest polyline vertex.
    ///
    /// Directions services emit dense polylines, so vertex spacing is usually
    /// well under the off-route threshold.
    #[default]
    Vertex,

    /// Perpendicular distance to the nearest polyline segment.
    ///
    /// Tolerates sparse polylines with long straight segments.
    Segment,
}

impl OffRouteMetric {
    /// Config-file spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            OffRouteMetric::Vertex => "vertex",
            OffRouteMetric::Segment => "segment",
        }
    }
}

impl fmt::Display for OffRouteMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OffRouteMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vertex" => Ok(OffRouteMetric::Vertex),
            "segment" => Ok(OffRouteMetric::Segment),
            other => Err(format!(
                "unknown off-route metric '{}' (expected vertex or segment)",
                other
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tracker config
// ─────────────────────────────────────────────────────────────────────────────

/// Thresholds used by the progress tracker.
///
/// All comparisons are strict: a fix exactly on a boundary has not yet
/// reached the step and is not yet off route.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Radius for advancing past an intermediate step (meters).
    pub step_radius_m: f64,

    /// Radius for arriving at the final step (meters).
    pub arrival_radius_m: f64,

    /// Deviation beyond which the traveller is off route (meters).
    pub off_route_threshold_m: f64,

    /// Deviation measurement.
    pub off_route_metric: OffRouteMetric,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            step_radius_m: DEFAULT_STEP_RADIUS_M,
            arrival_radius_m: DEFAULT_ARRIVAL_RADIUS_M,
            off_route_threshold_m: DEFAULT_OFF_ROUTE_THRESHOLD_M,
            off_route_metric: OffRouteMetric::Vertex,
        }
    }
}

impl TrackerConfig {
    /// Set the step radius.
    pub fn with_step_radius_m(mut self, meters: f64) -> Self {
        self.step_radius_m = meters;
        self
    }

    /// Set the arrival radius.
    pub fn with_arrival_radius_m(mut self, meters: f64) -> Self {
        self.arrival_radius_m = meters;
        self
    }

    /// Set the off-route threshold.
    pub fn with_off_route_threshold_m(mut self, meters: f64) -> Self {
        self.off_route_threshold_m = meters;
        self
    }

    /// Set the off-route metric.
    pub fn with_off_route_metric(mut self, metric: OffRouteMetric) -> Self {
        self.off_route_metric = metric;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.step_radius_m, 30.0);
        assert_eq!(config.arrival_radius_m, 30.0);
        assert_eq!(config.off_route_threshold_m, 50.0);
        assert_eq!(config.off_route_metric, OffRouteMetric::Vertex);
    }

    #[test]
    fn test_builder() {
        let config = TrackerConfig::default()
            .with_step_radius_m(25.0)
            .with_arrival_radius_m(20.0)
            .with_off_route_threshold_m(40.0)
            .with_off_route_metric(OffRouteMetric::Segment);
        assert_eq!(config.step_radius_m, 25.0);
        assert_eq!(config.arrival_radius_m, 20.0);
        assert_eq!(config.off_route_threshold_m, 40.0);
        assert_eq!(config.off_route_metric, OffRouteMetric::Segment);
    }

    #[test]
    fn test_metric_parse() {
        assert_eq!("vertex".parse::<OffRouteMetric>(), Ok(OffRouteMetric::Vertex));
        assert_eq!(" Segment ".parse::<OffRouteMetric>(), Ok(OffRouteMetric::Segment));
        assert!("nearest".parse::<OffRouteMetric>().is_err());
        assert_eq!(OffRouteMetric::Segment.to_string(), "segment");
    }
}
