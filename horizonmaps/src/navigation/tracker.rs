//! Geofenced route progression.
//!
//! The [`ProgressTracker`] compares each live fix with the active route and
//! decides, without being told by the caller, whether the traveller reached
//! the current step, arrived, or left the route.
//!
//! # State Machine
//!
//! ```text
//! Idle --start--> Navigating --(final target within arrival radius)--> Arrived
//! Navigating --begin_reroute--> Rerouting --replace_route--> Navigating
//! Rerouting --cancel_reroute--> Navigating
//! any --stop--> Idle          any --fail--> Failed
//! ```
//!
//! # Per-fix decision
//!
//! 1. Not tracking → `NoChange`
//! 2. Distance to the current step target (haversine)
//! 3. Last step and inside arrival radius → `Arrived`
//! 4. Not last and inside step radius → advance one step
//! 5. Deviation from the polyline above threshold → `OffRoute`
//! 6. Otherwise `NoChange`
//!
//! The tracker never performs I/O. `OffRoute` is a signal; the caller fetches
//! a new route and hands it back through [`ProgressTracker::replace_route`].

use super::config::{OffRouteMetric, TrackerConfig};
use super::event::NavigationEvent;
use super::state::{NavigationState, NavigationStatus};
use crate::geo::haversine_m;
use crate::position::Position;
use crate::route::{RouteError, RouteModel, Step};

/// Route progression state machine.
///
/// # Example
///
/// ```
/// use horizonmaps::geo::GeoPoint;
/// use horizonmaps::navigation::{NavigationEvent, ProgressTracker};
/// use horizonmaps::position::Position;
/// use horizonmaps::route::{RouteModel, Step};
///
/// let a = GeoPoint::new(4.6531, -74.0837);
/// let b = GeoPoint::new(4.6600, -74.0700);
/// let route = RouteModel::new(
///     vec![a, b],
///     vec![Step::new(a, "Head northeast", 0.0), Step::new(b, "Arrive", 1700.0)],
/// );
///
/// let mut tracker = ProgressTracker::with_defaults();
/// tracker.start(route, Position::at(a, 0)).unwrap();
///
/// assert!(matches!(
///     tracker.on_position_update(&Position::at(a, 1_000)),
///     NavigationEvent::StepAdvanced { new_index: 1, .. }
/// ));
/// assert_eq!(
///     tracker.on_position_update(&Position::at(b, 2_000)),
///     NavigationEvent::Arrived
/// );
/// ```
#[derive(Debug)]
pub struct ProgressTracker {
    config: TrackerConfig,
    route: Option<RouteModel>,
    state: NavigationState,
    last_position: Option<Position>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ProgressTracker {
    /// Create a tracker with the given thresholds.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            route: None,
            state: NavigationState::default(),
            last_position: None,
        }
    }

    /// Create a tracker with default thresholds.
    pub fn with_defaults() -> Self {
        Self::new(TrackerConfig::default())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Begin guidance along `route` from `origin`.
    ///
    /// Resets to the first step. On error the previous state is kept.
    pub fn start(&mut self, route: RouteModel, origin: Position) -> Result<(), RouteError> {
        route.validate()?;

        tracing::info!(
            steps = route.step_count(),
            distance_m = format!("{:.0}", route.total_distance_m()),
            origin = %origin.point(),
            "Guidance started"
        );

        self.route = Some(route);
        self.state = NavigationState {
            current_step_index: 0,
            status: NavigationStatus::Navigating,
        };
        self.last_position = Some(origin);
        Ok(())
    }

    /// Swap in a freshly computed route and restart at its first step.
    ///
    /// Returns `Ok(false)` without touching state when guidance is Idle or
    /// Failed: the request that produced `route` outlived the guidance it was
    /// meant for. Invalid routes are rejected before that check, leaving state
    /// unchanged.
    pub fn replace_route(&mut self, route: RouteModel) -> Result<bool, RouteError> {
        route.validate()?;

        if matches!(
            self.state.status,
            NavigationStatus::Idle | NavigationStatus::Failed
        ) {
            tracing::debug!(
                status = %self.state.status,
                "Ignoring replacement route, guidance not active"
            );
            return Ok(false);
        }

        tracing::info!(
            from = %self.state.status,
            steps = route.step_count(),
            distance_m = format!("{:.0}", route.total_distance_m()),
            "Route replaced"
        );

        self.route = Some(route);
        self.state = NavigationState {
            current_step_index: 0,
            status: NavigationStatus::Navigating,
        };
        Ok(true)
    }

    /// End guidance. Further fixes report `NoChange`.
    pub fn stop(&mut self) {
        if self.state.status != NavigationStatus::Idle {
            tracing::info!(from = %self.state.status, "Guidance stopped");
        }
        self.state.status = NavigationStatus::Idle;
    }

    /// Mark that a replacement route has been requested.
    ///
    /// While rerouting, fixes keep advancing steps and detecting arrival on
    /// the stale route, but repeated `OffRoute` signals are suppressed.
    /// Returns false unless guidance was Navigating.
    pub fn begin_reroute(&mut self) -> bool {
        if self.state.status != NavigationStatus::Navigating {
            return false;
        }
        self.state.status = NavigationStatus::Rerouting;
        tracing::debug!("Reroute pending");
        true
    }

    /// Abandon a pending reroute and keep following the current route.
    pub fn cancel_reroute(&mut self) -> bool {
        if self.state.status != NavigationStatus::Rerouting {
            return false;
        }
        self.state.status = NavigationStatus::Navigating;
        tracing::debug!("Reroute cancelled, continuing on previous route");
        true
    }

    /// Give up on guidance. Terminal until the next `start`.
    pub fn fail(&mut self) {
        tracing::warn!(from = %self.state.status, "Guidance failed");
        self.state.status = NavigationStatus::Failed;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Per-fix evaluation
    // ─────────────────────────────────────────────────────────────────────────

    /// Evaluate one position fix.
    pub fn on_position_update(&mut self, position: &Position) -> NavigationEvent {
        if !self.state.status.is_tracking() {
            return NavigationEvent::NoChange;
        }
        let Some(route) = self.route.as_ref() else {
            return NavigationEvent::NoChange;
        };
        let Some(step) = route.step(self.state.current_step_index) else {
            return NavigationEvent::NoChange;
        };

        self.last_position = Some(*position);

        let point = position.point();
        let to_target = haversine_m(&point, &step.target);
        let is_last = Some(self.state.current_step_index) == route.last_index();

        if is_last {
            if to_target < self.config.arrival_radius_m {
                self.state.status = NavigationStatus::Arrived;
                tracing::info!(
                    step = self.state.current_step_index,
                    distance_m = format!("{:.1}", to_target),
                    "Arrived at destination"
                );
                return NavigationEvent::Arrived;
            }
        } else if to_target < self.config.step_radius_m {
            self.state.current_step_index += 1;
            let instruction = route
                .step(self.state.current_step_index)
                .map(|s| s.instruction.clone())
                .unwrap_or_default();
            tracing::info!(
                new_index = self.state.current_step_index,
                distance_m = format!("{:.1}", to_target),
                instruction = %instruction,
                "Step advanced"
            );
            return NavigationEvent::StepAdvanced {
                new_index: self.state.current_step_index,
                instruction,
            };
        }

        let deviation = match self.config.off_route_metric {
            OffRouteMetric::Vertex => route.nearest_vertex_distance_m(&point),
            OffRouteMetric::Segment => route.nearest_segment_distance_m(&point),
        };

        match deviation {
            Some(distance_m) if distance_m > self.config.off_route_threshold_m => {
                if self.state.status == NavigationStatus::Rerouting {
                    tracing::trace!(
                        distance_m = format!("{:.1}", distance_m),
                        "Still off route, reroute already pending"
                    );
                    return NavigationEvent::NoChange;
                }
                tracing::info!(
                    distance_m = format!("{:.1}", distance_m),
                    position = %point,
                    "Off route"
                );
                NavigationEvent::OffRoute { distance_m }
            }
            _ => NavigationEvent::NoChange,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Current progress snapshot.
    pub fn state(&self) -> NavigationState {
        self.state
    }

    /// Current status.
    pub fn status(&self) -> NavigationStatus {
        self.state.status
    }

    /// Index of the step being approached.
    pub fn current_step_index(&self) -> usize {
        self.state.current_step_index
    }

    /// Step being approached.
    pub fn current_step(&self) -> Option<&Step> {
        self.route.as_ref()?.step(self.state.current_step_index)
    }

    /// Active route, if guidance was ever started.
    pub fn route(&self) -> Option<&RouteModel> {
        self.route.as_ref()
    }

    /// Thresholds in use.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Most recent fix seen (or the start origin).
    pub fn last_position(&self) -> Option<&Position> {
        self.last_position.as_ref()
    }

    /// Distance left to travel from the last fix.
    ///
    /// Straight-line distance to the current target plus the reported length
    /// of every later step. Zero once arrived.
    pub fn remaining_distance_m(&self) -> Option<f64> {
        if self.state.status == NavigationStatus::Arrived {
            return Some(0.0);
        }
        let route = self.route.as_ref()?;
        let step = route.step(self.state.current_step_index)?;
        let here = self.last_position?.point();
        let later: f64 = route.steps()[self.state.current_step_index + 1..]
            .iter()
            .map(|s| s.distance_m)
            .sum();
        Some(haversine_m(&here, &step.target) + later)
    }
}
