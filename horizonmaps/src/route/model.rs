//! Route and step types.

use serde::{Deserialize, Serialize};

use super::RouteError;
use crate::geo::{self, GeoPoint};

/// One maneuver of a planned route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Location the traveller must reach to complete this maneuver.
    pub target: GeoPoint,
    /// Human-readable instruction ("Turn left onto Calle 26").
    pub instruction: String,
    /// Length of the maneuver segment in meters.
    pub distance_m: f64,
}

impl Step {
    /// Create a new step.
    pub fn new(target: GeoPoint, instruction: impl Into<String>, distance_m: f64) -> Self {
        Self {
            target,
            instruction: instruction.into(),
            distance_m,
        }
    }
}

/// Immutable snapshot of a planned path.
///
/// # Example
///
/// ```
/// use horizonmaps::geo::GeoPoint;
/// use horizonmaps::route::{RouteModel, Step};
///
/// let a = GeoPoint::new(4.6531, -74.0837);
/// let b = GeoPoint::new(4.6600, -74.0700);
/// let route = RouteModel::new(
///     vec![a, b],
///     vec![Step::new(a, "Head northeast", 0.0), Step::new(b, "Arrive", 1700.0)],
/// );
///
/// assert!(route.validate().is_ok());
/// assert_eq!(route.destination(), Some(b));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteModel {
    polyline: Vec<GeoPoint>,
    steps: Vec<Step>,
}

impl RouteModel {
    /// Create a route from its polyline and steps.
    ///
    /// Construction does not validate; the tracker validates on
    /// `start`/`replace_route` so a bad route never becomes active.
    pub fn new(polyline: Vec<GeoPoint>, steps: Vec<Step>) -> Self {
        Self { polyline, steps }
    }

    /// Check the route can be navigated.
    pub fn validate(&self) -> Result<(), RouteError> {
        if self.steps.is_empty() {
            return Err(RouteError::NoSteps);
        }
        if self.polyline.is_empty() {
            return Err(RouteError::EmptyPolyline);
        }
        let invalid = self
            .polyline
            .iter()
            .chain(self.steps.iter().map(|s| &s.target))
            .find(|p| !p.is_valid());
        if let Some(point) = invalid {
            return Err(RouteError::InvalidCoordinate { point: *point });
        }
        Ok(())
    }

    /// Ordered polyline vertices.
    pub fn polyline(&self) -> &[GeoPoint] {
        &self.polyline
    }

    /// Ordered maneuver steps.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Step at `index`, if any.
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Number of steps.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Index of the final step.
    pub fn last_index(&self) -> Option<usize> {
        self.steps.len().checked_sub(1)
    }

    /// Target of the final step.
    pub fn destination(&self) -> Option<GeoPoint> {
        self.steps.last().map(|s| s.target)
    }

    /// Sum of the per-step distances reported by the directions service.
    pub fn total_distance_m(&self) -> f64 {
        self.steps.iter().map(|s| s.distance_m).sum()
    }

    /// Geometric length of the polyline.
    pub fn polyline_length_m(&self) -> f64 {
        geo::polyline_length_m(&self.polyline)
    }

    /// Distance from `point` to the nearest polyline vertex.
    ///
    /// Linear scan; polylines are bounded and samples arrive at most a few
    /// times per second.
    pub fn nearest_vertex_distance_m(&self, point: &GeoPoint) -> Option<f64> {
        self.polyline
            .iter()
            .map(|v| geo::haversine_m(point, v))
            .min_by(f64::total_cmp)
    }

    /// Distance from `point` to the nearest polyline segment.
    ///
    /// A single-vertex polyline degrades to the vertex distance.
    pub fn nearest_segment_distance_m(&self, point: &GeoPoint) -> Option<f64> {
        if self.polyline.len() < 2 {
            return self.nearest_vertex_distance_m(point);
        }
        self.polyline
            .windows(2)
            .map(|w| geo::distance_to_segment_m(point, &w[0], &w[1]))
            .min_by(f64::total_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_step_route() -> RouteModel {
        let a = GeoPoint::new(4.6531, -74.0837);
        let b = GeoPoint::new(4.6600, -74.0700);
        RouteModel::new(
            vec![a, b],
            vec![
                Step::new(a, "Head northeast on Avenida 68", 0.0),
                Step::new(b, "You have arrived", 1_700.0),
            ],
        )
    }

    #[test]
    fn test_validate_accepts_well_formed_route() {
        assert_eq!(two_step_route().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_empty_steps() {
        let route = RouteModel::new(vec![GeoPoint::new(0.0, 0.0)], vec![]);
        assert_eq!(route.validate(), Err(RouteError::NoSteps));
    }

    #[test]
    fn test_validate_rejects_empty_polyline() {
        let route = RouteModel::new(vec![], vec![Step::new(GeoPoint::new(0.0, 0.0), "x", 0.0)]);
        assert_eq!(route.validate(), Err(RouteError::EmptyPolyline));
    }

    #[test]
    fn test_validate_rejects_out_of_range_target() {
        let bad = GeoPoint::new(123.0, 0.0);
        let route = RouteModel::new(vec![GeoPoint::new(0.0, 0.0)], vec![Step::new(bad, "x", 0.0)]);
        assert_eq!(route.validate(), Err(RouteError::InvalidCoordinate { point: bad }));
    }

    #[test]
    fn test_accessors() {
        let route = two_step_route();
        assert_eq!(route.step_count(), 2);
        assert_eq!(route.last_index(), Some(1));
        assert_eq!(route.destination(), Some(GeoPoint::new(4.6600, -74.0700)));
        assert!((route.total_distance_m() - 1_700.0).abs() < 1e-9);
        assert!(route.step(2).is_none());
    }

    #[test]
    fn test_nearest_vertex_vs_segment() {
        let route = two_step_route();
        let a = route.polyline()[0];
        let b = route.polyline()[1];
        let mid = geo::interpolate(&a, &b, 0.5);

        let vertex = route.nearest_vertex_distance_m(&mid).unwrap();
        let segment = route.nearest_segment_distance_m(&mid).unwrap();
        assert!(segment < 1.0, "midpoint lies on the line, got {segment}");
        assert!(vertex > 800.0, "midpoint is ~850 m from either vertex, got {vertex}");
    }

    #[test]
    fn test_json_shape() {
        let route = two_step_route();
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["steps"][1]["instruction"], "You have arrived");
        assert_eq!(json["polyline"][0]["lat"], 4.6531);
    }
}
