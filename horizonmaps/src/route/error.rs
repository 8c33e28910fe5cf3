//! Route validation errors.

use thiserror::Error;

use crate::geo::GeoPoint;

/// A route that cannot be navigated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// The route has no maneuver steps.
    #[error("Invalid route: route has no steps")]
    NoSteps,

    /// The route has no polyline vertices to check deviation against.
    #[error("Invalid route: polyline is empty")]
    EmptyPolyline,

    /// A step target or polyline vertex lies outside WGS84 ranges.
    #[error("Invalid route: coordinate {point} is out of range")]
    InvalidCoordinate { point: GeoPoint },
}
