//! Directions service abstraction.
//!
//! Route computation is delegated to an external directions service. The
//! [`RoutingClient`] trait is the seam: the guidance session asks it for a
//! route both for initial planning and for rerouting, and tests substitute
//! scripted clients.
//!
//! # Example
//!
//! ```ignore
//! use horizonmaps::routing::{HttpRoutingClient, RouteRequest, RoutingProfile};
//!
//! let client = HttpRoutingClient::from_config(config.directions())?;
//! let request = RouteRequest::new(origin, destination, RoutingProfile::Driving);
//! let route = client.route(&request).await?;
//! ```

mod directions;
mod http;
mod scripted;

pub use directions::{DirectionsConfig, HttpRoutingClient, DEFAULT_DIRECTIONS_BASE_URL};
pub use http::{AsyncHttpClient, AsyncReqwestClient};
pub use scripted::ScriptedRoutingClient;

#[cfg(test)]
pub(crate) use http::tests::MockAsyncHttpClient;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use thiserror::Error;

use crate::geo::GeoPoint;
use crate::route::{RouteError, RouteModel};

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Travel mode requested from the directions service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingProfile {
    #[default]
    Driving,
    Walking,
    Cycling,
}

impl RoutingProfile {
    /// Path segment used by the directions API.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingProfile::Driving => "driving",
            RoutingProfile::Walking => "walking",
            RoutingProfile::Cycling => "cycling",
        }
    }
}

impl fmt::Display for RoutingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutingProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "driving" => Ok(RoutingProfile::Driving),
            "walking" => Ok(RoutingProfile::Walking),
            "cycling" => Ok(RoutingProfile::Cycling),
            other => Err(format!(
                "unknown routing profile '{}' (expected driving, walking or cycling)",
                other
            )),
        }
    }
}

/// A directions request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub profile: RoutingProfile,
}

impl RouteRequest {
    /// Create a request.
    pub fn new(origin: GeoPoint, destination: GeoPoint, profile: RoutingProfile) -> Self {
        Self {
            origin,
            destination,
            profile,
        }
    }
}

/// Errors returned by routing clients.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    /// The service found no route between the points.
    #[error("No route found from {origin} to {destination}")]
    NoRouteFound {
        origin: GeoPoint,
        destination: GeoPoint,
    },

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with something we could not interpret.
    #[error("Invalid directions response: {0}")]
    InvalidResponse(String),

    /// The service returned a route that cannot be navigated.
    #[error(transparent)]
    InvalidRoute(#[from] RouteError),

    /// Client misconfiguration (missing access token, bad URL).
    #[error("Routing configuration error: {0}")]
    Config(String),
}

impl RoutingError {
    /// Whether this is the "no route" answer rather than a failure.
    pub fn is_no_route(&self) -> bool {
        matches!(self, RoutingError::NoRouteFound { .. })
    }
}

/// A directions service.
///
/// Uses `BoxFuture` so clients can be shared as `Arc<dyn RoutingClient>` and
/// called from spawned tasks.
pub trait RoutingClient: Send + Sync {
    /// Compute a route for `request`.
    fn route(&self, request: &RouteRequest) -> BoxFuture<'_, Result<RouteModel, RoutingError>>;

    /// Short name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_round_trip() {
        for profile in [RoutingProfile::Driving, RoutingProfile::Walking, RoutingProfile::Cycling] {
            assert_eq!(profile.as_str().parse::<RoutingProfile>(), Ok(profile));
        }
        assert!("flying".parse::<RoutingProfile>().is_err());
        assert_eq!(RoutingProfile::default(), RoutingProfile::Driving);
    }

    #[test]
    fn test_error_display() {
        let err = RoutingError::NoRouteFound {
            origin: GeoPoint::new(1.0, 2.0),
            destination: GeoPoint::new(3.0, 4.0),
        };
        assert!(err.is_no_route());
        assert!(err.to_string().contains("No route found"));

        let err: RoutingError = RouteError::NoSteps.into();
        assert!(!err.is_no_route());
        assert!(err.to_string().contains("no steps"));
    }
}
