//! Mapbox-Directions-style HTTP routing client.
//!
//! # Request
//!
//! ```text
//! GET {base_url}/directions/v5/mapbox/{profile}/{lon},{lat};{lon},{lat}
//!     ?steps=true&geometries=geojson&overview=full&language={lang}&access_token={token}
//! ```
//!
//! # Response (abridged)
//!
//! ```json
//! {
//!   "code": "Ok",
//!   "routes": [{
//!     "geometry": { "coordinates": [[-74.0837, 4.6531], [-74.0700, 4.6600]] },
//!     "legs": [{ "steps": [{
//!       "distance": 1700.0,
//!       "maneuver": { "location": [-74.0837, 4.6531], "instruction": "Head northeast" }
//!     }]}]
//!   }]
//! }
//! ```
//!
//! Errors without a routing verdict (bad token, quota) carry only
//! `{"message": ...}`.
//!
//! Coordinates are `[lon, lat]` on the wire. Each step's maneuver location
//! becomes the step target; steps from all legs are flattened in order.

use reqwest::Url;
use serde::Deserialize;

use super::http::{AsyncHttpClient, AsyncReqwestClient};
use super::{BoxFuture, RouteRequest, RoutingClient, RoutingError};
use crate::geo::GeoPoint;
use crate::route::{RouteModel, Step};

/// Default directions endpoint.
pub const DEFAULT_DIRECTIONS_BASE_URL: &str = "https://api.mapbox.com";

/// Settings for the HTTP routing client.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsConfig {
    /// Scheme and host of the directions API, without trailing slash.
    pub base_url: String,
    /// API access token.
    pub access_token: String,
    /// Language tag for instruction text.
    pub language: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DIRECTIONS_BASE_URL.to_string(),
            access_token: String::new(),
            language: "en".to_string(),
            timeout_secs: 10,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<WireRoute>,
}

#[derive(Debug, Deserialize)]
struct WireRoute {
    geometry: WireGeometry,
    #[serde(default)]
    legs: Vec<WireLeg>,
}

#[derive(Debug, Deserialize)]
struct WireGeometry {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct WireLeg {
    #[serde(default)]
    steps: Vec<WireStep>,
}

#[derive(Debug, Deserialize)]
struct WireStep {
    #[serde(default)]
    distance: f64,
    maneuver: WireManeuver,
}

#[derive(Debug, Deserialize)]
struct WireManeuver {
    location: [f64; 2],
    #[serde(default)]
    instruction: String,
}

fn lon_lat(pair: [f64; 2]) -> GeoPoint {
    GeoPoint::new(pair[1], pair[0])
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Routing client backed by an HTTP directions API.
pub struct HttpRoutingClient<C: AsyncHttpClient = AsyncReqwestClient> {
    http: C,
    config: DirectionsConfig,
}

impl HttpRoutingClient<AsyncReqwestClient> {
    /// Create a reqwest-backed client.
    pub fn from_config(config: DirectionsConfig) -> Result<Self, RoutingError> {
        if config.access_token.trim().is_empty() {
            return Err(RoutingError::Config(
                "directions access token is not set (routing.access_token)".to_string(),
            ));
        }
        let http = AsyncReqwestClient::with_timeout(config.timeout_secs)?;
        Ok(Self::with_http_client(http, config))
    }
}

impl<C: AsyncHttpClient> HttpRoutingClient<C> {
    /// Create a client over any HTTP implementation.
    pub fn with_http_client(http: C, config: DirectionsConfig) -> Self {
        Self { http, config }
    }

    /// Build the request URL. Query values are percent-encoded.
    pub fn request_url(&self, request: &RouteRequest) -> Result<Url, RoutingError> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!(
            "{}/directions/v5/mapbox/{}/{:.6},{:.6};{:.6},{:.6}",
            base,
            request.profile,
            request.origin.lon,
            request.origin.lat,
            request.destination.lon,
            request.destination.lat,
        ))
        .map_err(|e| RoutingError::Config(format!("invalid base URL '{}': {}", base, e)))?;

        url.query_pairs_mut()
            .append_pair("steps", "true")
            .append_pair("geometries", "geojson")
            .append_pair("overview", "full")
            .append_pair("language", &self.config.language)
            .append_pair("access_token", &self.config.access_token);
        Ok(url)
    }

    /// Turn a response body into a route.
    fn parse_response(body: &[u8], request: &RouteRequest) -> Result<RouteModel, RoutingError> {
        let response: DirectionsResponse = serde_json::from_slice(body)
            .map_err(|e| RoutingError::InvalidResponse(format!("malformed JSON: {}", e)))?;

        match response.code.as_deref() {
            Some("Ok") => {}
            Some("NoRoute" | "NoSegment") => {
                return Err(RoutingError::NoRouteFound {
                    origin: request.origin,
                    destination: request.destination,
                })
            }
            Some(other) => {
                return Err(RoutingError::InvalidResponse(format!(
                    "service answered {}: {}",
                    other,
                    response.message.unwrap_or_default()
                )))
            }
            None => {
                return Err(RoutingError::InvalidResponse(format!(
                    "service error: {}",
                    response
                        .message
                        .unwrap_or_else(|| "no code or message in response".to_string())
                )))
            }
        }

        let Some(route) = response.routes.into_iter().next() else {
            return Err(RoutingError::NoRouteFound {
                origin: request.origin,
                destination: request.destination,
            });
        };

        let steps: Vec<Step> = route
            .legs
            .into_iter()
            .flat_map(|leg| leg.steps)
            .map(|s| Step::new(lon_lat(s.maneuver.location), s.maneuver.instruction, s.distance))
            .collect();

        let mut polyline: Vec<GeoPoint> =
            route.geometry.coordinates.into_iter().map(lon_lat).collect();
        if polyline.is_empty() {
            polyline = steps.iter().map(|s| s.target).collect();
        }

        let model = RouteModel::new(polyline, steps);
        model.validate()?;
        Ok(model)
    }
}

impl<C: AsyncHttpClient> RoutingClient for HttpRoutingClient<C> {
    fn route(&self, request: &RouteRequest) -> BoxFuture<'_, Result<RouteModel, RoutingError>> {
        let request = request.clone();
        Box::pin(async move {
            tracing::debug!(
                origin = %request.origin,
                destination = %request.destination,
                profile = %request.profile,
                "Requesting directions"
            );

            let url = self.request_url(&request)?;
            let body = self.http.get(url.as_str()).await?;
            let route = Self::parse_response(&body, &request)?;

            tracing::info!(
                steps = route.step_count(),
                vertices = route.polyline().len(),
                distance_m = format!("{:.0}", route.total_distance_m()),
                "Directions received"
            );
            Ok(route)
        })
    }

    fn name(&self) -> &'static str {
        "http-directions"
    }
}
