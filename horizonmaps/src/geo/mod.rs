//! Geographic primitives and great-circle math.
//!
//! All distance comparisons in the guidance core go through [`haversine_m`],
//! which uses a spherical Earth of radius [`EARTH_RADIUS_M`]. Coordinates are
//! WGS84 degrees.

use std::fmt;

use serde::{Deserialize, Serialize};

mod projection;

pub use projection::{distance_to_segment_m, project_on_segment};

/// Mean Earth radius used for haversine distances (meters).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Valid latitude range (degrees).
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range (degrees).
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (MIN_LAT..=MAX_LAT).contains(&self.lat)
            && (MIN_LON..=MAX_LON).contains(&self.lon)
    }

    /// Initial bearing towards another point in degrees (0-360, 0 = north).
    #[inline]
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        initial_bearing_deg(self, other)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

/// Haversine distance between two points in meters.
pub fn haversine_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    // Clamp guards asin against rounding just above 1.0 for antipodal points
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Initial great-circle bearing from `a` to `b` in degrees (0-360).
pub fn initial_bearing_deg(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    normalize_bearing(y.atan2(x).to_degrees())
}

/// Normalize a bearing to the 0-360 range.
pub fn normalize_bearing(bearing: f64) -> f64 {
    ((bearing % 360.0) + 360.0) % 360.0
}

/// Point reached by travelling `distance_m` from `origin` on `bearing_deg`.
pub fn destination_point(origin: &GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    let angular = distance_m / EARTH_RADIUS_M;
    let bearing = bearing_deg.to_radians();
    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());

    GeoPoint {
        lat: lat2.to_degrees(),
        lon: ((lon2.to_degrees() + 540.0) % 360.0) - 180.0,
    }
}

/// Total length of a polyline in meters.
pub fn polyline_length_m(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| haversine_m(&w[0], &w[1])).sum()
}

/// Linear interpolation between two points (`t` in 0..=1).
///
/// Good enough for the short segments of a road polyline.
pub fn interpolate(a: &GeoPoint, b: &GeoPoint, t: f64) -> GeoPoint {
    let t = t.clamp(0.0, 1.0);
    GeoPoint {
        lat: a.lat + (b.lat - a.lat) * t,
        lon: a.lon + (b.lon - a.lon) * t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOGOTA_A: GeoPoint = GeoPoint::new(4.6531, -74.0837);
    const BOGOTA_B: GeoPoint = GeoPoint::new(4.6600, -74.0700);

    #[test]
    fn test_haversine_same_point_is_zero() {
        assert!(haversine_m(&BOGOTA_A, &BOGOTA_A).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_one_degree_latitude() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        let expected = EARTH_RADIUS_M * 1.0_f64.to_radians();
        assert!((haversine_m(&a, &b) - expected).abs() < 0.01);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let ab = haversine_m(&BOGOTA_A, &BOGOTA_B);
        let ba = haversine_m(&BOGOTA_B, &BOGOTA_A);
        assert!((ab - ba).abs() < 1e-6);
        // ~1.7 km across northern Bogota
        assert!(ab > 1_600.0 && ab < 1_800.0, "got {:.0} m", ab);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert!((origin.bearing_to(&GeoPoint::new(1.0, 0.0)) - 0.0).abs() < 0.1);
        assert!((origin.bearing_to(&GeoPoint::new(0.0, 1.0)) - 90.0).abs() < 0.1);
        assert!((origin.bearing_to(&GeoPoint::new(-1.0, 0.0)) - 180.0).abs() < 0.1);
        assert!((origin.bearing_to(&GeoPoint::new(0.0, -1.0)) - 270.0).abs() < 0.1);
    }

    #[test]
    fn test_normalize_bearing() {
        assert!((normalize_bearing(-90.0) - 270.0).abs() < 1e-9);
        assert!((normalize_bearing(450.0) - 90.0).abs() < 1e-9);
        assert!(normalize_bearing(360.0).abs() < 1e-9);
    }

    #[test]
    fn test_destination_point_distance_matches() {
        let dest = destination_point(&BOGOTA_A, 37.0, 500.0);
        assert!((haversine_m(&BOGOTA_A, &dest) - 500.0).abs() < 0.01);
        assert!((BOGOTA_A.bearing_to(&dest) - 37.0).abs() < 0.1);
    }

    #[test]
    fn test_polyline_length() {
        let line = [GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0), GeoPoint::new(0.0, 2.0)];
        let len = polyline_length_m(&line);
        assert!(len > 222_000.0 && len < 223_000.0, "got {:.0} m", len);
        assert_eq!(polyline_length_m(&line[..1]), 0.0);
    }

    #[test]
    fn test_point_validity() {
        assert!(BOGOTA_A.is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.5).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_interpolate_clamps() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(2.0, 4.0);
        assert_eq!(interpolate(&a, &b, 0.5), GeoPoint::new(1.0, 2.0));
        assert_eq!(interpolate(&a, &b, 2.0), b);
    }
}
