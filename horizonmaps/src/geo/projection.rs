//! Point-to-segment projection for cross-track distances.

use super::{haversine_m, GeoPoint};

/// Project `p` onto the segment `a`-`b`.
///
/// Uses a planar approximation scaled by the cosine of the mean latitude,
/// accurate for road-scale segments (under ~10 km).
pub fn project_on_segment(p: &GeoPoint, a: &GeoPoint, b: &GeoPoint) -> GeoPoint {
    let cos_lat = ((a.lat + b.lat) / 2.0).to_radians().cos();

    let dx = (b.lon - a.lon) * cos_lat;
    let dy = b.lat - a.lat;
    let px = (p.lon - a.lon) * cos_lat;
    let py = p.lat - a.lat;

    let seg_len_sq = dx * dx + dy * dy;
    if seg_len_sq < 1e-20 {
        return *a;
    }

    let t = ((px * dx + py * dy) / seg_len_sq).clamp(0.0, 1.0);

    GeoPoint {
        lat: a.lat + t * (b.lat - a.lat),
        lon: a.lon + t * (b.lon - a.lon),
    }
}

/// Distance in meters from `p` to the nearest point of segment `a`-`b`.
pub fn distance_to_segment_m(p: &GeoPoint, a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine_m(p, &project_on_segment(p, a, b))
}
