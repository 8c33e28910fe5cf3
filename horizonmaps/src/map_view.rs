//! Map display seam.
//!
//! Rendering is external. The session pushes the user marker after every
//! accepted fix and the route polyline whenever the route changes.

use std::sync::Mutex;

use crate::geo::GeoPoint;
use crate::position::Position;

/// Receives marker and polyline updates.
pub trait MapView: Send + Sync {
    /// Move the user marker. `heading_deg` is present once enough movement
    /// has been observed to derive one.
    fn update_marker(&self, position: &Position, heading_deg: Option<f64>);

    /// Replace the drawn route line.
    fn replace_polyline(&self, points: &[GeoPoint]);
}

/// Logs map updates at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMapView;

impl MapView for TracingMapView {
    fn update_marker(&self, position: &Position, heading_deg: Option<f64>) {
        tracing::debug!(
            position = %position.point(),
            heading = heading_deg.map(|h| format!("{:.0}", h)).unwrap_or_default(),
            "Marker moved"
        );
    }

    fn replace_polyline(&self, points: &[GeoPoint]) {
        tracing::debug!(vertices = points.len(), "Route line replaced");
    }
}

/// Remembers what would have been drawn.
#[derive(Debug, Default)]
pub struct RecordingMapView {
    markers: Mutex<Vec<(Position, Option<f64>)>>,
    polylines: Mutex<Vec<Vec<GeoPoint>>>,
}

impl RecordingMapView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marker updates, in order.
    pub fn markers(&self) -> Vec<(Position, Option<f64>)> {
        self.markers.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Polylines drawn, in order.
    pub fn polylines(&self) -> Vec<Vec<GeoPoint>> {
        self.polylines.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// The line currently on screen.
    pub fn current_polyline(&self) -> Option<Vec<GeoPoint>> {
        self.polylines().pop()
    }
}

impl MapView for RecordingMapView {
    fn update_marker(&self, position: &Position, heading_deg: Option<f64>) {
        if let Ok(mut markers) = self.markers.lock() {
            markers.push((*position, heading_deg));
        }
    }

    fn replace_polyline(&self, points: &[GeoPoint]) {
        if let Ok(mut polylines) = self.polylines.lock() {
            polylines.push(points.to_vec());
        }
    }
}
