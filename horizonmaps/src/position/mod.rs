//! Live position fixes and the sources that produce them.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐  SamplerEvent   ┌──────────────────┐
//! │  GeoSampler    │ ──────────────► │ GuidanceSession  │
//! │ (own task +    │   (mpsc)        │  PositionHistory │
//! │  cancel token) │                 │  ProgressTracker │
//! └────────────────┘                 └──────────────────┘
//! ```
//!
//! Samplers own their background task and stop it through a
//! `CancellationToken`; nothing about the source lives in module-level state.

mod history;
mod replay;
mod sampler;
mod simulated;

pub use history::{PositionHistory, PositionHistoryConfig};
pub use replay::ReplaySampler;
pub use sampler::{GeoSampler, SamplerError, SamplerEvent, DEFAULT_SAMPLER_CHANNEL_CAPACITY};
pub use simulated::{SimulatedSampler, SimulationConfig};

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// A timestamped position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Fix time in milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

impl Position {
    /// Create a fix with an explicit timestamp.
    pub fn new(latitude: f64, longitude: f64, timestamp_ms: u64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp_ms,
        }
    }

    /// Create a fix stamped with the current wall-clock time.
    pub fn now(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, now_ms())
    }

    /// Create a fix at `point` stamped with `timestamp_ms`.
    pub fn at(point: GeoPoint, timestamp_ms: u64) -> Self {
        Self::new(point.lat, point.lon, timestamp_ms)
    }

    /// The fix location.
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
