//! Simulated drive along a polyline.
//!
//! Used for demo guidance and for exercising the tracker without hardware.
//! The sampler advances a fixed distance per tick (`speed × interval`) and
//! interpolates the fix between polyline vertices. An optional lateral offset
//! shifts every fix to the right of travel, which forces off-route scenarios.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::sampler::{GeoSampler, SamplerError, SamplerEvent};
use super::{now_ms, Position};
use crate::geo::{self, GeoPoint};

/// Default simulated speed: 50 km/h.
pub const DEFAULT_SIMULATION_SPEED_MPS: f64 = 13.9;

/// Default interval between simulated fixes.
pub const DEFAULT_SIMULATION_INTERVAL: Duration = Duration::from_millis(1000);

/// Simulation parameters.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Travel speed in meters per second.
    pub speed_mps: f64,
    /// Wall-clock time between fixes.
    pub interval: Duration,
    /// Perpendicular offset to the right of travel (meters, negative = left).
    pub lateral_offset_m: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speed_mps: DEFAULT_SIMULATION_SPEED_MPS,
            interval: DEFAULT_SIMULATION_INTERVAL,
            lateral_offset_m: 0.0,
        }
    }
}

impl SimulationConfig {
    /// Distance covered between two fixes.
    pub fn step_distance_m(&self) -> f64 {
        self.speed_mps * self.interval.as_secs_f64()
    }

    /// Check that the drive can make progress.
    pub fn validate(&self) -> Result<(), SamplerError> {
        let step = self.step_distance_m();
        if !(self.speed_mps.is_finite() && self.speed_mps > 0.0) || !(step.is_finite() && step > 0.0)
        {
            return Err(SamplerError::Unavailable(format!(
                "invalid simulation speed {} m/s every {:?}",
                self.speed_mps, self.interval
            )));
        }
        Ok(())
    }
}

/// Polyline with cumulative distances for position lookup.
#[derive(Debug, Clone)]
pub(crate) struct SimulatedTrack {
    points: Vec<GeoPoint>,
    /// `cumulative[i]` = distance from the first vertex to vertex `i`.
    cumulative: Vec<f64>,
    lateral_offset_m: f64,
}

impl SimulatedTrack {
    pub(crate) fn new(points: Vec<GeoPoint>, lateral_offset_m: f64) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                total += geo::haversine_m(&points[i - 1], p);
            }
            cumulative.push(total);
        }
        Self {
            points,
            cumulative,
            lateral_offset_m,
        }
    }

    pub(crate) fn length_m(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Location after travelling `distance_m` from the first vertex.
    pub(crate) fn point_at(&self, distance_m: f64) -> Option<GeoPoint> {
        let first = *self.points.first()?;
        if self.points.len() == 1 {
            return Some(first);
        }

        let distance_m = distance_m.clamp(0.0, self.length_m());
        // First vertex whose cumulative distance reaches the target
        let upper = self
            .cumulative
            .iter()
            .position(|&c| c >= distance_m)
            .unwrap_or(self.points.len() - 1)
            .max(1);
        let (a, b) = (self.points[upper - 1], self.points[upper]);
        let seg_len = self.cumulative[upper] - self.cumulative[upper - 1];
        let t = if seg_len > 0.0 {
            (distance_m - self.cumulative[upper - 1]) / seg_len
        } else {
            1.0
        };
        let on_track = geo::interpolate(&a, &b, t);

        if self.lateral_offset_m == 0.0 {
            return Some(on_track);
        }
        let right = a.bearing_to(&b) + 90.0;
        Some(geo::destination_point(
            &on_track,
            right,
            self.lateral_offset_m,
        ))
    }
}

/// Sampler that drives along a polyline at constant speed.
pub struct SimulatedSampler {
    track: SimulatedTrack,
    config: SimulationConfig,
    cancellation: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SimulatedSampler {
    /// Create a sampler for `polyline`.
    pub fn new(polyline: Vec<GeoPoint>, config: SimulationConfig) -> Self {
        Self {
            track: SimulatedTrack::new(polyline, config.lateral_offset_m),
            config,
            cancellation: CancellationToken::new(),
            handle: None,
        }
    }

    /// Estimated time to drive the whole polyline.
    ///
    /// `Duration::ZERO` for an unusable speed, saturating at `Duration::MAX`.
    pub fn estimated_duration(&self) -> Duration {
        let speed = self.config.speed_mps;
        if !(speed.is_finite() && speed > 0.0) {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.track.length_m() / speed).unwrap_or(Duration::MAX)
    }
}

impl GeoSampler for SimulatedSampler {
    fn start(&mut self, sink: mpsc::Sender<SamplerEvent>) -> Result<(), SamplerError> {
        if self.is_running() {
            return Err(SamplerError::AlreadyRunning);
        }
        if self.track.points.is_empty() {
            return Err(SamplerError::Unavailable(
                "simulation polyline is empty".to_string(),
            ));
        }
        self.config.validate()?;

        self.cancellation = CancellationToken::new();
        let cancellation = self.cancellation.clone();
        let track = self.track.clone();
        let interval = self.config.interval;
        let step = self.config.step_distance_m();

        tracing::info!(
            length_m = format!("{:.0}", track.length_m()),
            speed_mps = self.config.speed_mps,
            interval_ms = interval.as_millis() as u64,
            lateral_offset_m = self.config.lateral_offset_m,
            "Simulated sampler started"
        );

        self.handle = Some(tokio::spawn(async move {
            let start_ms = now_ms();
            let interval_ms = interval.as_millis() as u64;
            let mut ticker = tokio::time::interval(interval);
            let mut travelled = 0.0_f64;
            let mut tick: u64 = 0;

            loop {
                tokio::select! {
                    biased;
                    _ = cancellation.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let Some(point) = track.point_at(travelled) else { break };
                let fix = Position::at(point, start_ms + tick * interval_ms);
                if sink.send(SamplerEvent::Fix(fix)).await.is_err() {
                    break;
                }

                if travelled >= track.length_m() {
                    tracing::debug!("Simulated sampler reached end of track");
                    break;
                }
                travelled = (travelled + step).min(track.length_m());
                tick += 1;
            }
        }));

        Ok(())
    }

    fn stop(&mut self) {
        self.cancellation.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("Simulated sampler stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

impl Drop for SimulatedSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_line() -> Vec<GeoPoint> {
        // ~111 m per 0.001° of latitude
        vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.001, 0.0), GeoPoint::new(0.002, 0.0)]
    }

    #[test]
    fn test_track_length_and_endpoints() {
        let track = SimulatedTrack::new(straight_line(), 0.0);
        assert!((track.length_m() - 222.4).abs() < 0.5);
        assert_eq!(track.point_at(0.0), Some(GeoPoint::new(0.0, 0.0)));
        assert_eq!(track.point_at(1e9), Some(GeoPoint::new(0.002, 0.0)));
    }

    #[test]
    fn test_track_interpolates_within_segment() {
        let track = SimulatedTrack::new(straight_line(), 0.0);
        let p = track.point_at(track.length_m() * 0.75).unwrap();
        assert!((p.lat - 0.0015).abs() < 1e-6);
    }

    #[test]
    fn test_track_lateral_offset() {
        let track = SimulatedTrack::new(straight_line(), 100.0);
        let p = track.point_at(50.0).unwrap();
        let on_line = SimulatedTrack::new(straight_line(), 0.0).point_at(50.0).unwrap();
        assert!((geo::haversine_m(&p, &on_line) - 100.0).abs() < 0.5);
        // Heading north, right is east
        assert!(p.lon > 0.0);
    }

    #[test]
    fn test_estimated_duration() {
        let sampler = SimulatedSampler::new(
            straight_line(),
            SimulationConfig {
                speed_mps: 10.0,
                ..Default::default()
            },
        );
        let secs = sampler.estimated_duration().as_secs_f64();
        assert!((secs - 22.24).abs() < 0.1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampler_emits_fixes_until_end() {
        let mut sampler = SimulatedSampler::new(
            straight_line(),
            SimulationConfig {
                speed_mps: 100.0,
                interval: Duration::from_millis(100),
                lateral_offset_m: 0.0,
            },
        );
        let (tx, mut rx) = mpsc::channel(16);
        sampler.start(tx).unwrap();

        let mut fixes = Vec::new();
        while let Some(event) = rx.recv().await {
            match event {
                SamplerEvent::Fix(p) => fixes.push(p),
                SamplerEvent::Failed(e) => panic!("unexpected failure {e}"),
            }
        }

        // 10 m per tick over ~222 m → 24 fixes including both ends
        assert_eq!(fixes.len(), 24);
        assert_eq!(fixes.first().unwrap().point(), GeoPoint::new(0.0, 0.0));
        assert_eq!(fixes.last().unwrap().point(), GeoPoint::new(0.002, 0.0));
        assert!(fixes.windows(2).all(|w| w[1].timestamp_ms - w[0].timestamp_ms == 100));
    }

    #[test]
    fn test_estimated_duration_unusable_speed() {
        let estimate = |speed_mps: f64| {
            SimulatedSampler::new(
                straight_line(),
                SimulationConfig {
                    speed_mps,
                    ..Default::default()
                },
            )
            .estimated_duration()
        };
        assert_eq!(estimate(f64::NAN), Duration::ZERO);
        assert_eq!(estimate(-5.0), Duration::ZERO);
        assert_eq!(estimate(f64::INFINITY), Duration::ZERO);
        assert_eq!(estimate(1e-300), Duration::MAX);
    }

    #[test]
    fn test_config_validate() {
        assert!(SimulationConfig::default().validate().is_ok());
        for speed_mps in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = SimulationConfig {
                speed_mps,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "speed {speed_mps} accepted");
        }
        let zero_interval = SimulationConfig {
            interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(zero_interval.validate().is_err());
    }

    #[tokio::test]
    async fn test_sampler_rejects_nan_speed() {
        let mut sampler = SimulatedSampler::new(
            straight_line(),
            SimulationConfig {
                speed_mps: f64::NAN,
                ..Default::default()
            },
        );
        let (tx, _rx) = mpsc::channel(1);
        assert!(matches!(sampler.start(tx), Err(SamplerError::Unavailable(_))));
        assert!(!sampler.is_running());
    }

    #[tokio::test]
    async fn test_sampler_rejects_empty_polyline() {
        let mut sampler = SimulatedSampler::new(vec![], SimulationConfig::default());
        let (tx, _rx) = mpsc::channel(1);
        assert!(matches!(sampler.start(tx), Err(SamplerError::Unavailable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampler_stop() {
        let mut sampler = SimulatedSampler::new(straight_line(), SimulationConfig::default());
        let (tx, mut rx) = mpsc::channel(16);
        sampler.start(tx).unwrap();
        assert!(sampler.is_running());

        let first = rx.recv().await;
        assert!(matches!(first, Some(SamplerEvent::Fix(_))));

        sampler.stop();
        assert!(!sampler.is_running());
        // Channel closes once the task is gone
        while rx.recv().await.is_some() {}
    }
}
