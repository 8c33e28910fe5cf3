//! Replay of a recorded track.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::sampler::{GeoSampler, SamplerError, SamplerEvent};
use super::Position;

/// Sampler that replays recorded fixes, preserving their relative timing.
///
/// Gaps between consecutive timestamps are divided by `speedup`, so a
/// 20-minute drive recorded at 1 Hz replays in one minute with `speedup = 20`.
pub struct ReplaySampler {
    fixes: Vec<Position>,
    speedup: f64,
    cancellation: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ReplaySampler {
    /// Create a replay of `fixes` at real time.
    pub fn new(fixes: Vec<Position>) -> Self {
        Self::with_speedup(fixes, 1.0)
    }

    /// Create a replay with a time compression factor.
    pub fn with_speedup(fixes: Vec<Position>, speedup: f64) -> Self {
        Self {
            fixes,
            speedup,
            cancellation: CancellationToken::new(),
            handle: None,
        }
    }

    /// Number of recorded fixes.
    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    /// Whether the recording is empty.
    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    fn gap(previous: &Position, next: &Position, speedup: f64) -> Duration {
        let ms = next.timestamp_ms.saturating_sub(previous.timestamp_ms);
        Duration::try_from_secs_f64(ms as f64 / 1000.0 / speedup).unwrap_or(Duration::MAX)
    }
}

impl GeoSampler for ReplaySampler {
    fn start(&mut self, sink: mpsc::Sender<SamplerEvent>) -> Result<(), SamplerError> {
        if self.is_running() {
            return Err(SamplerError::AlreadyRunning);
        }
        if self.fixes.is_empty() {
            return Err(SamplerError::Unavailable("recorded track is empty".to_string()));
        }
        if !(self.speedup.is_finite() && self.speedup > 0.0) {
            return Err(SamplerError::Unavailable(format!(
                "invalid replay speedup {}",
                self.speedup
            )));
        }

        self.cancellation = CancellationToken::new();
        let cancellation = self.cancellation.clone();
        let fixes = self.fixes.clone();
        let speedup = self.speedup;

        tracing::info!(fixes = fixes.len(), speedup = speedup, "Replay sampler started");

        self.handle = Some(tokio::spawn(async move {
            let mut previous: Option<Position> = None;
            for fix in fixes {
                if let Some(prev) = previous {
                    let wait = Self::gap(&prev, &fix, speedup);
                    tokio::select! {
                        biased;
                        _ = cancellation.cancelled() => return,
                        _ = tokio::time::sleep(wait) => {}
                    }
                } else if cancellation.is_cancelled() {
                    return;
                }

                if sink.send(SamplerEvent::Fix(fix)).await.is_err() {
                    return;
                }
                previous = Some(fix);
            }
            tracing::debug!("Replay sampler finished recording");
        }));

        Ok(())
    }

    fn stop(&mut self) {
        self.cancellation.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn name(&self) -> &'static str {
        "replay"
    }
}

impl Drop for ReplaySampler {
    fn drop(&mut self) {
        self.stop();
    }
}
