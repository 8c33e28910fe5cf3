//! Position source abstraction.

use thiserror::Error;
use tokio::sync::mpsc;

use super::Position;

/// Default capacity of the channel between a sampler and its consumer.
pub const DEFAULT_SAMPLER_CHANNEL_CAPACITY: usize = 64;

/// Failures reported by a position source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplerError {
    /// The user or platform refused location access.
    #[error("Location permission denied")]
    PermissionDenied,

    /// No fix arrived within the allowed time.
    #[error("Timed out waiting for a position fix")]
    Timeout,

    /// The source could not produce fixes.
    #[error("Position source unavailable: {0}")]
    Unavailable(String),

    /// `start` was called on a sampler that is already running.
    #[error("Position source already running")]
    AlreadyRunning,
}

/// Item delivered by a sampler.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplerEvent {
    /// A new position fix.
    Fix(Position),
    /// The source failed; no further fixes will follow.
    Failed(SamplerError),
}

/// A continuous position-reporting source with an explicit lifecycle.
///
/// Implementations spawn their own task on `start` and deliver events to the
/// provided channel until `stop` is called, the source is exhausted, or the
/// receiver is dropped. Dropping the channel sender signals end-of-stream.
pub trait GeoSampler: Send {
    /// Begin delivering events to `sink`.
    ///
    /// Must be called from within a Tokio runtime.
    fn start(&mut self, sink: mpsc::Sender<SamplerEvent>) -> Result<(), SamplerError>;

    /// Stop delivering events. Idempotent.
    fn stop(&mut self);

    /// Whether the background task is still delivering.
    fn is_running(&self) -> bool;

    /// Short name for logging.
    fn name(&self) -> &'static str;
}
