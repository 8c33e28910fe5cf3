//! Session results.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::navigation::NavigationStatus;
use crate::position::SamplerError;
use crate::route::RouteError;
use crate::routing::RoutingError;

/// Errors that prevent a session from starting.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The route cannot be navigated.
    #[error("Cannot start guidance: {0}")]
    InvalidRoute(#[from] RouteError),

    /// Initial route planning failed.
    #[error("Route planning failed: {0}")]
    Routing(#[from] RoutingError),

    /// The position source refused to start.
    #[error("Position source failed to start: {0}")]
    Sampler(#[from] SamplerError),

    /// `run` was called before `start` or `plan`.
    #[error("Guidance session has not been started")]
    NotStarted,
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// The destination was reached.
    Arrived,
    /// The caller cancelled.
    Cancelled,
    /// The position source reported a failure or went silent.
    SourceFailed(SamplerError),
    /// The position source finished without arrival.
    SourceClosed,
    /// Rerouting failed too many times in a row.
    RerouteFailed {
        attempts: u32,
        last_error: RoutingError,
    },
}

impl SessionOutcome {
    /// Short label for logs and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionOutcome::Arrived => "arrived",
            SessionOutcome::Cancelled => "cancelled",
            SessionOutcome::SourceFailed(_) => "source failed",
            SessionOutcome::SourceClosed => "source closed",
            SessionOutcome::RerouteFailed { .. } => "reroute failed",
        }
    }

    pub fn is_arrived(&self) -> bool {
        matches!(self, SessionOutcome::Arrived)
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOutcome::SourceFailed(e) => write!(f, "source failed: {}", e),
            SessionOutcome::RerouteFailed {
                attempts,
                last_error,
            } => write!(f, "reroute failed after {} attempts: {}", attempts, last_error),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    /// Tracker status when the session ended.
    pub final_status: NavigationStatus,
    /// Step index when the session ended.
    pub final_step_index: usize,
    pub fixes_processed: u64,
    pub steps_advanced: u64,
    pub off_route_signals: u64,
    pub reroutes_applied: u64,
    pub reroute_failures: u64,
    /// Ground speed over the last fixes, when enough were seen.
    pub last_speed_mps: Option<f64>,
    /// Wall time the session ran.
    pub elapsed: Duration,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} after {:.1}s: {} fixes, {} steps advanced, {} off-route, {} reroutes ({} failed)",
            self.outcome,
            self.elapsed.as_secs_f64(),
            self.fixes_processed,
            self.steps_advanced,
            self.off_route_signals,
            self.reroutes_applied,
            self.reroute_failures,
        )?;
        if let Some(speed) = self.last_speed_mps {
            write!(f, ", last speed {:.1} m/s", speed)?;
        }
        Ok(())
    }
}
