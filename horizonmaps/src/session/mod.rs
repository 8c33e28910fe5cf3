//! Async guidance coordinator.
//!
//! # Architecture
//!
//! ```text
//!                        ┌────────────────────────────────────────┐
//!  SamplerEvent (mpsc)   │            GuidanceSession             │
//! ─────────────────────► │                                        │
//!                        │  PositionHistory ──► MapView (marker)  │
//!                        │         │                              │
//!                        │         ▼                              │
//!                        │  ProgressTracker ──► AnnouncementSink  │
//!                        │         │ OffRoute                     │
//!                        │         ▼                              │
//!                        │  spawn RoutingClient::route ───┐       │
//!                        │         ▲                      │       │
//!                        │         └── RerouteResult ◄────┘       │
//!                        └────────────────────────────────────────┘
//! ```
//!
//! The tracker stays synchronous. Reroute requests run on their own task and
//! report back through a channel tagged with a generation number, so the
//! event loop keeps consuming fixes on the old route while the request is in
//! flight.
//!
//! # Example
//!
//! ```ignore
//! let mut session = GuidanceSession::new(
//!     config.tracker(),
//!     routing,
//!     Arc::new(TracingAnnouncer),
//!     Arc::new(TracingMapView),
//!     config.session(),
//! );
//! session.start(route, origin)?;
//! let report = session.drive(&mut sampler, cancellation).await?;
//! ```

mod config;
mod guidance;
mod report;

pub use config::{
    SessionConfig, DEFAULT_ARRIVAL_PHRASE, DEFAULT_FIX_TIMEOUT, DEFAULT_MAX_REROUTE_ATTEMPTS,
    DEFAULT_REROUTING_PHRASE,
};
pub use guidance::GuidanceSession;
pub use report::{SessionError, SessionOutcome, SessionReport};
