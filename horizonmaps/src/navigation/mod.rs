//! Turn-by-turn progression against a planned route.
//!
//! The [`ProgressTracker`] is a small synchronous state machine. It consumes
//! position fixes, owns the step pointer, and reports one
//! [`NavigationEvent`] per fix. It never blocks and never touches the network;
//! the async [`crate::session::GuidanceSession`] performs reroute requests on
//! its behalf.
//!
//! # Thresholds
//!
//! | Threshold          | Default | Comparison |
//! |--------------------|---------|------------|
//! | Step radius        | 30 m    | `<`        |
//! | Arrival radius     | 30 m    | `<`        |
//! | Off-route distance | 50 m    | `>`        |

mod config;
mod event;
mod state;
mod tracker;

pub use config::{
    OffRouteMetric, TrackerConfig, DEFAULT_ARRIVAL_RADIUS_M, DEFAULT_OFF_ROUTE_THRESHOLD_M,
    DEFAULT_STEP_RADIUS_M,
};
pub use event::NavigationEvent;
pub use state::{NavigationState, NavigationStatus};
pub use tracker::ProgressTracker;
