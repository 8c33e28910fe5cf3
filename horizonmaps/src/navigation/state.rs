//! Navigation status and the tracker's externally visible state.

use std::fmt;

/// Guidance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationStatus {
    /// No active guidance.
    #[default]
    Idle,
    /// Following the active route.
    Navigating,
    /// Off route; a replacement route has been requested.
    ///
    /// Fixes are still evaluated against the stale route.
    Rerouting,
    /// Final step reached.
    Arrived,
    /// Guidance abandoned (e.g. rerouting kept failing).
    Failed,
}

impl NavigationStatus {
    /// Whether position updates are evaluated in this status.
    pub fn is_tracking(&self) -> bool {
        matches!(self, NavigationStatus::Navigating | NavigationStatus::Rerouting)
    }

    /// Human-readable name for logging/UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationStatus::Idle => "Idle",
            NavigationStatus::Navigating => "Navigating",
            NavigationStatus::Rerouting => "Rerouting",
            NavigationStatus::Arrived => "Arrived",
            NavigationStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for NavigationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the tracker's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationState {
    /// Index of the step currently being approached.
    pub current_step_index: usize,
    /// Guidance status.
    pub status: NavigationStatus,
}
