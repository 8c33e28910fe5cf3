//! Per-fix tracker decisions.

/// Outcome of feeding one position fix to the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationEvent {
    /// Nothing to report.
    NoChange,

    /// The traveller reached the current step; guidance moved to the next.
    StepAdvanced {
        /// Index of the step now being approached.
        new_index: usize,
        /// Instruction of the step now being approached.
        instruction: String,
    },

    /// The traveller left the route polyline.
    ///
    /// A signal only: the caller requests a new route and hands it back
    /// through `replace_route`.
    OffRoute {
        /// Deviation from the polyline in meters.
        distance_m: f64,
    },

    /// The final step was reached.
    Arrived,
}
