//! Per-step performance metrics for the time-march controller.

/// Timing data collected during a single controller step.
///
/// All durations are in microseconds. The controller fills these fields
/// after each `step()` or `step_dual()` call and keeps the most recent set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// Wall-clock time for the whole step, in microseconds.
    pub total_us: u64,
    /// Time spent inside the synchronizer, in microseconds.
    pub sync_us: u64,
    /// Number of synchronizer calls.
    pub sync_calls: u32,
    /// RK3 sub-stages executed (3 per plain step, 3 per dual iteration).
    pub substages: u32,
}
