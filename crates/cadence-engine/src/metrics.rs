//! Cumulative run metrics for a component.
//!
//! [`RunMetrics`] counts what the component did across its lifetime:
//! steps taken, kernel invocations and skips, records written and monitor
//! refreshes. Timings are in microseconds.

/// Counters and timings collected while a component runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Completed timesteps.
    pub steps: u64,
    /// Times the kernel was invoked.
    pub kernel_invocations: u64,
    /// Steps on which the recompute gate was closed.
    pub gated_skips: u64,
    /// Output records appended.
    pub records_written: u64,
    /// Monitor refreshes.
    pub monitor_refreshes: u64,
    /// Wall-clock time of the last kernel invocation, in microseconds.
    pub last_kernel_us: u64,
    /// Wall-clock time of the last step, in microseconds.
    pub last_step_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = RunMetrics::default();
        assert_eq!(m.steps, 0);
        assert_eq!(m.kernel_invocations, 0);
        assert_eq!(m.gated_skips, 0);
        assert_eq!(m.records_written, 0);
        assert_eq!(m.monitor_refreshes, 0);
        assert_eq!(m.last_kernel_us, 0);
        assert_eq!(m.last_step_us, 0);
    }
}
