//! Multi-rate gating and periodic boundary detection.
//!
//! One rule drives the recompute gate, output writes and monitor
//! refreshes: something happens at time `t` if the interval `(t - dt, t]`
//! crosses a multiple of its frequency. The ratio is truncated toward
//! zero, not floored, so before `t = dt` the first interval below zero
//! is treated as the same period as the first interval above it.

/// Whether stepping from `t - dt` to `t` crossed a multiple of `frequency`.
///
/// ```
/// use cadence_engine::crossed_boundary;
///
/// // Every 100 s, stepping 30 s at a time.
/// assert!(crossed_boundary(120.0, 30.0, 100.0));
/// assert!(!crossed_boundary(60.0, 30.0, 100.0));
/// ```
pub fn crossed_boundary(t: f64, dt: f64, frequency: f64) -> bool {
    (t / frequency).trunc() != ((t - dt) / frequency).trunc()
}

/// A configured cadence for a periodic side effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cadence {
    frequency: f64,
}

impl Cadence {
    /// A cadence firing once per `frequency` seconds.
    pub fn every(frequency: f64) -> Self {
        Self { frequency }
    }

    /// Period in seconds.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Whether the step ending at `t` is due.
    pub fn is_due(&self, t: f64, dt: f64) -> bool {
        crossed_boundary(t, dt, self.frequency)
    }
}
