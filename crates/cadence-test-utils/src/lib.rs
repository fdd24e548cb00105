//! Test utilities and mock types for Cadence development.
//!
//! Provides mock kernels ([`RecordingKernel`], [`ConstIncrementKernel`],
//! [`FailingKernel`], [`MissingIncrementKernel`], [`WrongArityKernel`]),
//! an in-memory history ([`MemorySink`]) implementing both
//! [`OutputSink`](cadence_history::OutputSink) and
//! [`RestartSource`](cadence_history::RestartSource), and a
//! [`CountingMonitor`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod memory;

pub use fixtures::{
    CallLog, ConstIncrementKernel, FailingKernel, MissingIncrementKernel, RecordingKernel,
    WrongArityKernel,
};
pub use memory::{CountingMonitor, MemorySink, MonitorLog};

/// Assert two floats agree within an absolute tolerance.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}
