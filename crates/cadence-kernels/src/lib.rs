//! Reference compute kernels for the Cadence coupling engine.
//!
//! Two column physics kernels that exercise the full engine:
//!
//! 1. [`NewtonianRelaxation`]: radiation-like relaxation of `T` toward an
//!    equilibrium temperature, usually run at a slow cadence
//! 2. [`ConvectiveAdjustment`]: dry adiabatic adjustment of unstable
//!    columns, usually run every step
//!
//! Both return per-timestep increments for `T` plus diagnostics, and are
//! typically coupled by passing one component's increments to the
//! other's `step`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod args;
pub mod convection;
pub mod relaxation;

pub use convection::ConvectiveAdjustment;
pub use relaxation::NewtonianRelaxation;

/// Reference surface pressure for potential temperature, in mb.
pub const REFERENCE_PRESSURE: f64 = 1000.0;
