//! Cadence: a multi-rate coupling and time-stepping engine for climate
//! model components.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Cadence sub-crates. For most users, adding `cadence` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use cadence::prelude::*;
//!
//! // Relax T toward 250 K on a 10-day timescale, recomputing hourly.
//! let radiation = NewtonianRelaxation::builder()
//!     .equilibrium(250.0)
//!     .timescale_days(10.0)
//!     .build()
//!     .unwrap();
//! let mut column = Component::new(
//!     radiation,
//!     ComponentConfig::new()
//!         .with_value("T", 300.0)
//!         .with_update_frequency(3600.0),
//! )
//! .unwrap();
//!
//! // Three 20-minute steps cross one hourly boundary.
//! column.step(3u32, &Increments::new()).unwrap();
//! assert_eq!(column.metrics().kernel_invocations, 2);
//! assert!(column.get("T").unwrap().to_vec()[0] < 300.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `cadence-core` | Values, field catalog, IDs, core errors |
//! | [`grid`] | `cadence-grid` | Axes, dimension resolution, coordinates |
//! | [`kernel`] | `cadence-kernel` | Kernel trait and declaration validation |
//! | [`history`] | `cadence-history` | History format, output sinks, restart sources |
//! | [`engine`] | `cadence-engine` | Components, state, gating and stepping |
//! | [`kernels`] | `cadence-kernels` | Reference kernels (relaxation, convection) |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, values and IDs (`cadence-core`).
///
/// Contains [`types::Value`], the [`types::FieldCatalog`] of known fields,
/// and the error types shared by kernels and the engine.
pub use cadence_core as types;

/// Grid axes and dimension resolution (`cadence-grid`).
pub use cadence_grid as grid;

/// The kernel seam (`cadence-kernel`).
///
/// The [`kernel::Kernel`] trait is the main extension point for
/// user-defined physics.
pub use cadence_kernel as kernel;

/// History output and restart (`cadence-history`).
///
/// [`history::HistoryFile`] is both an [`history::OutputSink`] and a
/// [`history::RestartSource`].
pub use cadence_history as history;

/// The stepping engine (`cadence-engine`).
pub use cadence_engine as engine;

/// Reference kernel implementations (`cadence-kernels`).
///
/// Includes [`kernels::NewtonianRelaxation`] and
/// [`kernels::ConvectiveAdjustment`].
pub use cadence_kernels as kernels;

/// Common imports for typical Cadence usage.
///
/// ```rust
/// use cadence::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use cadence_core::{FieldCatalog, FieldClass, FieldId, Value};

    // Errors
    pub use cadence_core::{KernelError, LookupError};
    pub use cadence_engine::{ComponentError, ConfigError};

    // Kernel
    pub use cadence_kernel::{Kernel, KernelOutput, SteppingScheme};

    // History
    pub use cadence_history::{HistoryFile, OutputSink, RestartSource};

    // Engine
    pub use cadence_engine::{
        Component, ComponentConfig, Increments, Monitor, MonitorConfig, OutputConfig, RunLength,
        RunMetrics,
    };

    // Reference kernels
    pub use cadence_kernels::{ConvectiveAdjustment, NewtonianRelaxation};
}
