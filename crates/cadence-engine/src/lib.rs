//! Multi-rate component stepping engine for Cadence.
//!
//! A [`Component`] couples one compute [`Kernel`](cadence_kernel::Kernel)
//! to a two-level [`State`], a [`ParameterStore`] and a
//! [`Grid`](cadence_grid::Grid). Components advance in lockstep on a shared
//! timestep while each recomputes its kernel at its own cadence; forcing
//! from one component is passed to another as [`Increments`].
//!
//! ```no_run
//! use cadence_engine::{Component, ComponentConfig, Increments};
//! # fn demo(kernel: impl cadence_kernel::Kernel) -> Result<(), cadence_engine::ComponentError> {
//! let mut c = Component::new(kernel, ComponentConfig::new().with_value("dt", 600.0))?;
//! c.step(6u32, &Increments::new())?;
//! println!("{}", c.report());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod assembly;
pub mod calendar;
pub mod component;
pub mod config;
pub mod error;
pub mod gating;
pub mod increments;
pub mod metrics;
pub mod monitor;
pub mod output;
pub mod params;
pub mod state;

pub use assembly::{assemble_inputs, InputSources};
pub use calendar::advance_calday;
pub use component::{Component, RunLength};
pub use config::{
    ComponentConfig, ConfigError, MonitorConfig, OutputConfig, ResolvedConfig,
    DEFAULT_OUTPUT_FREQUENCY,
};
pub use error::ComponentError;
pub use gating::{crossed_boundary, Cadence};
pub use increments::Increments;
pub use metrics::RunMetrics;
pub use monitor::{LogMonitor, Monitor};
pub use params::{ParameterStore, DEFAULT_DT};
pub use state::State;
