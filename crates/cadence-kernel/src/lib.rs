//! Compute kernel trait and declaration validation for Cadence components.
//!
//! The [`Kernel`] trait is the capability interface every physical module
//! implements: a fixed declaration of positional inputs and outputs plus a
//! pure `invoke` function. [`validate_kernel`] checks a declaration against
//! the field catalog once, at component construction, and produces the
//! [`KernelPlan`] the engine consults every step.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod kernel;
pub mod naming;
pub mod plan;

pub use kernel::{Kernel, KernelOutput, SteppingScheme};
pub use naming::{increment_key, old_key, UPDATE_FREQ_KEY};
pub use plan::{validate_kernel, DeclarationError, KernelPlan};
