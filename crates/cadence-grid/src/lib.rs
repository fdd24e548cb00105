//! Grid axes, field shapes and dimension resolution.
//!
//! A [`Grid`] holds the three axes (`lev`, `lat`, `lon`) shared by every
//! field of a component. [`resolve_dims`] decides the axis lengths from
//! explicitly supplied axes, from the shapes of supplied fields, and from
//! any length the compute kernel enforces.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod axis;
pub mod error;
pub mod grid;
pub mod resolve;

pub use axis::{Axis, GridDims};
pub use error::GridError;
pub use grid::Grid;
pub use resolve::{resolve_axis_length, resolve_dims};
