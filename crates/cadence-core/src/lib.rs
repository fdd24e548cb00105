//! Core types and traits for the Cadence multi-rate coupling framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Cadence workspace:
//! field identifiers, the field catalog, the tagged [`Value`] type,
//! error types, and the [`ValueSource`] lookup trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod id;
pub mod traits;
pub mod value;

pub use error::{KernelError, LookupError, ValueError};
pub use field::{FieldCatalog, FieldClass, FieldDef, FieldRank, FieldSet};
pub use id::{FieldId, Shape};
pub use traits::ValueSource;
pub use value::Value;
