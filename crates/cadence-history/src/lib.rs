//! History files, output sinks and restart sources for Cadence components.
//!
//! A component periodically appends its state to a history file and may
//! be started from the last record of an earlier run. This crate owns the
//! on-disk format and the two seams the engine talks to:
//!
//! - [`OutputSink`] receives the schema once and one [`Record`] per output
//!   boundary
//! - [`RestartSource`] yields [`RestartData`] from the last written record
//! - [`HistoryFile`] implements both on top of a file path
//! - [`HistoryWriter`] / [`HistoryReader`] stream the format over any
//!   `Write` / `Read`
//!
//! # Format
//!
//! ```text
//! [MAGIC "CDNC"] [VERSION u8] [Schema]
//! [Record 1] [Record 2] ... [Record N]
//! ```
//!
//! The schema holds global attributes, parameters, the three axes and the
//! variable table. Each record holds the simulated time in days, the
//! calendar day, and a subset of the variables as `f32` values in
//! row-major `(lev, lat, lon)` order.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod file;
pub mod reader;
pub mod sink;
pub mod types;
pub mod writer;

pub use error::HistoryError;
pub use file::HistoryFile;
pub use reader::{HistoryReader, RecordIter};
pub use sink::{OutputSink, RestartData, RestartSource};
pub use types::{AxisSchema, Record, Schema, VariableSchema};
pub use writer::HistoryWriter;

/// Magic bytes at the start of every history file.
pub const MAGIC: [u8; 4] = *b"CDNC";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;

/// Seconds per day, the unit of the record time coordinate.
pub const SECONDS_PER_DAY: f64 = 86400.0;
