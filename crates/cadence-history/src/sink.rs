//! The output and restart seams, and [`RestartData`].

use std::path::Path;

use cadence_core::Value;
use indexmap::IndexMap;

use crate::error::HistoryError;
use crate::types::{Record, Schema};
use crate::SECONDS_PER_DAY;

/// Destination for periodic history output.
///
/// [`create()`](Self::create) is called once with the full schema (unless
/// the component is appending to its restart source), then
/// [`append()`](Self::append) once per output boundary.
pub trait OutputSink: Send {
    /// Declare the schema, discarding any previous content.
    fn create(&mut self, schema: &Schema) -> Result<(), HistoryError>;

    /// Append one time record.
    fn append(&mut self, record: &Record) -> Result<(), HistoryError>;

    /// Filesystem location, if the sink is file-backed.
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// Source of initial values from a previous run.
pub trait RestartSource: Send {
    /// Read the last written record together with the schema.
    fn load(&mut self) -> Result<RestartData, HistoryError>;

    /// Filesystem location, if the source is file-backed.
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// Values recovered from the last record of a history.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RestartData {
    /// Elapsed simulated time in seconds, if any record was written.
    pub elapsed_time: Option<f64>,
    /// Parameters, with `calday` taken from the last record.
    pub params: IndexMap<String, Value>,
    /// Axis coordinates keyed by axis name.
    pub axes: IndexMap<String, Value>,
    /// Field values from the last record, shaped by rank.
    pub fields: IndexMap<String, Value>,
    /// Number of records in the history.
    pub record_count: u64,
}

impl RestartData {
    /// Assemble restart values from a schema and its last record.
    pub fn from_history(
        schema: &Schema,
        last: Option<&Record>,
        record_count: u64,
    ) -> Result<Self, HistoryError> {
        let mut params = schema.params.clone();
        let axes = schema
            .axes
            .iter()
            .map(|a| (a.name.clone(), Value::from(a.values.clone())))
            .collect();
        let mut fields = IndexMap::new();
        if let Some(record) = last {
            params.insert("calday".to_string(), Value::Scalar(record.calday));
            for (name, data) in &record.fields {
                let var = schema
                    .variable(name)
                    .ok_or_else(|| HistoryError::UnknownVariable { name: name.clone() })?;
                let flat = Value::from(data.iter().map(|&v| f64::from(v)).collect::<Vec<_>>());
                let shaped = flat
                    .conform(&schema.shape_of(var.rank))
                    .map_err(|e| HistoryError::Malformed {
                        detail: format!("variable '{name}': {e}"),
                    })?;
                fields.insert(name.clone(), shaped);
            }
        }
        Ok(Self {
            elapsed_time: last.map(|r| r.time_days * SECONDS_PER_DAY),
            params,
            axes,
            fields,
            record_count,
        })
    }
}
