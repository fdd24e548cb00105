//! History writer.
//!
//! [`HistoryWriter`] streams records to any `Write` sink. The header is
//! written immediately on construction.

use std::io::Write;

use crate::codec::{encode_header, encode_record};
use crate::error::HistoryError;
use crate::types::{Record, Schema};

/// Writes history data to a byte stream.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use cadence_core::{FieldRank, Value};
/// use cadence_history::{AxisSchema, HistoryReader, HistoryWriter, Record, Schema, VariableSchema};
///
/// let schema = Schema {
///     axes: vec![AxisSchema {
///         name: "lat".into(),
///         long_name: "latitude".into(),
///         units: "degrees_north".into(),
///         values: vec![-45.0, 45.0],
///     }],
///     variables: vec![VariableSchema {
///         name: "Ts".into(),
///         long_name: "surface temperature".into(),
///         units: "K".into(),
///         rank: FieldRank::Surface,
///     }],
///     ..Schema::default()
/// };
///
/// let mut buf = Vec::new();
/// let mut writer = HistoryWriter::new(&mut buf, schema.clone()).unwrap();
/// for day in 0..2 {
///     let mut record = Record::new(day as f64, day as f64);
///     record.push_field("Ts", &Value::from(vec![280.0, 290.0]));
///     writer.write_record(&record).unwrap();
/// }
/// assert_eq!(writer.records_written(), 2);
/// drop(writer);
///
/// let mut reader = HistoryReader::open(buf.as_slice()).unwrap();
/// assert_eq!(reader.schema(), &schema);
/// assert_eq!(reader.next_record().unwrap().unwrap().time_days, 0.0);
/// assert_eq!(reader.next_record().unwrap().unwrap().time_days, 1.0);
/// assert!(reader.next_record().unwrap().is_none());
/// ```
pub struct HistoryWriter<W: Write> {
    writer: W,
    schema: Schema,
    records_written: u64,
}

impl<W: Write> HistoryWriter<W> {
    /// Create a new history writer, immediately writing the header.
    pub fn new(mut writer: W, schema: Schema) -> Result<Self, HistoryError> {
        encode_header(&mut writer, &schema)?;
        Ok(Self {
            writer,
            schema,
            records_written: 0,
        })
    }

    /// Append one record.
    pub fn write_record(&mut self, record: &Record) -> Result<(), HistoryError> {
        encode_record(&mut self.writer, &self.schema, record)?;
        self.records_written += 1;
        Ok(())
    }

    /// The schema written in the header.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), HistoryError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Consume the writer and return the underlying `Write` sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
