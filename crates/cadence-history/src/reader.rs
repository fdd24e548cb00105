//! History reader.
//!
//! [`HistoryReader`] reads records from any `Read` source. The header is
//! validated on construction.

use std::io::Read;

use crate::codec::{decode_header, decode_record};
use crate::error::HistoryError;
use crate::types::{Record, Schema};

/// Reads history data from a byte stream.
pub struct HistoryReader<R: Read> {
    reader: R,
    schema: Schema,
    records_read: u64,
}

impl<R: Read> HistoryReader<R> {
    /// Open a history stream, reading and validating the header.
    pub fn open(mut reader: R) -> Result<Self, HistoryError> {
        let schema = decode_header(&mut reader)?;
        Ok(Self {
            reader,
            schema,
            records_read: 0,
        })
    }

    /// Schema from the header.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Read the next record, or `None` if the stream is exhausted.
    pub fn next_record(&mut self) -> Result<Option<Record>, HistoryError> {
        let record = decode_record(&mut self.reader, &self.schema)?;
        if record.is_some() {
            self.records_read += 1;
        }
        Ok(record)
    }

    /// Number of records read so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Read to the end of the stream, returning the last record (if any)
    /// and the total record count.
    pub fn last_record(&mut self) -> Result<(Option<Record>, u64), HistoryError> {
        let mut last = None;
        while let Some(record) = self.next_record()? {
            last = Some(record);
        }
        Ok((last, self.records_read))
    }

    /// Convert into a record iterator.
    pub fn records(self) -> RecordIter<R> {
        RecordIter {
            reader: self.reader,
            schema: self.schema,
            done: false,
        }
    }
}

/// Iterator adapter over history records.
pub struct RecordIter<R: Read> {
    reader: R,
    schema: Schema,
    done: bool,
}

impl<R: Read> Iterator for RecordIter<R> {
    type Item = Result<Record, HistoryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match decode_record(&mut self.reader, &self.schema) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
