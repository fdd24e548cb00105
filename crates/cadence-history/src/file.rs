//! [`HistoryFile`]: a file-backed [`OutputSink`] and [`RestartSource`].

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::codec::encode_record;
use crate::error::HistoryError;
use crate::reader::HistoryReader;
use crate::sink::{OutputSink, RestartData, RestartSource};
use crate::types::{Record, Schema};
use crate::writer::HistoryWriter;

/// A history stored at a filesystem path.
///
/// Each [`append()`](OutputSink::append) opens the file, writes one record
/// and closes it again, so the file is complete after every write.
#[derive(Debug, Clone)]
pub struct HistoryFile {
    path: PathBuf,
    schema: Option<Schema>,
}

impl HistoryFile {
    /// Refer to a history file. Nothing is opened until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            schema: None,
        }
    }

    /// The file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the schema and every record.
    pub fn read_all(&self) -> Result<(Schema, Vec<Record>), HistoryError> {
        let reader = self.open_reader()?;
        let schema = reader.schema().clone();
        let records = reader.records().collect::<Result<Vec<_>, _>>()?;
        Ok((schema, records))
    }

    fn open_reader(&self) -> Result<HistoryReader<BufReader<File>>, HistoryError> {
        let file = File::open(&self.path).map_err(|source| HistoryError::Open {
            path: self.path.clone(),
            source,
        })?;
        HistoryReader::open(BufReader::new(file))
    }

    fn schema_for_append(&mut self) -> Result<&Schema, HistoryError> {
        if self.schema.is_none() {
            // Appending to a file written by an earlier run.
            let reader = match self.open_reader() {
                Ok(r) => r,
                Err(HistoryError::Open { source, .. })
                    if source.kind() == std::io::ErrorKind::NotFound =>
                {
                    return Err(HistoryError::NotCreated)
                }
                Err(e) => return Err(e),
            };
            self.schema = Some(reader.schema().clone());
        }
        self.schema.as_ref().ok_or(HistoryError::NotCreated)
    }
}

impl OutputSink for HistoryFile {
    fn create(&mut self, schema: &Schema) -> Result<(), HistoryError> {
        let file = File::create(&self.path).map_err(|source| HistoryError::Open {
            path: self.path.clone(),
            source,
        })?;
        let mut writer = HistoryWriter::new(BufWriter::new(file), schema.clone())?;
        writer.flush()?;
        self.schema = Some(schema.clone());
        info!(
            path = %self.path.display(),
            variables = schema.variables.len(),
            "created history file"
        );
        Ok(())
    }

    fn append(&mut self, record: &Record) -> Result<(), HistoryError> {
        let path = self.path.clone();
        let schema = self.schema_for_append()?;
        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|source| HistoryError::Open {
                path: path.clone(),
                source,
            })?;
        let mut w = BufWriter::new(file);
        encode_record(&mut w, schema, record)?;
        w.flush()?;
        debug!(path = %path.display(), time_days = record.time_days, "appended record");
        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

impl RestartSource for HistoryFile {
    fn load(&mut self) -> Result<RestartData, HistoryError> {
        let mut reader = self.open_reader()?;
        let (last, count) = reader.last_record()?;
        let data = RestartData::from_history(reader.schema(), last.as_ref(), count)?;
        info!(path = %self.path.display(), records = count, "read restart file");
        Ok(data)
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
