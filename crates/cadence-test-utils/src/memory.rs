//! In-memory history and a counting monitor.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use cadence_core::FieldSet;
use cadence_engine::{Component, Monitor};
use cadence_history::{HistoryError, OutputSink, Record, RestartData, RestartSource, Schema};

#[derive(Debug, Default)]
struct History {
    schema: Option<Schema>,
    records: Vec<Record>,
    creates: usize,
}

/// History kept in memory; clones share the same contents.
///
/// Implements [`OutputSink`] and [`RestartSource`], so one instance can
/// be written by one component and restarted from by another. Give two
/// handles the same [`location`](Self::with_location) to exercise
/// appending mode.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<History>>,
    location: Option<PathBuf>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `path` as this sink's location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Declared schema, if `create` was called.
    pub fn schema(&self) -> Option<Schema> {
        self.inner.lock().unwrap().schema.clone()
    }

    /// Every appended record, oldest first.
    pub fn records(&self) -> Vec<Record> {
        self.inner.lock().unwrap().records.clone()
    }

    pub fn record_count(&self) -> usize {
        self.inner.lock().unwrap().records.len()
    }

    /// Number of `create` calls.
    pub fn creates(&self) -> usize {
        self.inner.lock().unwrap().creates
    }
}

impl OutputSink for MemorySink {
    fn create(&mut self, schema: &Schema) -> Result<(), HistoryError> {
        let mut h = self.inner.lock().unwrap();
        h.schema = Some(schema.clone());
        h.records.clear();
        h.creates += 1;
        Ok(())
    }

    fn append(&mut self, record: &Record) -> Result<(), HistoryError> {
        let mut h = self.inner.lock().unwrap();
        if h.schema.is_none() {
            return Err(HistoryError::NotCreated);
        }
        h.records.push(record.clone());
        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }
}

impl RestartSource for MemorySink {
    fn load(&mut self) -> Result<RestartData, HistoryError> {
        let h = self.inner.lock().unwrap();
        let schema = h.schema.as_ref().ok_or(HistoryError::NotCreated)?;
        RestartData::from_history(schema, h.records.last(), h.records.len() as u64)
    }

    fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }
}

// ── CountingMonitor ────────────────────────────────────────────────

/// What a [`CountingMonitor`] observed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MonitorLog {
    /// Elapsed time at each refresh.
    pub times: Vec<f64>,
    /// Number of fields passed at each refresh.
    pub field_counts: Vec<usize>,
}

/// Records the elapsed time of every refresh; clones share the log.
#[derive(Clone, Debug, Default)]
pub struct CountingMonitor {
    log: Arc<Mutex<MonitorLog>>,
}

impl CountingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> MonitorLog {
        self.log.lock().unwrap().clone()
    }

    pub fn refreshes(&self) -> usize {
        self.log.lock().unwrap().times.len()
    }
}

impl Monitor for CountingMonitor {
    fn refresh(&mut self, component: &Component, fields: &FieldSet) {
        let mut log = self.log.lock().unwrap();
        log.times.push(component.state().elapsed_time());
        log.field_counts.push(fields.len());
    }
}
