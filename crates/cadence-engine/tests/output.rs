//! Integration test: periodic output, monitors, restart and appending.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use cadence_engine::{
    Component, ComponentConfig, ComponentError, Increments, MonitorConfig, OutputConfig,
};
use cadence_history::{HistoryError, HistoryFile};
use cadence_test_utils::{assert_close, ConstIncrementKernel, CountingMonitor, MemorySink};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

fn scratch_path(tag: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "cadence-engine-{tag}-{}-{n}.cdnc",
        std::process::id()
    ))
}

fn heater() -> ConstIncrementKernel {
    ConstIncrementKernel::new("heater", "T", 1.0)
}

fn output(sink: &MemorySink, frequency: f64) -> OutputConfig {
    OutputConfig {
        frequency: Some(frequency),
        ..OutputConfig::new(sink.clone())
    }
}

// ── Output ─────────────────────────────────────────────────────────

#[test]
fn construction_declares_schema_and_writes_initial_record() {
    let sink = MemorySink::new();
    let c = Component::new(
        heater(),
        ComponentConfig::new().with_output(OutputConfig::new(sink.clone())),
    )
    .unwrap();
    assert_eq!(sink.creates(), 1);
    assert_eq!(sink.record_count(), 1);
    assert_eq!(c.output_index(), 1);
    let schema = sink.schema().unwrap();
    assert_eq!(schema.variables.len(), 1);
    assert_eq!(schema.axis_len("lev"), 10);
    assert_eq!(sink.records()[0].time_days, 0.0);
}

#[test]
fn records_follow_output_cadence() {
    let sink = MemorySink::new();
    let mut c = Component::new(
        heater(),
        ComponentConfig::new()
            .with_value("T", 280.0)
            .with_output(output(&sink, 3600.0)),
    )
    .unwrap();
    c.step(6u32, &Increments::new()).unwrap();

    let records = sink.records();
    let days: Vec<f64> = records.iter().map(|r| r.time_days * 86400.0).collect();
    assert_eq!(records.len(), 3);
    assert_close(days[1], 3600.0, 1e-6);
    assert_close(days[2], 7200.0, 1e-6);
    assert_eq!(records[2].fields["T"][0], 286.0);
    assert_eq!(c.metrics().records_written, 3);
}

#[test]
fn output_field_subset_is_respected() {
    let sink = MemorySink::new();
    let kernel = cadence_test_utils::RecordingKernel::new("rec", &["T", "Ts"], &["T"]);
    Component::new(
        kernel,
        ComponentConfig::new().with_output(OutputConfig {
            fields: Some(vec!["Ts".into()]),
            ..OutputConfig::new(sink.clone())
        }),
    )
    .unwrap();
    let record = &sink.records()[0];
    assert!(record.fields.contains_key("Ts"));
    assert!(!record.fields.contains_key("T"));
}

#[test]
fn write_without_output_is_a_no_op() {
    let mut c = Component::new(heater(), ComponentConfig::new()).unwrap();
    c.write().unwrap();
    assert_eq!(c.metrics().records_written, 0);
}

// ── Monitor ────────────────────────────────────────────────────────

#[test]
fn monitor_refreshes_every_step_by_default() {
    let monitor = CountingMonitor::new();
    let mut c = Component::new(
        heater(),
        ComponentConfig::new().with_monitor(MonitorConfig::new(monitor.clone())),
    )
    .unwrap();
    c.step(3u32, &Increments::new()).unwrap();
    assert_eq!(monitor.log().times, vec![1200.0, 2400.0, 3600.0]);
    assert_eq!(monitor.log().field_counts, vec![1, 1, 1]);
    assert_eq!(c.metrics().monitor_refreshes, 3);
}

#[test]
fn monitor_follows_its_own_cadence() {
    let monitor = CountingMonitor::new();
    let mut c = Component::new(
        heater(),
        ComponentConfig::new().with_monitor(MonitorConfig {
            frequency: Some(2400.0),
            ..MonitorConfig::new(monitor.clone())
        }),
    )
    .unwrap();
    c.step(3u32, &Increments::new()).unwrap();
    assert_eq!(monitor.log().times, vec![2400.0]);
}

#[test]
fn log_monitor_runs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let mut c = Component::new(
        heater(),
        ComponentConfig::new().with_monitor(MonitorConfig::new(cadence_engine::LogMonitor::new())),
    )
    .unwrap();
    c.step(2u32, &Increments::new()).unwrap();
    assert_eq!(c.metrics().monitor_refreshes, 2);
}

// ── Restart ────────────────────────────────────────────────────────

fn finished_run(sink: &MemorySink) -> Component {
    let mut c = Component::new(
        heater(),
        ComponentConfig::new()
            .with_value("T", 280.0)
            .with_value("calday", 3.0)
            .with_output(output(sink, 1200.0)),
    )
    .unwrap();
    c.step(3u32, &Increments::new()).unwrap();
    c
}

#[test]
fn restart_fills_unsupplied_values_from_last_record() {
    let sink = MemorySink::new();
    let first = finished_run(&sink);

    let c = Component::new(heater(), ComponentConfig::new().with_restart(sink.clone())).unwrap();
    assert_close(c.state().elapsed_time(), 3600.0, 1e-6);
    assert_close(
        c.params().scalar("calday").unwrap(),
        first.params().scalar("calday").unwrap(),
        1e-9,
    );
    assert_eq!(c.get("T").unwrap().to_vec(), vec![283.0; 10]);
}

#[test]
fn supplied_values_win_over_restart() {
    let sink = MemorySink::new();
    finished_run(&sink);
    let c = Component::new(
        heater(),
        ComponentConfig::new()
            .with_restart(sink.clone())
            .with_value("T", 250.0),
    )
    .unwrap();
    assert_eq!(c.get("T").unwrap().to_vec(), vec![250.0; 10]);
}

#[test]
fn restart_from_uncreated_history_is_a_resource_error() {
    let err = Component::new(heater(), ComponentConfig::new().with_restart(MemorySink::new()))
        .unwrap_err();
    assert!(matches!(
        err,
        ComponentError::Resource(HistoryError::NotCreated)
    ));
}

#[test]
fn output_to_restart_location_appends() {
    let sink = MemorySink::new().with_location("mem://column");
    finished_run(&sink);
    assert_eq!(sink.record_count(), 4);

    let mut c = Component::new(
        heater(),
        ComponentConfig::new()
            .with_restart(sink.clone())
            .with_output(output(&sink, 1200.0)),
    )
    .unwrap();
    assert_eq!(sink.creates(), 1, "schema not redeclared");
    assert_eq!(sink.record_count(), 4, "no initial write");
    assert_eq!(c.output_index(), 4);

    c.step(1u32, &Increments::new()).unwrap();
    assert_eq!(sink.record_count(), 5);
    assert_eq!(c.output_index(), 5);
    assert_close(sink.records()[4].time_days * 86400.0, 4800.0, 1e-6);
}

#[test]
fn output_elsewhere_does_not_append() {
    let sink = MemorySink::new().with_location("mem://a");
    finished_run(&sink);
    let other = MemorySink::new().with_location("mem://b");
    let c = Component::new(
        heater(),
        ComponentConfig::new()
            .with_restart(sink.clone())
            .with_output(output(&other, 1200.0)),
    )
    .unwrap();
    assert_eq!(other.creates(), 1);
    assert_eq!(other.record_count(), 1);
    assert_eq!(c.output_index(), 1);
}

// ── History files ──────────────────────────────────────────────────

#[test]
fn open_redirects_output_to_a_history_file() {
    let path = scratch_path("open");
    let mut c = Component::new(heater(), ComponentConfig::new().with_value("T", 280.0)).unwrap();
    c.open(&path).unwrap();
    assert_eq!(c.output_index(), 0);
    assert_eq!(c.output_location(), Some(path.as_path()));
    c.write().unwrap();
    // Same path: no-op, the record stays.
    c.open(&path).unwrap();
    assert_eq!(c.output_index(), 1);

    let (schema, records) = HistoryFile::new(&path).read_all().unwrap();
    assert!(schema.variable("T").is_some());
    assert_eq!(records.len(), 1);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn file_restart_and_append_round_trip() {
    let path = scratch_path("restart");
    let mut first = Component::new(
        heater(),
        ComponentConfig::new()
            .with_value("T", 280.0)
            .with_output(OutputConfig {
                frequency: Some(1200.0),
                ..OutputConfig::file(&path)
            }),
    )
    .unwrap();
    first.step(2u32, &Increments::new()).unwrap();

    let mut second = Component::new(
        heater(),
        ComponentConfig::new()
            .with_restart(HistoryFile::new(&path))
            .with_output(OutputConfig {
                frequency: Some(1200.0),
                ..OutputConfig::file(&path)
            }),
    )
    .unwrap();
    assert_eq!(second.output_index(), 3);
    assert_eq!(second.get("T").unwrap().to_vec(), vec![282.0; 10]);
    second.step(1u32, &Increments::new()).unwrap();

    let (_, records) = HistoryFile::new(&path).read_all().unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[3].fields["T"][0], 283.0);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_restart_file_is_a_resource_error() {
    let path = scratch_path("missing");
    let err = Component::new(
        heater(),
        ComponentConfig::new().with_restart(HistoryFile::new(&path)),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ComponentError::Resource(HistoryError::Open { .. })
    ));
}
