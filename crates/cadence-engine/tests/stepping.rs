//! Integration test: input assembly per scheme, recompute gating, Fixed
//! fields, external increments, calendar, and kernel failure handling.

use cadence_core::{FieldId, KernelError, Value};
use cadence_engine::{Component, ComponentConfig, ComponentError, ConfigError, Increments};
use cadence_kernel::{DeclarationError, SteppingScheme};
use cadence_test_utils::{
    assert_close, ConstIncrementKernel, FailingKernel, MissingIncrementKernel, RecordingKernel,
    WrongArityKernel,
};

fn id(c: &Component, name: &str) -> FieldId {
    c.catalog().id(name).unwrap()
}

fn first(v: &Value) -> f64 {
    v.to_vec()[0]
}

fn now(c: &Component, name: &str) -> f64 {
    first(c.state().now(id(c, name)).unwrap())
}

fn warm() -> ComponentConfig {
    ComponentConfig::new().with_value("T", 280.0)
}

// ── Input assembly ─────────────────────────────────────────────────

#[test]
fn explicit_kernel_sees_current_level() {
    let kernel = RecordingKernel::new("rec", &["T", "dt"], &["T"]).with_increment(1.0);
    let log = kernel.log();
    let mut c = Component::new(kernel, warm()).unwrap();
    c.step(1u32, &Increments::new()).unwrap();

    let t = id(&c, "T");
    let last = log.last().unwrap();
    assert_eq!(&last[0], c.state().now(t).unwrap());
    assert_ne!(c.state().now(t), c.state().old(t));
    assert_eq!(last[1], Value::Scalar(1200.0));
}

#[test]
fn implicit_kernel_sees_previous_level() {
    let kernel = RecordingKernel::new("rec", &["T", "Ts"], &["T"])
        .with_scheme(SteppingScheme::Implicit)
        .with_increment(1.0);
    let log = kernel.log();
    let mut c = Component::new(kernel, warm().with_value("Ts", 290.0)).unwrap();
    c.step(1u32, &Increments::new()).unwrap();

    let t = id(&c, "T");
    let last = log.last().unwrap();
    assert_eq!(&last[0], c.state().old(t).unwrap());
    assert_close(first(&last[0]), 280.0, 1e-12);
    assert_close(now(&c, "T"), 281.0, 1e-12);
    // Ts has no previous level.
    assert_close(first(&last[1]), 290.0, 1e-12);
}

#[test]
fn semi_implicit_kernel_sees_both_levels() {
    let kernel = RecordingKernel::new("rec", &["T", "Told"], &["T"])
        .with_scheme(SteppingScheme::SemiImplicit)
        .with_increment(1.0);
    let log = kernel.log();
    let mut c = Component::new(kernel, warm()).unwrap();
    c.step(1u32, &Increments::new()).unwrap();

    let t = id(&c, "T");
    let last = log.last().unwrap();
    assert_eq!(&last[0], c.state().now(t).unwrap());
    assert_eq!(&last[1], c.state().old(t).unwrap());
    assert_ne!(last[0], last[1]);
}

#[test]
fn update_frequency_is_available_as_input() {
    let kernel = RecordingKernel::new("rec", &["UpdateFreq", "nlev"], &["T"]);
    let log = kernel.log();
    Component::new(kernel, ComponentConfig::new().with_update_frequency(3600.0)).unwrap();
    let first_call = &log.calls()[0];
    assert_eq!(first_call[0], Value::Scalar(3600.0));
    assert_eq!(first_call[1], Value::Scalar(10.0));
}

// ── Gating ─────────────────────────────────────────────────────────

#[test]
fn gate_opens_only_when_a_boundary_is_crossed() {
    let kernel = RecordingKernel::new("rec", &["T"], &["T"]);
    let log = kernel.log();
    let mut c = Component::new(
        kernel,
        ComponentConfig::new()
            .with_value("dt", 30.0)
            .with_update_frequency(100.0),
    )
    .unwrap();
    assert_eq!(log.len(), 1, "forced compute at construction");

    // t = 30, 60, 90: no crossing.
    c.step(3u32, &Increments::new()).unwrap();
    assert_eq!(log.len(), 1);
    // t = 120 crosses 100.
    c.step(1u32, &Increments::new()).unwrap();
    assert_eq!(log.len(), 2);
    // t = 150, 180: no crossing.
    c.step(2u32, &Increments::new()).unwrap();
    assert_eq!(log.len(), 2);

    let m = c.metrics();
    assert_eq!(m.steps, 6);
    assert_eq!(m.kernel_invocations, 2);
    assert_eq!(m.gated_skips, 5);
}

#[test]
fn forced_compute_bypasses_gate() {
    let kernel = RecordingKernel::new("rec", &["T"], &["T"]);
    let log = kernel.log();
    let mut c = Component::new(kernel, ComponentConfig::new().with_update_frequency(1e9)).unwrap();
    assert!(!c.compute(false).unwrap());
    assert!(c.compute(true).unwrap());
    assert_eq!(log.len(), 2);
}

#[test]
fn gated_steps_keep_previous_increments() {
    let mut c = Component::new(
        ConstIncrementKernel::new("heat", "T", 0.25),
        warm().with_update_frequency(3600.0),
    )
    .unwrap();
    // dt = 1200: kernel runs at t = 3600 only, but the increment from
    // construction applies on every step.
    c.step(3u32, &Increments::new()).unwrap();
    assert_close(now(&c, "T"), 280.75, 1e-12);
    assert_eq!(c.metrics().kernel_invocations, 2);
}

// ── Fixed fields ───────────────────────────────────────────────────

#[test]
fn fixed_fields_never_hold_increments() {
    let kernel = RecordingKernel::new("rec", &["T", "q"], &["T", "q"]).with_increment(1.0);
    let mut c = Component::new(kernel, warm().with_value("q", 2.0).with_fixed(["q"])).unwrap();
    let (t, q) = (id(&c, "T"), id(&c, "q"));
    assert!(!c.increments().contains(q));
    assert!(c.increments().contains(t));

    let mut external = Increments::new();
    external.insert(q, Value::Scalar(5.0));
    c.step(2u32, &external).unwrap();
    assert!(!c.increments().contains(q));
    assert_close(now(&c, "q"), 2.0, 0.0);
    assert_close(now(&c, "T"), 282.0, 1e-12);
    assert!(c.report().contains("q (fixed)"));
}

// ── External increments ────────────────────────────────────────────

#[test]
fn external_increments_accumulate_until_the_kernel_runs() {
    let kernel = RecordingKernel::new("rec", &["T"], &["T"]);
    let mut c = Component::new(kernel, warm().with_update_frequency(1e9)).unwrap();
    let t = id(&c, "T");
    let mut external = Increments::new();
    external.insert(t, Value::Scalar(0.5));

    c.step(1u32, &external).unwrap();
    c.step(1u32, &external).unwrap();
    let inc = c.increments().get(t).unwrap().to_vec();
    assert!(inc.iter().all(|&v| v == 1.0), "dT1 + dT1, got {inc:?}");
    assert_close(now(&c, "T"), 281.5, 1e-12);
}

#[test]
fn kernel_increment_replaces_accumulated_external() {
    let mut c = Component::new(ConstIncrementKernel::new("heat", "T", 0.1), warm()).unwrap();
    let t = id(&c, "T");
    let mut external = Increments::new();
    external.insert(t, Value::Scalar(1.0));
    c.step(1u32, &external).unwrap();
    // The kernel ran after the advance and overwrote the sum.
    assert_close(first(c.increments().get(t).unwrap()), 0.1, 1e-12);
    assert_close(now(&c, "T"), 281.1, 1e-9);
}

#[test]
fn increments_for_unmarched_fields_are_skipped() {
    let mut c = Component::new(ConstIncrementKernel::new("heat", "T", 0.0), warm()).unwrap();
    let u = c.catalog().id("U").unwrap();
    let mut external = Increments::new();
    external.insert(u, Value::Scalar(1.0));
    c.step(1u32, &external).unwrap();
    assert!(!c.increments().contains(u));
}

#[test]
fn mis_shaped_external_increment_is_rejected() {
    let mut c = Component::new(ConstIncrementKernel::new("heat", "T", 0.0), warm()).unwrap();
    let t = id(&c, "T");
    let mut external = Increments::new();
    external.insert(t, Value::from(vec![1.0, 2.0, 3.0]));
    let err = c.step(1u32, &external).unwrap_err();
    assert!(matches!(
        err,
        ComponentError::Config(ConfigError::InvalidValue { ref name, .. }) if name == "T"
    ));
}

// ── Run length and calendar ────────────────────────────────────────

#[test]
fn duration_run_length_truncates() {
    let mut c = Component::new(ConstIncrementKernel::new("heat", "T", 0.0), warm()).unwrap();
    c.step(4000.0, &Increments::new()).unwrap();
    assert_eq!(c.metrics().steps, 3);
    assert_close(c.state().elapsed_time(), 3600.0, 0.0);
}

#[test]
fn calday_returns_after_a_year() {
    let mut c = Component::new(
        ConstIncrementKernel::new("heat", "T", 0.0),
        warm()
            .with_value("dt", 86400.0)
            .with_value("calday", 10.0),
    )
    .unwrap();
    c.step(365u32, &Increments::new()).unwrap();
    assert_close(c.params().scalar("calday").unwrap(), 10.0, 1e-9);
    assert_close(c.state().elapsed_time(), 365.0 * 86400.0, 0.0);
}

// ── Failures ───────────────────────────────────────────────────────

#[test]
fn kernel_failure_is_reported_with_kernel_name() {
    let mut c = Component::new(FailingKernel::new("flaky", "T", 1), warm()).unwrap();
    match c.step(1u32, &Increments::new()) {
        Err(ComponentError::KernelFailed { kernel, reason }) => {
            assert_eq!(kernel, "flaky");
            assert!(matches!(reason, KernelError::ExecutionFailed { .. }));
        }
        other => panic!("expected KernelFailed, got {other:?}"),
    }
}

#[test]
fn failing_construction_compute_is_an_error() {
    let err = Component::new(FailingKernel::new("flaky", "T", 0), warm()).unwrap_err();
    assert!(matches!(err, ComponentError::KernelFailed { .. }));
}

#[test]
fn wrong_output_arity_is_a_kernel_failure() {
    let err = Component::new(WrongArityKernel, warm()).unwrap_err();
    assert!(matches!(
        err,
        ComponentError::KernelFailed {
            reason: KernelError::ArityMismatch {
                expected: 2,
                found: 1
            },
            ..
        }
    ));
}

#[test]
fn missing_increment_is_a_configuration_error() {
    let err = Component::new(MissingIncrementKernel, warm()).unwrap_err();
    assert!(matches!(
        err,
        ComponentError::Config(ConfigError::Declaration(DeclarationError::MissingIncrement { .. }))
    ));
}

#[test]
fn unresolvable_input_is_a_configuration_error() {
    let kernel = RecordingKernel::new("rec", &["T", "albedo"], &["T"]);
    let err = Component::new(kernel, warm()).unwrap_err();
    assert!(matches!(
        err,
        ComponentError::Config(ConfigError::UnresolvedInput { ref name, .. }) if name == "albedo"
    ));
}

#[test]
fn kernel_enforced_levels_size_the_state() {
    let kernel = RecordingKernel::new("rec", &["T"], &["T"]).with_levels(26);
    let c = Component::new(kernel, warm()).unwrap();
    assert_eq!(c.grid().nlev(), 26);
    assert_eq!(c.state().now(id(&c, "T")).unwrap().shape().as_slice(), &[26, 1, 1]);
}
