//! Integration test: the physics kernels driven through `Component`, alone
//! and coupled by exchanging increments.

use cadence_core::KernelError;
use cadence_engine::{Component, ComponentConfig, ComponentError, Increments};
use cadence_kernel::SteppingScheme;
use cadence_kernels::{ConvectiveAdjustment, NewtonianRelaxation};
use cadence_test_utils::assert_close;

const DAY: f64 = 86400.0;

fn radiation(scheme: SteppingScheme) -> NewtonianRelaxation {
    NewtonianRelaxation::builder()
        .equilibrium(250.0)
        .timescale_days(10.0)
        .scheme(scheme)
        .build()
        .unwrap()
}

/// Ten levels, warming downward fast enough to be dry-unstable.
fn unstable_profile() -> Vec<f64> {
    (0..10).map(|k| 150.0 + 20.0 * k as f64).collect()
}

fn column(c: &Component, name: &str) -> Vec<f64> {
    c.get(name).unwrap().to_vec()
}

#[test]
fn relaxation_decays_geometrically() {
    let mut c = Component::new(
        radiation(SteppingScheme::Explicit),
        ComponentConfig::new()
            .with_value("T", 300.0)
            .with_value("dt", DAY),
    )
    .unwrap();
    c.step(10u32, &Increments::new()).unwrap();
    let expected = 250.0 + 50.0 * 0.9f64.powi(10);
    for t in column(&c, "T") {
        assert_close(t, expected, 1e-9);
    }
    // TdotRad is evaluated at the current temperature.
    assert_close(column(&c, "TdotRad")[0], -(expected - 250.0) / 10.0, 1e-9);
}

#[test]
fn semi_implicit_relaxation_converges() {
    let mut c = Component::new(
        radiation(SteppingScheme::SemiImplicit),
        ComponentConfig::new()
            .with_value("T", 300.0)
            .with_value("dt", DAY),
    )
    .unwrap();
    let mut previous = 300.0;
    for _ in 0..20 {
        c.step(1u32, &Increments::new()).unwrap();
        let t = column(&c, "T")[0];
        assert!(t < previous && t > 250.0, "T = {t}");
        previous = t;
    }
}

#[test]
fn convection_removes_instability() {
    let mut c = Component::new(
        ConvectiveAdjustment::new(),
        ComponentConfig::new().with_value("T", unstable_profile()),
    )
    .unwrap();
    let theta = column(&c, "theta");
    assert_eq!(theta.len(), 10);
    for k in 1..theta.len() {
        assert!(theta[k - 1] >= theta[k] - 1e-9, "unstable at level {k}: {theta:?}");
    }

    c.step(1u32, &Increments::new()).unwrap();
    // The adjusted column needs no further adjustment.
    let t = c.catalog().id("T").unwrap();
    let residual = c.increments().get(t).unwrap().to_vec();
    assert!(residual.iter().all(|v| v.abs() < 1e-9), "{residual:?}");
    assert!(column(&c, "TdotConv").iter().all(|v| v.abs() < 1e-6));
}

#[test]
fn exchanging_increments_keeps_components_in_step() {
    let config = || {
        ComponentConfig::new()
            .with_value("T", unstable_profile())
            .with_value("dt", 3600.0)
    };
    let mut rad = Component::new(radiation(SteppingScheme::Explicit), config()).unwrap();
    let mut conv = Component::new(ConvectiveAdjustment::new(), config()).unwrap();

    for _ in 0..24 {
        let from_rad = rad.increments().clone();
        let from_conv = conv.increments().clone();
        rad.step(1u32, &from_conv).unwrap();
        conv.step(1u32, &from_rad).unwrap();
    }

    let (a, b) = (column(&rad, "T"), column(&conv, "T"));
    for (x, y) in a.iter().zip(&b) {
        assert_close(*x, *y, 1e-9);
    }
    assert_close(rad.state().elapsed_time(), DAY, 0.0);
}

#[test]
fn slow_radiation_fast_convection() {
    let mut rad = Component::new(
        radiation(SteppingScheme::Explicit),
        ComponentConfig::new()
            .with_value("T", unstable_profile())
            .with_update_frequency(3600.0),
    )
    .unwrap();
    let mut conv = Component::new(
        ConvectiveAdjustment::new(),
        ComponentConfig::new().with_value("T", unstable_profile()),
    )
    .unwrap();

    // dt = 1200: twelve steps span four hours.
    for _ in 0..12 {
        let from_rad = rad.increments().clone();
        let from_conv = conv.increments().clone();
        rad.step(1u32, &from_conv).unwrap();
        conv.step(1u32, &from_rad).unwrap();
    }

    assert_eq!(rad.metrics().kernel_invocations, 1 + 4);
    assert_eq!(rad.metrics().gated_skips, 8);
    assert_eq!(conv.metrics().kernel_invocations, 1 + 12);
    assert!(column(&rad, "T").iter().all(|t| t.is_finite()));
}

#[test]
fn non_finite_state_surfaces_as_kernel_failure() {
    let mut c = Component::new(radiation(SteppingScheme::Explicit), ComponentConfig::new()).unwrap();
    c.set("T", f64::NAN).unwrap();
    match c.step(1u32, &Increments::new()) {
        Err(ComponentError::KernelFailed { kernel, reason }) => {
            assert_eq!(kernel, "radiation");
            assert_eq!(reason, KernelError::NanDetected { output: "Tinc".into() });
        }
        other => panic!("expected NanDetected, got {other:?}"),
    }
}
