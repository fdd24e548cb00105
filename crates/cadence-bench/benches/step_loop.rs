//! Criterion benchmarks for the coupled radiation/convection step loop.

use cadence_bench::{column_profile, grid_profile};
use cadence_engine::{Component, ComponentConfig, Increments};
use cadence_test_utils::ConstIncrementKernel;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_step_column(c: &mut Criterion) {
    let mut model = column_profile(42).unwrap();
    // Warm up: run one step so initial allocation is done
    model.step().unwrap();

    c.bench_function("step_column", |b| {
        b.iter(|| {
            model.step().unwrap();
            black_box(model.convection.increments());
        });
    });
}

fn bench_step_grid(c: &mut Criterion) {
    let mut model = grid_profile(42).unwrap();
    model.step().unwrap();

    c.bench_function("step_grid_2048", |b| {
        b.iter(|| {
            model.step().unwrap();
            black_box(model.convection.increments());
        });
    });
}

fn bench_gated_step(c: &mut Criterion) {
    // Gate never opens after construction: measures the bookkeeping alone.
    let mut component = Component::new(
        ConstIncrementKernel::new("heater", "T", 0.0),
        ComponentConfig::new().with_update_frequency(1e12),
    )
    .unwrap();
    let none = Increments::new();

    c.bench_function("gated_step", |b| {
        b.iter(|| {
            component.step(1u32, &none).unwrap();
            black_box(component.metrics().gated_skips);
        });
    });
}

fn bench_one_day_column(c: &mut Criterion) {
    c.bench_function("one_day_column", |b| {
        b.iter(|| {
            let mut model = column_profile(42).unwrap();
            for _ in 0..72 {
                model.step().unwrap();
            }
            black_box(model.radiation.state().elapsed_time());
        });
    });
}

criterion_group!(
    benches,
    bench_step_column,
    bench_step_grid,
    bench_gated_step,
    bench_one_day_column
);
criterion_main!(benches);
