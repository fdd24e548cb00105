//! Benchmark profiles for the Cadence coupling engine.
//!
//! Provides pre-built coupled models for benchmarking:
//!
//! - [`column_profile`]: one 26-level column
//! - [`grid_profile`]: 26 levels on a 32x64 horizontal grid
//! - [`initial_temperature`]: deterministic perturbed profile via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use cadence_engine::{Component, ComponentConfig, ComponentError, ConfigError};
use cadence_kernels::{ConvectiveAdjustment, NewtonianRelaxation};
use ndarray::Array3;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Vertical levels in every profile.
pub const NLEV: usize = 26;

/// Radiation and convection coupled by increment exchange.
///
/// Radiation recomputes hourly; convection every 20-minute step.
pub struct CoupledModel {
    /// The slow component.
    pub radiation: Component,
    /// The fast component.
    pub convection: Component,
}

impl CoupledModel {
    /// Advance both components by one step, each receiving the other's
    /// increments from before the step.
    pub fn step(&mut self) -> Result<(), ComponentError> {
        let from_rad = self.radiation.increments().clone();
        let from_conv = self.convection.increments().clone();
        self.radiation.step(1u32, &from_conv)?;
        self.convection.step(1u32, &from_rad)?;
        Ok(())
    }
}

fn build(nlat: usize, nlon: usize, seed: u64) -> Result<CoupledModel, ComponentError> {
    // Axis lengths are inferred from the temperature field.
    let config = || ComponentConfig::new().with_value("T", initial_temperature(nlat, nlon, seed));
    let radiation = NewtonianRelaxation::builder()
        .levels(NLEV)
        .build()
        .map_err(|reason| ConfigError::InvalidParameter {
            name: "radiation".into(),
            reason,
        })?;
    Ok(CoupledModel {
        radiation: Component::new(radiation, config().with_update_frequency(3600.0))?,
        convection: Component::new(ConvectiveAdjustment::new(), config())?,
    })
}

/// Build the single-column profile.
pub fn column_profile(seed: u64) -> Result<CoupledModel, ComponentError> {
    build(1, 1, seed)
}

/// Build the 32x64 grid profile.
///
/// Same pipeline as [`column_profile`] at 2048 columns.
pub fn grid_profile(seed: u64) -> Result<CoupledModel, ComponentError> {
    build(32, 64, seed)
}

/// Generate a deterministic initial temperature field.
///
/// A linear lapse from 200 K at the top to 290 K at the surface, with
/// uniform noise of up to 5 K per point drawn from a ChaCha8 stream
/// seeded by `seed`. Shape `(NLEV, nlat, nlon)`.
pub fn initial_temperature(nlat: usize, nlon: usize, seed: u64) -> Array3<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Array3::from_shape_fn((NLEV, nlat, nlon), |(k, _, _)| {
        let base = 200.0 + 90.0 * k as f64 / (NLEV - 1) as f64;
        // 53 random bits mapped to [0, 1).
        let u = (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        base + 5.0 * (2.0 * u - 1.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_temperature_is_deterministic() {
        let a = initial_temperature(2, 3, 42);
        let b = initial_temperature(2, 3, 42);
        let c = initial_temperature(2, 3, 43);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|&t| (195.0..295.0).contains(&t)));
    }

    #[test]
    fn column_profile_steps() {
        let mut model = column_profile(7).unwrap();
        for _ in 0..6 {
            model.step().unwrap();
        }
        assert_eq!(model.radiation.metrics().kernel_invocations, 1 + 2);
        assert_eq!(model.convection.metrics().kernel_invocations, 1 + 6);
        assert_eq!(model.convection.grid().nlev(), NLEV);
    }
}
