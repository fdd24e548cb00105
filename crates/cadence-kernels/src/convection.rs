//! Dry convective adjustment.
//!
//! Each column is made statically stable by merging unstable layers into
//! well-mixed blocks of uniform potential temperature. The whole
//! adjustment is returned as a single-step increment.
//!
//! Levels are pressures in mb, ordered top (index 0) to bottom.

use cadence_core::{KernelError, Value};
use cadence_kernel::{Kernel, KernelOutput};
use ndarray::{Array1, Array3};

use crate::args::{check_finite, column, coordinates, scalar};
use crate::REFERENCE_PRESSURE;

const SECONDS_PER_DAY: f64 = 86400.0;

/// Dry adiabatic adjustment of `T`.
///
/// Outputs, in order: `TdotConv` (K/day), `theta` (K, after adjustment)
/// and `Tinc`.
#[derive(Clone, Debug)]
pub struct ConvectiveAdjustment {
    name: String,
}

impl ConvectiveAdjustment {
    /// An adjustment kernel named `convection`.
    pub fn new() -> Self {
        Self {
            name: "convection".to_string(),
        }
    }

    /// Rename the kernel.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for ConvectiveAdjustment {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge unstable layers into well-mixed blocks until `theta` is
/// non-increasing from top (index 0) to bottom.
///
/// Layers are weighted by `weights` (pressure thickness); each block takes
/// the weighted mean of its layers, so the weighted sum is conserved.
/// Returns the number of merges performed.
pub fn adjust_column(theta: &mut [f64], weights: &[f64]) -> usize {
    // (weighted sum, total weight, layer count)
    let mut blocks: Vec<(f64, f64, usize)> = Vec::with_capacity(theta.len());
    let mut merges = 0;
    for (&t, &w) in theta.iter().zip(weights) {
        blocks.push((t * w, w, 1));
        while blocks.len() > 1 {
            let (s1, w1, _) = blocks[blocks.len() - 1];
            let (s0, w0, _) = blocks[blocks.len() - 2];
            if s0 / w0 >= s1 / w1 {
                break;
            }
            let (s, w, n) = blocks.pop().unwrap_or_default();
            if let Some(above) = blocks.last_mut() {
                above.0 += s;
                above.1 += w;
                above.2 += n;
            }
            merges += 1;
        }
    }
    let mut k = 0;
    for (s, w, n) in blocks {
        let mean = s / w;
        theta[k..k + n].fill(mean);
        k += n;
    }
    merges
}

/// Pressure thickness of each layer, from midpoints between levels.
fn layer_weights(lev: &Array1<f64>) -> Vec<f64> {
    let n = lev.len();
    (0..n)
        .map(|k| {
            let top = if k == 0 { 0.0 } else { 0.5 * (lev[k - 1] + lev[k]) };
            let bottom = if k + 1 == n {
                REFERENCE_PRESSURE.max(lev[k])
            } else {
                0.5 * (lev[k] + lev[k + 1])
            };
            (bottom - top).abs().max(f64::EPSILON)
        })
        .collect()
}

impl Kernel for ConvectiveAdjustment {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> Vec<String> {
        ["T", "lev", "dt", "Rd", "Cpd"].map(String::from).to_vec()
    }

    fn outputs(&self) -> Vec<String> {
        ["TdotConv", "theta", "Tinc"].map(String::from).to_vec()
    }

    fn prognostic(&self) -> Vec<String> {
        vec!["T".into()]
    }

    fn diagnostic(&self) -> Vec<String> {
        vec!["TdotConv".into(), "theta".into()]
    }

    fn invoke(&self, inputs: &[Value]) -> Result<KernelOutput, KernelError> {
        let t = column(inputs, 0, "T")?;
        let lev = coordinates(inputs, 1, "lev")?;
        let dt = scalar(inputs, 2, "dt")?;
        let kappa = scalar(inputs, 3, "Rd")? / scalar(inputs, 4, "Cpd")?;
        let (nlev, nlat, nlon) = t.dim();
        if lev.len() != nlev {
            return Err(KernelError::InvalidArgument {
                name: "lev".into(),
                reason: format!("{} levels for a field with {nlev}", lev.len()),
            });
        }
        if lev.iter().any(|&p| p <= 0.0) {
            return Err(KernelError::InvalidArgument {
                name: "lev".into(),
                reason: "pressures must be positive".into(),
            });
        }

        let exner: Vec<f64> = lev
            .iter()
            .map(|&p| (p / REFERENCE_PRESSURE).powf(kappa))
            .collect();
        let weights = layer_weights(&lev);
        let mut theta = Array3::<f64>::zeros(t.dim());
        let mut adjusted = t.clone();
        let mut buf = vec![0.0; nlev];
        for j in 0..nlat {
            for i in 0..nlon {
                for k in 0..nlev {
                    buf[k] = t[[k, j, i]] / exner[k];
                }
                adjust_column(&mut buf, &weights);
                for k in 0..nlev {
                    theta[[k, j, i]] = buf[k];
                    adjusted[[k, j, i]] = buf[k] * exner[k];
                }
            }
        }

        let increment = &adjusted - &t;
        check_finite("Tinc", &increment)?;
        let heating = &increment * (SECONDS_PER_DAY / dt);
        Ok(KernelOutput::Many(vec![
            Value::from(heating),
            Value::from(theta),
            Value::from(increment),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn stable_column_untouched() {
        let mut theta = vec![320.0, 310.0, 300.0];
        assert_eq!(adjust_column(&mut theta, &[1.0; 3]), 0);
        assert_eq!(theta, vec![320.0, 310.0, 300.0]);
    }

    #[test]
    fn unstable_pair_mixed_to_weighted_mean() {
        let mut theta = vec![300.0, 310.0];
        assert_eq!(adjust_column(&mut theta, &[1.0, 3.0]), 1);
        assert_eq!(theta, vec![307.5, 307.5]);
    }

    #[test]
    fn mixing_propagates_upward() {
        let mut theta = vec![300.0, 310.0, 320.0];
        assert_eq!(adjust_column(&mut theta, &[1.0; 3]), 2);
        assert_eq!(theta, vec![310.0, 310.0, 310.0]);
    }

    #[test]
    fn adjusts_superadiabatic_column() {
        let k = ConvectiveAdjustment::new();
        let lev = Value::from(vec![250.0, 750.0]);
        // Lower layer far warmer than the dry adiabat allows.
        let t = Value::from(Array3::from_shape_vec((2, 1, 1), vec![200.0, 320.0]).unwrap());
        let out = match k
            .invoke(&[
                t,
                lev,
                Value::Scalar(600.0),
                Value::Scalar(287.04),
                Value::Scalar(1004.64),
            ])
            .unwrap()
        {
            KernelOutput::Many(v) => v,
            KernelOutput::Single(_) => panic!("expected three outputs"),
        };
        let theta = out[1].to_vec();
        assert!((theta[0] - theta[1]).abs() < 1e-9);
        let inc = out[2].to_vec();
        assert!(inc[0] > 0.0 && inc[1] < 0.0);
    }

    #[test]
    fn level_count_must_match() {
        let k = ConvectiveAdjustment::new();
        let t = Value::from(Array3::<f64>::from_elem((3, 1, 1), 280.0));
        let err = k
            .invoke(&[
                t,
                Value::from(vec![500.0]),
                Value::Scalar(600.0),
                Value::Scalar(287.0),
                Value::Scalar(1004.0),
            ])
            .unwrap_err();
        assert!(matches!(err, KernelError::InvalidArgument { ref name, .. } if name == "lev"));
    }

    proptest! {
        #[test]
        fn adjustment_conserves_weighted_theta_and_stabilizes(
            theta in proptest::collection::vec(250.0f64..400.0, 2..12),
        ) {
            let weights: Vec<f64> = (0..theta.len()).map(|k| 1.0 + k as f64).collect();
            let before: f64 = theta.iter().zip(&weights).map(|(t, w)| t * w).sum();
            let mut adjusted = theta.clone();
            let merges = adjust_column(&mut adjusted, &weights);
            prop_assert!(merges < theta.len());
            let after: f64 = adjusted.iter().zip(&weights).map(|(t, w)| t * w).sum();
            prop_assert!((before - after).abs() < 1e-6 * before.abs());
            for k in 1..adjusted.len() {
                prop_assert!(adjusted[k - 1] >= adjusted[k] - 1e-9);
            }
        }
    }
}
