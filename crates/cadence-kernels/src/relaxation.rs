//! Newtonian relaxation of temperature toward equilibrium.
//!
//! A stand-in for radiative transfer: each level relaxes toward an
//! equilibrium temperature on a fixed timescale,
//!
//! ```text
//! dT/dt = -(T - Teq) / tau
//! ```
//!
//! Outputs the heating rate `TdotRad` (K/day) and the per-timestep
//! increment `Tinc`. Under the semi-implicit scheme the rate is evaluated
//! at the mean of the current and previous levels.

use cadence_core::{KernelError, Value};
use cadence_grid::Axis;
use cadence_kernel::{Kernel, KernelOutput, SteppingScheme};

use crate::args::{check_finite, column, scalar};

const SECONDS_PER_DAY: f64 = 86400.0;

/// Relaxes `T` toward a uniform equilibrium temperature.
///
/// ```
/// use cadence_kernels::NewtonianRelaxation;
///
/// let radiation = NewtonianRelaxation::builder()
///     .equilibrium(255.0)
///     .timescale_days(20.0)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct NewtonianRelaxation {
    name: String,
    equilibrium: f64,
    timescale: f64,
    scheme: SteppingScheme,
    levels: Option<usize>,
}

/// Builder for [`NewtonianRelaxation`].
///
/// Defaults: equilibrium 250 K, timescale 40 days, explicit scheme, no
/// enforced level count.
pub struct NewtonianRelaxationBuilder {
    name: String,
    equilibrium: f64,
    timescale: f64,
    scheme: SteppingScheme,
    levels: Option<usize>,
}

impl NewtonianRelaxation {
    /// Create a new builder.
    pub fn builder() -> NewtonianRelaxationBuilder {
        NewtonianRelaxationBuilder {
            name: "radiation".to_string(),
            equilibrium: 250.0,
            timescale: 40.0 * SECONDS_PER_DAY,
            scheme: SteppingScheme::Explicit,
            levels: None,
        }
    }

    /// Equilibrium temperature in K.
    pub fn equilibrium(&self) -> f64 {
        self.equilibrium
    }

    /// Relaxation timescale in seconds.
    pub fn timescale(&self) -> f64 {
        self.timescale
    }
}

impl NewtonianRelaxationBuilder {
    /// Component name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Equilibrium temperature in K.
    pub fn equilibrium(mut self, kelvin: f64) -> Self {
        self.equilibrium = kelvin;
        self
    }

    /// Relaxation timescale in seconds.
    pub fn timescale(mut self, seconds: f64) -> Self {
        self.timescale = seconds;
        self
    }

    /// Relaxation timescale in days.
    pub fn timescale_days(self, days: f64) -> Self {
        self.timescale(days * SECONDS_PER_DAY)
    }

    /// Stepping scheme.
    pub fn scheme(mut self, scheme: SteppingScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Require exactly `nlev` vertical levels.
    pub fn levels(mut self, nlev: usize) -> Self {
        self.levels = Some(nlev);
        self
    }

    /// Build the kernel.
    ///
    /// # Errors
    ///
    /// Returns an error if the timescale is not finite and positive, the
    /// equilibrium temperature is not finite and positive, or the level
    /// count is zero.
    pub fn build(self) -> Result<NewtonianRelaxation, String> {
        if !self.timescale.is_finite() || self.timescale <= 0.0 {
            return Err(format!("timescale must be positive, got {}", self.timescale));
        }
        if !self.equilibrium.is_finite() || self.equilibrium <= 0.0 {
            return Err(format!(
                "equilibrium temperature must be positive, got {}",
                self.equilibrium
            ));
        }
        if self.levels == Some(0) {
            return Err("level count must be at least 1".to_string());
        }
        Ok(NewtonianRelaxation {
            name: self.name,
            equilibrium: self.equilibrium,
            timescale: self.timescale,
            scheme: self.scheme,
            levels: self.levels,
        })
    }
}

impl Kernel for NewtonianRelaxation {
    fn name(&self) -> &str {
        &self.name
    }

    fn scheme(&self) -> SteppingScheme {
        self.scheme
    }

    fn inputs(&self) -> Vec<String> {
        match self.scheme {
            SteppingScheme::SemiImplicit => vec!["T".into(), "Told".into(), "dt".into()],
            _ => vec!["T".into(), "dt".into()],
        }
    }

    fn outputs(&self) -> Vec<String> {
        vec!["TdotRad".into(), "Tinc".into()]
    }

    fn prognostic(&self) -> Vec<String> {
        vec!["T".into()]
    }

    fn diagnostic(&self) -> Vec<String> {
        vec!["TdotRad".into()]
    }

    fn axis_length(&self, axis: Axis) -> Option<usize> {
        match axis {
            Axis::Lev => self.levels,
            _ => None,
        }
    }

    fn invoke(&self, inputs: &[Value]) -> Result<KernelOutput, KernelError> {
        let mut t = column(inputs, 0, "T")?;
        let dt = match self.scheme {
            SteppingScheme::SemiImplicit => {
                let old = column(inputs, 1, "Told")?;
                if old.shape() != t.shape() {
                    return Err(KernelError::InvalidArgument {
                        name: "Told".into(),
                        reason: format!("shape {:?} differs from T {:?}", old.shape(), t.shape()),
                    });
                }
                t = (&t + &old) * 0.5;
                scalar(inputs, 2, "dt")?
            }
            _ => scalar(inputs, 1, "dt")?,
        };

        let rate = t.mapv(|v| -(v - self.equilibrium) / self.timescale);
        let increment = &rate * dt;
        check_finite("Tinc", &increment)?;
        let heating = rate * SECONDS_PER_DAY;
        Ok(KernelOutput::Many(vec![
            Value::from(heating),
            Value::from(increment),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn column_of(values: &[f64]) -> Value {
        Value::from(Array3::from_shape_vec((values.len(), 1, 1), values.to_vec()).unwrap())
    }

    fn outputs(kernel: &NewtonianRelaxation, inputs: &[Value]) -> Vec<Value> {
        match kernel.invoke(inputs).unwrap() {
            KernelOutput::Many(v) => v,
            KernelOutput::Single(v) => vec![v],
        }
    }

    #[test]
    fn builder_defaults() {
        let k = NewtonianRelaxation::builder().build().unwrap();
        assert_eq!(k.equilibrium(), 250.0);
        assert_eq!(k.timescale(), 40.0 * 86400.0);
        assert_eq!(k.inputs(), vec!["T".to_string(), "dt".to_string()]);
    }

    #[test]
    fn builder_rejects_nonpositive_timescale() {
        assert!(NewtonianRelaxation::builder().timescale(0.0).build().is_err());
        assert!(NewtonianRelaxation::builder().timescale(f64::NAN).build().is_err());
        assert!(NewtonianRelaxation::builder().levels(0).build().is_err());
    }

    #[test]
    fn relaxes_toward_equilibrium() {
        let k = NewtonianRelaxation::builder()
            .equilibrium(250.0)
            .timescale(1000.0)
            .build()
            .unwrap();
        let out = outputs(&k, &[column_of(&[260.0, 250.0, 240.0]), Value::Scalar(100.0)]);
        assert_eq!(out[1].to_vec(), vec![-1.0, 0.0, 1.0]);
        assert_eq!(out[0].to_vec(), vec![-0.01 * 86400.0, 0.0, 0.01 * 86400.0]);
    }

    #[test]
    fn semi_implicit_uses_mean_of_levels() {
        let k = NewtonianRelaxation::builder()
            .equilibrium(250.0)
            .timescale(1000.0)
            .scheme(SteppingScheme::SemiImplicit)
            .build()
            .unwrap();
        assert_eq!(k.inputs()[1], "Told");
        let out = outputs(
            &k,
            &[column_of(&[270.0]), column_of(&[250.0]), Value::Scalar(100.0)],
        );
        assert_eq!(out[1].to_vec(), vec![-1.0]);
    }

    #[test]
    fn nan_input_is_detected() {
        let k = NewtonianRelaxation::builder().build().unwrap();
        let err = k
            .invoke(&[column_of(&[f64::NAN]), Value::Scalar(600.0)])
            .unwrap_err();
        assert_eq!(err, KernelError::NanDetected { output: "Tinc".into() });
    }

    #[test]
    fn enforces_levels() {
        let k = NewtonianRelaxation::builder().levels(26).build().unwrap();
        assert_eq!(k.axis_length(Axis::Lev), Some(26));
        assert_eq!(k.axis_length(Axis::Lat), None);
    }
}
