//! Positional argument extraction shared by the reference kernels.

use cadence_core::{KernelError, Value};
use ndarray::{Array1, Array3};

/// Take a 3D column field.
pub fn column(inputs: &[Value], index: usize, name: &str) -> Result<Array3<f64>, KernelError> {
    match inputs.get(index) {
        Some(Value::Array3(a)) => Ok(a.clone()),
        Some(other) => Err(KernelError::InvalidArgument {
            name: name.to_string(),
            reason: format!("expected a 3D field, got shape {:?}", other.shape()),
        }),
        None => Err(missing(name)),
    }
}

/// Take a rank-1 coordinate array.
pub fn coordinates(inputs: &[Value], index: usize, name: &str) -> Result<Array1<f64>, KernelError> {
    match inputs.get(index) {
        Some(Value::Array1(a)) => Ok(a.clone()),
        Some(Value::Scalar(v)) => Ok(Array1::from_elem(1, *v)),
        Some(other) => Err(KernelError::InvalidArgument {
            name: name.to_string(),
            reason: format!("expected coordinates, got shape {:?}", other.shape()),
        }),
        None => Err(missing(name)),
    }
}

/// Take a single number.
pub fn scalar(inputs: &[Value], index: usize, name: &str) -> Result<f64, KernelError> {
    let value = inputs.get(index).ok_or_else(|| missing(name))?;
    value.as_scalar().ok_or_else(|| KernelError::InvalidArgument {
        name: name.to_string(),
        reason: "expected a single number".to_string(),
    })
}

/// Reject output containing NaN.
pub fn check_finite(name: &str, values: &Array3<f64>) -> Result<(), KernelError> {
    if values.iter().any(|v| v.is_nan()) {
        return Err(KernelError::NanDetected {
            output: name.to_string(),
        });
    }
    Ok(())
}

fn missing(name: &str) -> KernelError {
    KernelError::InvalidArgument {
        name: name.to_string(),
        reason: "argument missing".to_string(),
    }
}
