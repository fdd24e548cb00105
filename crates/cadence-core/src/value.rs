//! The tagged [`Value`] type stored in parameters, grid and state.
//!
//! Every quantity a component handles is one of: a scalar, a piece of
//! text, or a dense `f64` array of rank 1 (axes), 2 (surface fields) or
//! 3 (column fields). Shapes are checked when values are combined or
//! conformed to a declared field shape, never discovered later.

use ndarray::{Array1, Array2, Array3, ArrayD, Ix1, Ix2, Ix3, IxDyn};

use crate::error::ValueError;
use crate::id::Shape;

/// A scalar, text, or rank-1/2/3 array value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A single number.
    Scalar(f64),
    /// A text value (e.g. a run title). Never squeezed or reshaped.
    Text(String),
    /// A one-dimensional array, used for axes.
    Array1(Array1<f64>),
    /// A two-dimensional array `(nlat, nlon)`.
    Array2(Array2<f64>),
    /// A three-dimensional array `(nlev, nlat, nlon)`.
    Array3(Array3<f64>),
}

impl Value {
    /// Shape of the value. Scalars and text have an empty shape.
    pub fn shape(&self) -> Shape {
        match self {
            Self::Scalar(_) | Self::Text(_) => Shape::new(),
            Self::Array1(a) => a.shape().iter().copied().collect(),
            Self::Array2(a) => a.shape().iter().copied().collect(),
            Self::Array3(a) => a.shape().iter().copied().collect(),
        }
    }

    /// Number of numeric elements. Text has none.
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Text(_) => 0,
            Self::Array1(a) => a.len(),
            Self::Array2(a) => a.len(),
            Self::Array3(a) => a.len(),
        }
    }

    /// Returns `true` if the value holds no numeric elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` for [`Value::Text`].
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// The value as a single number, if it holds exactly one element.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Text(_) => None,
            _ if self.len() == 1 => self.to_vec().first().copied(),
            _ => None,
        }
    }

    /// The value as text, if it is [`Value::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// All numeric elements in row-major order. Empty for text.
    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            Self::Scalar(v) => vec![*v],
            Self::Text(_) => Vec::new(),
            Self::Array1(a) => a.iter().copied().collect(),
            Self::Array2(a) => a.iter().copied().collect(),
            Self::Array3(a) => a.iter().copied().collect(),
        }
    }

    /// Whether any element is NaN.
    pub fn has_nan(&self) -> bool {
        self.to_vec().iter().any(|v| v.is_nan())
    }

    /// Convert to a dynamic-rank array. `None` for text.
    pub fn to_dyn(&self) -> Option<ArrayD<f64>> {
        match self {
            Self::Scalar(v) => Some(ArrayD::from_elem(IxDyn(&[]), *v)),
            Self::Text(_) => None,
            Self::Array1(a) => Some(a.clone().into_dyn()),
            Self::Array2(a) => Some(a.clone().into_dyn()),
            Self::Array3(a) => Some(a.clone().into_dyn()),
        }
    }

    /// Build a value from a dynamic-rank array of rank 0 to 3.
    pub fn from_dyn(array: ArrayD<f64>) -> Result<Self, ValueError> {
        let rank = array.ndim();
        let mismatch = |found: &[usize], expected: usize| ValueError::ShapeMismatch {
            found: found.to_vec(),
            expected: vec![0; expected],
        };
        match rank {
            0 => Ok(Self::Scalar(array.iter().copied().next().unwrap_or(0.0))),
            1 => {
                let shape = array.shape().to_vec();
                array
                    .into_dimensionality::<Ix1>()
                    .map(Self::Array1)
                    .map_err(|_| mismatch(&shape, 1))
            }
            2 => {
                let shape = array.shape().to_vec();
                array
                    .into_dimensionality::<Ix2>()
                    .map(Self::Array2)
                    .map_err(|_| mismatch(&shape, 2))
            }
            3 => {
                let shape = array.shape().to_vec();
                array
                    .into_dimensionality::<Ix3>()
                    .map(Self::Array3)
                    .map_err(|_| mismatch(&shape, 3))
            }
            rank => Err(ValueError::UnsupportedRank { rank }),
        }
    }

    /// Drop every axis of length one.
    ///
    /// A `(1, 1, n)` column becomes a rank-1 array; a single element
    /// becomes a scalar. Text is returned unchanged.
    pub fn squeeze(&self) -> Self {
        let Some(array) = self.to_dyn() else {
            return self.clone();
        };
        let shape: Vec<usize> = array.shape().iter().copied().filter(|&n| n != 1).collect();
        match reshape_dyn(&array, &shape).and_then(Self::from_dyn) {
            Ok(v) => v,
            // Squeezing never changes the element count, so reshaping cannot
            // fail; fall back to the original value regardless.
            Err(_) => self.clone(),
        }
    }

    /// Conform the value to `shape`.
    ///
    /// A scalar (or any single-element array) is broadcast to fill the
    /// shape. Arrays with the same element count are reshaped in row-major
    /// order, preserving data element-for-element.
    pub fn conform(&self, shape: &[usize]) -> Result<Self, ValueError> {
        let Some(array) = self.to_dyn() else {
            return Err(ValueError::NotNumeric { operation: "reshape" });
        };
        let target: usize = shape.iter().product();
        if array.len() == target {
            return reshape_dyn(&array, shape).and_then(Self::from_dyn);
        }
        if array.len() == 1 {
            let fill = array.iter().copied().next().unwrap_or(0.0);
            return Self::from_dyn(ArrayD::from_elem(IxDyn(shape), fill));
        }
        Err(ValueError::ShapeMismatch {
            found: array.shape().to_vec(),
            expected: shape.to_vec(),
        })
    }

    /// Element-wise sum.
    ///
    /// Shapes must match, except that a single-element operand is
    /// broadcast over the other.
    pub fn add(&self, other: &Self) -> Result<Self, ValueError> {
        let (Some(a), Some(b)) = (self.to_dyn(), other.to_dyn()) else {
            return Err(ValueError::NotNumeric { operation: "add" });
        };
        if a.shape() == b.shape() {
            return Self::from_dyn(&a + &b);
        }
        if b.len() == 1 {
            let s = b.iter().copied().next().unwrap_or(0.0);
            return Self::from_dyn(a.mapv(|v| v + s));
        }
        if a.len() == 1 {
            let s = a.iter().copied().next().unwrap_or(0.0);
            return Self::from_dyn(b.mapv(|v| v + s));
        }
        Err(ValueError::ShapeMismatch {
            found: b.shape().to_vec(),
            expected: a.shape().to_vec(),
        })
    }

    /// Add `other` into `self` in place.
    pub fn accumulate(&mut self, other: &Self) -> Result<(), ValueError> {
        *self = self.add(other)?;
        Ok(())
    }
}

fn reshape_dyn(array: &ArrayD<f64>, shape: &[usize]) -> Result<ArrayD<f64>, ValueError> {
    let data: Vec<f64> = array.iter().copied().collect();
    ArrayD::from_shape_vec(IxDyn(shape), data).map_err(|_| ValueError::ShapeMismatch {
        found: array.shape().to_vec(),
        expected: shape.to_vec(),
    })
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Array1<f64>> for Value {
    fn from(a: Array1<f64>) -> Self {
        Self::Array1(a)
    }
}

impl From<Array2<f64>> for Value {
    fn from(a: Array2<f64>) -> Self {
        Self::Array2(a)
    }
}

impl From<Array3<f64>> for Value {
    fn from(a: Array3<f64>) -> Self {
        Self::Array3(a)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Self::Array1(Array1::from(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};
    use proptest::prelude::*;

    #[test]
    fn squeeze_column_to_profile() {
        let v = Value::Array3(Array3::from_shape_vec((4, 1, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap());
        assert_eq!(v.squeeze(), Value::Array1(array![1.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn squeeze_single_element_to_scalar() {
        let v = Value::Array2(array![[7.5]]);
        assert_eq!(v.squeeze(), Value::Scalar(7.5));
    }

    #[test]
    fn squeeze_leaves_text_alone() {
        let v = Value::from("run 1");
        assert_eq!(v.squeeze(), v);
    }

    #[test]
    fn conform_broadcasts_scalar() {
        let v = Value::Scalar(283.15).conform(&[2, 1, 3]).unwrap();
        assert_eq!(v.shape().as_slice(), &[2, 1, 3]);
        assert!(v.to_vec().iter().all(|&x| x == 283.15));
    }

    #[test]
    fn conform_rejects_wrong_count() {
        let v = Value::from(vec![1.0, 2.0, 3.0]);
        match v.conform(&[2, 2]) {
            Err(ValueError::ShapeMismatch { found, expected }) => {
                assert_eq!(found, vec![3]);
                assert_eq!(expected, vec![2, 2]);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn conform_text_fails() {
        assert!(matches!(
            Value::from("x").conform(&[1]),
            Err(ValueError::NotNumeric { .. })
        ));
    }

    #[test]
    fn add_broadcasts_scalar_operand() {
        let a = Value::Array2(array![[1.0, 2.0], [3.0, 4.0]]);
        let sum = a.add(&Value::Scalar(1.0)).unwrap();
        assert_eq!(sum, Value::Array2(array![[2.0, 3.0], [4.0, 5.0]]));
    }

    #[test]
    fn add_shape_mismatch_fails() {
        let a = Value::from(vec![1.0, 2.0]);
        let b = Value::from(vec![1.0, 2.0, 3.0]);
        assert!(matches!(a.add(&b), Err(ValueError::ShapeMismatch { .. })));
    }

    #[test]
    fn as_scalar_accepts_single_element_arrays() {
        assert_eq!(Value::Array3(Array3::from_elem((1, 1, 1), 2.0)).as_scalar(), Some(2.0));
        assert_eq!(Value::from(vec![1.0, 2.0]).as_scalar(), None);
    }

    proptest! {
        #[test]
        fn conform_preserves_elements(data in prop::collection::vec(-1e6f64..1e6, 12)) {
            let v = Value::from(data.clone());
            let shaped = v.conform(&[3, 2, 2]).unwrap();
            let shape = shaped.shape();
            prop_assert_eq!(shape.as_slice(), &[3usize, 2, 2][..]);
            prop_assert_eq!(shaped.to_vec(), data);
        }

        #[test]
        fn add_commutative(a in prop::collection::vec(-1e3f64..1e3, 6),
                           b in prop::collection::vec(-1e3f64..1e3, 6)) {
            let va = Value::from(a).conform(&[2, 3]).unwrap();
            let vb = Value::from(b).conform(&[2, 3]).unwrap();
            prop_assert_eq!(va.add(&vb).unwrap(), vb.add(&va).unwrap());
        }
    }
}
