//! The [`Grid`]: axis coordinates plus derived axis lengths.

use cadence_core::{FieldRank, Shape, Value, ValueSource};
use indexmap::IndexMap;
use ndarray::Array1;

use crate::axis::{Axis, GridDims};
use crate::error::GridError;

/// Axis coordinates for a component.
///
/// Exposes six named entries through [`ValueSource`]: the coordinate
/// arrays `lev`, `lat`, `lon` and the derived scalars `nlev`, `nlat`,
/// `nlon`. Axis lengths are fixed at construction; assignments that would
/// change a length are rejected so field shapes stay consistent.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    dims: GridDims,
    values: IndexMap<String, Value>,
}

impl Grid {
    /// Build a grid from explicit coordinate arrays.
    pub fn new(lev: Array1<f64>, lat: Array1<f64>, lon: Array1<f64>) -> Result<Self, GridError> {
        for (axis, coords) in [(Axis::Lev, &lev), (Axis::Lat, &lat), (Axis::Lon, &lon)] {
            if coords.is_empty() {
                return Err(GridError::EmptyAxis { axis });
            }
        }
        let dims = GridDims::new(lev.len(), lat.len(), lon.len());
        let mut values = IndexMap::with_capacity(6);
        values.insert(Axis::Lev.name().to_string(), Value::Array1(lev));
        values.insert(Axis::Lat.name().to_string(), Value::Array1(lat));
        values.insert(Axis::Lon.name().to_string(), Value::Array1(lon));
        for axis in Axis::ALL {
            values.insert(
                axis.length_name().to_string(),
                Value::Scalar(dims.get(axis) as f64),
            );
        }
        Ok(Self { dims, values })
    }

    /// Build a grid of the given dimensions with default coordinates.
    pub fn with_dims(dims: GridDims) -> Result<Self, GridError> {
        Self::new(
            Axis::Lev.default_coordinates(dims.nlev),
            Axis::Lat.default_coordinates(dims.nlat),
            Axis::Lon.default_coordinates(dims.nlon),
        )
    }

    /// Build a grid of resolved dimensions, taking coordinates from
    /// `supplied` where present and defaults elsewhere.
    pub fn from_supplied(
        dims: GridDims,
        supplied: &IndexMap<String, Value>,
    ) -> Result<Self, GridError> {
        let coordinates = |axis: Axis| -> Result<Array1<f64>, GridError> {
            let n = dims.get(axis);
            let Some(v) = supplied.get(axis.name()) else {
                return Ok(axis.default_coordinates(n));
            };
            let c = axis_coordinates(axis, v)?;
            if c.len() != n {
                return Err(GridError::AxisLengthChanged {
                    axis,
                    found: c.len(),
                    expected: n,
                });
            }
            Ok(c)
        };
        Self::new(
            coordinates(Axis::Lev)?,
            coordinates(Axis::Lat)?,
            coordinates(Axis::Lon)?,
        )
    }

    /// Resolved axis lengths.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Number of vertical levels.
    pub fn nlev(&self) -> usize {
        self.dims.nlev
    }

    /// Number of latitudes.
    pub fn nlat(&self) -> usize {
        self.dims.nlat
    }

    /// Number of longitudes.
    pub fn nlon(&self) -> usize {
        self.dims.nlon
    }

    /// `(nlev, nlat, nlon)`.
    pub fn shape_3d(&self) -> [usize; 3] {
        [self.dims.nlev, self.dims.nlat, self.dims.nlon]
    }

    /// Declared shape of a field of the given rank on this grid.
    pub fn field_shape(&self, rank: FieldRank) -> Shape {
        rank.shape(self.dims.nlev, self.dims.nlat, self.dims.nlon)
    }

    /// Coordinate values of an axis.
    pub fn axis(&self, axis: Axis) -> &Array1<f64> {
        match self.values.get(axis.name()) {
            Some(Value::Array1(a)) => a,
            // Constructors only ever store rank-1 coordinates.
            _ => unreachable!("axis {} stored with wrong type", axis.name()),
        }
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Assign new coordinates to an axis.
    ///
    /// The length must not change. Assigning `nlev`/`nlat`/`nlon` fails
    /// with [`GridError::ReadOnly`]. Returns `Ok(false)` if `name` is not a
    /// grid entry at all.
    pub fn set(&mut self, name: &str, value: &Value) -> Result<bool, GridError> {
        if Axis::from_length_name(name).is_some() {
            return Err(GridError::ReadOnly {
                name: name.to_string(),
            });
        }
        let Some(axis) = Axis::from_name(name) else {
            return Ok(false);
        };
        let coords = axis_coordinates(axis, value)?;
        let expected = self.dims.get(axis);
        if coords.len() != expected {
            return Err(GridError::AxisLengthChanged {
                axis,
                found: coords.len(),
                expected,
            });
        }
        self.values.insert(name.to_string(), Value::Array1(coords));
        Ok(true)
    }
}

impl ValueSource for Grid {
    fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    fn names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

/// Interpret a supplied value as axis coordinates.
///
/// A scalar is a single-point axis; a rank-1 array is used as-is.
pub(crate) fn axis_coordinates(axis: Axis, value: &Value) -> Result<Array1<f64>, GridError> {
    let coords = match value {
        Value::Scalar(v) => Array1::from_elem(1, *v),
        Value::Array1(a) => a.clone(),
        _ => return Err(GridError::AxisNotRank1 { axis }),
    };
    if coords.is_empty() {
        return Err(GridError::EmptyAxis { axis });
    }
    Ok(coords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn derived_lengths_are_exposed() {
        let grid = Grid::with_dims(GridDims::new(5, 2, 3)).unwrap();
        assert_eq!(grid.get("nlev"), Some(&Value::Scalar(5.0)));
        assert_eq!(grid.get("nlat"), Some(&Value::Scalar(2.0)));
        assert_eq!(grid.get("nlon"), Some(&Value::Scalar(3.0)));
        assert_eq!(grid.shape_3d(), [5, 2, 3]);
        assert_eq!(grid.field_shape(FieldRank::Surface).as_slice(), &[2, 3]);
    }

    #[test]
    fn set_axis_keeps_length() {
        let mut grid = Grid::with_dims(GridDims::new(2, 1, 1)).unwrap();
        assert!(grid.set("lev", &Value::from(vec![100.0, 900.0])).unwrap());
        assert_eq!(grid.axis(Axis::Lev), &array![100.0, 900.0]);
        match grid.set("lev", &Value::from(vec![1.0, 2.0, 3.0])) {
            Err(GridError::AxisLengthChanged { found: 3, expected: 2, .. }) => {}
            other => panic!("expected AxisLengthChanged, got {other:?}"),
        }
    }

    #[test]
    fn set_derived_length_is_read_only() {
        let mut grid = Grid::with_dims(GridDims::default()).unwrap();
        assert!(matches!(
            grid.set("nlev", &Value::Scalar(3.0)),
            Err(GridError::ReadOnly { .. })
        ));
    }

    #[test]
    fn set_unknown_name_is_not_handled() {
        let mut grid = Grid::with_dims(GridDims::default()).unwrap();
        assert_eq!(grid.set("T", &Value::Scalar(3.0)), Ok(false));
    }

    #[test]
    fn from_supplied_uses_given_coordinates() {
        let mut supplied = IndexMap::new();
        supplied.insert("lat".to_string(), Value::from(vec![-10.0, 10.0]));
        let grid = Grid::from_supplied(GridDims::new(3, 2, 1), &supplied).unwrap();
        assert_eq!(grid.axis(Axis::Lat), &array![-10.0, 10.0]);
        assert_eq!(grid.axis(Axis::Lev).len(), 3);
    }

    #[test]
    fn empty_axis_rejected() {
        let err = Grid::new(Array1::zeros(0), array![0.0], array![0.0]).unwrap_err();
        assert_eq!(err, GridError::EmptyAxis { axis: Axis::Lev });
    }
}
