//! Axis-length resolution.
//!
//! Lengths are decided once, before a component is built, by a pure
//! function of the supplied inputs:
//!
//! 1. an explicitly supplied axis (`lev`, `lat`, `lon`) gives its length;
//! 2. otherwise the first supplied array-valued field of a known rank
//!    that spans the axis gives it;
//! 3. otherwise the kernel-enforced length, else the default.
//!
//! When the kernel enforces a length, the result must agree with it.

use cadence_core::{FieldCatalog, FieldRank, Value};
use indexmap::IndexMap;

use crate::axis::{Axis, GridDims};
use crate::error::GridError;
use crate::grid::axis_coordinates;

/// Resolve the length of one axis.
pub fn resolve_axis_length(
    axis: Axis,
    supplied: &IndexMap<String, Value>,
    catalog: &FieldCatalog,
    enforced: Option<usize>,
    default: usize,
) -> Result<usize, GridError> {
    let found = match supplied.get(axis.name()) {
        Some(v) => Some(axis_coordinates(axis, v)?.len()),
        None => inferred_from_fields(axis, supplied, catalog),
    };
    let n = match (found, enforced) {
        (Some(n), _) => n,
        (None, Some(e)) => e,
        (None, None) => default,
    };
    if let Some(required) = enforced {
        if required != n {
            return Err(GridError::DimensionMismatch {
                axis,
                found: n,
                required,
            });
        }
    }
    if n == 0 {
        return Err(GridError::EmptyAxis { axis });
    }
    Ok(n)
}

/// Resolve all three axis lengths.
///
/// `enforced` reports the length a kernel requires along an axis, if any.
pub fn resolve_dims(
    supplied: &IndexMap<String, Value>,
    catalog: &FieldCatalog,
    enforced: impl Fn(Axis) -> Option<usize>,
    defaults: GridDims,
) -> Result<GridDims, GridError> {
    let mut dims = defaults;
    for axis in Axis::ALL {
        let n = resolve_axis_length(axis, supplied, catalog, enforced(axis), defaults.get(axis))?;
        dims.set(axis, n);
    }
    Ok(dims)
}

fn inferred_from_fields(
    axis: Axis,
    supplied: &IndexMap<String, Value>,
    catalog: &FieldCatalog,
) -> Option<usize> {
    supplied.iter().find_map(|(name, value)| {
        let def = catalog.get(name)?;
        // Scalars broadcast to any shape and carry no dimension information.
        if value.len() <= 1 || value.is_text() {
            return None;
        }
        let position = match (def.rank, axis) {
            (FieldRank::Surface, Axis::Lev) => return None,
            (FieldRank::Surface, Axis::Lat) => 0,
            (FieldRank::Surface, Axis::Lon) => 1,
            (FieldRank::Column, Axis::Lev) => 0,
            (FieldRank::Column, Axis::Lat) => 1,
            (FieldRank::Column, Axis::Lon) => 2,
        };
        Some(value.shape().get(position).copied().unwrap_or(1))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};
    use proptest::prelude::*;

    fn supplied(entries: Vec<(&str, Value)>) -> IndexMap<String, Value> {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn explicit_axis_wins() {
        let catalog = FieldCatalog::standard();
        let s = supplied(vec![
            ("lev", Value::from(vec![100.0, 500.0, 900.0])),
            ("T", Value::Array3(Array3::zeros((7, 1, 1)))),
        ]);
        let n = resolve_axis_length(Axis::Lev, &s, &catalog, None, 10).unwrap();
        assert_eq!(n, 3);
    }

    #[test]
    fn inferred_from_column_field() {
        let catalog = FieldCatalog::standard();
        let s = supplied(vec![("T", Value::Array3(Array3::zeros((7, 2, 4))))]);
        let dims = resolve_dims(&s, &catalog, |_| None, GridDims::default()).unwrap();
        assert_eq!(dims, GridDims::new(7, 2, 4));
    }

    #[test]
    fn surface_field_does_not_set_levels() {
        let catalog = FieldCatalog::standard();
        let s = supplied(vec![("Ts", Value::Array2(Array2::zeros((3, 5))))]);
        let dims = resolve_dims(&s, &catalog, |_| None, GridDims::default()).unwrap();
        assert_eq!(dims, GridDims::new(10, 3, 5));
    }

    #[test]
    fn scalar_field_values_are_ignored() {
        let catalog = FieldCatalog::standard();
        let s = supplied(vec![("T", Value::Scalar(250.0))]);
        let dims = resolve_dims(&s, &catalog, |_| None, GridDims::default()).unwrap();
        assert_eq!(dims, GridDims::default());
    }

    #[test]
    fn kernel_enforced_length_used_when_unsupplied() {
        let catalog = FieldCatalog::standard();
        let s = IndexMap::new();
        let enforce = |a: Axis| (a == Axis::Lev).then_some(26);
        let dims = resolve_dims(&s, &catalog, enforce, GridDims::default()).unwrap();
        assert_eq!(dims.nlev, 26);
    }

    #[test]
    fn kernel_enforced_mismatch_fails() {
        let catalog = FieldCatalog::standard();
        let s = supplied(vec![("lev", Value::from(vec![500.0, 900.0]))]);
        match resolve_axis_length(Axis::Lev, &s, &catalog, Some(26), 10) {
            Err(GridError::DimensionMismatch {
                found: 2,
                required: 26,
                ..
            }) => {}
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn rank2_axis_rejected() {
        let catalog = FieldCatalog::standard();
        let s = supplied(vec![("lat", Value::Array2(Array2::zeros((2, 2))))]);
        assert_eq!(
            resolve_axis_length(Axis::Lat, &s, &catalog, None, 1),
            Err(GridError::AxisNotRank1 { axis: Axis::Lat })
        );
    }

    proptest! {
        #[test]
        fn explicit_axis_length_is_preserved(n in 1usize..64) {
            let catalog = FieldCatalog::standard();
            let s = supplied(vec![("lon", Value::from(vec![0.0; n]))]);
            let got = resolve_axis_length(Axis::Lon, &s, &catalog, None, 1).unwrap();
            prop_assert_eq!(got, n);
        }
    }
}
