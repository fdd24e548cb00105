//! Error types for grid construction and dimension resolution.

use std::fmt;

use crate::axis::Axis;

/// Errors arising from grid construction, axis updates, or resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A supplied axis value was not a rank-1 array or scalar.
    AxisNotRank1 {
        /// The offending axis.
        axis: Axis,
    },
    /// An axis has zero length.
    EmptyAxis {
        /// The offending axis.
        axis: Axis,
    },
    /// The supplied length disagrees with the length the kernel enforces.
    DimensionMismatch {
        /// The axis in question.
        axis: Axis,
        /// Length derived from the supplied inputs.
        found: usize,
        /// Length the kernel requires.
        required: usize,
    },
    /// An axis assignment would change the axis length.
    AxisLengthChanged {
        /// The axis in question.
        axis: Axis,
        /// Length of the assigned value.
        found: usize,
        /// Current length of the axis.
        expected: usize,
    },
    /// `nlev`, `nlat` and `nlon` are derived and cannot be assigned.
    ReadOnly {
        /// The name that was assigned.
        name: String,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AxisNotRank1 { axis } => {
                write!(f, "input {} must be rank 1", axis.name())
            }
            Self::EmptyAxis { axis } => write!(f, "axis {} has zero length", axis.name()),
            Self::DimensionMismatch {
                axis,
                found,
                required,
            } => write!(
                f,
                "input {} has dimension {found} but the kernel requires {required}",
                axis.name()
            ),
            Self::AxisLengthChanged {
                axis,
                found,
                expected,
            } => write!(
                f,
                "cannot assign {found} values to axis {} of length {expected}",
                axis.name()
            ),
            Self::ReadOnly { name } => write!(f, "grid entry '{name}' is read-only"),
        }
    }
}

impl std::error::Error for GridError {}
