//! Error types shared across the Cadence workspace.
//!
//! Organized by concern: value shape handling, name lookup, and kernel
//! execution. Subsystem crates wrap these in their own error enums.

use std::error::Error;
use std::fmt;

/// Errors from [`Value`](crate::Value) arithmetic and reshaping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueError {
    /// Element count of the value does not match the target shape.
    ShapeMismatch {
        /// Shape of the value that was supplied.
        found: Vec<usize>,
        /// Shape that was required.
        expected: Vec<usize>,
    },
    /// The operation is not defined for text values.
    NotNumeric {
        /// Name of the operation that was attempted.
        operation: &'static str,
    },
    /// An array had more axes than the value type can represent.
    UnsupportedRank {
        /// Number of axes found.
        rank: usize,
    },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { found, expected } => {
                write!(f, "shape {found:?} cannot be conformed to {expected:?}")
            }
            Self::NotNumeric { operation } => {
                write!(f, "{operation} is not defined for text values")
            }
            Self::UnsupportedRank { rank } => {
                write!(f, "arrays of rank {rank} are not supported (max 3)")
            }
        }
    }
}

impl Error for ValueError {}

/// A name could not be resolved in any of the consulted stores.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupError {
    /// The name that was looked up.
    pub name: String,
}

impl LookupError {
    /// Construct a lookup error for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' not in parameters, grid or state", self.name)
    }
}

impl Error for LookupError {}

/// Errors from an individual kernel invocation.
///
/// Returned by `Kernel::invoke()` and wrapped by the engine together with
/// the name of the failing kernel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KernelError {
    /// The kernel's computation failed.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The kernel received a different number of arguments than it declared.
    ArityMismatch {
        /// Number of arguments declared.
        expected: usize,
        /// Number of arguments received.
        found: usize,
    },
    /// An argument had the wrong shape or type.
    InvalidArgument {
        /// Declared name of the argument.
        name: String,
        /// Description of what was wrong.
        reason: String,
    },
    /// NaN detected in kernel output.
    NanDetected {
        /// Declared name of the offending output.
        output: String,
    },
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::ArityMismatch { expected, found } => {
                write!(f, "expected {expected} arguments, got {found}")
            }
            Self::InvalidArgument { name, reason } => {
                write!(f, "invalid argument '{name}': {reason}")
            }
            Self::NanDetected { output } => write!(f, "NaN detected in output '{output}'"),
        }
    }
}

impl Error for KernelError {}
