//! Top-level error type for component construction and stepping.

use std::error::Error;
use std::fmt;

use cadence_core::{KernelError, LookupError};
use cadence_history::HistoryError;

use crate::config::ConfigError;

/// Errors from [`Component`](crate::Component) operations.
#[derive(Debug)]
pub enum ComponentError {
    /// Inconsistent configuration, declaration or shapes.
    Config(ConfigError),
    /// A restart source or output sink failed.
    Resource(HistoryError),
    /// The compute kernel returned an error.
    KernelFailed {
        /// Name of the failing kernel.
        kernel: String,
        /// The kernel's error.
        reason: KernelError,
    },
    /// A name was found in none of parameters, grid or state.
    Lookup(LookupError),
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Resource(e) => write!(f, "resource: {e}"),
            Self::KernelFailed { kernel, reason } => {
                write!(f, "kernel '{kernel}' failed: {reason}")
            }
            Self::Lookup(e) => write!(f, "{e}"),
        }
    }
}

impl Error for ComponentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Resource(e) => Some(e),
            Self::KernelFailed { reason, .. } => Some(reason),
            Self::Lookup(e) => Some(e),
        }
    }
}

impl From<ConfigError> for ComponentError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<HistoryError> for ComponentError {
    fn from(e: HistoryError) -> Self {
        Self::Resource(e)
    }
}

impl From<LookupError> for ComponentError {
    fn from(e: LookupError) -> Self {
        Self::Lookup(e)
    }
}
