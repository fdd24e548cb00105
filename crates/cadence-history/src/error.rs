//! Error types for history output and restart.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that can occur while writing or reading history data.
#[derive(Debug)]
pub enum HistoryError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// A history file could not be opened.
    Open {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The stream does not start with the expected `b"CDNC"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the file.
        found: u8,
    },
    /// The schema or a record could not be decoded.
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A record names a variable the schema does not declare.
    UnknownVariable {
        /// The undeclared variable.
        name: String,
    },
    /// Records were appended before the schema was declared.
    NotCreated,
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Open { path, source } => {
                write!(f, "cannot open history file {}: {source}", path.display())
            }
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"CDNC\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported history format version {found}")
            }
            Self::Malformed { detail } => write!(f, "malformed history data: {detail}"),
            Self::UnknownVariable { name } => {
                write!(f, "variable '{name}' is not declared in the history schema")
            }
            Self::NotCreated => write!(f, "history output has not been created"),
        }
    }
}

impl std::error::Error for HistoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Open { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for HistoryError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
