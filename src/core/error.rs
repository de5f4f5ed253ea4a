//! Error types and handling for guarded filesystem operations.
//!
//! Callers see two kinds of failure: a guard rejection, which is deliberately
//! opaque, and the native I/O error of the underlying call, which is passed
//! through untouched.

use thiserror::Error;

/// A specialized Result type for guarded filesystem operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The path guard refused the operation.
    ///
    /// The reason and the offending path are only written to the debug log.
    #[error("filesystem operation rejected for safety")]
    Rejected,

    /// The native filesystem call failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error came from the guard rather than the OS.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }

    /// The native error kind, if this is a pass-through I/O failure.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::Io(e) => Some(e.kind()),
            Self::Rejected => None,
        }
    }
}
