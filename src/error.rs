//! Error types.
//!
//! Two distinct failure surfaces exist: [`Error`] goes back to whoever
//! called a write or flush, while [`FatalError`] is the out-of-band event
//! for persistent I/O failure, delivered on the registry's fatal channel
//! so the host decides whether the process lives.

use std::fmt;

use thiserror::Error;

/// Caller-facing errors from write and flush operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The structured payload could not be encoded. Surfaced to the
    /// caller; nothing is buffered and other pending lines are untouched.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An open or write failed even after the immediate retry.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Which file operation exhausted its retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalOp {
    /// Opening the rotated file failed twice.
    Open,
    /// Writing to the rotated file failed twice.
    Write,
}

impl fmt::Display for FatalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// A persistent I/O failure on one destination.
///
/// Emitted after the single immediate retry also failed. The affected
/// batch of lines is dropped rather than re-buffered; the host receiving
/// this event owns the termination policy.
#[derive(Debug, Error)]
#[error("destination {destination}: {op} failed after retry: {source}")]
pub struct FatalError {
    /// Name of the destination that failed.
    pub destination: String,

    /// The operation that exhausted its retry.
    pub op: FatalOp,

    /// The underlying I/O error from the second attempt.
    pub source: std::io::Error,
}

impl FatalError {
    pub(crate) fn open(destination: impl Into<String>, source: std::io::Error) -> Self {
        Self {
            destination: destination.into(),
            op: FatalOp::Open,
            source,
        }
    }

    pub(crate) fn write(destination: impl Into<String>, source: std::io::Error) -> Self {
        Self {
            destination: destination.into(),
            op: FatalOp::Write,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_error_display() {
        let err = FatalError::write(
            "/var/log/app.log",
            std::io::Error::other("disk gone"),
        );
        assert_eq!(
            err.to_string(),
            "destination /var/log/app.log: write failed after retry: disk gone"
        );
    }

    #[test]
    fn test_io_error_converts() {
        fn io_fail() -> Result<()> {
            Err(std::io::Error::other("nope"))?
        }
        assert!(matches!(io_fail(), Err(Error::Io(_))));
    }

    #[test]
    fn test_serialize_error_converts() {
        // A map with a non-string key cannot be represented as JSON.
        let mut bad = std::collections::HashMap::new();
        bad.insert(vec![1u8], "x");
        let err = serde_json::to_string(&bad).unwrap_err();
        let converted: Error = err.into();
        assert!(matches!(converted, Error::Serialize(_)));
    }
}
