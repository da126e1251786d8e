//! Storage Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Errors that concern the original rendition of a file are returned to the
//! caller; errors about derivatives and folder pruning are logged where they
//! happen and never reach this far.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Blank or contradictory relocation input; a caller bug.
    #[display("invalid argument: {_0}")]
    InvalidArgument(#[error(not(source))] String),
    /// Something that is not a folder sits where a folder is expected.
    #[display("path conflict, a file exists where a folder is expected: {}", _0.display())]
    PathConflict(#[error(not(source))] PathBuf),
    /// Access denied, even after an attempt to fix folder permissions.
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// The original rendition of a file was expected on disk but is absent.
    /// Reported apart from [`NotFound`](Self::NotFound): the pipeline that
    /// stores files produced nothing, this is not a failed move.
    #[display("source file missing: {}", _0.display())]
    SourceMissing(#[error(not(source))] PathBuf),
    /// A computed storage path is longer than the configured budget.
    #[display("storage name too long ({length} > {limit} characters): {name}")]
    NameTooLong { name: String, length: usize, limit: usize },
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// File does not exist
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// File already exists (for operations that refuse to overwrite)
    #[display("file already exists: {}", _0.display())]
    AlreadyExists(#[error(not(source))] PathBuf),
    /// Path contains invalid characters or escapes root
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// The category of this error, detached from any I/O error it owns.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidArgument(_) => ErrorClass::InvalidArgument,
            Self::PathConflict(_) => ErrorClass::PathConflict,
            Self::PermissionDenied(_) => ErrorClass::PermissionDenied,
            Self::SourceMissing(_) => ErrorClass::SourceMissing,
            Self::NameTooLong { .. } => ErrorClass::NameTooLong,
            Self::Io(_) => ErrorClass::Io,
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::AlreadyExists(_) => ErrorClass::AlreadyExists,
            Self::InvalidPath(_) => ErrorClass::InvalidPath,
        }
    }
}

/// Copyable mirror of [`ErrorKind`], for callers that wrap storage errors in
/// their own and still need to tell them apart.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    #[display("invalid argument")]
    InvalidArgument,
    #[display("path conflict")]
    PathConflict,
    #[display("permission denied")]
    PermissionDenied,
    #[display("source missing")]
    SourceMissing,
    #[display("name too long")]
    NameTooLong,
    #[display("I/O error")]
    Io,
    #[display("not found")]
    NotFound,
    #[display("already exists")]
    AlreadyExists,
    #[display("invalid path")]
    InvalidPath,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_missing_is_distinct_from_not_found() {
        let missing = ErrorKind::SourceMissing(PathBuf::from("a/b.png"));
        let not_found = ErrorKind::NotFound(PathBuf::from("a/b.png"));
        assert_ne!(missing.class(), not_found.class());
        assert_eq!(missing.to_string(), "source file missing: a/b.png");
    }

    #[test]
    fn only_io_is_retryable() {
        assert!(ErrorKind::Io(IoError::other("disk")).is_retryable());
        assert!(!ErrorKind::PathConflict(PathBuf::from("a")).is_retryable());
        assert!(!ErrorKind::InvalidArgument("blank".to_string()).is_retryable());
    }

    #[test]
    fn name_too_long_display() {
        let err = ErrorKind::NameTooLong { name: "abc".to_string(), length: 3, limit: 2 };
        assert_eq!(err.to_string(), "storage name too long (3 > 2 characters): abc");
        assert_eq!(err.class(), ErrorClass::NameTooLong);
    }
}
