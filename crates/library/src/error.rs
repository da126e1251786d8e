//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Every hook returns at most one of these. Storage failures are wrapped with
//! the path they concern and their [`ErrorClass`], so that a host can show the
//! offending path to the user and still tell a missing source from a
//! permission problem.

use derive_more::{Display, Error};
use repertory_storage::error::{Error as StorageError, ErrorClass};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The original rendition of a file could not be moved.
    #[display("cannot move files inside archive directory: `{path}` ({class})")]
    Relocation { path: String, class: ErrorClass },
    /// The folders of a collection could not be created.
    #[display("cannot create archive folder `{path}` ({class})")]
    Folder { path: String, class: ErrorClass },
    /// The original root could not be listed to find a free name.
    #[display("cannot check duplicate names for `{_0}`")]
    Collision(#[error(not(source))] String),
    /// The host failed to read or persist a record.
    #[display("host error: {_0}")]
    Host(#[error(not(source))] String),
    /// The storage topology could not be built from the settings.
    #[display("cannot prepare archive folders in `{_0}`")]
    Topology(#[error(not(source))] String),
}
impl ErrorKind {
    /// Wraps a failed move of the file at `path`, keeping the storage
    /// error tree as a child.
    #[track_caller]
    pub fn relocation(err: StorageError, path: &str) -> Error {
        let class = err.class();
        err.raise(ErrorKind::Relocation { path: path.to_string(), class })
    }

    /// Wraps a failed creation of the folder `path`.
    #[track_caller]
    pub fn folder(err: StorageError, path: &str) -> Error {
        let class = err.class();
        err.raise(ErrorKind::Folder { path: path.to_string(), class })
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Relocation { class, .. } | Self::Folder { class, .. } => *class == ErrorClass::Io,
            _ => false,
        }
    }

    /// The storage error class behind this error, if it came from storage.
    pub fn class(&self) -> Option<ErrorClass> {
        match self {
            Self::Relocation { class, .. } | Self::Folder { class, .. } => Some(*class),
            _ => None,
        }
    }
}
