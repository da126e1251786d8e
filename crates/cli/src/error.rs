//! CLI Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Errors from the other crates are
//! kept as children, and the whole tree is printed when a command fails.

use derive_more::{Display, Error};

/// A command error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for command operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The settings could not be loaded or are invalid.
    #[display("cannot load configuration")]
    Config,
    /// A command-line value could not be parsed.
    #[display("invalid argument: {_0}")]
    Argument(#[error(not(source))] String),
    /// Building the rendition roots or moving files failed.
    #[display("storage operation failed")]
    Storage,
}
