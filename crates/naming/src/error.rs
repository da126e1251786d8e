//! Naming Error Types
//!
//! Only policy parsing can fail; sanitizing and converting never do.

use derive_more::{Display, Error};

/// A naming error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for naming operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A field selector string could not be understood.
    #[display("unknown field selector: {_0}")]
    FieldSelector(#[error(not(source))] String),
    /// A metadata field key is not of the form `<element set>:<element>`.
    #[display("invalid metadata field key: {_0}")]
    FieldKey(#[error(not(source))] String),
    /// A conversion name could not be understood.
    #[display("unknown name conversion: {_0}")]
    Conversion(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
