//! Path segment naming for archive storage.
//!
//! Turns record metadata (titles, identifiers, upload-time filenames) into
//! names that are safe to use as a single folder or file name:
//!
//! - **[`sanitize`]** strips markup, reserved characters and control
//!   characters, and bounds the length (keeping the tail).
//! - **[`convert`]** applies the configured [`Conversion`] on top of an
//!   already sanitized name: transliteration, underscores, or a
//!   deterministic [hash](storage_hash).
//!
//! The [`NamingPolicy`] types describe, per record kind, *where* a name comes
//! from and *how* it is converted. They are parsed once from configuration
//! strings (`"id"`, `"Dublin Core:Identifier"`, `"Full"`, …) and never
//! re-parsed afterwards; they deserialize straight from those strings.

mod convert;
pub mod error;
mod policy;
mod sanitize;

pub use crate::convert::{HashSource, convert, first_letter_to_ascii, spaces_to_underscore, storage_hash, to_ascii};
pub use crate::policy::{Conversion, FieldKey, FieldSelector, NamingPolicy};
pub use crate::sanitize::{DEFAULT_MAX_LENGTH, sanitize, sanitize_bounded};
