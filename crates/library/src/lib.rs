//! Archive folder naming and file relocation for a content-management host.
//!
//! The host reports record saves and deletions through [`RepertoryHooks`];
//! [`Repertory`] reacts by deriving folder names from record metadata and
//! moving files, with all of their derivatives, to match them:
//!
//! ```text
//! <collection folder>/<item folder>/<file name>
//! ```
//!
//! Folder names come from a [`FolderNameBuilder`], which resolves the
//! configured field of a record (see [`resolve`]), sanitizes and converts it,
//! and falls back to the record id. Collection folder names are cached in
//! [`FolderNames`] when a collection is saved.

pub mod error;
mod filename;
mod folder;
mod hooks;
mod host;
mod identifier;
#[cfg(test)]
mod testing;

pub use crate::filename::{base_name, file_basename};
pub use crate::folder::{FolderNameBuilder, FolderNames};
pub use crate::hooks::{DERIVATIVE_FOLDERS_SETTING, Repertory, RepertoryHooks};
pub use crate::host::{Collection, Host, Item, RecordKind, RecordRef, StoredFile};
pub use crate::identifier::resolve;
