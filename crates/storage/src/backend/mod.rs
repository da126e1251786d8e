//! Storage backend trait and implementations.
//!
//! One backend is configured per rendition root (the original files, and each
//! kind of derivative). The trait only covers the primitive filesystem
//! operations the relocation engine composes: it is not a general file store.

mod local;

pub use self::local::LocalBackend;
use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

/// How a backend moves a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveProcess {
    /// Paths are validated, missing parent folders are created and an
    /// existing destination is never overwritten.
    #[default]
    Internal,
    /// A raw `rename(2)` of the joined paths.
    Direct,
}

/// Unified interface for rendition roots.
///
/// All operations are blocking and run inline in the caller's request.
///
/// # Path Handling
/// All paths are relative to the backend root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations should
/// enforce this validation. An empty path designates the root itself, which
/// only [`list`](Self::list) and [`create_folder`](Self::create_folder)
/// accept.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use repertory_storage::{backend::StorageBackend, error::Result};
///
/// fn occupied(backend: &dyn StorageBackend, folder: &str, name: &str) -> Result<bool> {
///     Ok(backend.list(Path::new(folder))?.iter().any(|entry| entry == name))
/// }
/// ```
pub trait StorageBackend: Send + Sync {
    /// Name of the rendition this backend stores (`original`, `thumbnail`,
    /// ...). Used for logging.
    fn name(&self) -> &str;

    /// Absolute root directory of the backend.
    fn root(&self) -> &Path;

    /// Check if a file or folder exists.
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Names of the entries of a folder, in no particular order.
    ///
    /// A folder that does not exist is listed as empty, not as an error.
    fn list(&self, folder: &Path) -> Result<Vec<String>>;

    /// Create a folder and its missing parents, with mode `0755`.
    ///
    /// Returns [`PathConflict`](crate::error::ErrorKind::PathConflict) if a
    /// file occupies the path, and
    /// [`PermissionDenied`](crate::error::ErrorKind::PermissionDenied) if an
    /// existing folder is not writable even after resetting its mode.
    fn create_folder(&self, folder: &Path) -> Result<()>;

    /// Rename/move a file within the same backend.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the source
    /// file does not exist. The move must keep the file identity (a rename,
    /// never a copy then delete).
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Remove a folder if it is empty, or whatever its content when
    /// `even_non_empty` is set.
    ///
    /// Returns `Ok(false)` when nothing was removed: the folder is missing,
    /// is not a folder, is not writable, is not empty, or resolves to the
    /// backend root (which is never removed).
    fn remove_folder(&self, folder: &Path, even_non_empty: bool) -> Result<bool>;
}
