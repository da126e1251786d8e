//! Path validation and storage-relative path helpers.
//!
//! Storage-relative paths are plain strings using `/` as separator: a folder
//! part (empty, or ending with exactly one `/`) followed by a filename. They
//! are only turned into [`Path`]s at the backend boundary, where they are
//! [validated](validate) against traversal.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a storage path for security and correctness.
/// Ensures that paths don't escape the storage root (no `..` traversal).
///
/// > **Note:** This does **not** normalize backslashes, non-UTF8 bytes, or
/// >           platform-specific weirdness. Null bytes are explicitly rejected.
///
/// # Returns
/// Returns the normalized path if valid, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath)
/// if invalid.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use repertory_storage::validate_path;
/// // Valid paths
/// assert!(validate_path("collection/item/photo.jpg").is_ok());
/// assert!(validate_path("a/../photo.jpg").is_ok()); // (never leaves storage root)
/// // Invalid paths
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("a/../../b").is_err()); // (leaves storage root)
/// assert!(validate_path("a\0b").is_err());
/// // Paths get resolved
/// assert_eq!(
///     validate_path("wrong/.././correct//./photo.jpg/").unwrap(),
///     Path::new("correct/photo.jpg")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}

/// Normalizes separators of a storage-relative path: backslashes become `/`,
/// and empty or `.` segments are dropped, so `"\\a//./b.png"` and `"a/b.png"`
/// compare equal. Parent references are left for [`validate`] to judge.
pub fn normalize(path: &str) -> String {
    path.split(['/', '\\']).filter(|segment| !segment.is_empty() && *segment != ".").collect::<Vec<_>>().join("/")
}

/// Folder part of a normalized path, with its trailing `/` (empty for a file
/// at the root).
pub fn folder_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[..=index],
        None => "",
    }
}

/// Filename part of a normalized path.
pub fn file_name_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// Parent of a folder as returned by [`folder_of`]: `"a/b/"` gives `"a/"`
/// and `"a/"` gives `""`.
pub fn parent_folder(folder: &str) -> &str {
    folder_of(folder.trim_end_matches('/'))
}

/// Splits a filename on its last dot: `("photo.1", ".jpg")`. A leading dot
/// does not start an extension, and a name without extension gets `""`.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(index) if index > 0 => (&name[..index], &name[index..]),
        _ => (name, ""),
    }
}

/// Replaces the extension of the filename in `path` with `extension`, which
/// is used verbatim (include the dot if one is wanted).
pub fn with_extension(path: &str, extension: &str) -> String {
    let (stem, _) = split_extension(file_name_of(path));
    format!("{}{stem}{extension}", folder_of(path))
}
