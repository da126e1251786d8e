//! Local filesystem storage backend.
//!
//! This module provides a storage backend implementation for the local filesystem.
//! Files are stored in a configured directory and accessed using blocking
//! `std::fs` operations.

use crate::backend::MoveProcess;
use crate::error::ErrorKind;
use crate::{StorageBackend, error::Result, path::validate as validate_path};
use std::fs::{self, DirBuilder};
use std::path::{Path, PathBuf};

/// Mode of created folders: owner `rwx`, group and others `r-x`.
const FOLDER_MODE: u32 = 0o755;

/// Local filesystem storage backend.
///
/// Stores the files of one rendition in a directory on the local filesystem.
/// All paths are relative to the configured root directory.
///
/// # Examples
///
/// ```no_run
/// use repertory_storage::backend::{LocalBackend, MoveProcess};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("original", "/var/www/files/original")?
///     .with_move_process(MoveProcess::Direct);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalBackend {
    name: String,
    /// Root directory of the rendition
    root: PathBuf,
    move_process: MoveProcess,
}
impl LocalBackend {
    /// Create a new local filesystem backend, creating its root directory if
    /// it does not exist yet.
    ///
    /// # Arguments
    /// * `root` - Absolute path to the rendition root directory
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute, or exists and is not a
    /// directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::PathConflict(root));
            }
        } else {
            folder_builder().create(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }
        Ok(Self { name: name.into(), root, move_process: MoveProcess::default() })
    }

    pub fn with_move_process(mut self, move_process: MoveProcess) -> Self {
        self.move_process = move_process;
        self
    }

    pub fn move_process(&self) -> MoveProcess {
        self.move_process
    }

    /// Get the absolute path for a relative storage path.
    ///
    /// Validates the path and joins it with the root directory.
    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    /// Same as [`absolute_path`](Self::absolute_path), except that an empty
    /// path is the root itself.
    fn absolute_folder(&self, folder: &Path) -> Result<PathBuf> {
        match folder.as_os_str().is_empty() {
            true => Ok(self.root.clone()),
            false => self.absolute_path(folder),
        }
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists(path.to_path_buf()),
            std::io::ErrorKind::NotADirectory => ErrorKind::PathConflict(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    fn rename_internal(&self, from: &Path, to: &Path) -> Result<()> {
        let from_path = self.absolute_path(from)?;
        let to_path = self.absolute_path(to)?;
        if !from_path.is_file() {
            exn::bail!(ErrorKind::NotFound(from.to_path_buf()));
        }
        if to_path.exists() {
            exn::bail!(ErrorKind::AlreadyExists(to.to_path_buf()));
        }
        if let Some(parent) = to_path.parent() {
            folder_builder().create(parent).map_err(|e| Self::map_io_error(e, to))?;
        }
        Ok(fs::rename(&from_path, &to_path).map_err(|e| Self::map_io_error(e, to))?)
    }

    /// A single `rename(2)`: the destination folder must already exist.
    fn rename_direct(&self, from: &Path, to: &Path) -> Result<()> {
        let from_path = self.absolute_path(from)?;
        let to_path = self.absolute_path(to)?;
        // rename(2) silently replaces an existing destination.
        if fs::symlink_metadata(&to_path).is_ok() {
            exn::bail!(ErrorKind::AlreadyExists(to.to_path_buf()));
        }
        Ok(fs::rename(&from_path, &to_path).map_err(|e| Self::map_io_error(e, from))?)
    }
}

impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::exists(&abs_path).map_err(ErrorKind::Io)?)
    }

    fn list(&self, folder: &Path) -> Result<Vec<String>> {
        let abs_path = self.absolute_folder(folder)?;
        let entries = match fs::read_dir(&abs_path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => exn::bail!(Self::map_io_error(e, folder)),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Self::map_io_error(e, folder))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn create_folder(&self, folder: &Path) -> Result<()> {
        let abs_path = self.absolute_folder(folder)?;
        match fs::metadata(&abs_path) {
            Ok(metadata) if metadata.is_dir() => {
                if let Err(e) = set_folder_mode(&abs_path) {
                    tracing::debug!(path = %abs_path.display(), error = %e, "could not reset folder mode");
                }
                let writable = fs::metadata(&abs_path).map(|m| !m.permissions().readonly()).unwrap_or(false);
                match writable {
                    true => Ok(()),
                    false => exn::bail!(ErrorKind::PermissionDenied(abs_path)),
                }
            },
            Ok(_) => exn::bail!(ErrorKind::PathConflict(abs_path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                folder_builder().create(&abs_path).map_err(|e| match e.kind() {
                    // A file sits somewhere along the way.
                    std::io::ErrorKind::AlreadyExists | std::io::ErrorKind::NotADirectory => {
                        ErrorKind::PathConflict(abs_path.clone())
                    },
                    _ => Self::map_io_error(e, &abs_path),
                })?;
                // The builder mode is subject to the umask.
                if let Err(e) = set_folder_mode(&abs_path) {
                    tracing::debug!(path = %abs_path.display(), error = %e, "could not set folder mode");
                }
                tracing::debug!(backend = %self.name, path = %abs_path.display(), "created folder");
                Ok(())
            },
            Err(e) => exn::bail!(Self::map_io_error(e, &abs_path)),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        match self.move_process {
            MoveProcess::Internal => self.rename_internal(from, to),
            MoveProcess::Direct => self.rename_direct(from, to),
        }
    }

    fn remove_folder(&self, folder: &Path, even_non_empty: bool) -> Result<bool> {
        let abs_path = self.absolute_path(folder)?;
        let real = match abs_path.canonicalize() {
            Ok(real) => real,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => exn::bail!(Self::map_io_error(e, folder)),
        };
        let root = self.root.canonicalize().map_err(|e| Self::map_io_error(e, &self.root))?;
        // Symbolic links may point anywhere; only prune inside the root.
        if real == root || !real.starts_with(&root) {
            return Ok(false);
        }
        let metadata = fs::metadata(&real).map_err(|e| Self::map_io_error(e, folder))?;
        if !metadata.is_dir() || metadata.permissions().readonly() {
            return Ok(false);
        }
        let is_empty = fs::read_dir(&real).map_err(|e| Self::map_io_error(e, folder))?.next().is_none();
        if !is_empty && !even_non_empty {
            return Ok(false);
        }
        fs::remove_dir_all(&real).map_err(|e| Self::map_io_error(e, folder))?;
        Ok(true)
    }
}

#[cfg(unix)]
fn folder_builder() -> DirBuilder {
    use std::os::unix::fs::DirBuilderExt;
    let mut builder = DirBuilder::new();
    builder.recursive(true).mode(FOLDER_MODE);
    builder
}

#[cfg(not(unix))]
fn folder_builder() -> DirBuilder {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    builder
}

#[cfg(unix)]
fn set_folder_mode(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(FOLDER_MODE))
}

#[cfg(not(unix))]
fn set_folder_mode(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
