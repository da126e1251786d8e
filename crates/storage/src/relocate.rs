//! Moving a stored file, and every derivative of it, to a new storage path.

use crate::error::{ErrorKind, Result};
use crate::path::{folder_of, normalize, with_extension};
use crate::topology::StorageTopology;
use std::path::Path;

/// Default budget of a storage path, in characters.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 190;

/// Outcome of a successful [`RelocationEngine::relocate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relocation {
    /// The file already was at the requested path; nothing was touched.
    Unchanged,
    /// The original was moved, along with `derivatives` derivative files.
    Moved { from: String, to: String, derivatives: usize },
}
impl Relocation {
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Moves files across every rendition root of a [`StorageTopology`].
///
/// Moves are not transactional. Each step is its own operation, and a
/// failure between two steps leaves the file partially moved:
///
/// 1. The destination folder is created under the original root and, with a
///    derivative extension, under every derivative root. A folder that
///    cannot be created fails the relocation before anything has moved.
/// 2. The original is moved; it must exist.
/// 3. With a derivative extension, each derivative is moved to the same
///    relative path under its own root, with its own extension. Missing
///    derivatives are skipped and failed moves are logged.
/// 4. When the folder changed, the old one is pruned in every root.
#[derive(Debug, Clone, Copy)]
pub struct RelocationEngine<'a> {
    topology: &'a StorageTopology,
    max_name_length: usize,
}
impl<'a> RelocationEngine<'a> {
    pub fn new(topology: &'a StorageTopology) -> Self {
        Self { topology, max_name_length: DEFAULT_MAX_NAME_LENGTH }
    }

    pub fn with_max_name_length(mut self, max_name_length: usize) -> Self {
        self.max_name_length = max_name_length;
        self
    }

    pub fn topology(&self) -> &'a StorageTopology {
        self.topology
    }

    /// Moves the file at `current` (relative to the original root) to `new`.
    ///
    /// `derivative_extension` is the extension of the file's derivatives
    /// (usually `jpg`); `None` when the file has no derivatives.
    ///
    /// # Errors
    /// - [`InvalidArgument`](ErrorKind::InvalidArgument) if a path is blank.
    /// - [`NameTooLong`](ErrorKind::NameTooLong) if `new` exceeds the budget;
    ///   nothing is touched.
    /// - [`PathConflict`](ErrorKind::PathConflict) or
    ///   [`PermissionDenied`](ErrorKind::PermissionDenied) if a destination
    ///   folder can't be created.
    /// - [`SourceMissing`](ErrorKind::SourceMissing) if the original is not
    ///   on disk.
    #[tracing::instrument(skip(self))]
    pub fn relocate(&self, current: &str, new: &str, derivative_extension: Option<&str>) -> Result<Relocation> {
        if current.trim().is_empty() || new.trim().is_empty() {
            exn::bail!(ErrorKind::InvalidArgument(format!("cannot relocate `{current}` to `{new}`")));
        }
        let (current, new) = (normalize(current), normalize(new));
        if current == new {
            tracing::debug!(path = %current, "file already in place");
            return Ok(Relocation::Unchanged);
        }
        let length = new.chars().count();
        if length > self.max_name_length {
            exn::bail!(ErrorKind::NameTooLong { name: new, length, limit: self.max_name_length });
        }

        let (current_folder, new_folder) = (folder_of(&current), folder_of(&new));
        let derivative_extension = derivative_extension.filter(|extension| !extension.is_empty());
        let original = self.topology.original().backend();
        if !new_folder.is_empty() {
            original.create_folder(Path::new(new_folder))?;
            // Created even when there is nothing to move, for derivative
            // producers that only know about the base filename.
            if derivative_extension.is_some() {
                for rendition in self.topology.derivatives() {
                    rendition.backend().create_folder(Path::new(new_folder))?;
                }
            }
        }
        if !original.exists(Path::new(&current))? {
            exn::bail!(ErrorKind::SourceMissing(original.root().join(&current)));
        }
        original.rename(Path::new(&current), Path::new(&new))?;

        let derivatives = match derivative_extension {
            Some(extension) => self.move_derivatives(&current, &new, extension),
            None => 0,
        };

        if current_folder != new_folder {
            self.topology.prune(current_folder);
        }
        tracing::info!(from = %current, to = %new, derivatives, "relocated file");
        Ok(Relocation::Moved { from: current, to: new, derivatives })
    }

    fn move_derivatives(&self, current: &str, new: &str, default_extension: &str) -> usize {
        let mut moved = 0;
        for rendition in self.topology.derivatives() {
            let backend = rendition.backend();
            let extension = rendition.extension_for(default_extension);
            let (from, to) = (with_extension(current, &extension), with_extension(new, &extension));
            match backend.exists(Path::new(&from)) {
                Ok(true) => {},
                Ok(false) => {
                    tracing::debug!(rendition = rendition.name(), path = %from, "no derivative to move");
                    continue;
                },
                Err(e) => {
                    tracing::warn!(rendition = rendition.name(), path = %from, error = %e, "cannot check derivative");
                    continue;
                },
            }
            match backend.rename(Path::new(&from), Path::new(&to)) {
                Ok(()) => moved += 1,
                Err(e) => tracing::warn!(rendition = rendition.name(), %from, %to, error = %e, "derivative not moved"),
            }
        }
        moved
    }
}
