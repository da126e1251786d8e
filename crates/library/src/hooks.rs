//! Reactions to the host's record saves and deletions.
//!
//! Each hook runs to completion inside the host request that triggered it.
//! Files are handled one at a time, in attachment order, and a file's new path
//! is persisted as soon as it has been moved, so a later read within the same
//! request never sees a file whose record and location disagree.
//!
//! Nothing serializes two requests working on the same item or collection:
//! both may compute folder names before either persists them, and files can
//! end up mixed between the two outcomes. Like the host's own saves, the last
//! writer wins.

use crate::error::{ErrorKind, Result};
use crate::filename::{base_name, file_basename};
use crate::folder::{FolderNameBuilder, FolderNames};
use crate::host::{Collection, Host, Item, StoredFile};
use exn::ResultExt;
use repertory_config::Settings;
use repertory_storage::{Relocation, RelocationEngine, StorageTopology, file_name_of, folder_of, normalize, unique_name};
use std::collections::HashSet;
use std::path::Path;

/// Key of the host setting holding the extra derivative folders.
pub const DERIVATIVE_FOLDERS_SETTING: &str = "derivative_folders";

/// The events a host reports to the repertory.
///
/// Every method either succeeds or returns the error that should abort the
/// host's save and be shown to the user.
pub trait RepertoryHooks {
    /// Caches the folder name of the collection and, when enabled, creates
    /// its folder in every rendition root.
    fn on_collection_saved(&mut self, collection: &Collection) -> Result<()>;

    /// Moves every file of the item that is not in the item's folder.
    fn on_item_saved(&mut self, item: &Item) -> Result<()>;

    /// A file was attached to an item. Its derivatives don't exist yet.
    fn on_file_inserted(&mut self, file: &StoredFile) -> Result<()> {
        self.on_file_metadata_saved(file, true)
    }

    /// Renames and moves a file to the path its naming policy gives.
    fn on_file_metadata_saved(&mut self, file: &StoredFile, is_insert: bool) -> Result<()>;

    /// Prunes the last folder of a file the host has just removed.
    fn on_file_deleted(&mut self, file: &StoredFile) -> Result<()>;
}

/// Folder naming and file relocation bound to a host.
///
/// Build one per request: files already handled by the file hook are
/// remembered until [`finish_request`](Self::finish_request), so that the
/// save triggered by persisting a new path doesn't handle the file again.
pub struct Repertory<H> {
    host: H,
    settings: Settings,
    topology: StorageTopology,
    folder_names: FolderNames,
    handled: HashSet<u64>,
}

impl<H: Host> Repertory<H> {
    /// Builds the storage topology from the settings and loads the cached
    /// collection folder names.
    ///
    /// Extra derivative folders that don't exist are dropped, and the
    /// setting is saved back without them.
    #[tracing::instrument(skip_all, fields(files_dir = %settings.storage.files_dir.display()))]
    pub fn new(mut host: H, settings: Settings) -> Result<Self> {
        let storage = &settings.storage;
        let topology =
            StorageTopology::new(&storage.files_dir, &storage.derivative_folders, storage.move_process, &storage.force_prune)
                .or_raise(|| ErrorKind::Topology(storage.files_dir.display().to_string()))?;
        if let Some(kept) = topology.pruned_derivative_folders() {
            host.save_setting(DERIVATIVE_FOLDERS_SETTING, kept)?;
            tracing::info!(derivative_folders = kept, "saved derivative folders without invalid entries");
        }
        let folder_names = FolderNames::from(host.collection_folder_names()?);
        Ok(Self { host, settings, topology, folder_names, handled: HashSet::new() })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn topology(&self) -> &StorageTopology {
        &self.topology
    }

    pub fn folder_names(&self) -> &FolderNames {
        &self.folder_names
    }

    /// Forgets which files were handled during the current request.
    pub fn finish_request(&mut self) {
        self.handled.clear();
    }

    fn builder(&self) -> FolderNameBuilder<'_, H> {
        FolderNameBuilder::new(&self.host, &self.settings)
    }

    /// Moves a file with its derivatives, then records its new path.
    fn relocate(&mut self, file_id: u64, current: &str, new: &str, derivative_extension: Option<&str>) -> Result<()> {
        let engine = RelocationEngine::new(&self.topology).with_max_name_length(self.settings.storage.max_name_length);
        let relocation =
            engine.relocate(current, new, derivative_extension).map_err(|err| ErrorKind::relocation(err, current))?;
        if let Relocation::Moved { to, .. } = relocation {
            self.host.save_file_path(file_id, &to)?;
        }
        Ok(())
    }

    fn is_in_original_root(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        match self.topology.original().backend().exists(Path::new(path)) {
            Ok(exists) => exists,
            Err(e) => {
                tracing::debug!(%path, error = %e, "cannot check original file");
                false
            },
        }
    }
}

impl<H: Host> RepertoryHooks for Repertory<H> {
    #[tracing::instrument(skip_all, fields(collection_id = collection.id))]
    fn on_collection_saved(&mut self, collection: &Collection) -> Result<()> {
        let name = self.builder().recompute_collection_folder(&self.folder_names, collection)?;
        if self.folder_names.insert(collection.id, name.clone()) {
            self.host.save_collection_folder_names(self.folder_names.as_map())?;
            tracing::debug!(folder = %name, "cached collection folder");
        }
        if self.settings.storage.create_folders && !name.is_empty() {
            self.topology.create_folder_everywhere(&name).map_err(|err| ErrorKind::folder(err, &name))?;
            tracing::info!(folder = %name, "created collection folders");
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(item_id = item.id))]
    fn on_item_saved(&mut self, item: &Item) -> Result<()> {
        let folder = self.builder().build_full_path(&self.folder_names, item)?;
        for file in self.host.item_files(item.id)? {
            if !file.stored {
                continue;
            }
            let current = normalize(&file.path);
            if folder_of(&current) == folder {
                continue;
            }
            // The basename was settled when the file itself was saved.
            let new = format!("{folder}{}", file_name_of(&current));
            let extension = file.has_derivatives.then(|| self.settings.storage.derivative_extension.clone());
            self.relocate(file.id, &current, &new, extension.as_deref())?;
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(file_id = file.id, is_insert = is_insert))]
    fn on_file_metadata_saved(&mut self, file: &StoredFile, is_insert: bool) -> Result<()> {
        if self.handled.contains(&file.id) {
            tracing::debug!("file already handled in this request");
            return Ok(());
        }
        let current = normalize(&file.path);
        if !file.stored || !self.is_in_original_root(&current) {
            tracing::debug!(path = %current, "file not in the archive yet");
            return Ok(());
        }
        // A failed attempt may be retried within the same request.
        self.place_file(file, &current, is_insert)?;
        self.handled.insert(file.id);
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(file_id = file.id))]
    fn on_file_deleted(&mut self, file: &StoredFile) -> Result<()> {
        let path = normalize(&file.path);
        let folder = folder_of(&path);
        let removed = self.topology.prune(folder);
        tracing::debug!(%folder, removed, "pruned folder of deleted file");
        Ok(())
    }
}

impl<H: Host> Repertory<H> {
    /// Renames the stored file at `current` after its original filename and
    /// moves it into its item's folder.
    fn place_file(&mut self, file: &StoredFile, current: &str, is_insert: bool) -> Result<()> {
        let mut file = file.clone();
        if self.settings.file.base_original_name {
            let base = base_name(&file.original_filename);
            if base != file.original_filename {
                file.original_filename = base.to_string();
                self.host.save_original_filename(file.id, &file.original_filename)?;
            }
        }

        let Some(item) = self.host.item(file.item_id)? else {
            exn::bail!(ErrorKind::Host(format!("file {} belongs to unknown item {}", file.id, file.item_id)));
        };
        let folder = self.builder().build_full_path(&self.folder_names, &item)?;
        let basename =
            file_basename(&self.host, &file, &self.settings.file, self.settings.storage.sanitize_max_length)?;
        let candidate = format!("{folder}{basename}");
        if candidate == current {
            tracing::debug!(path = %current, "file already in place");
            return Ok(());
        }
        let new = unique_name(&self.topology, &candidate, current)
            .or_raise(|| ErrorKind::Collision(candidate.clone()))?;

        // Derivatives are only made once the file is inserted.
        let extension = (!is_insert && file.has_derivatives).then(|| self.settings.storage.derivative_extension.clone());
        self.relocate(file.id, current, &new, extension.as_deref())
    }
}
