//! Rendition roots: where the original of a file lives, and where each of its
//! derivatives lives.

use crate::backend::{LocalBackend, MoveProcess, StorageBackend};
use crate::error::{ErrorKind, Result};
use crate::path::{normalize, parent_folder};
use crate::BackendHandle;
use std::path::Path;
use std::sync::Arc;

/// Name of the rendition holding the uploaded files.
pub const ORIGINAL: &str = "original";

/// The renditions every file store has, and their folder below the files
/// directory. The original comes first.
pub const FIXED_RENDITIONS: [(&str, &str); 4] = [
    (ORIGINAL, "original"),
    ("fullsize", "fullsize"),
    ("thumbnail", "thumbnails"),
    ("square_thumbnail", "square_thumbnails"),
];

/// One rendition root.
#[derive(Clone)]
pub struct Rendition {
    name: String,
    backend: BackendHandle,
    /// Verbatim replacement of the file extension, for derivative folders
    /// that don't follow the standard naming.
    extension: Option<String>,
    /// Pruning removes this rendition's folder even when it is not empty.
    force_prune: bool,
}
impl Rendition {
    pub fn new(name: impl Into<String>, backend: BackendHandle) -> Self {
        Self { name: name.into(), backend, extension: None, force_prune: false }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    pub fn root(&self) -> &Path {
        self.backend.root()
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn force_prune(&self) -> bool {
        self.force_prune
    }

    /// Extension of this rendition's files: the configured override, or
    /// `.<default_extension>`.
    pub fn extension_for(&self, default_extension: &str) -> String {
        match &self.extension {
            Some(extension) => extension.clone(),
            None => format!(".{default_extension}"),
        }
    }
}
impl std::fmt::Debug for Rendition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rendition")
            .field("name", &self.name)
            .field("root", &self.backend.root())
            .field("extension", &self.extension)
            .field("force_prune", &self.force_prune)
            .finish()
    }
}

/// All rendition roots, built once from configuration and passed by
/// reference to whatever moves files.
#[derive(Debug, Clone)]
pub struct StorageTopology {
    /// Original first, then fixed derivatives, then extra derivatives in
    /// configuration order.
    renditions: Vec<Rendition>,
    /// Rewritten extra derivative setting, when entries had to be dropped.
    pruned_derivative_folders: Option<String>,
}
impl StorageTopology {
    /// Builds the topology of a files directory.
    ///
    /// The fixed rendition roots are created when missing. `derivative_folders`
    /// is a comma-separated list of extra derivative folders (relative to
    /// `files_dir`), each optionally followed by `|<extension>`. Entries that
    /// don't resolve to an existing folder, resolve to `/`, or duplicate
    /// another root are dropped; the setting without them is then available
    /// from [`pruned_derivative_folders`](Self::pruned_derivative_folders) so
    /// that it can be persisted.
    ///
    /// `force_prune` names the extra derivative types whose folders are
    /// pruned even when they are not empty.
    #[tracing::instrument(skip_all, fields(files_dir = %files_dir.display()))]
    pub fn new(
        files_dir: &Path,
        derivative_folders: &str,
        move_process: MoveProcess,
        force_prune: &[String],
    ) -> Result<Self> {
        if !files_dir.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(files_dir.to_path_buf()));
        }
        let mut renditions = Vec::new();
        for (name, folder) in FIXED_RENDITIONS {
            let backend = LocalBackend::new(name, files_dir.join(folder))?.with_move_process(move_process);
            renditions.push(Rendition::new(name, Arc::new(backend)));
        }

        let mut kept = Vec::new();
        let mut dropped = false;
        for entry in derivative_folders.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let (name, extension) = match entry.split_once('|') {
                Some((name, extension)) => (name.trim(), Some(extension.trim()).filter(|e| !e.is_empty())),
                None => (entry, None),
            };
            let root = match (!name.is_empty()).then(|| files_dir.join(name).canonicalize()) {
                Some(Ok(root)) if root.is_dir() && root.parent().is_some() => root,
                _ => {
                    tracing::warn!(entry, "dropping derivative folder that is not an existing folder");
                    dropped = true;
                    continue;
                },
            };
            let duplicate = renditions.iter().any(|r| {
                r.name == name || r.root().canonicalize().is_ok_and(|existing| existing == root)
            });
            if duplicate {
                tracing::warn!(entry, "dropping derivative folder already used by another rendition");
                dropped = true;
                continue;
            }
            let backend = LocalBackend::new(name, &root)?.with_move_process(move_process);
            renditions.push(Rendition {
                name: name.to_string(),
                backend: Arc::new(backend),
                extension: extension.map(str::to_string),
                force_prune: force_prune.iter().any(|forced| forced == name),
            });
            kept.push(entry);
        }

        let pruned_derivative_folders = dropped.then(|| kept.join(", "));
        Ok(Self { renditions, pruned_derivative_folders })
    }

    /// Builds a topology from already configured renditions; the first one
    /// is the original.
    pub fn from_renditions(renditions: Vec<Rendition>) -> Result<Self> {
        let Some(original) = renditions.first() else {
            exn::bail!(ErrorKind::InvalidArgument("a topology needs an original rendition".to_string()));
        };
        let original_root = original.root().to_path_buf();
        if renditions.iter().skip(1).any(|r| r.root() == original_root.as_path()) {
            exn::bail!(ErrorKind::InvalidArgument("derivative roots must differ from the original root".to_string()));
        }
        Ok(Self { renditions, pruned_derivative_folders: None })
    }

    /// The extra derivative folder setting without its invalid entries, if
    /// any had to be dropped.
    pub fn pruned_derivative_folders(&self) -> Option<&str> {
        self.pruned_derivative_folders.as_deref()
    }

    pub fn renditions(&self) -> &[Rendition] {
        &self.renditions
    }

    pub fn original(&self) -> &Rendition {
        &self.renditions[0]
    }

    /// Every rendition except the original.
    pub fn derivatives(&self) -> impl Iterator<Item = &Rendition> {
        self.renditions.iter().skip(1)
    }

    pub fn rendition(&self, name: &str) -> Option<&Rendition> {
        self.renditions.iter().find(|r| r.name == name)
    }

    pub fn root_for(&self, name: &str) -> Option<&Path> {
        self.rendition(name).map(Rendition::root)
    }

    /// Rendition names and roots, original first.
    pub fn all_roots(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.renditions.iter().map(|r| (r.name(), r.root()))
    }

    /// Extension of the files of a rendition. Unknown renditions get the
    /// default.
    pub fn extension_for(&self, name: &str, default_extension: &str) -> String {
        match self.rendition(name) {
            Some(rendition) => rendition.extension_for(default_extension),
            None => format!(".{default_extension}"),
        }
    }

    /// Creates `folder` in every rendition root. An empty folder is the root
    /// itself and is left alone.
    pub fn create_folder_everywhere(&self, folder: &str) -> Result<()> {
        let folder = normalize(folder);
        if folder.is_empty() {
            return Ok(());
        }
        for rendition in &self.renditions {
            rendition.backend().create_folder(Path::new(&folder))?;
        }
        Ok(())
    }

    /// Removes `folder` from every rendition root if it is empty, then each
    /// of its parents in turn while they become empty. Roots themselves are
    /// never removed.
    ///
    /// Pruning is cleanup: failures are logged and skipped. Returns the
    /// number of folders removed.
    #[tracing::instrument(skip(self))]
    pub fn prune(&self, folder: &str) -> usize {
        let start = normalize(folder);
        if start.is_empty() {
            return 0;
        }
        let mut removed = 0;
        for rendition in &self.renditions {
            let mut current = format!("{start}/");
            let mut even_non_empty = rendition.force_prune;
            while !current.is_empty() {
                match rendition.backend().remove_folder(Path::new(&current), even_non_empty) {
                    Ok(true) => removed += 1,
                    Ok(false) => break,
                    Err(e) => {
                        tracing::debug!(rendition = rendition.name(), folder = %current, error = %e, "skipped pruning");
                        break;
                    },
                }
                even_non_empty = false;
                current = parent_folder(&current).to_string();
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn topology(files_dir: &Path, derivative_folders: &str) -> StorageTopology {
        StorageTopology::new(files_dir, derivative_folders, MoveProcess::Internal, &[]).unwrap()
    }

    #[test]
    fn creates_fixed_roots() {
        let temp_dir = tempfile::tempdir().unwrap();
        let topology = topology(temp_dir.path(), "");
        let names: Vec<_> = topology.all_roots().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["original", "fullsize", "thumbnail", "square_thumbnail"]);
        assert_eq!(topology.original().name(), ORIGINAL);
        assert_eq!(topology.root_for("thumbnail").unwrap(), temp_dir.path().join("thumbnails"));
        assert!(temp_dir.path().join("square_thumbnails").is_dir());
        assert!(topology.pruned_derivative_folders().is_none());
    }

    #[test]
    fn requires_absolute_files_dir() {
        assert!(StorageTopology::new(Path::new("files"), "", MoveProcess::Internal, &[]).is_err());
    }

    #[test]
    fn adds_extra_derivatives() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("zoom")).unwrap();
        fs::create_dir(temp_dir.path().join("previews")).unwrap();
        let topology = topology(temp_dir.path(), "zoom|_zdata, previews");
        assert_eq!(topology.renditions().len(), 6);
        assert_eq!(topology.extension_for("zoom", "jpg"), "_zdata");
        assert_eq!(topology.extension_for("previews", "jpg"), ".jpg");
        assert_eq!(topology.extension_for("thumbnail", "png"), ".png");
        assert!(topology.pruned_derivative_folders().is_none());
    }

    #[test]
    fn drops_invalid_extra_derivatives() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("zoom")).unwrap();
        fs::write(temp_dir.path().join("file"), b"data").unwrap();
        let topology = topology(temp_dir.path(), "missing|.png, zoom|_zdata, file, thumbnail, /");
        let names: Vec<_> = topology.derivatives().map(Rendition::name).collect();
        assert_eq!(names, vec!["fullsize", "thumbnail", "square_thumbnail", "zoom"]);
        assert_eq!(topology.pruned_derivative_folders(), Some("zoom|_zdata"));
    }

    #[test]
    fn force_prune_applies_to_named_extras() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("zoom")).unwrap();
        let forced = vec!["zoom".to_string(), "thumbnail".to_string()];
        let topology = StorageTopology::new(temp_dir.path(), "zoom", MoveProcess::Internal, &forced).unwrap();
        assert!(topology.rendition("zoom").unwrap().force_prune());
        assert!(!topology.rendition("thumbnail").unwrap().force_prune());
    }

    #[test]
    fn builds_from_configured_renditions() {
        let temp_dir = tempfile::tempdir().unwrap();
        let rendition = |name: &str, folder: &str| {
            let backend = LocalBackend::new(name, temp_dir.path().join(folder)).unwrap();
            Rendition::new(name, Arc::new(backend))
        };
        let topology =
            StorageTopology::from_renditions(vec![rendition("master", "masters"), rendition("web", "web")]).unwrap();
        assert_eq!(topology.original().name(), "master");
        assert_eq!(topology.root_for("web").unwrap(), temp_dir.path().join("web"));
        assert_eq!(topology.extension_for("web", "jpg"), ".jpg");
        assert!(topology.pruned_derivative_folders().is_none());

        let err = StorageTopology::from_renditions(Vec::new()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidArgument(_)));
        let shared = vec![rendition("master", "masters"), rendition("copy", "masters")];
        let err = StorageTopology::from_renditions(shared).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidArgument(_)));
    }

    #[test]
    fn creates_folders_everywhere() {
        let temp_dir = tempfile::tempdir().unwrap();
        let topology = topology(temp_dir.path(), "");
        topology.create_folder_everywhere("coll/item/").unwrap();
        for (_, root) in topology.all_roots() {
            assert!(root.join("coll/item").is_dir());
        }
        topology.create_folder_everywhere("").unwrap();
    }

    #[test]
    fn prunes_empty_folders_up_to_the_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let topology = topology(temp_dir.path(), "");
        topology.create_folder_everywhere("a/b/c").unwrap();
        fs::write(temp_dir.path().join("thumbnails/a/keep.jpg"), b"data").unwrap();
        topology.prune("a/b/c/");
        let original = topology.root_for(ORIGINAL).unwrap();
        assert!(!original.join("a").exists());
        assert!(original.is_dir());
        let thumbnails = topology.root_for("thumbnail").unwrap();
        assert!(!thumbnails.join("a/b").exists());
        assert!(thumbnails.join("a/keep.jpg").exists());
    }

    #[test]
    fn never_prunes_non_empty_folders_unless_forced() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("zoom/a/tiles")).unwrap();
        fs::write(temp_dir.path().join("zoom/a/tiles/0.jpg"), b"data").unwrap();
        fs::write(temp_dir.path().join("zoom/keep.jpg"), b"data").unwrap();
        let forced = vec!["zoom".to_string()];
        let topology = StorageTopology::new(temp_dir.path(), "zoom", MoveProcess::Internal, &forced).unwrap();
        topology.create_folder_everywhere("a").unwrap();
        fs::write(temp_dir.path().join("original/a/photo.jpg"), b"data").unwrap();
        topology.prune("a");
        assert!(temp_dir.path().join("original/a/photo.jpg").exists());
        assert!(!temp_dir.path().join("thumbnails/a").exists());
        assert!(!temp_dir.path().join("zoom/a").exists());
        assert!(temp_dir.path().join("zoom/keep.jpg").exists());
    }

    #[test]
    fn prune_ignores_the_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let topology = topology(temp_dir.path(), "");
        assert_eq!(topology.prune(""), 0);
        assert_eq!(topology.prune("/"), 0);
        for (_, root) in topology.all_roots() {
            assert!(root.is_dir());
        }
    }
}
