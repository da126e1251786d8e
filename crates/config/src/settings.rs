use repertory_naming::{Conversion, FieldKey, FieldSelector, NamingPolicy};
use repertory_storage::DEFAULT_MAX_NAME_LENGTH;
use repertory_storage::backend::MoveProcess;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything the repertory reads from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub collection: CollectionSettings,
    pub item: ItemSettings,
    pub file: FileSettings,
    pub storage: StorageSettings,
    pub download: DownloadSettings,
}

/// Naming of collection folders.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    pub field: FieldSelector,
    pub prefix: String,
    pub conversion: Conversion,
    /// Folder names set by hand, by collection id, for
    /// [`FieldSelector::FixedString`].
    pub names: BTreeMap<String, String>,
}
impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            field: FieldSelector::Field(FieldKey::dublin_core("Title")),
            prefix: String::new(),
            conversion: Conversion::FullAscii,
            names: BTreeMap::new(),
        }
    }
}
impl CollectionSettings {
    pub fn policy(&self) -> NamingPolicy {
        NamingPolicy::new(self.field.clone(), self.prefix.clone(), self.conversion)
    }

    pub fn name_for(&self, collection_id: u64) -> Option<&str> {
        self.names.get(&collection_id.to_string()).map(String::as_str)
    }
}

/// Naming of item folders.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ItemSettings {
    pub field: FieldSelector,
    pub prefix: String,
    pub conversion: Conversion,
}
impl Default for ItemSettings {
    fn default() -> Self {
        Self { field: FieldSelector::InternalId, prefix: String::new(), conversion: Conversion::FullAscii }
    }
}
impl ItemSettings {
    pub fn policy(&self) -> NamingPolicy {
        NamingPolicy::new(self.field.clone(), self.prefix.clone(), self.conversion)
    }
}

/// Naming of stored files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub field: FieldSelector,
    pub prefix: String,
    pub conversion: Conversion,
    /// Reduce the recorded original filename to its basename.
    pub base_original_name: bool,
}
impl Default for FileSettings {
    fn default() -> Self {
        Self {
            field: FieldSelector::OriginalFilename,
            prefix: String::new(),
            conversion: Conversion::FullAscii,
            base_original_name: false,
        }
    }
}
impl FileSettings {
    pub fn policy(&self) -> NamingPolicy {
        NamingPolicy::new(self.field.clone(), self.prefix.clone(), self.conversion)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Absolute directory holding the `original`, `fullsize`, `thumbnails`
    /// and `square_thumbnails` folders.
    pub files_dir: PathBuf,
    /// Extra derivative folders: `"name|extension, name2"`.
    pub derivative_folders: String,
    /// Extension of derivative files, without the dot.
    pub derivative_extension: String,
    pub move_process: MoveProcess,
    /// Budget of a storage path, in characters.
    pub max_name_length: usize,
    /// Bound of a sanitized name, in characters.
    pub sanitize_max_length: usize,
    /// Create the folders of a collection as soon as it is saved.
    pub create_folders: bool,
    /// Extra derivative types whose folders are pruned even when not empty.
    pub force_prune: Vec<String>,
}
impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            files_dir: default_files_dir(),
            derivative_folders: String::new(),
            derivative_extension: "jpg".to_string(),
            move_process: MoveProcess::Internal,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            sanitize_max_length: repertory_naming::DEFAULT_MAX_LENGTH,
            create_folders: true,
            force_prune: Vec::new(),
        }
    }
}

/// Read by the download controller only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Files above this size, in bytes, need a confirmation before download.
    pub max_free_download: u64,
    pub legal_text: String,
}
impl Default for DownloadSettings {
    fn default() -> Self {
        Self { max_free_download: 30_000_000, legal_text: "I agree with terms of use.".to_string() }
    }
}

fn default_files_dir() -> PathBuf {
    match crate::project_dirs() {
        Some(dirs) => dirs.data_dir().join("files"),
        None => PathBuf::from("/var/lib/repertory/files"),
    }
}
