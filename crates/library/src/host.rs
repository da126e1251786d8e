//! What the repertory needs from the content-management host.
//!
//! Records are handed over as read-only snapshots; every change goes back
//! through an explicit [`Host`] command.

use crate::error::Result;
use repertory_naming::FieldKey;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Collection,
    Item,
    File,
}

/// A record whose metadata can be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordRef {
    pub kind: RecordKind,
    pub id: u64,
}
impl RecordRef {
    pub fn collection(id: u64) -> Self {
        Self { kind: RecordKind::Collection, id }
    }

    pub fn item(id: u64) -> Self {
        Self { kind: RecordKind::Item, id }
    }

    pub fn file(id: u64) -> Self {
        Self { kind: RecordKind::File, id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: u64,
    pub collection_id: Option<u64>,
}

/// A file attached to an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: u64,
    /// Location of the original rendition, relative to the original root.
    pub path: String,
    /// Filename given at upload time. Only used to derive names.
    pub original_filename: String,
    pub item_id: u64,
    pub has_derivatives: bool,
    pub size: u64,
    pub mime_type: String,
    /// Whether the host has finished storing the file.
    pub stored: bool,
}

/// Persistence and metadata queries provided by the host.
///
/// Queries return records in a stable order: element texts in insertion
/// order, files in attachment order.
pub trait Host {
    /// Texts of the `key` element of a record.
    fn element_texts(&self, record: RecordRef, key: &FieldKey) -> Result<Vec<String>>;

    fn item(&self, id: u64) -> Result<Option<Item>>;

    /// Files attached to an item.
    fn item_files(&self, item_id: u64) -> Result<Vec<StoredFile>>;

    /// Records the new location of a file; called right after its move.
    fn save_file_path(&mut self, file_id: u64, path: &str) -> Result<()>;

    fn save_original_filename(&mut self, file_id: u64, original_filename: &str) -> Result<()>;

    /// Cached collection folder names, by collection id.
    fn collection_folder_names(&self) -> Result<BTreeMap<u64, String>>;

    fn save_collection_folder_names(&mut self, names: &BTreeMap<u64, String>) -> Result<()>;

    /// Overwrites a plugin setting, such as a self-pruned derivative list.
    fn save_setting(&mut self, key: &str, value: &str) -> Result<()>;
}
