//! In-memory [`Host`] used by the tests of this crate.

use crate::error::Result;
use crate::host::{Host, Item, RecordRef, StoredFile};
use repertory_naming::FieldKey;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
pub(crate) struct MemoryHost {
    pub texts: HashMap<(RecordRef, String), Vec<String>>,
    pub items: BTreeMap<u64, Item>,
    /// Keyed by id, which is also the attachment order.
    pub files: BTreeMap<u64, StoredFile>,
    pub folder_names: BTreeMap<u64, String>,
    pub settings: BTreeMap<String, String>,
    /// Every persisted path, in order.
    pub saved_paths: Vec<(u64, String)>,
}
impl MemoryHost {
    pub fn add_text(&mut self, record: RecordRef, key: &str, text: &str) {
        self.texts.entry((record, key.to_string())).or_default().push(text.to_string());
    }

    pub fn add_item(&mut self, id: u64, collection_id: Option<u64>) -> Item {
        let item = Item { id, collection_id };
        self.items.insert(id, item.clone());
        item
    }

    pub fn add_file(&mut self, id: u64, item_id: u64, path: &str, original_filename: &str) -> StoredFile {
        let file = StoredFile {
            id,
            path: path.to_string(),
            original_filename: original_filename.to_string(),
            item_id,
            has_derivatives: true,
            size: 4,
            mime_type: "image/png".to_string(),
            stored: true,
        };
        self.files.insert(id, file.clone());
        file
    }

    pub fn file(&self, id: u64) -> &StoredFile {
        &self.files[&id]
    }
}

impl Host for MemoryHost {
    fn element_texts(&self, record: RecordRef, key: &FieldKey) -> Result<Vec<String>> {
        Ok(self.texts.get(&(record, key.to_string())).cloned().unwrap_or_default())
    }

    fn item(&self, id: u64) -> Result<Option<Item>> {
        Ok(self.items.get(&id).cloned())
    }

    fn item_files(&self, item_id: u64) -> Result<Vec<StoredFile>> {
        Ok(self.files.values().filter(|file| file.item_id == item_id).cloned().collect())
    }

    fn save_file_path(&mut self, file_id: u64, path: &str) -> Result<()> {
        if let Some(file) = self.files.get_mut(&file_id) {
            file.path = path.to_string();
        }
        self.saved_paths.push((file_id, path.to_string()));
        Ok(())
    }

    fn save_original_filename(&mut self, file_id: u64, original_filename: &str) -> Result<()> {
        if let Some(file) = self.files.get_mut(&file_id) {
            file.original_filename = original_filename.to_string();
        }
        Ok(())
    }

    fn collection_folder_names(&self) -> Result<BTreeMap<u64, String>> {
        Ok(self.folder_names.clone())
    }

    fn save_collection_folder_names(&mut self, names: &BTreeMap<u64, String>) -> Result<()> {
        self.folder_names = names.clone();
        Ok(())
    }

    fn save_setting(&mut self, key: &str, value: &str) -> Result<()> {
        self.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
