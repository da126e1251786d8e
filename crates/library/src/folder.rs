//! Folder names of collections and items.
//!
//! The storage path of a file is `<collection folder>/<item folder>/<name>`.
//! Item folders are computed whenever they are needed. Collection folders are
//! computed when the collection is saved and cached in [`FolderNames`], so
//! that every file of an item lands in the same folder during a batch even if
//! the collection changes meanwhile.

use crate::error::Result;
use crate::host::{Collection, Host, Item, RecordRef};
use crate::identifier::resolve;
use repertory_config::Settings;
use repertory_naming::{Conversion, FieldKey, FieldSelector, HashSource, NamingPolicy, convert, sanitize_bounded};
use std::collections::BTreeMap;

/// Cached folder name of each collection. An empty name means the
/// collection contributes no folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderNames(BTreeMap<u64, String>);
impl FolderNames {
    pub fn get(&self, collection_id: u64) -> Option<&str> {
        self.0.get(&collection_id).map(String::as_str)
    }

    /// Stores a name; returns whether the cache changed.
    pub fn insert(&mut self, collection_id: u64, name: String) -> bool {
        self.0.insert(collection_id, name.clone()).is_none_or(|previous| previous != name)
    }

    pub fn as_map(&self) -> &BTreeMap<u64, String> {
        &self.0
    }

    fn is_taken_by_another(&self, name: &str, collection_id: u64) -> bool {
        self.0.iter().any(|(id, taken)| *id != collection_id && taken == name)
    }
}
impl From<BTreeMap<u64, String>> for FolderNames {
    fn from(names: BTreeMap<u64, String>) -> Self {
        Self(names)
    }
}

/// Derives folder names from record metadata and the naming settings.
pub struct FolderNameBuilder<'a, H: ?Sized> {
    host: &'a H,
    settings: &'a Settings,
}
impl<'a, H: Host + ?Sized> FolderNameBuilder<'a, H> {
    pub fn new(host: &'a H, settings: &'a Settings) -> Self {
        Self { host, settings }
    }

    /// Name contributed by one record, without separator.
    ///
    /// Empty only when the policy selects no folder. An id policy gives the
    /// id untouched; otherwise the resolved value is sanitized and converted,
    /// and the record id stands in when nothing usable is left.
    pub fn segment(&self, record: RecordRef, policy: &NamingPolicy) -> Result<String> {
        match &policy.field {
            FieldSelector::None => Ok(String::new()),
            FieldSelector::InternalId => Ok(record.id.to_string()),
            _ => {
                let raw = resolve(self.host, record, policy)?.unwrap_or_default();
                Ok(self.name_from(&raw, record.id, policy.conversion))
            },
        }
    }

    fn name_from(&self, raw: &str, id: u64, conversion: Conversion) -> String {
        let sanitized = sanitize_bounded(raw, self.settings.storage.sanitize_max_length);
        if sanitized.is_empty() {
            return id.to_string();
        }
        match convert(&sanitized, conversion, HashSource::new(id, raw)) {
            converted if converted.is_empty() => id.to_string(),
            converted => converted,
        }
    }

    /// Folder of an item, with a trailing separator unless empty.
    pub fn build_item_folder(&self, item: &Item) -> Result<String> {
        let segment = self.segment(RecordRef::item(item.id), &self.settings.item.policy())?;
        Ok(with_separator(&segment))
    }

    /// Cached folder of a collection, with a trailing separator unless
    /// empty. A collection missing from the cache (deleted, or never saved)
    /// gets its raw id.
    pub fn build_collection_folder(&self, names: &FolderNames, collection_id: Option<u64>) -> String {
        let Some(collection_id) = collection_id.filter(|_| !self.settings.collection.field.is_none()) else {
            return String::new();
        };
        match names.get(collection_id) {
            Some(name) => with_separator(name),
            None => {
                tracing::debug!(collection_id, "collection folder not cached, using its id");
                with_separator(&collection_id.to_string())
            },
        }
    }

    /// `<collection folder><item folder>`.
    pub fn build_full_path(&self, names: &FolderNames, item: &Item) -> Result<String> {
        let mut path = self.build_collection_folder(names, item.collection_id);
        path.push_str(&self.build_item_folder(item)?);
        Ok(path)
    }

    /// Computes the folder name of a collection, to be cached by the caller.
    ///
    /// With [`FieldSelector::FixedString`] the name configured for the
    /// collection is used. Without one, the first word of its title is taken
    /// and `_<id>` is appended until no other collection uses it.
    pub fn recompute_collection_folder(&self, names: &FolderNames, collection: &Collection) -> Result<String> {
        let policy = self.settings.collection.policy();
        if policy.field != FieldSelector::FixedString {
            return self.segment(RecordRef::collection(collection.id), &policy);
        }
        let raw = match self.settings.collection.name_for(collection.id) {
            Some(name) => name.to_string(),
            None => self.default_collection_name(names, collection)?,
        };
        Ok(self.name_from(&raw, collection.id, policy.conversion))
    }

    fn default_collection_name(&self, names: &FolderNames, collection: &Collection) -> Result<String> {
        let titles = self.host.element_texts(RecordRef::collection(collection.id), &FieldKey::dublin_core("Title"))?;
        let mut name = titles.first().and_then(|title| title.split_whitespace().next()).unwrap_or_default().to_string();
        while names.is_taken_by_another(&name, collection.id) {
            name.push_str(&format!("_{}", collection.id));
        }
        Ok(name)
    }
}

fn with_separator(segment: &str) -> String {
    match segment.trim_matches('/') {
        "" => String::new(),
        segment => format!("{segment}/"),
    }
}
