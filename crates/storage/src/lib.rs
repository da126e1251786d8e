//! Filesystem side of the repertory: rendition roots, duplicate name
//! resolution and relocation of stored files with their derivatives.

pub mod backend;
mod collision;
pub mod error;
mod path;
mod relocate;
mod topology;

pub use crate::backend::StorageBackend;
pub use crate::collision::unique_name;
pub use crate::path::validate as validate_path;
pub use crate::path::{file_name_of, folder_of, normalize, parent_folder, split_extension, with_extension};
pub use crate::relocate::{DEFAULT_MAX_NAME_LENGTH, Relocation, RelocationEngine};
pub use crate::topology::{FIXED_RENDITIONS, ORIGINAL, Rendition, StorageTopology};
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
