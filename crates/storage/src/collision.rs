//! Resolution of duplicate storage names.
//!
//! The check is done against the original rendition folder on disk, not
//! against any database: the other file may not be persisted yet.

use crate::error::Result;
use crate::path::{file_name_of, folder_of, normalize, split_extension};
use crate::topology::StorageTopology;
use std::path::Path;

/// Returns a storage path for a file that no other file occupies.
///
/// A folder entry occupies a stem when the entry, without its last extension,
/// equals that stem; so `photo.jpg`, `photo.png` and `photo` all occupy
/// `photo`, but `photo.1.jpg` does not.
///
/// - Nothing occupies the candidate stem: the candidate is returned.
/// - The file at `current` is there: when it is the only occupant the
///   candidate is returned; otherwise `current` is kept.
/// - Another file is there: `.1`, `.2`, ... is appended to the stem until a
///   free one is found. A suffixed stem whose only occupant is the file
///   itself counts as free, so a file already renamed keeps its suffix.
///
/// ```no_run
/// # use repertory_storage::{StorageTopology, unique_name, error::Result};
/// # fn example(topology: &StorageTopology) -> Result<()> {
/// // With `a/b.png` already stored for another file:
/// assert_eq!(unique_name(topology, "a/b.png", "tmp/upload.png")?, "a/b.1.png");
/// # Ok(())
/// # }
/// ```
#[tracing::instrument(level = "debug", skip(topology))]
pub fn unique_name(topology: &StorageTopology, candidate: &str, current: &str) -> Result<String> {
    let candidate = normalize(candidate);
    let current = normalize(current);
    let folder = folder_of(&candidate);
    let (stem, extension) = split_extension(file_name_of(&candidate));
    if stem.is_empty() {
        return Ok(candidate);
    }

    let entries = topology.original().backend().list(Path::new(folder))?;
    let taken = occupants(&entries, stem);
    if taken.is_empty() {
        return Ok(candidate);
    }
    let own_name = (folder_of(&current) == folder).then(|| file_name_of(&current));
    if let Some(own_name) = own_name
        && taken.contains(&own_name)
    {
        return Ok(match taken.len() {
            1 => candidate,
            _ => current,
        });
    }

    let mut suffix = 1u64;
    loop {
        let suffixed = format!("{stem}.{suffix}");
        let taken = occupants(&entries, &suffixed);
        if taken.is_empty() || own_name.is_some_and(|own_name| taken == [own_name]) {
            let unique = format!("{folder}{suffixed}{extension}");
            tracing::debug!(%candidate, %unique, "renamed duplicate");
            return Ok(unique);
        }
        suffix += 1;
    }
}

fn occupants<'a>(entries: &'a [String], stem: &str) -> Vec<&'a str> {
    entries.iter().map(String::as_str).filter(|entry| split_extension(entry).0 == stem).collect()
}
