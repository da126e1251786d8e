//! Stored basename of a file.

use crate::error::Result;
use crate::host::{Host, RecordRef, StoredFile};
use crate::identifier::resolve;
use repertory_config::FileSettings;
use repertory_naming::{Conversion, FieldSelector, HashSource, convert, sanitize_bounded, storage_hash};
use repertory_storage::{file_name_of, split_extension};

/// Last segment of an upload-time filename, whichever separator it uses.
pub fn base_name(original_filename: &str) -> &str {
    original_filename.rsplit(['/', '\\']).next().unwrap_or(original_filename)
}

/// The basename a file should be stored under, folder excluded.
///
/// | Field                 | Name                                             |
/// |-----------------------|--------------------------------------------------|
/// | none                  | the current basename                             |
/// | original filename     | the upload-time basename, sanitized and converted |
/// | hash                  | hash of the file, with the upload-time extension |
/// | id                    | file id, with the current extension              |
/// | metadata field        | converted field value, with the current extension |
///
/// A [`Conversion::Hash`] always gives the hash. Whenever nothing usable is
/// left, the current basename is kept.
pub fn file_basename<H: Host + ?Sized>(
    host: &H,
    file: &StoredFile,
    settings: &FileSettings,
    max_length: usize,
) -> Result<String> {
    let current = file_name_of(&file.path);
    let (_, current_extension) = split_extension(current);
    let original = base_name(&file.original_filename);
    let (_, original_extension) = split_extension(original);
    let hashed = || format!("{}{original_extension}", storage_hash(file.id, &file.original_filename));

    let name = match &settings.field {
        FieldSelector::HashOfOriginalName => hashed(),
        FieldSelector::OriginalFilename if settings.conversion == Conversion::Hash => hashed(),
        FieldSelector::OriginalFilename => {
            let sanitized = sanitize_bounded(original, max_length);
            match sanitized.is_empty() {
                true => String::new(),
                false => convert(&sanitized, settings.conversion, HashSource::new(file.id, &file.original_filename)),
            }
        },
        FieldSelector::InternalId => format!("{}{current_extension}", file.id),
        FieldSelector::Field(_) => {
            let raw = resolve(host, RecordRef::file(file.id), &settings.policy())?.unwrap_or_default();
            let sanitized = sanitize_bounded(&raw, max_length);
            match sanitized.is_empty() {
                true => String::new(),
                false => {
                    let source = HashSource::new(file.id, &file.original_filename);
                    format!("{}{current_extension}", convert(&sanitized, settings.conversion, source))
                },
            }
        },
        FieldSelector::None | FieldSelector::FixedString => String::new(),
    };
    Ok(match name.is_empty() {
        true => current.to_string(),
        false => name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryHost;
    use repertory_naming::FieldKey;
    use rstest::rstest;

    fn file(original_filename: &str) -> StoredFile {
        let mut host = MemoryHost::default();
        host.add_file(9, 1, "coll/1/0f3a.png", original_filename)
    }

    fn settings(field: FieldSelector, conversion: Conversion) -> FileSettings {
        FileSettings { field, conversion, ..FileSettings::default() }
    }

    #[rstest]
    #[case("C:\\Users\\me\\Für Élise.png", "Für Élise.png")]
    #[case("/tmp/upload/photo.jpg", "photo.jpg")]
    #[case("photo.jpg", "photo.jpg")]
    #[case("", "")]
    fn keeps_last_segment(#[case] original: &str, #[case] expected: &str) {
        assert_eq!(base_name(original), expected);
    }

    #[rstest]
    #[case(Conversion::FullAscii, "Fur_Elise.png")]
    #[case(Conversion::Keep, "Für Élise.png")]
    #[case(Conversion::SpacesToUnderscore, "Für_Élise.png")]
    fn names_from_original_filename(#[case] conversion: Conversion, #[case] expected: &str) {
        let host = MemoryHost::default();
        let file = file("/home/me/Für Élise.png");
        let name = file_basename(&host, &file, &settings(FieldSelector::OriginalFilename, conversion), 250).unwrap();
        assert_eq!(name, expected);
    }

    #[rstest]
    #[case(FieldSelector::HashOfOriginalName, Conversion::FullAscii)]
    #[case(FieldSelector::OriginalFilename, Conversion::Hash)]
    fn hashed_names_keep_the_original_extension(#[case] field: FieldSelector, #[case] conversion: Conversion) {
        let host = MemoryHost::default();
        let file = file("scan.tiff");
        let name = file_basename(&host, &file, &settings(field, conversion), 250).unwrap();
        assert_eq!(name, format!("{}.tiff", storage_hash(9, "scan.tiff")));
    }

    #[test]
    fn id_keeps_the_current_extension() {
        let host = MemoryHost::default();
        let name = file_basename(&host, &file("a.jpg"), &settings(FieldSelector::InternalId, Conversion::Keep), 250);
        assert_eq!(name.unwrap(), "9.png");
    }

    #[test]
    fn field_value_with_current_extension() {
        let mut host = MemoryHost::default();
        host.add_text(RecordRef::file(9), "Dublin Core:Title", "Vue du pont");
        let field = FieldSelector::Field(FieldKey::dublin_core("Title"));
        let name = file_basename(&host, &file("a.jpg"), &settings(field.clone(), Conversion::FullAscii), 250).unwrap();
        assert_eq!(name, "Vue_du_pont.png");
        // Without a title the name is left alone.
        let other = StoredFile { id: 10, ..file("a.jpg") };
        assert_eq!(file_basename(&host, &other, &settings(field, Conversion::FullAscii), 250).unwrap(), "0f3a.png");
    }

    #[rstest]
    #[case(FieldSelector::None, "Für Élise.png")]
    #[case(FieldSelector::OriginalFilename, "")]
    #[case(FieldSelector::OriginalFilename, "<br>")]
    fn falls_back_to_current_name(#[case] field: FieldSelector, #[case] original: &str) {
        let host = MemoryHost::default();
        let name = file_basename(&host, &file(original), &settings(field, Conversion::FullAscii), 250).unwrap();
        assert_eq!(name, "0f3a.png");
    }
}
