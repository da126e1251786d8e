//! Configuration of the repertory.
//!
//! Settings are merged from, by increasing priority:
//!
//! 1. built-in defaults,
//! 2. a configuration file (TOML, YAML or JSON, chosen by extension),
//! 3. `REPERTORY_*` environment variables, with `__` separating nested keys
//!    (`REPERTORY_STORAGE__FILES_DIR=/srv/files`).
//!
//! Naming policies are parsed into their enums while loading, and the result
//! is [validated](Settings::validate) before it is returned.

pub mod error;
mod settings;

pub use crate::settings::{CollectionSettings, DownloadSettings, FileSettings, ItemSettings, Settings, StorageSettings};
use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use repertory_naming::FieldSelector;
use std::path::{Path, PathBuf};

/// Prefix of the environment variables read by [`Settings::load`].
pub const ENV_PREFIX: &str = "REPERTORY_";
/// Name of the configuration file looked up in the user configuration
/// directory when no path is given.
pub const DEFAULT_FILE_NAME: &str = "repertory.toml";

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "repertory")
}

/// The configuration file used when none is given, if it exists.
pub fn default_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(DEFAULT_FILE_NAME)).filter(|path| path.is_file())
}

impl Settings {
    /// Loads settings from `path` (or the [default file](default_path) when
    /// there is one) and the environment.
    #[tracing::instrument]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::Missing(path.to_path_buf())),
            Some(path) => figment = merge_file(figment, path)?,
            None => {
                if let Some(path) = default_path() {
                    tracing::debug!(path = %path.display(), "using default configuration file");
                    figment = merge_file(figment, &path)?;
                }
            },
        }
        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extracts and validates settings from an already assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Self = figment.extract().map_err(ErrorKind::Load)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks that every policy is allowed for its record kind and that
    /// storage values are usable.
    pub fn validate(&self) -> Result<()> {
        let file_only = |field: &FieldSelector| {
            matches!(field, FieldSelector::OriginalFilename | FieldSelector::HashOfOriginalName)
        };
        if file_only(&self.collection.field) {
            exn::bail!(ErrorKind::Invalid("collection folders cannot be named from a file".to_string()));
        }
        if file_only(&self.item.field) || self.item.field == FieldSelector::FixedString {
            exn::bail!(ErrorKind::Invalid("item folders are named by id, by a field or not at all".to_string()));
        }
        if self.file.field == FieldSelector::FixedString {
            exn::bail!(ErrorKind::Invalid("files cannot be named from a fixed string".to_string()));
        }
        if !self.storage.files_dir.is_absolute() {
            exn::bail!(ErrorKind::Invalid(format!(
                "files directory must be absolute: {}",
                self.storage.files_dir.display()
            )));
        }
        if self.storage.max_name_length == 0 || self.storage.sanitize_max_length == 0 {
            exn::bail!(ErrorKind::Invalid("name lengths must be greater than zero".to_string()));
        }
        Ok(())
    }
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::Format(path.to_path_buf())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use repertory_naming::{Conversion, FieldKey};
    use repertory_storage::backend::MoveProcess;
    use rstest::rstest;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.collection.field, FieldSelector::Field(FieldKey::dublin_core("Title")));
        assert_eq!(settings.item.field, FieldSelector::InternalId);
        assert_eq!(settings.file.field, FieldSelector::OriginalFilename);
        assert_eq!(settings.file.conversion, Conversion::FullAscii);
        assert_eq!(settings.storage.derivative_extension, "jpg");
        assert_eq!(settings.storage.max_name_length, 190);
        assert_eq!(settings.storage.sanitize_max_length, 250);
        assert_eq!(settings.storage.move_process, MoveProcess::Internal);
        assert_eq!(settings.download.max_free_download, 30_000_000);
    }

    #[test]
    fn loads_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "repertory.toml",
                r#"
                [collection]
                field = "String"
                names = { 3 = "Photographs" }

                [item]
                field = "Dublin Core:Identifier"
                prefix = "record:"
                conversion = "Spaces"

                [storage]
                files_dir = "/srv/files"
                derivative_folders = "zoom|_zdata"
                move_process = "direct"
                force_prune = ["zoom"]
                "#,
            )?;
            let settings = Settings::load(Some(Path::new("repertory.toml"))).unwrap();
            assert_eq!(settings.collection.field, FieldSelector::FixedString);
            assert_eq!(settings.collection.name_for(3), Some("Photographs"));
            assert_eq!(settings.collection.name_for(4), None);
            assert_eq!(settings.item.field, FieldSelector::Field(FieldKey::dublin_core("Identifier")));
            assert_eq!(settings.item.prefix, "record:");
            assert_eq!(settings.item.conversion, Conversion::SpacesToUnderscore);
            assert_eq!(settings.storage.files_dir, PathBuf::from("/srv/files"));
            assert_eq!(settings.storage.move_process, MoveProcess::Direct);
            assert_eq!(settings.storage.force_prune, vec!["zoom".to_string()]);
            // Untouched sections keep their defaults.
            assert_eq!(settings.file, FileSettings::default());
            Ok(())
        });
    }

    #[test]
    fn loads_yaml_file() {
        Jail::expect_with(|jail| {
            jail.create_file("repertory.yaml", "item:\n  field: none\nstorage:\n  files_dir: /srv/files\n")?;
            let settings = Settings::load(Some(Path::new("repertory.yaml"))).unwrap();
            assert_eq!(settings.item.field, FieldSelector::None);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("repertory.json", r#"{"storage": {"files_dir": "/srv/files", "max_name_length": 100}}"#)?;
            jail.set_env("REPERTORY_STORAGE__MAX_NAME_LENGTH", "120");
            jail.set_env("REPERTORY_FILE__FIELD", "hash");
            let settings = Settings::load(Some(Path::new("repertory.json"))).unwrap();
            assert_eq!(settings.storage.max_name_length, 120);
            assert_eq!(settings.file.field, FieldSelector::HashOfOriginalName);
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Settings::load(Some(Path::new("/nonexistent/repertory.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Missing(_)));
    }

    #[test]
    fn unknown_format_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repertory.ini");
        std::fs::write(&path, "field = id").unwrap();
        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Format(_)));
    }

    #[test]
    fn bad_policy_is_a_load_error() {
        Jail::expect_with(|jail| {
            jail.create_file("repertory.toml", "[item]\nconversion = \"uppercase\"\n")?;
            let err = Settings::load(Some(Path::new("repertory.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Load(_)));
            Ok(())
        });
    }

    #[rstest]
    #[case("[collection]\nfield = \"original\"\n")]
    #[case("[collection]\nfield = \"hash\"\n")]
    #[case("[item]\nfield = \"string\"\n")]
    #[case("[item]\nfield = \"original\"\n")]
    #[case("[file]\nfield = \"string\"\n")]
    #[case("[storage]\nfiles_dir = \"relative/files\"\n")]
    #[case("[storage]\nmax_name_length = 0\n")]
    fn rejects_invalid_settings(#[case] toml: &str) {
        let figment = Figment::new().merge(Toml::string("[storage]\nfiles_dir = \"/srv\"\n")).merge(Toml::string(toml));
        let err = Settings::from_figment(figment).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)), "{err:?}");
    }
}
