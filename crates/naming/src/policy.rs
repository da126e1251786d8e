//! Configurable choice of *what* names a folder or file, and *how* it is
//! converted.

use crate::error::{ErrorKind, Result};
use derive_more::Display;
use serde::Deserialize;
use std::str::FromStr;

/// A metadata field, identified by its element set and element name
/// (`"Dublin Core:Title"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{element_set}:{element}")]
pub struct FieldKey {
    pub element_set: String,
    pub element: String,
}
impl FieldKey {
    pub fn new(element_set: impl Into<String>, element: impl Into<String>) -> Self {
        Self { element_set: element_set.into(), element: element.into() }
    }

    pub fn dublin_core(element: impl Into<String>) -> Self {
        Self::new("Dublin Core", element)
    }
}
impl FromStr for FieldKey {
    type Err = crate::error::Error;

    /// Element set names may themselves contain a colon, so the key is split
    /// on the last one.
    fn from_str(s: &str) -> Result<Self> {
        let Some((element_set, element)) = s.rsplit_once(':') else {
            exn::bail!(ErrorKind::FieldKey(s.to_string()));
        };
        let (element_set, element) = (element_set.trim(), element.trim());
        if element_set.is_empty() || element.is_empty() {
            exn::bail!(ErrorKind::FieldKey(s.to_string()));
        }
        Ok(Self::new(element_set, element))
    }
}

/// Where the raw name of a folder or file comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum FieldSelector {
    /// No folder at this level (or, for files, no renaming).
    #[default]
    None,
    /// The record's numeric id, used verbatim.
    InternalId,
    /// The first text of a metadata field.
    Field(FieldKey),
    /// A stable hash of the stored file; only meaningful for files.
    HashOfOriginalName,
    /// A per-record name entered by an administrator; only meaningful for
    /// collections.
    FixedString,
    /// The filename the file was uploaded with; only meaningful for files.
    OriginalFilename,
}
impl FieldSelector {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}
impl FromStr for FieldSelector {
    type Err = crate::error::Error;

    /// Accepts `none`, `id`, `hash`, `string`, `original` or a
    /// `<element set>:<element>` field key.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Ok(match trimmed.to_ascii_lowercase().as_str() {
            "" | "none" => Self::None,
            "id" => Self::InternalId,
            "hash" => Self::HashOfOriginalName,
            "string" => Self::FixedString,
            "original" | "original_filename" => Self::OriginalFilename,
            _ if trimmed.contains(':') => Self::Field(trimmed.parse()?),
            _ => exn::bail!(ErrorKind::FieldSelector(s.to_string())),
        })
    }
}
impl TryFrom<String> for FieldSelector {
    type Error = ErrorKind;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse().map_err(|err: crate::error::Error| (*err).clone())
    }
}

/// How a sanitized name is turned into its final form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Conversion {
    /// Sanitized name, as is.
    Keep,
    /// Runs of whitespace become `_`.
    SpacesToUnderscore,
    /// Only the first character is transliterated to ASCII.
    FirstLetterOnly,
    /// [`FirstLetterOnly`](Self::FirstLetterOnly) then
    /// [`SpacesToUnderscore`](Self::SpacesToUnderscore).
    FirstLetterAndSpaces,
    /// Full transliteration to a restricted ASCII alphabet.
    #[default]
    FullAscii,
    /// The name is replaced by a stable hash of the file.
    Hash,
}
impl FromStr for Conversion {
    type Err = crate::error::Error;

    /// Case, spaces, dashes and underscores are ignored: `"Full ASCII"`,
    /// `"full_ascii"` and `"fullascii"` are the same conversion.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Ok(match normalized.as_str() {
            "keep" | "keepname" => Self::Keep,
            "spaces" | "spacestounderscore" => Self::SpacesToUnderscore,
            "firstletter" | "firstletteronly" => Self::FirstLetterOnly,
            "firstandspaces" | "firstletterandspaces" => Self::FirstLetterAndSpaces,
            "full" | "fullascii" => Self::FullAscii,
            "hash" => Self::Hash,
            _ => exn::bail!(ErrorKind::Conversion(s.to_string())),
        })
    }
}
impl TryFrom<String> for Conversion {
    type Error = ErrorKind;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse().map_err(|err: crate::error::Error| (*err).clone())
    }
}

/// Naming policy of one record kind: where the name comes from, the literal
/// prefix stripped from field values, and the conversion applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NamingPolicy {
    pub field: FieldSelector,
    /// Only field texts starting with this prefix are considered, and the
    /// prefix is removed from the chosen one. Matching is case-sensitive.
    pub prefix: String,
    pub conversion: Conversion,
}
impl NamingPolicy {
    pub fn new(field: FieldSelector, prefix: impl Into<String>, conversion: Conversion) -> Self {
        Self { field, prefix: prefix.into(), conversion }
    }
}
