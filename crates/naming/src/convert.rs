//! Conversions applied to an already [sanitized](crate::sanitize) name.

use crate::policy::Conversion;
use crate::sanitize::{DEFAULT_MAX_LENGTH, tail};

/// Number of hexadecimal digits kept from the BLAKE3 digest.
const HASH_LENGTH: usize = 32;

/// Entity suffixes whose single leading letter is the base Latin letter
/// (`eacute` → `e`, `uuml` → `u`).
const ENTITY_SUFFIXES: &[&str] =
    &["acute", "cedil", "circ", "grave", "lig", "orn", "ring", "slash", "th", "tilde", "uml"];

/// Named HTML entities of the non-ASCII letters that have one. Characters
/// missing from this table have no Latin base and become `_`.
const ENTITIES: &[(char, &str)] = &[
    ('À', "Agrave"),
    ('Á', "Aacute"),
    ('Â', "Acirc"),
    ('Ã', "Atilde"),
    ('Ä', "Auml"),
    ('Å', "Aring"),
    ('Æ', "AElig"),
    ('Ç', "Ccedil"),
    ('È', "Egrave"),
    ('É', "Eacute"),
    ('Ê', "Ecirc"),
    ('Ë', "Euml"),
    ('Ì', "Igrave"),
    ('Í', "Iacute"),
    ('Î', "Icirc"),
    ('Ï', "Iuml"),
    ('Ð', "ETH"),
    ('Ñ', "Ntilde"),
    ('Ò', "Ograve"),
    ('Ó', "Oacute"),
    ('Ô', "Ocirc"),
    ('Õ', "Otilde"),
    ('Ö', "Ouml"),
    ('Ø', "Oslash"),
    ('Ù', "Ugrave"),
    ('Ú', "Uacute"),
    ('Û', "Ucirc"),
    ('Ü', "Uuml"),
    ('Ý', "Yacute"),
    ('Þ', "THORN"),
    ('ß', "szlig"),
    ('à', "agrave"),
    ('á', "aacute"),
    ('â', "acirc"),
    ('ã', "atilde"),
    ('ä', "auml"),
    ('å', "aring"),
    ('æ', "aelig"),
    ('ç', "ccedil"),
    ('è', "egrave"),
    ('é', "eacute"),
    ('ê', "ecirc"),
    ('ë', "euml"),
    ('ì', "igrave"),
    ('í', "iacute"),
    ('î', "icirc"),
    ('ï', "iuml"),
    ('ð', "eth"),
    ('ñ', "ntilde"),
    ('ò', "ograve"),
    ('ó', "oacute"),
    ('ô', "ocirc"),
    ('õ', "otilde"),
    ('ö', "ouml"),
    ('ø', "oslash"),
    ('ù', "ugrave"),
    ('ú', "uacute"),
    ('û', "ucirc"),
    ('ü', "uuml"),
    ('ý', "yacute"),
    ('þ', "thorn"),
    ('ÿ', "yuml"),
    ('Œ', "OElig"),
    ('œ', "oelig"),
    ('Š', "Scaron"),
    ('š', "scaron"),
    ('Ÿ', "Yuml"),
];

/// Identity of the stored file (or record) a [`Conversion::Hash`] is
/// computed from. The same source always yields the same hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashSource<'a> {
    pub id: u64,
    pub original_name: &'a str,
}
impl<'a> HashSource<'a> {
    pub fn new(id: u64, original_name: &'a str) -> Self {
        Self { id, original_name }
    }
}

/// Applies `conversion` to a sanitized `name`.
///
/// [`Conversion::Hash`] ignores `name` entirely and returns
/// [`storage_hash`] of `source`.
///
/// ```
/// use repertory_naming::{Conversion, HashSource, convert};
/// let source = HashSource::new(7, "Für Élise.png");
/// assert_eq!(convert("Für Élise", Conversion::FullAscii, source), "Fur_Elise");
/// assert_eq!(convert("Für Élise", Conversion::SpacesToUnderscore, source), "Für_Élise");
/// assert_eq!(convert("Élise à Paris", Conversion::FirstLetterOnly, source), "Elise à Paris");
/// ```
pub fn convert(name: &str, conversion: Conversion, source: HashSource<'_>) -> String {
    match conversion {
        Conversion::Keep => name.to_string(),
        Conversion::SpacesToUnderscore => spaces_to_underscore(name),
        Conversion::FirstLetterOnly => first_letter_to_ascii(name),
        Conversion::FirstLetterAndSpaces => spaces_to_underscore(&first_letter_to_ascii(name)),
        Conversion::FullAscii => to_ascii(name),
        Conversion::Hash => storage_hash(source.id, source.original_name),
    }
}

/// Transliterates `name` to a restricted ASCII alphabet.
///
/// Accented letters and ligatures are reduced to their base Latin letters
/// through their named entity (`é` → `eacute` → `e`, `œ` → `oelig` → `oe`),
/// every other non-ASCII character becomes `_`, and so does any ASCII
/// character outside `[A-Za-z0-9_\-.#~@+:\[\]]`. Runs of `_` collapse and
/// only the last 250 characters are kept.
pub fn to_ascii(name: &str) -> String {
    let mut ascii = String::with_capacity(name.len());
    let mut push = |c: char| {
        if c == '_' && ascii.ends_with('_') {
            return;
        }
        ascii.push(c);
    };
    for c in name.chars() {
        if c.is_ascii() {
            push(if is_kept(c) { c } else { '_' });
            continue;
        }
        match latin_base(c) {
            Some(base) => base.chars().for_each(&mut push),
            None => push('_'),
        }
    }
    tail(&ascii, DEFAULT_MAX_LENGTH).to_string()
}

/// Transliterates only the first character of `name`; the rest is kept
/// untouched (sliced by character, never by byte).
pub fn first_letter_to_ascii(name: &str) -> String {
    let Some(first) = to_ascii(name).chars().next() else {
        return String::new();
    };
    std::iter::once(first).chain(name.chars().skip(1)).collect()
}

/// Replaces every run of whitespace with a single `_`.
pub fn spaces_to_underscore(name: &str) -> String {
    let mut converted = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                converted.push('_');
            }
            in_space = true;
        } else {
            converted.push(c);
            in_space = false;
        }
    }
    converted
}

/// Deterministic storage name of a file: the first 32 hexadecimal digits of
/// the BLAKE3 digest of its id and upload-time filename.
pub fn storage_hash(id: u64, original_name: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(id.to_string().as_bytes());
    hasher.update(b"\0");
    hasher.update(original_name.as_bytes());
    let digest = hasher.finalize().to_hex();
    digest.as_str()[..HASH_LENGTH].to_string()
}

fn is_kept(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '[' | ']' | '_' | '-' | '.' | '#' | '~' | '@' | '+' | ':')
}

fn latin_base(c: char) -> Option<&'static str> {
    let (_, entity) = ENTITIES.iter().find(|(letter, _)| *letter == c)?;
    let is_letters = |s: &str| s.chars().all(|c| c.is_ascii_alphabetic());
    if let Some((letter, suffix)) = entity.split_at_checked(1)
        && is_letters(letter)
        && ENTITY_SUFFIXES.contains(&suffix)
    {
        return Some(letter);
    }
    match entity.split_at_checked(2) {
        Some((letters, "lig")) if is_letters(letters) => Some(letters),
        _ => None,
    }
}
