//! Reduction of arbitrary strings to a single safe path segment.

use regex::Regex;
use std::sync::LazyLock;

/// Default maximum length of a sanitized name, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 250;

/// Characters trimmed from both ends before anything else happens. The last
/// one is a no-break space.
const TRIMMED: &[char] = &[' ', '/', '\\', '?', '<', '>', ':', '*', '%', '|', '"', '\'', '`', '&', ';', '\u{00A0}'];

// A tag starts with a letter, `/`, `!` or `?` right after the `<`; an
// unterminated tag runs to the end of the string.
static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[A-Za-z/!?][^>]*(?:>|$)").unwrap());

/// Sanitizes `raw` with the [default length bound](DEFAULT_MAX_LENGTH).
///
/// See [`sanitize_bounded`].
pub fn sanitize(raw: &str) -> String {
    sanitize_bounded(raw, DEFAULT_MAX_LENGTH)
}

/// Returns a name that can be used as a single folder or file name.
///
/// The string should be a simple name, not a path: separators are removed,
/// so a path has to be sanitized segment by segment.
///
/// 1. Markup tags are stripped.
/// 2. Spaces, separators and `?<>:*%|"'`&;` are trimmed from both ends.
/// 3. `(` and `{` become `[`, `)` and `}` become `]`.
/// 4. Control characters, whitespace, separators and `?<>:*%|"'`&;#+^$` become
///    a space, and runs of spaces collapse into one.
/// 5. Only the **last** `max_length` characters are kept, so that trailing
///    disambiguating suffixes survive.
///
/// Never fails; an empty input yields an empty output. Sanitizing twice gives
/// the same result as sanitizing once.
///
/// ```
/// use repertory_naming::sanitize;
/// assert_eq!(sanitize("  <b>Report</b> (draft): v2?  "), "Report [draft] v2");
/// assert_eq!(sanitize("a/b\\c"), "a b c");
/// ```
pub fn sanitize_bounded(raw: &str, max_length: usize) -> String {
    let stripped = TAGS.replace_all(raw, "");
    let mut name = String::with_capacity(stripped.len());
    for c in stripped.trim_matches(TRIMMED).chars() {
        let c = match c {
            '(' | '{' => '[',
            ')' | '}' => ']',
            c if is_reserved(c) => ' ',
            c => c,
        };
        if c == ' ' && name.ends_with(' ') {
            continue;
        }
        name.push(c);
    }
    tail(&name, max_length).trim_matches(' ').to_string()
}

fn is_reserved(c: char) -> bool {
    c.is_control()
        || c.is_whitespace()
        || matches!(
            c,
            '/' | '\\' | '?' | '<' | '>' | ':' | '*' | '%' | '|' | '"' | '\'' | '`' | '&' | ';' | '#' | '+' | '^' | '$'
        )
}

/// The last `max_chars` characters of `s` (not bytes).
pub(crate) fn tail(s: &str, max_chars: usize) -> &str {
    let count = s.chars().count();
    if count <= max_chars {
        return s;
    }
    match s.char_indices().nth(count - max_chars) {
        Some((index, _)) => &s[index..],
        None => "",
    }
}
