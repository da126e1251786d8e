//! Identifying value of a record, taken from one of its fields.

use crate::error::Result;
use crate::host::{Host, RecordRef};
use repertory_naming::{FieldSelector, NamingPolicy};

/// Picks the identifying value of a record according to its naming policy.
///
/// - [`FieldSelector::InternalId`] gives the decimal id.
/// - [`FieldSelector::Field`] gives the first text of the field. With a
///   prefix, only texts starting with it (case-sensitively) are eligible, and
///   the prefix and surrounding whitespace are stripped from the chosen one.
/// - Anything else, or a field without an eligible non-blank text, gives
///   `None`. Falling back to the id is up to the caller.
pub fn resolve<H: Host + ?Sized>(host: &H, record: RecordRef, policy: &NamingPolicy) -> Result<Option<String>> {
    let key = match &policy.field {
        FieldSelector::InternalId => return Ok(Some(record.id.to_string())),
        FieldSelector::Field(key) => key,
        _ => return Ok(None),
    };
    let texts = host.element_texts(record, key)?;
    let chosen = match policy.prefix.as_str() {
        "" => texts.first().map(String::as_str),
        prefix => texts.iter().find_map(|text| text.strip_prefix(prefix)),
    };
    Ok(chosen.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryHost;
    use repertory_naming::{Conversion, FieldKey};
    use rstest::rstest;

    fn identifier_policy(prefix: &str) -> NamingPolicy {
        NamingPolicy::new(FieldSelector::Field(FieldKey::dublin_core("Identifier")), prefix, Conversion::FullAscii)
    }

    fn host(identifiers: &[&str]) -> MemoryHost {
        let mut host = MemoryHost::default();
        for identifier in identifiers {
            host.add_text(RecordRef::collection(3), "Dublin Core:Identifier", identifier);
        }
        host
    }

    #[test]
    fn none_and_id() {
        let host = host(&["doc:1"]);
        let none = NamingPolicy::default();
        assert_eq!(resolve(&host, RecordRef::collection(3), &none).unwrap(), None);
        let id = NamingPolicy::new(FieldSelector::InternalId, "", Conversion::Keep);
        assert_eq!(resolve(&host, RecordRef::collection(3), &id).unwrap().as_deref(), Some("3"));
    }

    #[test]
    fn first_value_without_prefix() {
        let host = host(&["doc:1", "record:alpha"]);
        let resolved = resolve(&host, RecordRef::collection(3), &identifier_policy("")).unwrap();
        assert_eq!(resolved.as_deref(), Some("doc:1"));
    }

    #[rstest]
    #[case(&["doc:1", "record:alpha"], "record:", Some("alpha"))]
    #[case(&["record: beta ", "record:alpha"], "record:", Some("beta"))]
    #[case(&["doc:1"], "record:", None)]
    #[case(&["Record:alpha"], "record:", None)]
    #[case(&["record:   ", "record:alpha"], "record:", None)]
    #[case(&[], "", None)]
    fn prefixed_values(#[case] identifiers: &[&str], #[case] prefix: &str, #[case] expected: Option<&str>) {
        let host = host(identifiers);
        let resolved = resolve(&host, RecordRef::collection(3), &identifier_policy(prefix)).unwrap();
        assert_eq!(resolved.as_deref(), expected);
    }

    #[test]
    fn other_records_are_not_consulted() {
        let host = host(&["record:alpha"]);
        assert_eq!(resolve(&host, RecordRef::item(3), &identifier_policy("record:")).unwrap(), None);
    }
}
