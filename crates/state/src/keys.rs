//! Composite-key encoding for the flat ledger namespace.
//!
//! Secondary indexes are emulated by encoding an index name plus one or more
//! component values into a single key, joined by a reserved delimiter that is
//! guaranteed not to appear in legitimate field values. A leading delimiter
//! keeps every composite key outside the range of plain record keys.
//!
//! Key format: {DELIM}{index_name}{DELIM}{component}...

use clinledger_types::{ContractError, Result};

/// Reserved delimiter byte. Never valid inside an index name or component.
pub const COMPOSITE_KEY_DELIMITER: char = '\u{0}';

/// Encodes an index name and ordered components into a composite key.
///
/// # Errors
///
/// Returns [`ContractError::Encoding`] if the index name or any component
/// contains the reserved delimiter — the encoding would be ambiguous, so
/// callers must reject or escape such input first.
pub fn create_composite_key(index_name: &str, components: &[&str]) -> Result<String> {
    ensure_delimiter_free(index_name)?;

    let capacity =
        2 + index_name.len() + components.iter().map(|c| 1 + c.len()).sum::<usize>();
    let mut key = String::with_capacity(capacity);
    key.push(COMPOSITE_KEY_DELIMITER);
    key.push_str(index_name);
    for component in components {
        ensure_delimiter_free(component)?;
        key.push(COMPOSITE_KEY_DELIMITER);
        key.push_str(component);
    }
    Ok(key)
}

/// Splits a composite key back into its index name and components.
///
/// For any `index_name` and `components` free of the reserved delimiter,
/// `split_composite_key(&create_composite_key(index_name, components)?)`
/// yields exactly `(index_name, components)`.
///
/// # Errors
///
/// Returns [`ContractError::Encoding`] if the key does not carry the leading
/// delimiter, i.e. it is a plain record key rather than a composite key.
pub fn split_composite_key(key: &str) -> Result<(String, Vec<String>)> {
    let Some(rest) = key.strip_prefix(COMPOSITE_KEY_DELIMITER) else {
        return Err(ContractError::Encoding { part: key.to_string() });
    };

    let mut parts = rest.split(COMPOSITE_KEY_DELIMITER);
    let index_name = parts.next().unwrap_or_default().to_string();
    let components = parts.map(str::to_string).collect();
    Ok((index_name, components))
}

fn ensure_delimiter_free(part: &str) -> Result<()> {
    if part.contains(COMPOSITE_KEY_DELIMITER) {
        return Err(ContractError::Encoding { part: part.to_string() });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_round_trip() {
        let key = create_composite_key("docType~subjectId", &["patients", "249"]).unwrap();
        let (index_name, components) = split_composite_key(&key).expect("should split");

        assert_eq!(index_name, "docType~subjectId");
        assert_eq!(components, vec!["patients", "249"]);
    }

    #[test]
    fn test_round_trip_no_components() {
        let key = create_composite_key("rowId", &[]).unwrap();
        let (index_name, components) = split_composite_key(&key).unwrap();

        assert_eq!(index_name, "rowId");
        assert!(components.is_empty());
    }

    #[test]
    fn test_empty_component_survives() {
        let key = create_composite_key("idx", &["", "b"]).unwrap();
        let (_, components) = split_composite_key(&key).unwrap();
        assert_eq!(components, vec!["", "b"]);
    }

    #[test]
    fn test_rejects_delimiter_in_component() {
        let err = create_composite_key("idx", &["a\u{0}b"]).expect_err("should reject");
        assert!(matches!(err, ContractError::Encoding { .. }));
    }

    #[test]
    fn test_rejects_delimiter_in_index_name() {
        assert!(create_composite_key("bad\u{0}name", &["a"]).is_err());
    }

    #[test]
    fn test_split_rejects_plain_key() {
        let err = split_composite_key("100001").expect_err("should reject");
        assert!(matches!(err, ContractError::Encoding { .. }));
    }

    #[test]
    fn test_composite_keys_sort_before_plain_keys() {
        let composite = create_composite_key("rowId", &["999"]).unwrap();
        assert!(composite.as_str() < "0");
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            index_name in "[a-zA-Z0-9~_-]{1,24}",
            components in proptest::collection::vec("[a-zA-Z0-9 .:_-]{0,16}", 0..6),
        ) {
            let refs: Vec<&str> = components.iter().map(String::as_str).collect();
            let key = create_composite_key(&index_name, &refs).unwrap();
            let (name, parts) = split_composite_key(&key).unwrap();
            prop_assert_eq!(name, index_name);
            prop_assert_eq!(parts, components);
        }
    }
}
