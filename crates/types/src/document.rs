//! Stored-document value model and query result shapes.
//!
//! Records live in the ledger as JSON documents. Reads decode them with a
//! typed parse-or-fallback: [`Payload::Document`] when the stored bytes parse
//! as a structured document, [`Payload::Raw`] otherwise, so callers can
//! detect malformed stored data instead of silently receiving a string.
//!
//! Serialized result shapes (`Key`/`Record`, `TxId`/`Timestamp`/`IsDelete`/
//! `Value`) are part of the invocation wire format.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ContractError, SelectorSnafu};

/// A decoded stored payload.
///
/// Stored values are expected to be JSON documents, but the namespace also
/// holds index sentinels and may hold corrupt data; decoding never fails,
/// it falls back to the raw string form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// The payload parsed as a structured document.
    Document(Value),
    /// The payload did not parse; the lossy UTF-8 rendition is kept.
    Raw(String),
}

impl Payload {
    /// Decodes stored bytes, falling back to the raw string on parse failure.
    #[must_use]
    pub fn decode(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(doc) => Self::Document(doc),
            Err(_) => Self::Raw(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    /// Returns the structured document, if this payload parsed as one.
    #[must_use]
    pub fn as_document(&self) -> Option<&Value> {
        match self {
            Self::Document(doc) => Some(doc),
            Self::Raw(_) => None,
        }
    }

    /// Whether the stored bytes failed to parse as a document.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

/// A raw key/value pair emitted by a range or selector iterator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvPair {
    /// The state key.
    pub key: String,
    /// The stored bytes (empty for a missing value).
    pub value: Vec<u8>,
}

/// One committed version of a key, emitted by the history iterator.
///
/// Generated by the ledger platform; read-only to this core. A deletion
/// appears as a version with `is_delete` set and an empty snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVersion {
    /// Transaction that committed this version.
    pub tx_id: String,
    /// Commit timestamp.
    pub timestamp: DateTime<Utc>,
    /// Whether this version is a delete marker.
    pub is_delete: bool,
    /// The value snapshot at this version.
    pub value: Vec<u8>,
}

/// A collected non-history query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryRecord {
    /// The state key the record was found under.
    pub key: String,
    /// The decoded record.
    pub record: Payload,
}

/// A collected history result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HistoryEntry {
    /// Transaction that committed this version.
    pub tx_id: String,
    /// Commit timestamp.
    pub timestamp: DateTime<Utc>,
    /// Whether this version is a delete marker.
    pub is_delete: bool,
    /// The decoded value snapshot.
    pub value: Payload,
}

/// A declarative equality filter over stored documents.
///
/// Asserts that `docType` equals the given tag, plus zero or more additional
/// field equalities. Translated by the query layer into the substrate's
/// native filtered query.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    /// Required document type tag.
    pub doc_type: String,
    /// Additional field equalities, in assertion order.
    pub fields: Vec<(String, Value)>,
}

impl Selector {
    /// Creates a selector matching every document of the given type.
    #[must_use]
    pub fn new(doc_type: impl Into<String>) -> Self {
        Self { doc_type: doc_type.into(), fields: Vec::new() }
    }

    /// Adds a field equality assertion.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Parses a raw selector document of the form
    /// `{"selector": {"docType": "...", "field": "value", ...}}`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Selector`] if the document is not valid JSON,
    /// has no `selector` object, or asserts no `docType`.
    pub fn from_document(raw: &str) -> Result<Self, ContractError> {
        let doc: Value = serde_json::from_str(raw)
            .map_err(|e| SelectorSnafu { message: e.to_string() }.build())?;
        let selector = doc
            .get("selector")
            .and_then(Value::as_object)
            .ok_or_else(|| SelectorSnafu { message: "missing selector object" }.build())?;

        let mut doc_type = None;
        let mut fields = Vec::new();
        for (name, value) in selector {
            if name == "docType" {
                doc_type = value.as_str().map(str::to_owned);
            } else {
                fields.push((name.clone(), value.clone()));
            }
        }

        let doc_type = doc_type
            .ok_or_else(|| SelectorSnafu { message: "selector must assert a docType" }.build())?;
        Ok(Self { doc_type, fields })
    }

    /// Whether a decoded document satisfies every assertion.
    #[must_use]
    pub fn matches(&self, doc: &Value) -> bool {
        if doc.get("docType").and_then(Value::as_str) != Some(self.doc_type.as_str()) {
            return false;
        }
        self.fields.iter().all(|(name, value)| doc.get(name) == Some(value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_document() {
        let payload = Payload::decode(br#"{"docType":"patients","rowId":"1"}"#);
        assert!(!payload.is_raw());
        let doc = payload.as_document().unwrap();
        assert_eq!(doc["docType"], "patients");
    }

    #[test]
    fn test_decode_falls_back_to_raw() {
        let payload = Payload::decode(b"\x00");
        assert!(payload.is_raw());
        assert_eq!(payload, Payload::Raw("\u{0}".to_string()));
    }

    #[test]
    fn test_payload_serializes_untagged() {
        let doc = Payload::Document(json!({"a": 1}));
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"a":1}"#);

        let raw = Payload::Raw("not json".to_string());
        assert_eq!(serde_json::to_string(&raw).unwrap(), r#""not json""#);
    }

    #[test]
    fn test_query_record_wire_shape() {
        let record = QueryRecord {
            key: "100001".to_string(),
            record: Payload::Document(json!({"docType": "admission"})),
        };
        let encoded = serde_json::to_value(&record).unwrap();
        assert_eq!(encoded, json!({"Key": "100001", "Record": {"docType": "admission"}}));
    }

    #[test]
    fn test_history_entry_wire_shape() {
        let entry = HistoryEntry {
            tx_id: "tx-1".to_string(),
            timestamp: DateTime::from_timestamp(1_600_000_000, 0).unwrap(),
            is_delete: false,
            value: Payload::Raw(String::new()),
        };
        let encoded = serde_json::to_value(&entry).unwrap();
        assert_eq!(encoded["TxId"], "tx-1");
        assert_eq!(encoded["IsDelete"], false);
        assert!(encoded.get("Timestamp").is_some());
        assert_eq!(encoded["Value"], "");
    }

    #[test]
    fn test_selector_matches() {
        let selector = Selector::new("patients").field("subjectId", "249");
        assert!(selector.matches(&json!({"docType": "patients", "subjectId": "249"})));
        assert!(!selector.matches(&json!({"docType": "patients", "subjectId": "250"})));
        assert!(!selector.matches(&json!({"docType": "admission", "subjectId": "249"})));
        assert!(!selector.matches(&json!("not an object")));
    }

    #[test]
    fn test_selector_from_document() {
        let selector = Selector::from_document(
            r#"{"selector": {"docType": "noteevent", "category": "Radiology"}}"#,
        )
        .unwrap();
        assert_eq!(selector.doc_type, "noteevent");
        assert_eq!(selector.fields, vec![("category".to_string(), json!("Radiology"))]);
    }

    #[test]
    fn test_selector_document_requires_doc_type() {
        let err = Selector::from_document(r#"{"selector": {"subjectId": "249"}}"#)
            .expect_err("should reject");
        assert!(err.to_string().contains("docType"));
    }

    #[test]
    fn test_selector_document_rejects_garbage() {
        assert!(Selector::from_document("not json").is_err());
        assert!(Selector::from_document(r#"{"no": "selector"}"#).is_err());
    }
}
