//! The one insert path every entity kind shares.
//!
//! A handler invocation validates its arguments against the schema row,
//! optionally guards against an existing record, writes the document, and
//! writes the declared index entry. The substrate commits the primary write
//! and the index write as one atomic unit; a failure anywhere aborts the
//! whole invocation with nothing committed.

use serde_json::{Map, Value};
use tracing::debug;

use clinledger_state::{IndexManager, LedgerState, StateStore};
use clinledger_types::{ContractError, Result};

use crate::schema::{Coercion, EntitySchema};

impl Coercion {
    fn apply(self, raw: &str) -> Value {
        match self {
            Self::None => Value::String(raw.to_string()),
            Self::Integer => raw.trim().parse::<i64>().map_or(Value::Null, Value::from),
            Self::Lowercase => Value::String(raw.to_lowercase()),
        }
    }
}

/// Inserts one record of the given kind.
///
/// Returns the stored record bytes for kinds whose schema declares a
/// payload, `None` otherwise.
///
/// # Errors
///
/// [`ContractError::Arity`] / [`ContractError::Validation`] before any
/// write; [`ContractError::DuplicateKey`] for guarded kinds when the
/// primary key is occupied, also before any write; otherwise substrate
/// and encoding errors.
pub async fn insert_record<S: LedgerState>(
    stub: &S,
    schema: &EntitySchema,
    args: &[String],
) -> Result<Option<Vec<u8>>> {
    let args = schema.validate(args)?;
    let key = schema.primary_key(args);

    if schema.checks_existence {
        let existing = StateStore::get(stub, key).await?;
        if !existing.is_empty() {
            return Err(ContractError::DuplicateKey { key: key.to_string() });
        }
    }

    let document = build_document(schema, args);
    let bytes = serde_json::to_vec(&document)
        .map_err(|e| ContractError::Serialization { message: e.to_string() })?;
    StateStore::put(stub, key, &bytes).await?;

    if let Some(index) = &schema.index {
        let components: Vec<&str> = if index.with_doc_type {
            vec![schema.doc_type, key]
        } else {
            vec![key]
        };
        IndexManager::write_index(stub, index.name, &components, key).await?;
    }

    debug!(function = schema.function, key, "stored record");
    Ok(schema.returns_record.then_some(bytes))
}

/// Builds the stored document: `docType` first, then the schema's fields in
/// declaration order with their coercions applied.
fn build_document(schema: &EntitySchema, args: &[String]) -> Map<String, Value> {
    let mut document = Map::with_capacity(schema.fields.len() + 1);
    document.insert("docType".to_string(), Value::String(schema.doc_type.to_string()));
    for (field, raw) in schema.fields.iter().zip(args) {
        document.insert(field.name.to_string(), field.coercion.apply(raw));
    }
    document
}
