//! Read-side handlers: point lookup, range, selector, history, delete.
//!
//! Query results are the JSON encoding of the collector output; a point
//! lookup returns the stored bytes untouched. Delete removes only the
//! primary record — no handler anywhere removes a secondary-index entry,
//! so a deleted record's index key stays behind.

use serde::Serialize;
use tracing::debug;

use clinledger_state::{HistoryReader, LedgerState, QueryExecutor, StateStore};
use clinledger_types::{ContractError, Result, Selector};

/// Point lookup. Returns the stored bytes; a missing (empty) value is
/// [`ContractError::NotFound`].
pub async fn read_record<S: LedgerState>(
    stub: &S,
    function: &str,
    args: &[String],
) -> Result<Vec<u8>> {
    let key = single_arg(function, args)?;
    if key.is_empty() {
        return Err(ContractError::Validation { position: 1 });
    }

    let bytes = StateStore::get(stub, key).await?;
    if bytes.is_empty() {
        return Err(ContractError::NotFound { key: key.to_string() });
    }
    Ok(bytes)
}

/// Range query over `[start_key, end_key)`.
pub async fn get_records_by_range<S: LedgerState>(
    stub: &S,
    function: &str,
    args: &[String],
) -> Result<Vec<u8>> {
    if args.len() != 2 {
        return Err(arity(function, 2, args.len()));
    }

    let records = QueryExecutor::range(stub, &args[0], &args[1]).await?;
    debug!(function, results = records.len(), "range query complete");
    encode(&records)
}

/// Selector query for a patient by subject id.
pub async fn query_patient_by_id<S: LedgerState>(
    stub: &S,
    function: &str,
    args: &[String],
) -> Result<Vec<u8>> {
    let subject_id = single_arg(function, args)?;
    let selector = Selector::new("patients").field("subjectId", subject_id);
    run_selector(stub, function, &selector).await
}

/// Selector query for note events by category.
pub async fn query_noteevent_by_category<S: LedgerState>(
    stub: &S,
    function: &str,
    args: &[String],
) -> Result<Vec<u8>> {
    let category = single_arg(function, args)?;
    let selector = Selector::new("noteevent").field("category", category);
    run_selector(stub, function, &selector).await
}

/// Ad-hoc selector query from a raw selector document.
pub async fn query_records<S: LedgerState>(
    stub: &S,
    function: &str,
    args: &[String],
) -> Result<Vec<u8>> {
    let raw = single_arg(function, args)?;
    if raw.is_empty() {
        return Err(ContractError::Validation { position: 1 });
    }

    let selector = Selector::from_document(raw)?;
    run_selector(stub, function, &selector).await
}

/// Full version history for a key, oldest first, delete markers included.
pub async fn get_history_for_key<S: LedgerState>(
    stub: &S,
    function: &str,
    args: &[String],
) -> Result<Vec<u8>> {
    let key = single_arg(function, args)?;
    let entries = HistoryReader::history_for(stub, key).await?;
    debug!(function, key, versions = entries.len(), "history query complete");
    encode(&entries)
}

/// Removes a record's primary key. The record must exist; its index entry
/// is left behind.
pub async fn delete_record<S: LedgerState>(
    stub: &S,
    function: &str,
    args: &[String],
) -> Result<()> {
    let key = single_arg(function, args)?;
    if key.is_empty() {
        return Err(ContractError::Validation { position: 1 });
    }

    let existing = StateStore::get(stub, key).await?;
    if existing.is_empty() {
        return Err(ContractError::NotFound { key: key.to_string() });
    }

    StateStore::delete(stub, key).await?;
    debug!(function, key, "deleted record");
    Ok(())
}

async fn run_selector<S: LedgerState>(
    stub: &S,
    function: &str,
    selector: &Selector,
) -> Result<Vec<u8>> {
    let records = QueryExecutor::selector(stub, selector).await?;
    debug!(
        function,
        doc_type = selector.doc_type,
        results = records.len(),
        "selector query complete"
    );
    encode(&records)
}

fn single_arg<'a>(function: &str, args: &'a [String]) -> Result<&'a str> {
    if args.len() != 1 {
        return Err(arity(function, 1, args.len()));
    }
    Ok(&args[0])
}

fn arity(function: &str, expected: usize, got: usize) -> ContractError {
    ContractError::Arity { function: function.to_string(), expected, got }
}

fn encode<T: Serialize>(results: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(results)
        .map_err(|e| ContractError::Serialization { message: e.to_string() })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use clinledger_state::MemoryLedger;
    use serde_json::Value;

    use crate::insert::insert_record;
    use crate::schema::schema_for;

    use super::*;

    async fn seeded_ledger() -> MemoryLedger {
        let ledger = MemoryLedger::new();
        let schema = schema_for("insertPatient").unwrap();
        let args: Vec<String> = ["234", "249", "F", "2075-03-13 00:00:00", "", "", "", "0"]
            .into_iter()
            .map(String::from)
            .collect();
        insert_record(&ledger, schema, &args).await.unwrap();
        ledger
    }

    #[tokio::test]
    async fn test_read_record_returns_stored_bytes() {
        let ledger = seeded_ledger().await;
        let bytes =
            read_record(&ledger, "readPatient", &["249".to_string()]).await.unwrap();
        let doc: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc["docType"], "patients");
        assert_eq!(doc["gender"], "F");
    }

    #[tokio::test]
    async fn test_read_record_not_found() {
        let ledger = seeded_ledger().await;
        let err = read_record(&ledger, "readPatient", &["999".to_string()])
            .await
            .expect_err("missing key");
        assert!(matches!(err, ContractError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_read_record_rejects_empty_key() {
        let ledger = seeded_ledger().await;
        let err = read_record(&ledger, "readPatient", &[String::new()])
            .await
            .expect_err("empty key");
        assert!(matches!(err, ContractError::Validation { position: 1 }));
    }

    #[tokio::test]
    async fn test_query_patient_by_id() {
        let ledger = seeded_ledger().await;
        let bytes = query_patient_by_id(&ledger, "queryPatientById", &["249".to_string()])
            .await
            .unwrap();
        let results: Value = serde_json::from_slice(&bytes).unwrap();
        let results = results.as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["Key"], "249");
        assert_eq!(results[0]["Record"]["subjectId"], "249");
    }

    #[tokio::test]
    async fn test_query_records_with_raw_selector() {
        let ledger = seeded_ledger().await;
        let raw = r#"{"selector": {"docType": "patients", "gender": "F"}}"#.to_string();
        let bytes = query_records(&ledger, "queryRecords", &[raw]).await.unwrap();
        let results: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(results.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_query_records_rejects_bad_selector() {
        let ledger = seeded_ledger().await;
        let err = query_records(&ledger, "queryRecords", &["nonsense".to_string()])
            .await
            .expect_err("bad selector");
        assert!(matches!(err, ContractError::Selector { .. }));
    }

    #[tokio::test]
    async fn test_delete_requires_existing_record() {
        let ledger = seeded_ledger().await;
        let err = delete_record(&ledger, "deleteRecord", &["999".to_string()])
            .await
            .expect_err("absent key");
        assert!(matches!(err, ContractError::NotFound { .. }));

        delete_record(&ledger, "deleteRecord", &["249".to_string()]).await.unwrap();
        assert!(ledger.get_state("249").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_leaves_index_entry_behind() {
        let ledger = seeded_ledger().await;
        delete_record(&ledger, "deleteRecord", &["249".to_string()]).await.unwrap();

        let index_key = clinledger_state::create_composite_key(
            "docType~subjectId",
            &["patients", "249"],
        )
        .unwrap();
        assert_eq!(ledger.get_state(&index_key).await.unwrap(), [0]);
    }

    #[tokio::test]
    async fn test_history_includes_delete_marker() {
        let ledger = seeded_ledger().await;
        delete_record(&ledger, "deleteRecord", &["249".to_string()]).await.unwrap();

        let bytes =
            get_history_for_key(&ledger, "getHistoryForPatient", &["249".to_string()])
                .await
                .unwrap();
        let entries: Value = serde_json::from_slice(&bytes).unwrap();
        let entries = entries.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["IsDelete"], false);
        assert_eq!(entries[1]["IsDelete"], true);
    }

    #[tokio::test]
    async fn test_range_query_wire_arity() {
        let ledger = seeded_ledger().await;
        let err = get_records_by_range(&ledger, "getRecordsByRange", &["a".to_string()])
            .await
            .expect_err("needs two args");
        assert!(matches!(err, ContractError::Arity { expected: 2, got: 1, .. }));
    }
}
