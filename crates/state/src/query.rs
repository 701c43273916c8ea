//! Range and selector query construction.
//!
//! Both modes open a substrate iterator and hand it straight to
//! [`ResultCollector`]; nothing materializes until the drain runs.

use clinledger_types::{QueryRecord, Result, Selector};

use crate::collect::ResultCollector;
use crate::stub::LedgerState;

/// Builds range scans and selector queries over the ledger namespace.
pub struct QueryExecutor;

impl QueryExecutor {
    /// Scans `[start_key, end_key)` in ascending lexical order and drains
    /// the results. An empty `end_key` scans to the end of the namespace.
    ///
    /// # Errors
    ///
    /// Returns the substrate error if the iterator cannot be opened.
    /// Failures while draining are end-of-stream, not errors.
    pub async fn range<S: LedgerState>(
        stub: &S,
        start_key: &str,
        end_key: &str,
    ) -> Result<Vec<QueryRecord>> {
        let iter = stub.get_state_by_range(start_key, end_key).await?;
        Ok(ResultCollector::collect_records(iter).await)
    }

    /// Runs a declarative equality filter through the substrate's native
    /// query mechanism and drains the results.
    ///
    /// # Errors
    ///
    /// Returns the substrate error if the query cannot be opened.
    pub async fn selector<S: LedgerState>(
        stub: &S,
        selector: &Selector,
    ) -> Result<Vec<QueryRecord>> {
        let iter = stub.get_query_result(selector).await?;
        Ok(ResultCollector::collect_records(iter).await)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use crate::backend::MemoryLedger;
    use crate::stub::LedgerState as _;

    use super::*;

    #[tokio::test]
    async fn test_range_query_is_end_exclusive_and_ordered() {
        let ledger = MemoryLedger::new();
        for key in ["100", "200", "300"] {
            let doc = format!(r#"{{"docType":"service","rowId":"{key}"}}"#);
            ledger.put_state(key, doc.as_bytes()).await.unwrap();
        }

        let records = QueryExecutor::range(&ledger, "100", "300").await.unwrap();
        let keys: Vec<_> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["100", "200"]);
    }

    #[tokio::test]
    async fn test_selector_query_filters_by_doc_type() {
        let ledger = MemoryLedger::new();
        ledger
            .put_state("1", br#"{"docType":"admission","hadmId":"1"}"#)
            .await
            .unwrap();
        ledger
            .put_state("2", br#"{"docType":"patients","subjectId":"2"}"#)
            .await
            .unwrap();

        let records =
            QueryExecutor::selector(&ledger, &Selector::new("admission")).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "1");
    }
}
