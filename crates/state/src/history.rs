//! Per-key version-history replay.

use clinledger_types::{HistoryEntry, Result};

use crate::collect::ResultCollector;
use crate::stub::LedgerState;

/// Reads the full committed history of a key.
pub struct HistoryReader;

impl HistoryReader {
    /// Opens the platform's per-key history iterator (oldest committed
    /// version first) and drains it in history mode. Every committed
    /// version is returned, delete markers included; nothing is filtered
    /// or deduplicated.
    ///
    /// # Errors
    ///
    /// Returns the substrate error if the iterator cannot be opened.
    pub async fn history_for<S: LedgerState>(stub: &S, key: &str) -> Result<Vec<HistoryEntry>> {
        let iter = stub.get_history_for_key(key).await?;
        Ok(ResultCollector::collect_history(iter).await)
    }
}
