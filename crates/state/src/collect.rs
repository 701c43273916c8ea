//! The shared iterator drain.
//!
//! Range, selector, and history queries all materialize their results
//! through this one algorithm. Two deliberate behaviors are load-bearing:
//!
//! - A failing `next()` call is treated as end-of-stream, not as an error:
//!   the drain stops and returns whatever was collected so far. This is a
//!   preserved design choice of the source system.
//! - The iterator is closed on every exit path, releasing the platform-side
//!   cursor whether the drain completed, stopped early, or hit a failure.
//!
//! Output order follows iterator emission order; nothing is re-sorted.

use tracing::debug;

use clinledger_types::{HistoryEntry, KeyVersion, KvPair, Payload, QueryRecord};

use crate::stub::StateIterator;

/// Drains a query or history iterator into an ordered in-memory list.
pub struct ResultCollector;

impl ResultCollector {
    /// Drains a range or selector iterator into `{key, record}` results,
    /// decoding each payload with parse-or-fallback. Results with empty
    /// payloads are skipped.
    pub async fn collect_records<I>(iter: I) -> Vec<QueryRecord>
    where
        I: StateIterator<Item = KvPair>,
    {
        Self::drain(iter, |pair: KvPair| {
            if pair.value.is_empty() {
                return None;
            }
            let record = Payload::decode(&pair.value);
            Some(QueryRecord { key: pair.key, record })
        })
        .await
    }

    /// Drains a history iterator into wrapped version entries.
    ///
    /// Every committed version is kept, including delete markers whose
    /// snapshot is empty; history reports the full life of a key.
    pub async fn collect_history<I>(iter: I) -> Vec<HistoryEntry>
    where
        I: StateIterator<Item = KeyVersion>,
    {
        Self::drain(iter, |version: KeyVersion| {
            Some(HistoryEntry {
                tx_id: version.tx_id,
                timestamp: version.timestamp,
                is_delete: version.is_delete,
                value: Payload::decode(&version.value),
            })
        })
        .await
    }

    async fn drain<I, T, F>(mut iter: I, mut wrap: F) -> Vec<T>
    where
        I: StateIterator,
        F: FnMut(I::Item) -> Option<T>,
    {
        let mut results = Vec::new();
        loop {
            match iter.next().await {
                Ok(Some(item)) => {
                    if let Some(wrapped) = wrap(item) {
                        results.push(wrapped);
                    }
                }
                Ok(None) => break,
                Err(error) => {
                    // End-of-stream signal, not a propagated error.
                    debug!(%error, collected = results.len(), "iterator failed mid-drain");
                    break;
                }
            }
        }
        iter.close().await;
        results
    }
}
