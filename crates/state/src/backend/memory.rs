//! In-memory substrate for unit and integration tests.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use clinledger_types::{BackendError, KeyVersion, KvPair, Selector};

use crate::stub::LedgerState;

use super::SnapshotIter;

#[derive(Default)]
struct MemoryState {
    /// Flat state namespace, lexically ordered.
    state: BTreeMap<String, Vec<u8>>,
    /// Per-key committed versions, oldest first.
    history: HashMap<String, Vec<KeyVersion>>,
}

impl MemoryState {
    fn record_version(&mut self, key: &str, is_delete: bool, value: &[u8]) {
        self.history.entry(key.to_string()).or_default().push(KeyVersion {
            tx_id: Uuid::new_v4().simple().to_string(),
            timestamp: Utc::now(),
            is_delete,
            value: value.to_vec(),
        });
    }
}

/// In-memory ledger substrate.
///
/// State lives in a `BTreeMap` so range scans come out in ascending lexical
/// order; every write appends to a per-key version log so history replay
/// behaves like the platform's.
#[derive(Default)]
pub struct MemoryLedger {
    inner: RwLock<MemoryState>,
}

impl MemoryLedger {
    /// Creates an empty substrate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently present, index entries included.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.inner.read().state.len()
    }
}

impl LedgerState for MemoryLedger {
    type KvIter = SnapshotIter<KvPair>;
    type HistoryIter = SnapshotIter<KeyVersion>;

    async fn put_state(&self, key: &str, value: &[u8]) -> Result<(), BackendError> {
        let mut inner = self.inner.write();
        inner.state.insert(key.to_string(), value.to_vec());
        inner.record_version(key, false, value);
        Ok(())
    }

    async fn get_state(&self, key: &str) -> Result<Vec<u8>, BackendError> {
        Ok(self.inner.read().state.get(key).cloned().unwrap_or_default())
    }

    async fn delete_state(&self, key: &str) -> Result<(), BackendError> {
        let mut inner = self.inner.write();
        inner.state.remove(key);
        inner.record_version(key, true, &[]);
        Ok(())
    }

    async fn get_state_by_range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> Result<Self::KvIter, BackendError> {
        if !end_key.is_empty() && start_key > end_key {
            return Err(BackendError::Cursor {
                message: format!("invalid range: {start_key:?} > {end_key:?}"),
            });
        }

        let upper = if end_key.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end_key.to_string())
        };
        let items = self
            .inner
            .read()
            .state
            .range((Bound::Included(start_key.to_string()), upper))
            .map(|(key, value)| KvPair { key: key.clone(), value: value.clone() })
            .collect();
        Ok(SnapshotIter::new(items))
    }

    async fn get_query_result(
        &self,
        selector: &Selector,
    ) -> Result<Self::KvIter, BackendError> {
        let items = self
            .inner
            .read()
            .state
            .iter()
            .filter(|(_, value)| {
                serde_json::from_slice::<serde_json::Value>(value)
                    .is_ok_and(|doc| selector.matches(&doc))
            })
            .map(|(key, value)| KvPair { key: key.clone(), value: value.clone() })
            .collect();
        Ok(SnapshotIter::new(items))
    }

    async fn get_history_for_key(
        &self,
        key: &str,
    ) -> Result<Self::HistoryIter, BackendError> {
        let items = self.inner.read().history.get(key).cloned().unwrap_or_default();
        Ok(SnapshotIter::new(items))
    }
}
