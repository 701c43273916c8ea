//! redb-backed substrate with a durable history table.
//!
//! State lives in one table keyed by the plain string key. Every write also
//! appends a postcard-encoded version row to the history table, keyed by
//! `{key}{seq:8BE}` so a bounded range scan returns a key's versions oldest
//! first. A sequences table holds the monotonic transaction counter.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use clinledger_types::{BackendError, KeyVersion, KvPair, Selector};

use crate::stub::LedgerState;

use super::SnapshotIter;

/// Flat state namespace: key → stored bytes.
const STATE: TableDefinition<&str, &[u8]> = TableDefinition::new("state");

/// Version history: {key bytes}{seq:8BE} → postcard [`VersionRow`].
const HISTORY: TableDefinition<&[u8], &[u8]> = TableDefinition::new("history");

/// Monotonic counters. Keys: "txn".
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

const TXN_SEQUENCE: &str = "txn";

/// One committed version as stored on disk.
#[derive(Debug, Serialize, Deserialize)]
struct VersionRow {
    tx_id: String,
    timestamp_ms: i64,
    is_delete: bool,
    value: Vec<u8>,
}

/// File-backed ledger substrate.
pub struct FileLedger {
    db: Database,
}

impl FileLedger {
    /// Opens or creates a database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Operation`] if the database cannot be opened
    /// or its tables cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let db = Database::create(path).map_err(op_err)?;

        // Ensure tables exist so read transactions can open them.
        let txn = db.begin_write().map_err(op_err)?;
        {
            let _ = txn.open_table(STATE).map_err(op_err)?;
            let _ = txn.open_table(HISTORY).map_err(op_err)?;
            let _ = txn.open_table(SEQUENCES).map_err(op_err)?;
        }
        txn.commit().map_err(op_err)?;

        Ok(Self { db })
    }

    fn record_version(
        txn: &redb::WriteTransaction,
        key: &str,
        is_delete: bool,
        value: &[u8],
    ) -> Result<(), BackendError> {
        let seq = {
            let mut sequences = txn.open_table(SEQUENCES).map_err(op_err)?;
            let current =
                sequences.get(TXN_SEQUENCE).map_err(op_err)?.map(|g| g.value()).unwrap_or(0);
            let next = current + 1;
            sequences.insert(TXN_SEQUENCE, next).map_err(op_err)?;
            next
        };

        let row = VersionRow {
            tx_id: format!("{seq:016x}"),
            timestamp_ms: Utc::now().timestamp_millis(),
            is_delete,
            value: value.to_vec(),
        };
        let encoded = postcard::to_allocvec(&row).map_err(op_err)?;

        let mut history = txn.open_table(HISTORY).map_err(op_err)?;
        history
            .insert(history_key(key, seq).as_slice(), encoded.as_slice())
            .map_err(op_err)?;
        Ok(())
    }
}

impl LedgerState for FileLedger {
    type KvIter = SnapshotIter<KvPair>;
    type HistoryIter = SnapshotIter<KeyVersion>;

    async fn put_state(&self, key: &str, value: &[u8]) -> Result<(), BackendError> {
        let txn = self.db.begin_write().map_err(op_err)?;
        {
            let mut state = txn.open_table(STATE).map_err(op_err)?;
            state.insert(key, value).map_err(op_err)?;
        }
        Self::record_version(&txn, key, false, value)?;
        txn.commit().map_err(op_err)?;
        Ok(())
    }

    async fn get_state(&self, key: &str) -> Result<Vec<u8>, BackendError> {
        let txn = self.db.begin_read().map_err(op_err)?;
        let state = txn.open_table(STATE).map_err(op_err)?;
        Ok(state.get(key).map_err(op_err)?.map(|g| g.value().to_vec()).unwrap_or_default())
    }

    async fn delete_state(&self, key: &str) -> Result<(), BackendError> {
        let txn = self.db.begin_write().map_err(op_err)?;
        {
            let mut state = txn.open_table(STATE).map_err(op_err)?;
            state.remove(key).map_err(op_err)?;
        }
        Self::record_version(&txn, key, true, &[])?;
        txn.commit().map_err(op_err)?;
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

        let txn = self.db.begin_read().map_err(op_err)?;
        let state = txn.open_table(STATE).map_err(op_err)?;

        let range = if end_key.is_empty() {
            state.range(start_key..).map_err(op_err)?
        } else {
            state.range(start_key..end_key).map_err(op_err)?
        };

        let mut items = Vec::new();
        for result in range {
            let (key, value) = result.map_err(op_err)?;
            items.push(KvPair { key: key.value().to_string(), value: value.value().to_vec() });
        }
        Ok(SnapshotIter::new(items))
    }

    async fn get_query_result(
        &self,
        selector: &Selector,
    ) -> Result<Self::KvIter, BackendError> {
        let txn = self.db.begin_read().map_err(op_err)?;
        let state = txn.open_table(STATE).map_err(op_err)?;

        let mut items = Vec::new();
        for result in state.iter().map_err(op_err)? {
            let (key, value) = result.map_err(op_err)?;
            let bytes = value.value();
            let matched = serde_json::from_slice::<serde_json::Value>(bytes)
                .is_ok_and(|doc| selector.matches(&doc));
            if matched {
                items.push(KvPair { key: key.value().to_string(), value: bytes.to_vec() });
            }
        }
        Ok(SnapshotIter::new(items))
    }

    async fn get_history_for_key(
        &self,
        key: &str,
    ) -> Result<Self::HistoryIter, BackendError> {
        let txn = self.db.begin_read().map_err(op_err)?;
        let history = txn.open_table(HISTORY).map_err(op_err)?;

        let lower = history_key(key, 0);
        let upper = history_key(key, u64::MAX);
        let expected_len = key.len() + 8;

        let mut items = Vec::new();
        for result in history.range(lower.as_slice()..=upper.as_slice()).map_err(op_err)? {
            let (row_key, row_value) = result.map_err(op_err)?;
            let row_key = row_key.value();
            // Keys sharing a prefix interleave in this range; exact matches
            // carry the key bytes plus the 8-byte sequence, nothing else.
            if row_key.len() != expected_len || !row_key.starts_with(key.as_bytes()) {
                continue;
            }

            let row: VersionRow = postcard::from_bytes(row_value.value()).map_err(op_err)?;
            items.push(KeyVersion {
                tx_id: row.tx_id,
                timestamp: DateTime::from_timestamp_millis(row.timestamp_ms)
                    .unwrap_or_default(),
                is_delete: row.is_delete,
                value: row.value,
            });
        }
        Ok(SnapshotIter::new(items))
    }
}

fn history_key(key: &str, seq: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(key.len() + 8);
    buf.extend_from_slice(key.as_bytes());
    buf.extend_from_slice(&seq.to_be_bytes());
    buf
}

fn op_err(err: impl std::fmt::Display) -> BackendError {
    BackendError::Operation { message: err.to_string() }
}
