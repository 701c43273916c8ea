//! Single-key state access.
//!
//! Thin choke point over the substrate's key-value namespace. It exists so
//! the missing-vs-empty contract is written down in exactly one place:
//! `get` of a missing key returns an empty value, so an empty result must be
//! read as "not found" by every caller that needs an existence check. This
//! is a documented limitation of the namespace, not something to correct
//! here.

use tracing::debug;

use clinledger_types::BackendError;

use crate::stub::LedgerState;

/// Single-key put/get/delete against the ledger namespace.
pub struct StateStore;

impl StateStore {
    /// Unconditionally writes `value` under `key` (overwrite-or-create).
    pub async fn put<S: LedgerState>(
        stub: &S,
        key: &str,
        value: &[u8],
    ) -> Result<(), BackendError> {
        debug!(key, bytes = value.len(), "put state");
        stub.put_state(key, value).await
    }

    /// Reads the value under `key`. Empty for a missing key; callers treat
    /// empty as not-found.
    pub async fn get<S: LedgerState>(stub: &S, key: &str) -> Result<Vec<u8>, BackendError> {
        stub.get_state(key).await
    }

    /// Removes `key`. Not an error if the key did not exist.
    pub async fn delete<S: LedgerState>(stub: &S, key: &str) -> Result<(), BackendError> {
        debug!(key, "delete state");
        stub.delete_state(key).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use crate::backend::MemoryLedger;

    use super::*;

    #[tokio::test]
    async fn test_missing_and_empty_are_indistinguishable() {
        let ledger = MemoryLedger::new();
        StateStore::put(&ledger, "empty", b"").await.unwrap();

        let missing = StateStore::get(&ledger, "missing").await.unwrap();
        let empty = StateStore::get(&ledger, "empty").await.unwrap();
        assert_eq!(missing, empty);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let ledger = MemoryLedger::new();
        StateStore::put(&ledger, "k", b"v1").await.unwrap();
        StateStore::put(&ledger, "k", b"v2").await.unwrap();
        assert_eq!(StateStore::get(&ledger, "k").await.unwrap(), b"v2");
    }
}
