//! The external ledger substrate boundary.
//!
//! The transaction-ordering, consensus, and replication substrate is an
//! external collaborator: it provides atomic commit of every write issued by
//! one invocation, optimistic-concurrency conflict detection, and durable
//! replication. This module expresses that collaborator as a trait so the
//! store layer stays independent of any concrete platform.
//!
//! Every operation is asynchronous and suspends the invocation's single
//! logical thread of control until the substrate responds; operations within
//! one invocation execute strictly in issue order. A commit abort after
//! conflict validation is the caller's problem — there is no retry logic
//! here.

use clinledger_types::{BackendError, KeyVersion, KvPair, Selector};

/// An opaque streaming iterator over query or history results.
///
/// Iterators hold a platform-side cursor. Every code path that opens one
/// must call [`StateIterator::close`] before returning — on normal
/// completion, early return, and drain failure alike.
#[allow(async_fn_in_trait)]
pub trait StateIterator: Send {
    /// The result type this iterator emits.
    type Item;

    /// Advances the cursor, returning `None` once exhausted.
    async fn next(&mut self) -> Result<Option<Self::Item>, BackendError>;

    /// Releases the platform-side cursor.
    async fn close(&mut self);
}

/// Key-value access to the ledger's flat state namespace.
///
/// Primary records and secondary-index entries share this one key space.
/// `get_state` of a missing key returns an empty value, which makes
/// "missing" and "present-but-empty" indistinguishable; callers needing an
/// existence check must treat an empty result as not-found.
#[allow(async_fn_in_trait)]
pub trait LedgerState: Send + Sync {
    /// Iterator type for range and selector queries.
    type KvIter: StateIterator<Item = KvPair>;
    /// Iterator type for per-key version history.
    type HistoryIter: StateIterator<Item = KeyVersion>;

    /// Unconditionally writes `value` under `key` (overwrite-or-create).
    async fn put_state(&self, key: &str, value: &[u8]) -> Result<(), BackendError>;

    /// Reads the value under `key`; empty for a missing key.
    async fn get_state(&self, key: &str) -> Result<Vec<u8>, BackendError>;

    /// Removes `key`. Not an error if the key did not exist.
    async fn delete_state(&self, key: &str) -> Result<(), BackendError>;

    /// Opens an iterator over `[start_key, end_key)` in ascending lexical
    /// order. An empty `start_key` scans from the beginning of the
    /// namespace; an empty `end_key` scans to its end.
    async fn get_state_by_range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> Result<Self::KvIter, BackendError>;

    /// Opens an iterator over records matching the substrate's native
    /// translation of the given equality selector.
    async fn get_query_result(&self, selector: &Selector)
    -> Result<Self::KvIter, BackendError>;

    /// Opens the per-key version-history iterator, oldest committed version
    /// first, delete markers included.
    async fn get_history_for_key(&self, key: &str) -> Result<Self::HistoryIter, BackendError>;
}
