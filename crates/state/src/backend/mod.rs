//! Substrate implementations for testing and local runs.
//!
//! The real ledger substrate is external; these backends implement the same
//! contract so the store layer can be exercised without it:
//! - [`MemoryLedger`] — `BTreeMap` state with a per-key version log
//! - [`FileLedger`] — redb-backed state with a durable history table
//!
//! Both serve iterator results from a snapshot taken at open time, so a
//! drain never observes writes issued after the cursor was opened.

mod file;
mod memory;

pub use file::FileLedger;
pub use memory::MemoryLedger;

use clinledger_types::BackendError;

use crate::stub::StateIterator;

/// An iterator over results snapshotted when the cursor was opened.
///
/// `next` after `close` fails, which callers must treat as end-of-stream
/// per the drain contract.
pub struct SnapshotIter<T> {
    items: std::vec::IntoIter<T>,
    closed: bool,
}

impl<T> SnapshotIter<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Self { items: items.into_iter(), closed: false }
    }
}

impl<T: Send> StateIterator for SnapshotIter<T> {
    type Item = T;

    async fn next(&mut self) -> Result<Option<T>, BackendError> {
        if self.closed {
            return Err(BackendError::Cursor { message: "cursor is closed".to_string() });
        }
        Ok(self.items.next())
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_iter_drains_in_order() {
        let mut iter = SnapshotIter::new(vec![1, 2, 3]);
        assert_eq!(iter.next().await.unwrap(), Some(1));
        assert_eq!(iter.next().await.unwrap(), Some(2));
        assert_eq!(iter.next().await.unwrap(), Some(3));
        assert_eq!(iter.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_next_after_close_fails() {
        let mut iter = SnapshotIter::new(vec![1]);
        iter.close().await;
        assert!(iter.next().await.is_err());
    }
}
