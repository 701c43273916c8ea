//! Secondary-index writes for the flat ledger namespace.
//!
//! An index entry is a composite key mapped to a one-byte sentinel; only the
//! key's existence carries information. Entries are written alongside their
//! owning record in the same invocation, so the substrate commits both
//! atomically. There is no removal path: neither update nor delete touches
//! index entries, so a deleted record leaves its entry behind. That gap is
//! part of the current design, not something this module works around.

use tracing::debug;

use clinledger_types::Result;

use crate::keys::create_composite_key;
use crate::state::StateStore;
use crate::stub::LedgerState;

/// Sentinel payload stored at every index key. Passing an empty value would
/// delete the key on some platforms, so a single null byte is stored
/// instead.
pub const INDEX_SENTINEL: [u8; 1] = [0];

/// Derives and writes secondary-index entries for a primary record write.
pub struct IndexManager;

impl IndexManager {
    /// Builds the composite key for `index_name` over `components` and
    /// writes the sentinel under it. Returns the index key.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Encoding`](clinledger_types::ContractError)
    /// if a component collides with the reserved delimiter, or the
    /// substrate error if the write fails.
    pub async fn write_index<S: LedgerState>(
        stub: &S,
        index_name: &str,
        components: &[&str],
        owner_key: &str,
    ) -> Result<String> {
        let index_key = create_composite_key(index_name, components)?;
        StateStore::put(stub, &index_key, &INDEX_SENTINEL).await?;
        debug!(index = index_name, owner = owner_key, "wrote index entry");
        Ok(index_key)
    }
}
