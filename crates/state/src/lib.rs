//! Generic transactional document-store layer for ClinLedger.
//!
//! This crate sits between the entity handlers (`clinledger-contract`) and
//! the external ledger substrate, providing:
//!
//! - Composite-key encoding with a reserved delimiter (`keys`)
//! - The substrate trait and iterator contract (`stub`)
//! - Single-key state access (`state`) and secondary-index writes (`indexes`)
//! - Range and selector query construction (`query`)
//! - The shared iterator drain (`collect`) and per-key history replay
//!   (`history`)
//! - In-memory and redb-backed substrate implementations (`backend`)

mod backend;
mod collect;
mod history;
mod indexes;
mod keys;
mod query;
mod state;
mod stub;

pub use backend::{FileLedger, MemoryLedger, SnapshotIter};
pub use collect::ResultCollector;
pub use history::HistoryReader;
pub use indexes::{INDEX_SENTINEL, IndexManager};
pub use keys::{COMPOSITE_KEY_DELIMITER, create_composite_key, split_composite_key};
pub use query::QueryExecutor;
pub use state::StateStore;
pub use stub::{LedgerState, StateIterator};
