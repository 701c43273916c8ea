//! Shared domain types for ClinLedger.
//!
//! This crate provides:
//! - The contract error taxonomy ([`ContractError`]) whose display strings
//!   become invocation failure payloads
//! - The substrate boundary error ([`BackendError`])
//! - The stored-document value model ([`Payload`]) with typed
//!   parse-or-fallback decoding
//! - Query and history result records and the selector type

mod document;
mod error;

pub use document::{HistoryEntry, KeyVersion, KvPair, Payload, QueryRecord, Selector};
pub use error::{BackendError, ContractError, Result};
