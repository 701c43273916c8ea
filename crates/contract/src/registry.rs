//! The invocation dispatch registry.
//!
//! Wire function names resolve through an explicit map built once at
//! startup: every schema row registers its insert handler, and the read
//! side registers the generic query forms plus the named patient and
//! note-event variants. A miss fails with
//! [`ContractError::UnknownFunction`]; the caller surfaces the display
//! message as the invocation's failure payload.
//!
//! The substrate handle is passed into every dispatch call. No handler
//! holds state between invocations.

use std::collections::HashMap;

use tracing::debug;

use clinledger_state::LedgerState;
use clinledger_types::{ContractError, Result};

use crate::insert::insert_record;
use crate::queries;
use crate::schema::{EntitySchema, SCHEMAS};

/// What a registered wire name routes to.
enum Handler {
    /// Schema-driven insert of one entity kind.
    Insert(&'static EntitySchema),
    /// Point lookup by primary key.
    Read,
    /// Range scan over `[start, end)`.
    Range,
    /// Patient selector by subject id.
    PatientById,
    /// Note-event selector by category.
    NoteeventByCategory,
    /// Ad-hoc selector from a raw selector document.
    RawSelector,
    /// Per-key version history.
    History,
    /// Primary-record delete.
    Delete,
}

/// Maps wire function names to typed handlers.
///
/// Built once and reused across invocations; dispatch itself holds no
/// mutable state.
pub struct Registry {
    handlers: HashMap<&'static str, Handler>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Builds the registry from the schema table and the fixed read-side
    /// handler set.
    #[must_use]
    pub fn new() -> Self {
        let mut handlers = HashMap::with_capacity(SCHEMAS.len() + 9);
        for schema in SCHEMAS {
            handlers.insert(schema.function, Handler::Insert(schema));
        }

        handlers.insert("readRecord", Handler::Read);
        handlers.insert("readPatient", Handler::Read);
        handlers.insert("getRecordsByRange", Handler::Range);
        handlers.insert("queryPatientById", Handler::PatientById);
        handlers.insert("queryNoteeventByCategory", Handler::NoteeventByCategory);
        handlers.insert("queryRecords", Handler::RawSelector);
        handlers.insert("getHistoryForKey", Handler::History);
        handlers.insert("getHistoryForPatient", Handler::History);
        handlers.insert("deleteRecord", Handler::Delete);

        Self { handlers }
    }

    /// Whether a handler is registered under this name.
    #[must_use]
    pub fn contains(&self, function: &str) -> bool {
        self.handlers.contains_key(function)
    }

    /// Routes one invocation to its handler.
    ///
    /// Returns the handler's payload bytes, or `None` for handlers that
    /// declare no payload (unflagged inserts, delete).
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::UnknownFunction`] on a dispatch miss, or
    /// whatever the routed handler fails with.
    pub async fn dispatch<S: LedgerState>(
        &self,
        stub: &S,
        function: &str,
        args: &[String],
    ) -> Result<Option<Vec<u8>>> {
        let Some(handler) = self.handlers.get(function) else {
            return Err(ContractError::UnknownFunction { name: function.to_string() });
        };
        debug!(function, args = args.len(), "dispatching invocation");

        match handler {
            Handler::Insert(schema) => insert_record(stub, schema, args).await,
            Handler::Read => queries::read_record(stub, function, args).await.map(Some),
            Handler::Range => {
                queries::get_records_by_range(stub, function, args).await.map(Some)
            }
            Handler::PatientById => {
                queries::query_patient_by_id(stub, function, args).await.map(Some)
            }
            Handler::NoteeventByCategory => {
                queries::query_noteevent_by_category(stub, function, args).await.map(Some)
            }
            Handler::RawSelector => queries::query_records(stub, function, args).await.map(Some),
            Handler::History => {
                queries::get_history_for_key(stub, function, args).await.map(Some)
            }
            Handler::Delete => queries::delete_record(stub, function, args).await.map(|()| None),
        }
    }
}
