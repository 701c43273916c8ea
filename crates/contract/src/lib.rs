//! Entity schemas, insert/query handlers, and dispatch for ClinLedger.
//!
//! The ~26 per-entity insert handlers differ only in schema data, so they
//! collapse into one table ([`SCHEMAS`]) and one insert path
//! ([`insert_record`]). The read side provides point lookup, range and
//! selector queries, per-key history, and delete. [`Registry`] maps wire
//! function names onto all of it behind a single `dispatch` call.

mod insert;
mod queries;
mod registry;
mod schema;

pub use insert::insert_record;
pub use queries::{
    delete_record, get_history_for_key, get_records_by_range, query_noteevent_by_category,
    query_patient_by_id, query_records, read_record,
};
pub use registry::Registry;
pub use schema::{Coercion, EntitySchema, FieldSpec, IndexSpec, SCHEMAS, schema_for};
