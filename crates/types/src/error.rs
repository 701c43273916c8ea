//! Error types for ClinLedger using snafu.
//!
//! [`ContractError`] covers every way an invocation can fail; its display
//! strings are returned verbatim as the invocation's failure payload.
//! [`BackendError`] is the boundary type for the external ledger substrate.
//! Any error aborts the whole invocation — atomicity of the writes issued so
//! far is guaranteed by the substrate, not by this code.

use snafu::Snafu;

/// Unified result type for contract operations.
pub type Result<T, E = ContractError> = std::result::Result<T, E>;

/// Top-level error type for contract invocations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ContractError {
    /// Argument count does not match the entity schema.
    #[snafu(display(
        "incorrect number of arguments for {function}: expected {expected}, got {got}"
    ))]
    Arity {
        /// Wire name of the invoked function.
        function: String,
        /// Arity declared by the schema.
        expected: usize,
        /// Arguments actually supplied.
        got: usize,
    },

    /// A positionally-required argument is empty. The position is 1-based
    /// and names the first offending argument.
    #[snafu(display("argument {position} must be a non-empty string"))]
    Validation {
        /// 1-based argument position.
        position: usize,
    },

    /// The primary key is already occupied. Raised only by entity kinds
    /// whose schema performs the existence check, before any write.
    #[snafu(display("record already exists: {key}"))]
    DuplicateKey {
        /// The occupied primary key.
        key: String,
    },

    /// Point lookup on an absent key.
    #[snafu(display("record does not exist: {key}"))]
    NotFound {
        /// The missing key.
        key: String,
    },

    /// A composite-key encoding violation: a part collides with the
    /// reserved delimiter (ambiguous encoding, callers must reject or
    /// escape such input), or a key being split lacks the composite prefix.
    #[snafu(display("invalid composite key encoding: {part:?}"))]
    Encoding {
        /// The offending index name, component, or key.
        part: String,
    },

    /// Dispatch miss: no handler is registered under this name.
    #[snafu(display("unknown function: {name}"))]
    UnknownFunction {
        /// The unrecognized function name.
        name: String,
    },

    /// A raw selector document could not be translated into a query.
    #[snafu(display("invalid selector document: {message}"))]
    Selector {
        /// What was wrong with the document.
        message: String,
    },

    /// A record or result set could not be encoded for the wire.
    #[snafu(display("serialization failed: {message}"))]
    Serialization {
        /// Error description from the codec.
        message: String,
    },

    /// A substrate operation outside iterator draining failed. Iterator
    /// failures during draining are swallowed as end-of-stream instead.
    #[snafu(context(false), display("{source}"))]
    Backend {
        /// The underlying substrate error.
        source: BackendError,
    },
}

/// Errors surfaced by the external ledger substrate.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum BackendError {
    /// A single-key state operation failed.
    #[snafu(display("state operation failed: {message}"))]
    Operation {
        /// Error description from the substrate.
        message: String,
    },

    /// An iterator open or advance call failed.
    #[snafu(display("cursor operation failed: {message}"))]
    Cursor {
        /// Error description from the substrate.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_payload_shaped() {
        let err = ContractError::Arity {
            function: "insertPatient".to_string(),
            expected: 8,
            got: 7,
        };
        assert_eq!(
            err.to_string(),
            "incorrect number of arguments for insertPatient: expected 8, got 7"
        );

        let err = ContractError::Validation { position: 2 };
        assert_eq!(err.to_string(), "argument 2 must be a non-empty string");

        let err = ContractError::DuplicateKey { key: "100001".to_string() };
        assert_eq!(err.to_string(), "record already exists: 100001");

        let err = ContractError::NotFound { key: "100001".to_string() };
        assert_eq!(err.to_string(), "record does not exist: 100001");
    }

    #[test]
    fn test_backend_error_converts() {
        fn fails() -> Result<()> {
            Err(BackendError::Operation { message: "disk full".to_string() })?;
            Ok(())
        }
        let err = fails().expect_err("should convert");
        assert!(matches!(err, ContractError::Backend { .. }));
        assert_eq!(err.to_string(), "state operation failed: disk full");
    }
}
