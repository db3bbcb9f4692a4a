//! Print-file pipeline error types.

use crate::ports::outbound::StoreError;
use shared_crypto::CryptoError;
use thiserror::Error;

/// Errors from print-file generation.
///
/// Everything except delivery failures aborts the enclosing batch: there is
/// no partial-success state, and a partial or incorrect file must never be
/// delivered downstream.
#[derive(Debug, Error)]
pub enum PrintFileError {
    /// Fetched pair count differs from the configured quantity.
    #[error(
        "Print row count mismatch: expected = {expected}, found = {found}, \
         questionnaire type = {questionnaire_type}"
    )]
    QuantityMismatch {
        /// Quantity the configuration demanded.
        expected: u32,
        /// Rows actually assembled.
        found: u32,
        /// Questionnaire type of the offending line item.
        questionnaire_type: String,
    },

    /// The pack code has no catalog entry.
    #[error("Unknown pack code: {0}")]
    UnknownPackCode(String),

    /// The supplier has no column template.
    #[error("Unknown supplier: {0}")]
    UnknownSupplier(String),

    /// Sealing failed; an unencrypted fallback is never delivered.
    #[error(transparent)]
    Encryption(#[from] CryptoError),

    /// The pair store failed; propagated immediately, never swallowed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Artifact or manifest I/O failed.
    #[error("I/O failure on {path}: {source}")]
    Io {
        /// Path of the file being written or read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
