//! # Error Types
//!
//! Errors raised while constructing or parsing shared entities.

use thiserror::Error;

/// Errors from entity validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityError {
    /// Batch id is not a UUID.
    #[error("Invalid batch id: {0}")]
    InvalidBatchId(String),

    /// Questionnaire type is not a two-digit code.
    #[error("Invalid questionnaire type: {0:?} (expected two ASCII digits)")]
    InvalidQuestionnaireType(String),

    /// A line item requested zero pairs.
    #[error("Zero quantity for pack code {pack_code}")]
    ZeroQuantity { pack_code: String },
}

/// Errors from batch configuration parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration had no rows.
    #[error("Batch configuration is empty")]
    Empty,

    /// The header row did not match the expected columns.
    #[error("Malformed header: expected {expected:?}, got {found:?}")]
    MalformedHeader { expected: String, found: String },

    /// A data row did not have exactly three columns.
    #[error("Malformed row at line {line}: {content:?}")]
    MalformedRow { line: usize, content: String },

    /// The quantity column was not a positive integer.
    #[error("Invalid quantity at line {line}: {value:?}")]
    InvalidQuantity { line: usize, value: String },

    /// A column failed entity validation.
    #[error("Invalid value at line {line}: {source}")]
    InvalidValue {
        line: usize,
        #[source]
        source: EntityError,
    },
}
