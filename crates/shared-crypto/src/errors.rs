//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Sealing failed or the sealed artifact failed verification.
    ///
    /// An artifact that does not verify as encrypted must never be
    /// delivered; the caller aborts the line item.
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// The envelope carries no key slot for the presented key pair.
    #[error("No key slot matches the presented recipient key")]
    NoMatchingRecipient,

    /// The envelope bytes are not a valid sealed envelope.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Key material could not be parsed.
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    /// A key file could not be read.
    #[error("Cannot read key file {path}: {reason}")]
    KeyFileUnreadable {
        /// Path of the offending key file.
        path: String,
        /// Underlying I/O failure.
        reason: String,
    },
}
