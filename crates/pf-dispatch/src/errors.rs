//! Dispatch and completion-gate error types.

use shared_bus::TransportError;
use thiserror::Error;

/// Errors from allocation dispatch and the completion gate.
///
/// All of these are fatal for the enclosing batch: no print files are
/// generated, and the caller must re-run with a fresh batch id.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The allocator failed to confirm the full batch within the deadline.
    #[error("Batch completion timed out: expected {expected} confirmations, received {received}")]
    GateTimeout {
        /// Total confirmations required to release the gate.
        expected: u32,
        /// Confirmations received before the deadline elapsed.
        received: u32,
    },

    /// The transport rejected a publish; the batch is partially dispatched.
    #[error("Allocation request publish failed: {0}")]
    Transport(#[from] TransportError),

    /// The confirmation feed closed before the batch completed.
    #[error("Confirmation feed closed before batch completed")]
    FeedClosed,
}
