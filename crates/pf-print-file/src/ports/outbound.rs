//! Outbound ports (SPI) for the print-file subsystem.
//!
//! Implemented by adapters in the runtime crate; tests substitute in-memory
//! fakes.

use async_trait::async_trait;
use shared_types::{AllocatedPair, BatchId, QuestionnaireType};
use std::path::Path;
use thiserror::Error;

/// Pair store failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The query failed.
    #[error("Store query failed: {0}")]
    Query(String),

    /// The store could not be reached or opened.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded.
    #[error("Corrupt pair record: {0}")]
    CorruptRecord(String),
}

/// A lazy, finite, non-restartable pair sequence.
///
/// Consumed exactly once by the file assembler; each element may surface a
/// store error mid-stream, which is fatal for the batch.
pub type PairStream = Box<dyn Iterator<Item = Result<AllocatedPair, StoreError>> + Send>;

/// Read-only view of the allocated-pair store.
///
/// Retry policy belongs to the store collaborator, not this pipeline:
/// errors propagate as fatal.
pub trait PairStore: Send + Sync {
    /// Fetch all pairs for (questionnaire type, batch) not yet bound to a
    /// real-world case.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query cannot be executed.
    fn fetch_unlinked(
        &self,
        questionnaire_type: &QuestionnaireType,
        batch_id: BatchId,
    ) -> Result<PairStream, StoreError>;
}

/// Delivery sink failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// Upload to the sink failed.
    #[error("Upload to {sink} failed: {reason}")]
    Upload {
        /// Sink name.
        sink: String,
        /// Failure description.
        reason: String,
    },
}

/// A "push named blob" delivery path.
///
/// Sinks do not participate in the correctness invariants: a failure is
/// reported and retried by operator action, and never invalidates an
/// already-validated, already-manifested artifact.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Human-readable sink name for logs and error reports.
    fn name(&self) -> &str;

    /// Push one named blob.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] on upload failure.
    async fn deliver(&self, file_name: &str, path: &Path) -> Result<(), SinkError>;
}
