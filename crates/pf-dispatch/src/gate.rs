//! # Completion Gate
//!
//! Blocks the caller until the allocator has confirmed the entire batch, or
//! declares the batch failed.
//!
//! The gate owns an exclusive, batch-scoped subscription for its lifetime.
//! Dropping the subscription tears down the feed on success, timeout and
//! panic paths alike, so no server-side queue state leaks.

use crate::errors::DispatchError;
use shared_bus::{AllocationEvent, Subscription};
use shared_types::BatchId;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of a released gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateStats {
    /// Confirmations counted (equals the expected total on release).
    pub confirmations: u32,
}

/// The batch completion rendezvous.
///
/// One confirmation is expected per requested unit; the gate assumes the
/// allocator emits exactly one confirmation per unit. A duplicated
/// confirmation would release the gate early, a documented correctness
/// dependency on the allocator.
pub struct CompletionGate {
    deadline: Duration,
}

impl CompletionGate {
    /// Create a gate with the given deadline.
    #[must_use]
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    /// Wait until `expected` confirmations scoped to `batch_id` have been
    /// received and acknowledged, or the deadline elapses.
    ///
    /// Confirmations for other batches are acknowledged and discarded, not
    /// counted: without batch scoping, concurrent unrelated batches would
    /// be indistinguishable.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::GateTimeout`] when the deadline elapses first;
    ///   the caller treats the batch as failed and generates no files.
    /// - [`DispatchError::FeedClosed`] if the bus drops before release.
    pub async fn await_completion(
        &self,
        mut subscription: Subscription,
        batch_id: BatchId,
        expected: u32,
    ) -> Result<GateStats, DispatchError> {
        info!(
            batch_id = %batch_id,
            expected,
            deadline_secs = self.deadline.as_secs(),
            "Awaiting batch completion"
        );

        let mut received = 0u32;

        let outcome = tokio::time::timeout(self.deadline, async {
            while received < expected {
                let Some(delivery) = subscription.recv().await else {
                    return Err(DispatchError::FeedClosed);
                };

                // Exactly one count per confirmation: acknowledged tags
                // cannot be counted twice.
                if !subscription.ack(&delivery) {
                    continue;
                }

                match &delivery.event {
                    AllocationEvent::PairCreated {
                        batch_id: event_batch,
                        ..
                    } if *event_batch == batch_id => {
                        received += 1;
                        debug!(batch_id = %batch_id, received, expected, "Confirmation counted");
                    }
                    _ => {
                        debug!(batch_id = %batch_id, "Ignoring confirmation for another batch");
                    }
                }
            }
            Ok(())
        })
        .await;

        // Subscription drops here on every path, tearing down the feed.
        match outcome {
            Ok(Ok(())) => {
                info!(batch_id = %batch_id, confirmations = received, "Batch complete");
                Ok(GateStats {
                    confirmations: received,
                })
            }
            Ok(Err(e)) => Err(e),
            Err(_elapsed) => {
                warn!(
                    batch_id = %batch_id,
                    expected,
                    received,
                    "Batch timed out awaiting confirmations"
                );
                Err(DispatchError::GateTimeout { expected, received })
            }
        }
    }
}
