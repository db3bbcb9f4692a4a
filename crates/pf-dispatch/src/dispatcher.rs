//! # Request Dispatcher
//!
//! Publishes one allocation-request message per required UAC/QID pair.

use crate::errors::DispatchError;
use shared_bus::{AllocationEvent, MessagePublisher};
use shared_types::{BatchId, BatchLineItem};
use std::sync::Arc;
use tracing::info;

/// Sum of the line-item quantities: the confirmation count that releases
/// the completion gate.
#[must_use]
pub fn expected_total(line_items: &[BatchLineItem]) -> u32 {
    line_items.iter().map(|item| item.quantity).sum()
}

/// Dispatches allocation requests for a batch.
///
/// Quantity is expressed as repetition count: `quantity` individual
/// messages per line item, mirroring how the allocator processes one unit
/// of work per message. No local state is retained; the only side effect
/// is network I/O.
pub struct RequestDispatcher<P: MessagePublisher> {
    publisher: Arc<P>,
}

impl<P: MessagePublisher> RequestDispatcher<P> {
    /// Create a dispatcher over a transport.
    pub fn new(publisher: Arc<P>) -> Self {
        Self { publisher }
    }

    /// Publish every allocation request for the batch, in configuration
    /// order.
    ///
    /// Returns the number of requests published.
    ///
    /// # Errors
    ///
    /// A transport-level publish failure aborts immediately and is fatal
    /// for the batch: the dispatch may be partial, so the operator must
    /// re-run with a fresh batch id rather than retry under this one.
    pub async fn dispatch_batch(
        &self,
        line_items: &[BatchLineItem],
        batch_id: BatchId,
    ) -> Result<u32, DispatchError> {
        let mut published = 0u32;

        for item in line_items {
            info!(
                batch_id = %batch_id,
                questionnaire_type = %item.questionnaire_type,
                quantity = item.quantity,
                "Queueing allocation requests"
            );
            for _ in 0..item.quantity {
                self.publisher
                    .publish(AllocationEvent::QidRequested {
                        questionnaire_type: item.questionnaire_type.clone(),
                        batch_id,
                    })
                    .await?;
                published += 1;
            }
        }

        info!(batch_id = %batch_id, published, "Batch dispatched");
        Ok(published)
    }
}
