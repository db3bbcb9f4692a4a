//! # Event Subscriber
//!
//! The consuming side of the transport contract: exclusive subscriptions
//! with per-delivery acknowledgement.

use crate::events::{AllocationEvent, MessageProperties, RoutingKey, RoutingPattern};
use std::collections::{HashMap, HashSet};
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was closed.
    #[error("Message bus closed")]
    Closed,
}

/// One message as handed to a consumer.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Broker-assigned delivery tag, unique per bus instance.
    pub tag: u64,
    /// The concrete routing key the message was published under.
    pub routing_key: RoutingKey,
    /// Delivery properties (content type, persistence flag).
    pub properties: MessageProperties,
    /// The event payload.
    pub event: AllocationEvent,
}

/// An exclusive subscription handle.
///
/// Deliveries whose routing key does not match the subscription pattern are
/// filtered out. Each delivery is acknowledged individually with [`ack`];
/// acknowledgement is idempotent per tag. When the handle drops, the
/// subscription is torn down on success, timeout and panic paths alike.
///
/// [`ack`]: Subscription::ack
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<Delivery>,

    /// Pattern for this subscription.
    pattern: RoutingPattern,

    /// Tags acknowledged so far.
    acked: HashSet<u64>,

    /// Reference to subscription tracking (for cleanup).
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Pattern key for this subscription.
    pattern_key: String,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<Delivery>,
        pattern: RoutingPattern,
        subscriptions: Arc<RwLock<HashMap<String, usize>>>,
        pattern_key: String,
    ) -> Self {
        Self {
            receiver,
            pattern,
            acked: HashSet::new(),
            subscriptions,
            pattern_key,
        }
    }

    /// Receive the next delivery matching the pattern.
    ///
    /// Returns `None` when the bus has been dropped.
    pub async fn recv(&mut self) -> Option<Delivery> {
        loop {
            let delivery = match self.receiver.recv().await {
                Ok(d) => d,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, deliveries dropped");
                    continue;
                }
            };

            if self.pattern.matches(&delivery.routing_key) {
                return Some(delivery);
            }
            // Routing key outside the pattern, keep waiting
        }
    }

    /// Try to receive the next matching delivery without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::Closed`] when the bus has been dropped.
    pub fn try_recv(&mut self) -> Result<Option<Delivery>, SubscriptionError> {
        loop {
            let delivery = match self.receiver.try_recv() {
                Ok(d) => d,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.pattern.matches(&delivery.routing_key) {
                return Ok(Some(delivery));
            }
        }
    }

    /// Acknowledge a delivery.
    ///
    /// Returns `true` the first time a tag is acknowledged and `false` for
    /// repeats, so a caller counting acknowledgements cannot double-count.
    pub fn ack(&mut self, delivery: &Delivery) -> bool {
        self.acked.insert(delivery.tag)
    }

    /// Number of distinct deliveries acknowledged on this subscription.
    #[must_use]
    pub fn acked_count(&self) -> usize {
        self.acked.len()
    }

    /// The pattern for this subscription.
    #[must_use]
    pub fn pattern(&self) -> &RoutingPattern {
        &self.pattern
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Decrement subscription count
        let Ok(mut subs) = self.subscriptions.write() else {
            return;
        };
        let Some(count) = subs.get_mut(&self.pattern_key) else {
            debug!(pattern = %self.pattern_key, "Subscription dropped");
            return;
        };

        *count = count.saturating_sub(1);
        if *count == 0 {
            subs.remove(&self.pattern_key);
        }
        debug!(pattern = %self.pattern_key, "Subscription dropped");
    }
}

/// A stream wrapper for subscriptions.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct EventStream {
    subscription: Subscription,
}

impl EventStream {
    /// Create a new event stream from a subscription.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// The pattern for this stream.
    #[must_use]
    pub fn pattern(&self) -> &RoutingPattern {
        self.subscription.pattern()
    }
}

impl Stream for EventStream {
    type Item = AllocationEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.subscription.try_recv() {
            Ok(Some(delivery)) => Poll::Ready(Some(delivery.event)),
            Ok(None) => {
                // No delivery ready; register waker and return pending
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Err(SubscriptionError::Closed) => Poll::Ready(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CONFIRMATION_PATTERN;
    use crate::publisher::{InMemoryMessageBus, MessagePublisher};
    use shared_types::{BatchId, QuestionnaireType};
    use std::time::Duration;
    use tokio::time::timeout;

    fn confirmation(batch_id: BatchId) -> AllocationEvent {
        AllocationEvent::PairCreated {
            qid: "0112345678".to_string(),
            questionnaire_type: QuestionnaireType::new("01").unwrap(),
            batch_id,
        }
    }

    fn request(batch_id: BatchId) -> AllocationEvent {
        AllocationEvent::QidRequested {
            questionnaire_type: QuestionnaireType::new("01").unwrap(),
            batch_id,
        }
    }

    #[tokio::test]
    async fn test_subscription_recv() {
        let bus = InMemoryMessageBus::new();
        let mut sub = bus.subscribe(RoutingPattern::new(CONFIRMATION_PATTERN));

        bus.publish(confirmation(BatchId::mint())).await.unwrap();

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("delivery");

        assert!(matches!(received.event, AllocationEvent::PairCreated { .. }));
    }

    #[tokio::test]
    async fn test_subscription_filters_by_pattern() {
        let bus = InMemoryMessageBus::new();
        let mut sub = bus.subscribe(RoutingPattern::new(CONFIRMATION_PATTERN));
        // Second subscriber keeps requests deliverable
        let _drain = bus.subscribe(RoutingPattern::new("request.*"));

        let batch_id = BatchId::mint();
        bus.publish(request(batch_id)).await.unwrap();
        bus.publish(confirmation(batch_id)).await.unwrap();

        // Only the confirmation comes through the gate-side pattern
        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("delivery");
        assert!(matches!(received.event, AllocationEvent::PairCreated { .. }));
    }

    #[tokio::test]
    async fn test_ack_is_idempotent() {
        let bus = InMemoryMessageBus::new();
        let mut sub = bus.subscribe(RoutingPattern::new("#"));

        bus.publish(confirmation(BatchId::mint())).await.unwrap();
        let delivery = sub.recv().await.unwrap();

        assert!(sub.ack(&delivery));
        assert!(!sub.ack(&delivery));
        assert_eq!(sub.acked_count(), 1);
    }

    #[tokio::test]
    async fn test_subscription_drop_cleanup() {
        let bus = InMemoryMessageBus::new();

        {
            let _sub1 = bus.subscribe(RoutingPattern::new("#"));
            let _sub2 = bus.subscribe(RoutingPattern::new("#"));
            assert_eq!(bus.subscriber_count(), 2);
        }

        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus = InMemoryMessageBus::new();
        let mut sub = bus.subscribe(RoutingPattern::new("#"));

        let result = sub.try_recv();
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_event_stream_pattern() {
        let bus = InMemoryMessageBus::new();
        let stream = bus.event_stream(RoutingPattern::new(CONFIRMATION_PATTERN));
        assert_eq!(stream.pattern().as_str(), "event.uac.*");
    }
}
