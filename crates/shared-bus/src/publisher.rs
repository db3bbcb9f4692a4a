//! # Message Publisher
//!
//! The publishing side of the transport contract and the in-memory bus.

use crate::events::{AllocationEvent, MessageProperties, RoutingPattern};
use crate::subscriber::{Delivery, EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Transport-level publish failures.
///
/// Publish failure is fatal for the enclosing batch: the dispatcher never
/// retries silently, because a partially dispatched batch would double-count
/// on re-run under the same batch id.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No consumer is bound to the routed queue.
    #[error("No consumers for routing key {0}")]
    NoConsumers(String),

    /// The underlying transport rejected the message.
    #[error("Transport rejected publish: {0}")]
    Rejected(String),
}

/// Trait for publishing allocation events to the bus.
///
/// This is the entire surface the pipeline needs from the transport; an
/// AMQP-backed implementation would map it onto a durable topic exchange
/// with persistent deliveries.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publish an event, routed by its routing key.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the transport cannot accept the
    /// message; the caller treats this as fatal for the batch.
    async fn publish(&self, event: AllocationEvent) -> Result<(), TransportError>;

    /// Total number of events accepted for publication.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the topic bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer
/// semantics. Suitable for single-process operation and tests; distributed
/// deployments would use a broker-backed implementation behind the same
/// traits.
pub struct InMemoryMessageBus {
    /// Broadcast sender for deliveries.
    sender: broadcast::Sender<Delivery>,

    /// Monotonic delivery tag source.
    next_tag: AtomicU64,

    /// Active subscription count by pattern.
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryMessageBus {
    /// Create a bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with specified per-subscriber capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            next_tag: AtomicU64::new(1),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to deliveries whose routing key matches a pattern.
    ///
    /// The returned [`Subscription`] is exclusive to the caller; dropping it
    /// tears the subscription down on every exit path, which is what keeps
    /// batch-scoped gate queues from leaking.
    #[must_use]
    pub fn subscribe(&self, pattern: RoutingPattern) -> Subscription {
        let receiver = self.sender.subscribe();
        let pattern_key = pattern.as_str();

        {
            if let Ok(mut subs) = self.subscriptions.write() {
                *subs.entry(pattern_key.clone()).or_insert(0) += 1;
            }
        }

        debug!(pattern = %pattern_key, "New subscription created");

        Subscription::new(receiver, pattern, self.subscriptions.clone(), pattern_key)
    }

    /// Get a stream of deliveries matching a pattern.
    #[must_use]
    pub fn event_stream(&self, pattern: RoutingPattern) -> EventStream {
        EventStream::new(self.subscribe(pattern))
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// The per-subscriber channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryMessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePublisher for InMemoryMessageBus {
    async fn publish(&self, event: AllocationEvent) -> Result<(), TransportError> {
        let routing_key = event.routing_key();
        let delivery = Delivery {
            tag: self.next_tag.fetch_add(1, Ordering::Relaxed),
            routing_key: routing_key.clone(),
            properties: MessageProperties::default(),
            event,
        };

        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(delivery) {
            Ok(receiver_count) => {
                debug!(
                    routing_key = %routing_key,
                    receivers = receiver_count,
                    "Event published"
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    routing_key = %routing_key,
                    error = %e,
                    "Event dropped (no receivers)"
                );
                Err(TransportError::NoConsumers(routing_key.to_string()))
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
