//! # Shared Bus - Allocation Event Transport
//!
//! The narrow publish/consume contract between this pipeline and the
//! external allocator, plus an in-memory implementation of it.
//!
//! ```text
//! ┌──────────────┐                      ┌──────────────┐
//! │  Dispatcher  │                      │  Allocator   │
//! │              │  publish(request)    │              │
//! │              │ ──────┐              │              │
//! └──────────────┘       │              └──────────────┘
//!        ▲               ▼                     │
//!        │         ┌──────────────┐            │ publish(confirmation)
//!        │         │  Topic Bus   │ ◄──────────┘
//!        └──────── │              │
//!   subscribe      └──────────────┘
//!   ("event.uac.*")
//! ```
//!
//! ## Contract
//!
//! - `publish(event)` routes by the event's routing key; delivery is
//!   persistent `application/json` in a broker-backed implementation.
//! - `subscribe(pattern)` yields an exclusive [`Subscription`] whose
//!   server-side state is torn down when the handle drops.
//! - Every delivery is acknowledged individually via
//!   [`Subscription::ack`]; acknowledgement is idempotent per delivery tag.
//!
//! The in-memory bus covers single-process operation and tests; a
//! distributed deployment would put an AMQP client behind the same traits.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{
    AllocationEvent, MessageProperties, RoutingKey, RoutingPattern, CONFIRMATION_PATTERN,
    EVENT_UAC_UPDATED, REQUEST_QID,
};
pub use publisher::{InMemoryMessageBus, MessagePublisher, TransportError};
pub use subscriber::{Delivery, EventStream, Subscription, SubscriptionError};

/// MIME marker carried on every published message.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Maximum deliveries buffered per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
