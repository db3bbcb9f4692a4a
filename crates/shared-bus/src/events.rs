//! # Allocation Events
//!
//! Event types that flow between the pipeline and the allocator, and the
//! topic routing vocabulary used to scope subscriptions.

use serde::{Deserialize, Serialize};
use shared_types::{BatchId, QuestionnaireType};

/// Routing key for allocation request messages (the allocator's work queue).
pub const REQUEST_QID: &str = "request.qid";

/// Routing key stamped on pair-created confirmation events.
pub const EVENT_UAC_UPDATED: &str = "event.uac.updated";

/// Wildcard pattern a completion gate subscribes with.
pub const CONFIRMATION_PATTERN: &str = "event.uac.*";

/// All events that can be published to the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AllocationEvent {
    /// One unit of allocation work: mint a single UAC/QID pair.
    ///
    /// Quantity is expressed as repetition count (one message per required
    /// unit), mirroring how the allocator processes work.
    #[serde(rename_all = "camelCase")]
    QidRequested {
        /// Questionnaire type to mint a pair for.
        questionnaire_type: QuestionnaireType,
        /// The batch this request belongs to.
        batch_id: BatchId,
    },

    /// The allocator minted and stored one UAC/QID pair.
    #[serde(rename_all = "camelCase")]
    PairCreated {
        /// The questionnaire identifier of the new pair.
        qid: String,
        /// The questionnaire type the pair was minted for.
        questionnaire_type: QuestionnaireType,
        /// The batch the pair was allocated under.
        batch_id: BatchId,
    },
}

impl AllocationEvent {
    /// The topic routing key this event is published under.
    #[must_use]
    pub fn routing_key(&self) -> RoutingKey {
        match self {
            Self::QidRequested { .. } => RoutingKey::new(REQUEST_QID),
            Self::PairCreated { .. } => RoutingKey::new(EVENT_UAC_UPDATED),
        }
    }

    /// The batch this event is scoped to.
    #[must_use]
    pub fn batch_id(&self) -> BatchId {
        match self {
            Self::QidRequested { batch_id, .. } | Self::PairCreated { batch_id, .. } => *batch_id,
        }
    }
}

/// Delivery properties carried alongside every published message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageProperties {
    /// MIME content type of the payload.
    pub content_type: String,
    /// Whether the broker should persist the message to disk.
    pub persistent: bool,
}

impl Default for MessageProperties {
    fn default() -> Self {
        Self {
            content_type: crate::CONTENT_TYPE_JSON.to_string(),
            persistent: true,
        }
    }
}

/// A concrete dot-separated topic routing key, e.g. `event.uac.updated`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingKey(String);

impl RoutingKey {
    /// Wrap a routing key string.
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self(key.to_string())
    }

    /// The raw key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A topic subscription pattern.
///
/// Segments are dot-separated; `*` matches exactly one segment and `#`
/// matches the remainder of the key, as in a broker topic exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingPattern {
    segments: Vec<String>,
}

impl RoutingPattern {
    /// Parse a pattern such as `event.uac.*`.
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        Self {
            segments: pattern.split('.').map(str::to_string).collect(),
        }
    }

    /// Whether a concrete routing key matches this pattern.
    #[must_use]
    pub fn matches(&self, key: &RoutingKey) -> bool {
        let key_segments: Vec<&str> = key.as_str().split('.').collect();
        let mut ki = 0;

        for (pi, segment) in self.segments.iter().enumerate() {
            if segment == "#" {
                // `#` consumes the rest of the key; segments after it are
                // not supported
                return pi == self.segments.len() - 1;
            }
            let Some(key_segment) = key_segments.get(ki) else {
                return false;
            };
            if segment != "*" && segment != key_segment {
                return false;
            }
            ki += 1;
        }

        ki == key_segments.len()
    }

    /// The canonical string form of the pattern.
    #[must_use]
    pub fn as_str(&self) -> String {
        self.segments.join(".")
    }
}

impl std::fmt::Display for RoutingPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str())
    }
}
