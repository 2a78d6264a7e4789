//! # Structured events emitted by the dispatch runtime.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Dispatch events**: a message's path through one subscription
//!   (filtered, offered, delivered, exhausted)
//! - **Outcome events**: dead-letter and re-enqueue attempts and their results
//! - **Registry events**: consumer attach/detach
//! - **Runtime events**: shutdown progress
//!
//! The [`Event`] struct carries the metadata needed to reconstruct a
//! message's path: the message sequence id, subscription name, consumer id,
//! delivery count, and an optional reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore exact order when events are observed
//! out of order.
//!
//! ## Example
//! ```rust
//! use subflow::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::MessageDelivered)
//!     .with_message_seq(42)
//!     .with_subscription("orders")
//!     .with_consumer("link-1");
//!
//! assert_eq!(ev.kind, EventKind::MessageDelivered);
//! assert_eq!(ev.consumer.as_deref(), Some("link-1"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of dispatch runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Dispatch events ===
    /// Message rejected by the subscription's correlation filter set.
    ///
    /// Not a failure: the message is silently dropped from this
    /// subscription's delivery path.
    ///
    /// Sets: `message_seq`, `subscription`.
    MessageFiltered,

    /// Message offered to one candidate consumer.
    ///
    /// Emitted once per candidate until one accepts.
    ///
    /// Sets: `message_seq`, `subscription`, `consumer`, `accepted`.
    DeliveryAttempted,

    /// A consumer accepted the message (terminal success for this pass).
    ///
    /// Sets: `message_seq`, `subscription`, `consumer`.
    MessageDelivered,

    /// No active consumer accepted the message; outcome handling follows.
    ///
    /// Sets: `message_seq`, `subscription`, `delivery_count`.
    DeliveryExhausted,

    // === Outcome events ===
    /// The message's delivery count reached the configured maximum; a
    /// dead-letter move will be attempted.
    ///
    /// Sets: `message_seq`, `subscription`, `delivery_count`.
    MaxDeliveryReached,

    /// The queue accepted the dead-letter move.
    ///
    /// Sets: `message_seq`, `subscription`.
    DeadLettered,

    /// The queue refused the dead-letter move. Logged, never escalated; the
    /// re-enqueue attempt still follows.
    ///
    /// Sets: `message_seq`, `subscription`.
    DeadLetterFailed,

    /// The message went back to the pending queue with a bumped delivery count.
    ///
    /// Sets: `message_seq`, `subscription`, `delivery_count`.
    ReEnqueued,

    /// The queue refused to take the message back. The message is gone from
    /// this subscription's active circulation and this event is its only
    /// trace.
    ///
    /// Sets: `message_seq`, `subscription`, `delivery_count`.
    ReEnqueueFailed,

    /// A stopping worker handed an undispatched inbox message back to the
    /// queue. No delivery attempt was made; the delivery count is unchanged.
    ///
    /// Sets: `message_seq`, `subscription`, `delivery_count`.
    MessageReturned,

    // === Registry events ===
    /// A consumer was attached to the subscription.
    ///
    /// Sets: `subscription`, `consumer`.
    ConsumerAttached,

    /// A consumer was detached from the subscription.
    ///
    /// Sets: `subscription`, `consumer`.
    ConsumerDetached,

    // === Runtime events ===
    /// Topic shutdown requested.
    ShutdownRequested,

    /// All subscription workers stopped within the configured grace period.
    AllStoppedWithinGrace,

    /// Grace period exceeded; some workers did not stop in time.
    GraceExceeded,
}

/// Dispatch runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Sequence id of the message this event concerns.
    pub message_seq: Option<u64>,
    /// Subscription display name.
    pub subscription: Option<Arc<str>>,
    /// Consumer id.
    pub consumer: Option<Arc<str>>,
    /// Message delivery count at the time of the event.
    pub delivery_count: Option<u32>,
    /// Whether a delivery attempt was accepted.
    pub accepted: Option<bool>,
    /// Human-readable reason.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and
    /// next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            message_seq: None,
            subscription: None,
            consumer: None,
            delivery_count: None,
            accepted: None,
            reason: None,
        }
    }

    /// Attaches the message sequence id.
    #[inline]
    pub fn with_message_seq(mut self, seq: u64) -> Self {
        self.message_seq = Some(seq);
        self
    }

    /// Attaches the subscription name.
    #[inline]
    pub fn with_subscription(mut self, name: impl Into<Arc<str>>) -> Self {
        self.subscription = Some(name.into());
        self
    }

    /// Attaches a consumer id (or subscriber name).
    #[inline]
    pub fn with_consumer(mut self, id: impl Into<Arc<str>>) -> Self {
        self.consumer = Some(id.into());
        self
    }

    /// Attaches the message's delivery count.
    #[inline]
    pub fn with_delivery_count(mut self, count: u32) -> Self {
        self.delivery_count = Some(count);
        self
    }

    /// Attaches the accept/reject result of a delivery attempt.
    #[inline]
    pub fn with_accepted(mut self, accepted: bool) -> Self {
        self.accepted = Some(accepted);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
