//! # Consumer capability trait and the channel-backed implementation.
//!
//! "Consumer" is a capability, not a concrete class: the engine only needs
//! `try_deliver`, `received_count`, and `is_draining`, so tests can stand in
//! deterministic doubles and transports can bring their own link types.
//!
//! ## Rules
//! - [`Consumer::try_deliver`] is a **non-blocking, synchronous** decision:
//!   it returns accept/reject immediately from the consumer's current
//!   capacity and never suspends the dispatch loop.
//! - An accepting implementation increments its own received counter as part
//!   of acceptance, so the counter and the accept decision cannot drift.
//! - A draining consumer must refuse all new work.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::message::Message;

/// Shared handle to a consumer (`Arc<dyn Consumer>`).
pub type ConsumerRef = Arc<dyn Consumer>;

/// # Delivery target attached to a subscription.
///
/// Implementations decide acceptance from their own flow-control state;
/// the dispatch engine treats the decision as opaque.
pub trait Consumer: Send + Sync + 'static {
    /// Returns the stable consumer identifier.
    fn id(&self) -> &str;

    /// Returns how many messages this consumer has accepted so far.
    ///
    /// The fair selector orders candidates ascending by this counter.
    fn received_count(&self) -> u64;

    /// Returns true once the consumer is detaching and must no longer
    /// receive new work.
    fn is_draining(&self) -> bool;

    /// Offers one message. Returns true if the consumer accepted it.
    ///
    /// Must not block; acceptance implies the received counter was bumped.
    fn try_deliver(&self, message: &Message) -> bool;
}

/// Channel-backed consumer: the bounded inbox is the credit window.
///
/// `try_deliver` maps to `try_send` — a full inbox means the consumer is out
/// of credit and the offer is rejected. The receiving half is handed to the
/// transport/link side at attach time.
///
/// ## Example
/// ```
/// use bytes::Bytes;
/// use subflow::{Consumer, LinkConsumer, Message};
///
/// let (link, mut inbox) = LinkConsumer::new("link-1", 2);
/// assert!(link.try_deliver(&Message::new(1, Bytes::new())));
/// assert!(link.try_deliver(&Message::new(2, Bytes::new())));
/// // Credit exhausted:
/// assert!(!link.try_deliver(&Message::new(3, Bytes::new())));
/// assert_eq!(link.received_count(), 2);
/// assert_eq!(inbox.try_recv().unwrap().seq(), 1);
/// ```
pub struct LinkConsumer {
    id: Arc<str>,
    tx: mpsc::Sender<Message>,
    received: AtomicU64,
    draining: AtomicBool,
}

impl LinkConsumer {
    /// Creates a consumer with the given id and credit window, returning the
    /// consumer handle and the receiving half of its inbox.
    pub fn new(id: impl Into<Arc<str>>, credit: usize) -> (Arc<Self>, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(credit.max(1));
        let consumer = Arc::new(Self {
            id: id.into(),
            tx,
            received: AtomicU64::new(0),
            draining: AtomicBool::new(false),
        });
        (consumer, rx)
    }

    /// Marks the consumer as draining.
    ///
    /// From this point it refuses all offers; in-flight work already in its
    /// inbox is unaffected. Irreversible for the lifetime of the link.
    pub fn begin_drain(&self) {
        self.draining.store(true, Ordering::Release);
    }
}

impl Consumer for LinkConsumer {
    fn id(&self) -> &str {
        &self.id
    }

    fn received_count(&self) -> u64 {
        self.received.load(Ordering::Acquire)
    }

    fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    fn try_deliver(&self, message: &Message) -> bool {
        // Drain is checked here too, not only in the selector: the flag may
        // flip between snapshot and offer.
        if self.is_draining() {
            return false;
        }
        match self.tx.try_send(message.clone()) {
            Ok(()) => {
                self.received.fetch_add(1, Ordering::AcqRel);
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => false,
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn msg(seq: u64) -> Message {
        Message::new(seq, Bytes::new())
    }

    #[test]
    fn test_accept_until_credit_exhausted() {
        let (link, mut rx) = LinkConsumer::new("link-1", 2);
        assert!(link.try_deliver(&msg(1)));
        assert!(link.try_deliver(&msg(2)));
        assert!(!link.try_deliver(&msg(3)));
        assert_eq!(link.received_count(), 2);

        // Consuming from the inbox restores credit.
        assert_eq!(rx.try_recv().unwrap().seq(), 1);
        assert!(link.try_deliver(&msg(3)));
        assert_eq!(link.received_count(), 3);
    }

    #[test]
    fn test_draining_refuses_offers() {
        let (link, _rx) = LinkConsumer::new("link-2", 4);
        assert!(link.try_deliver(&msg(1)));
        link.begin_drain();
        assert!(link.is_draining());
        assert!(!link.try_deliver(&msg(2)));
        assert_eq!(link.received_count(), 1);
    }

    #[test]
    fn test_closed_inbox_refuses_offers() {
        let (link, rx) = LinkConsumer::new("link-3", 4);
        drop(rx);
        assert!(!link.try_deliver(&msg(1)));
        assert_eq!(link.received_count(), 0);
    }
}
