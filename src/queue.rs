//! # Message queue boundary.
//!
//! The durable store behind a subscription is an external collaborator; this
//! crate only needs two best-effort operations from it. Both return a plain
//! `bool`: `false` means the action did not happen and will be reported on
//! the event bus, never escalated as an error.
//!
//! [`InMemoryQueue`] is the reference implementation used by tests and the
//! demos. It is a plain in-process store, not a durable transport.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::message::Message;

/// # Best-effort queue operations the dispatch engine calls.
///
/// Implementations must be non-blocking and must not panic; a refused
/// action is expressed by returning `false`.
pub trait MessageQueue: Send + Sync + 'static {
    /// Attempts to move the message to the dead-letter channel.
    ///
    /// Called when a message exhausts all consumers with its delivery count
    /// at or beyond the subscription's maximum.
    fn try_dead_letter(&self, message: &Message) -> bool;

    /// Attempts to put the message back into the pending queue for a later
    /// delivery attempt.
    ///
    /// The engine bumps the delivery count before calling this; the queue
    /// stores what it is given.
    fn try_re_enqueue(&self, message: Message) -> bool;
}

/// In-process queue with a pending deque and a dead-letter store.
///
/// ## Example
/// ```
/// use bytes::Bytes;
/// use subflow::{InMemoryQueue, Message, MessageQueue};
///
/// let queue = InMemoryQueue::new();
/// assert!(queue.try_re_enqueue(Message::new(1, Bytes::new())));
/// assert_eq!(queue.pending_len(), 1);
/// assert_eq!(queue.pop_pending().unwrap().seq(), 1);
/// ```
#[derive(Default)]
pub struct InMemoryQueue {
    pending: Mutex<VecDeque<Message>>,
    dead_letters: Mutex<Vec<Message>>,
}

impl InMemoryQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a fresh message at the back of the pending queue.
    pub fn enqueue(&self, message: Message) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.push_back(message);
        }
    }

    /// Pops the next pending message, if any.
    ///
    /// The queue-reader loop feeds these to a subscription's dispatch worker
    /// in dequeue order.
    pub fn pop_pending(&self) -> Option<Message> {
        self.pending.lock().ok()?.pop_front()
    }

    /// Returns the number of pending messages.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Returns a copy of the dead-letter store, in arrival order.
    pub fn dead_letters(&self) -> Vec<Message> {
        self.dead_letters
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    /// Returns the number of dead-lettered messages.
    pub fn dead_letter_len(&self) -> usize {
        self.dead_letters.lock().map(|d| d.len()).unwrap_or(0)
    }
}

impl MessageQueue for InMemoryQueue {
    fn try_dead_letter(&self, message: &Message) -> bool {
        match self.dead_letters.lock() {
            Ok(mut dead) => {
                dead.push(message.clone());
                true
            }
            Err(_) => false,
        }
    }

    fn try_re_enqueue(&self, message: Message) -> bool {
        match self.pending.lock() {
            Ok(mut pending) => {
                pending.push_back(message);
                true
            }
            Err(_) => false,
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
    fn test_pending_is_fifo() {
        let queue = InMemoryQueue::new();
        queue.enqueue(msg(1));
        queue.enqueue(msg(2));
        assert!(queue.try_re_enqueue(msg(3)));

        assert_eq!(queue.pop_pending().unwrap().seq(), 1);
        assert_eq!(queue.pop_pending().unwrap().seq(), 2);
        assert_eq!(queue.pop_pending().unwrap().seq(), 3);
        assert!(queue.pop_pending().is_none());
    }

    #[test]
    fn test_dead_letter_keeps_copy() {
        let queue = InMemoryQueue::new();
        let message = msg(7).with_property("k", "v");
        assert!(queue.try_dead_letter(&message));

        let dead = queue.dead_letters();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].seq(), 7);
        assert_eq!(dead[0].property("k"), Some("v"));
        // Dead-lettering does not consume the original.
        assert_eq!(message.seq(), 7);
    }

    #[test]
    fn test_queue_stores_given_delivery_count() {
        let queue = InMemoryQueue::new();
        let mut message = msg(8);
        message.mark_redelivery();
        assert!(queue.try_re_enqueue(message));
        assert_eq!(queue.pop_pending().unwrap().delivery_count(), 1);
    }
}
