//! # Outcome handling for messages no consumer accepted.
//!
//! Invoked by the engine after the offer loop exhausts its candidates
//! (including the zero-candidate case). Two independent best-effort actions:
//!
//! 1. **Dead-letter** — only when the delivery count has reached the
//!    subscription's maximum. A refused move is reported and changes
//!    nothing else.
//! 2. **Re-enqueue** — always, whether or not the dead-letter branch fired
//!    or succeeded. The delivery count is bumped immediately before the
//!    attempt.
//!
//! The two attempts are deliberately not coupled: one's failure never
//! skips the other, trading a possible duplicate (dead-lettered *and*
//! re-enqueued) for never losing a message silently.
//!
//! ## Rules
//! - Nothing here returns an error; every branch ends in exactly one event.
//! - A message that fails re-enqueue is gone from active circulation — the
//!   `ReEnqueueFailed` event is the only trace, which is why it exists.

use crate::config::SubscriptionConfig;
use crate::events::{Bus, Event, EventKind};
use crate::message::Message;
use crate::queue::MessageQueue;

/// Applies the dead-letter / re-enqueue consequence for an undelivered message.
pub(crate) fn handle_undelivered(
    config: &SubscriptionConfig,
    queue: &dyn MessageQueue,
    bus: &Bus,
    mut message: Message,
) {
    if message.delivery_count() >= config.max_delivery_count {
        publish_outcome(bus, config, &message, EventKind::MaxDeliveryReached);

        if queue.try_dead_letter(&message) {
            publish_outcome(bus, config, &message, EventKind::DeadLettered);
        } else {
            publish_outcome(bus, config, &message, EventKind::DeadLetterFailed);
        }
    }

    // Bump before handing back so the queue stores the attempt it represents.
    message.mark_redelivery();
    let seq = message.seq();
    let count = message.delivery_count();

    if queue.try_re_enqueue(message) {
        bus.publish(outcome_event(config, seq, count, EventKind::ReEnqueued));
    } else {
        bus.publish(outcome_event(config, seq, count, EventKind::ReEnqueueFailed));
    }
}

fn publish_outcome(bus: &Bus, config: &SubscriptionConfig, message: &Message, kind: EventKind) {
    bus.publish(outcome_event(
        config,
        message.seq(),
        message.delivery_count(),
        kind,
    ));
}

fn outcome_event(config: &SubscriptionConfig, seq: u64, count: u32, kind: EventKind) -> Event {
    Event::new(kind)
        .with_message_seq(seq)
        .with_subscription(config.name.clone())
        .with_delivery_count(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::InMemoryQueue;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Queue double that refuses everything and counts the attempts.
    struct RefusingQueue {
        dead_letter_calls: AtomicUsize,
        re_enqueue_calls: AtomicUsize,
    }

    impl RefusingQueue {
        fn new() -> Self {
            Self {
                dead_letter_calls: AtomicUsize::new(0),
                re_enqueue_calls: AtomicUsize::new(0),
            }
        }
    }

    impl MessageQueue for RefusingQueue {
        fn try_dead_letter(&self, _message: &Message) -> bool {
            self.dead_letter_calls.fetch_add(1, Ordering::SeqCst);
            false
        }
        fn try_re_enqueue(&self, _message: Message) -> bool {
            self.re_enqueue_calls.fetch_add(1, Ordering::SeqCst);
            false
        }
    }

    fn config(max: u32) -> SubscriptionConfig {
        SubscriptionConfig::new("orders", Vec::new(), max)
    }

    fn message_with_count(seq: u64, count: u32) -> Message {
        let mut msg = Message::new(seq, Bytes::new());
        for _ in 0..count {
            msg.mark_redelivery();
        }
        msg
    }

    fn kinds(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        kinds
    }

    #[test]
    fn test_below_threshold_only_re_enqueues() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let queue = InMemoryQueue::new();

        handle_undelivered(&config(2), &queue, &bus, message_with_count(1, 0));

        assert_eq!(queue.dead_letter_len(), 0);
        assert_eq!(queue.pending_len(), 1);
        assert_eq!(queue.pop_pending().unwrap().delivery_count(), 1);
        assert_eq!(kinds(&mut rx), vec![EventKind::ReEnqueued]);
    }

    #[test]
    fn test_at_threshold_dead_letters_and_still_re_enqueues() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let queue = InMemoryQueue::new();

        handle_undelivered(&config(2), &queue, &bus, message_with_count(1, 2));

        // Both attempts fired in the same pass.
        assert_eq!(queue.dead_letter_len(), 1);
        assert_eq!(queue.pending_len(), 1);
        assert_eq!(
            kinds(&mut rx),
            vec![
                EventKind::MaxDeliveryReached,
                EventKind::DeadLettered,
                EventKind::ReEnqueued,
            ]
        );
    }

    #[test]
    fn test_above_threshold_also_dead_letters() {
        let bus = Bus::new(16);
        let queue = InMemoryQueue::new();
        handle_undelivered(&config(2), &queue, &bus, message_with_count(1, 5));
        assert_eq!(queue.dead_letter_len(), 1);
    }

    #[test]
    fn test_dead_letter_failure_does_not_skip_re_enqueue() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let queue = RefusingQueue::new();

        handle_undelivered(&config(1), &queue, &bus, message_with_count(3, 1));

        assert_eq!(queue.dead_letter_calls.load(Ordering::SeqCst), 1);
        assert_eq!(queue.re_enqueue_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            kinds(&mut rx),
            vec![
                EventKind::MaxDeliveryReached,
                EventKind::DeadLetterFailed,
                EventKind::ReEnqueueFailed,
            ]
        );
    }

    #[test]
    fn test_exactly_one_dead_letter_attempt_per_pass() {
        let queue = RefusingQueue::new();
        let bus = Bus::new(16);
        handle_undelivered(&config(1), &queue, &bus, message_with_count(4, 9));
        assert_eq!(queue.dead_letter_calls.load(Ordering::SeqCst), 1);
        assert_eq!(queue.re_enqueue_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_re_enqueue_event_carries_bumped_count() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let queue = InMemoryQueue::new();

        handle_undelivered(&config(10), &queue, &bus, message_with_count(5, 3));

        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::ReEnqueued);
        assert_eq!(ev.message_seq, Some(5));
        assert_eq!(ev.delivery_count, Some(4));
        assert_eq!(ev.subscription.as_deref(), Some("orders"));
    }
}
