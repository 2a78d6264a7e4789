//! # DispatchEngine: the per-subscription delivery algorithm.
//!
//! One engine serves one subscription. [`DispatchEngine::run`] drives a
//! bounded inbox one message at a time; [`DispatchEngine::process_incoming`]
//! is the single-message entry point the queue-reader side calls, in
//! dequeue order.
//!
//! ## Per-message flow
//! ```text
//! process_incoming(msg)
//!   ├─► filters::matches?  ── no ──► Event(MessageFiltered), return
//!   ├─► registry.snapshot() → select_candidates()
//!   ├─► for each candidate: try_deliver(msg)
//!   │     ├─ Event(DeliveryAttempted) per offer
//!   │     └─ first accept → Event(MessageDelivered), return
//!   └─► none accepted → Event(DeliveryExhausted)
//!                     → outcome::handle_undelivered (dead-letter / re-enqueue)
//! ```
//!
//! ## Rules
//! - Messages are processed **sequentially** within one engine (per-message
//!   ordering of dispatch decisions is preserved).
//! - One pass touches at most one consumer's received counter: the loop
//!   stops at the first acceptance.
//! - The cancellation token is observed **between** messages only. An
//!   in-flight message always finishes its pass — deliver, drop, or
//!   re-enqueue — before the loop exits.
//! - On exit the worker hands every message still sitting in its inbox back
//!   to the queue untouched (`MessageReturned`), so shutdown cannot lose
//!   messages that were published but never pulled.
//! - Nothing in a single message's handling can take the loop down; queue
//!   refusals are events, not errors.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::SubscriptionConfig;
use crate::consumers::{select_candidates, ConsumerRegistry};
use crate::events::{Bus, Event, EventKind};
use crate::filters;
use crate::message::Message;
use crate::queue::MessageQueue;

use super::outcome;

/// Per-subscription dispatch engine.
///
/// Owns shared handles only; cheap to construct per worker.
pub struct DispatchEngine {
    config: Arc<SubscriptionConfig>,
    registry: Arc<ConsumerRegistry>,
    queue: Arc<dyn MessageQueue>,
    bus: Bus,
}

impl DispatchEngine {
    /// Creates an engine over the given collaborators.
    pub fn new(
        config: Arc<SubscriptionConfig>,
        registry: Arc<ConsumerRegistry>,
        queue: Arc<dyn MessageQueue>,
        bus: Bus,
    ) -> Self {
        Self {
            config,
            registry,
            queue,
            bus,
        }
    }

    /// Runs the dispatch loop until the inbox closes or the token fires.
    ///
    /// The token is checked between messages; the message currently being
    /// processed completes its pass first. Anything left in the inbox when
    /// the loop exits is returned to the queue with its count unchanged.
    pub async fn run(self, mut inbox: mpsc::Receiver<Message>, token: CancellationToken) {
        loop {
            if token.is_cancelled() {
                break;
            }
            tokio::select! {
                _ = token.cancelled() => break,
                next = inbox.recv() => match next {
                    Some(message) => self.process_incoming(message).await,
                    None => break,
                },
            }
        }
        self.return_inbox(&mut inbox);
    }

    /// Hands messages the loop never pulled back to the queue.
    ///
    /// These saw no delivery attempt, so their delivery count is not
    /// bumped. A queue refusal here is reported the same way as on the
    /// redelivery path.
    fn return_inbox(&self, inbox: &mut mpsc::Receiver<Message>) {
        inbox.close();
        while let Ok(message) = inbox.try_recv() {
            let seq = message.seq();
            let count = message.delivery_count();
            let kind = if self.queue.try_re_enqueue(message) {
                EventKind::MessageReturned
            } else {
                EventKind::ReEnqueueFailed
            };
            self.bus.publish(
                Event::new(kind)
                    .with_message_seq(seq)
                    .with_subscription(self.config.name.clone())
                    .with_delivery_count(count),
            );
        }
    }

    /// Processes one message pulled from the subscription's queue.
    ///
    /// This is the unit of consistency: the message's whole pass — filter,
    /// offers, outcome — runs to completion here, and no second pass for
    /// the same message instance can run concurrently.
    pub async fn process_incoming(&self, message: Message) {
        if !filters::matches(&message, &self.config.filters) {
            self.bus.publish(
                self.dispatch_event(EventKind::MessageFiltered, &message),
            );
            return;
        }

        let candidates = select_candidates(self.registry.snapshot().await);
        for consumer in candidates {
            let accepted = consumer.try_deliver(&message);
            self.bus.publish(
                self.dispatch_event(EventKind::DeliveryAttempted, &message)
                    .with_consumer(consumer.id().to_string())
                    .with_accepted(accepted),
            );
            if accepted {
                self.bus.publish(
                    self.dispatch_event(EventKind::MessageDelivered, &message)
                        .with_consumer(consumer.id().to_string()),
                );
                return;
            }
        }

        self.bus.publish(
            self.dispatch_event(EventKind::DeliveryExhausted, &message)
                .with_delivery_count(message.delivery_count()),
        );
        outcome::handle_undelivered(&self.config, self.queue.as_ref(), &self.bus, message);
    }

    fn dispatch_event(&self, kind: EventKind, message: &Message) -> Event {
        Event::new(kind)
            .with_message_seq(message.seq())
            .with_subscription(self.config.name.clone())
    }
}
