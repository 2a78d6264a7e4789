//! # Topic: fan-out over subscriptions and graceful shutdown.
//!
//! A [`Topic`] owns the event bus, the observer [`SubscriberSet`], and a set
//! of subscriptions, each with its own dispatch worker. Publishing a message
//! hands an independent copy to every subscription's inbox; each
//! subscription then filters and dispatches on its own.
//!
//! ## Shutdown path
//! ```text
//! Topic::shutdown()
//!   ├─► Bus.publish(ShutdownRequested)
//!   ├─► root_token.cancel()  → propagates to per-subscription child tokens
//!   ├─► drop inbox senders   → workers also see closed inboxes
//!   │     each worker finishes its in-flight pass, then returns any
//!   │     unpulled inbox messages to its queue (MessageReturned)
//!   └─► wait up to Config::grace:
//!          ├─ all workers joined → Bus.publish(AllStoppedWithinGrace)
//!          └─ timeout            → Bus.publish(GraceExceeded)
//!                                  Err(RuntimeError::GraceExceeded { stuck })
//! ```
//!
//! Subscriptions run independently: no shared mutable state between them,
//! one worker per subscription, messages processed one at a time.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, SubscriptionConfig};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::message::Message;
use crate::queue::MessageQueue;
use crate::subscribers::{Subscribe, SubscriberSet};

use super::subscription::Subscription;

struct SubscriptionEntry {
    subscription: Arc<Subscription>,
    sender: tokio::sync::mpsc::Sender<Message>,
    worker: JoinHandle<()>,
}

/// A topic with fan-out to zero or more durable subscriptions.
pub struct Topic {
    name: Arc<str>,
    cfg: Config,
    bus: Bus,
    entries: Vec<SubscriptionEntry>,
    root_token: CancellationToken,
    // Retained so the observer fan-out lives as long as the topic.
    #[allow(dead_code)]
    observers: Arc<SubscriberSet>,
    #[allow(dead_code)]
    listener: JoinHandle<()>,
}

impl Topic {
    /// Creates a topic, wiring the given observers onto the event bus.
    pub fn new(name: impl Into<Arc<str>>, cfg: Config, observers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let observers = Arc::new(SubscriberSet::new(observers));

        // Forward bus events to the observer set (fire-and-forget).
        let listener = {
            let mut rx = bus.subscribe();
            let set = Arc::clone(&observers);
            tokio::spawn(async move {
                while let Ok(ev) = rx.recv().await {
                    set.emit(&ev);
                }
            })
        };

        Self {
            name: name.into(),
            cfg,
            bus,
            entries: Vec::new(),
            root_token: CancellationToken::new(),
            observers,
            listener,
        }
    }

    /// Returns the topic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the shared event bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Adds a subscription and spawns its dispatch worker.
    ///
    /// The subscription's worker runs under a child token of the topic's
    /// root token and gets an inbox of `Config::inflight_capacity`.
    pub fn add_subscription(
        &mut self,
        config: SubscriptionConfig,
        queue: Arc<dyn MessageQueue>,
    ) -> Arc<Subscription> {
        let subscription = Arc::new(Subscription::new(config, queue, self.bus.clone()));
        let (sender, worker) = subscription.spawn(
            self.cfg.inflight_capacity_clamped(),
            self.root_token.child_token(),
        );
        self.entries.push(SubscriptionEntry {
            subscription: Arc::clone(&subscription),
            sender,
            worker,
        });
        subscription
    }

    /// Returns handles to all subscriptions.
    pub fn subscriptions(&self) -> Vec<Arc<Subscription>> {
        self.entries
            .iter()
            .map(|e| Arc::clone(&e.subscription))
            .collect()
    }

    /// Publishes a message: every subscription receives an independent copy.
    ///
    /// Waits for inbox space per subscription (bounded backpressure); a
    /// subscription whose worker already exited is skipped.
    pub async fn publish(&self, message: Message) {
        for entry in &self.entries {
            let _ = entry.sender.send(message.clone()).await;
        }
    }

    /// Shuts the topic down, waiting up to `Config::grace` for workers.
    ///
    /// Each worker finishes its in-flight message and returns unpulled
    /// inbox messages to its queue before exiting. Returns
    /// [`RuntimeError::GraceExceeded`] naming the subscriptions whose
    /// workers did not stop in time.
    pub async fn shutdown(self) -> Result<(), RuntimeError> {
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.root_token.cancel();

        let mut entries = self.entries;
        // Close the inboxes as well; a worker parked on recv exits either way.
        let mut workers: Vec<(Arc<str>, JoinHandle<()>)> = entries
            .drain(..)
            .map(|e| {
                drop(e.sender);
                (Arc::from(e.subscription.name()), e.worker)
            })
            .collect();

        let grace = self.cfg.grace;
        let all_joined = async {
            for (_, worker) in workers.iter_mut() {
                let _ = worker.await;
            }
        };

        match time::timeout(grace, all_joined).await {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithinGrace));
                Ok(())
            }
            Err(_) => {
                self.bus.publish(Event::new(EventKind::GraceExceeded));
                let stuck: Vec<String> = workers
                    .iter()
                    .filter(|(_, worker)| !worker.is_finished())
                    .map(|(name, _)| name.to_string())
                    .collect();
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }
}
