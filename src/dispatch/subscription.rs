//! # Subscription: one durable subscription's runtime wiring.
//!
//! A [`Subscription`] bundles the immutable [`SubscriptionConfig`], the
//! consumer [`ConsumerRegistry`], the queue handle and the event bus, and
//! knows how to put a [`DispatchEngine`] on a worker task.
//!
//! Attach/detach arrive on the link-lifecycle path and go through the
//! registry; the dispatch worker reads snapshots concurrently.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::SubscriptionConfig;
use crate::consumers::{ConsumerRef, ConsumerRegistry};
use crate::error::DispatchError;
use crate::events::Bus;
use crate::message::Message;
use crate::queue::MessageQueue;

use super::engine::DispatchEngine;

/// One topic subscription with its consumers and dispatch worker wiring.
pub struct Subscription {
    config: Arc<SubscriptionConfig>,
    registry: Arc<ConsumerRegistry>,
    queue: Arc<dyn MessageQueue>,
    bus: Bus,
}

impl Subscription {
    /// Creates a subscription over the given queue collaborator and bus.
    pub fn new(config: SubscriptionConfig, queue: Arc<dyn MessageQueue>, bus: Bus) -> Self {
        let config = Arc::new(config);
        let registry = ConsumerRegistry::new(config.name.clone(), bus.clone());
        Self {
            config,
            registry,
            queue,
            bus,
        }
    }

    /// Returns the subscription's display name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the subscription's configuration.
    pub fn config(&self) -> &Arc<SubscriptionConfig> {
        &self.config
    }

    /// Returns the event bus this subscription publishes on.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Attaches a consumer to this subscription.
    pub async fn attach(&self, consumer: ConsumerRef) -> Result<(), DispatchError> {
        self.registry.attach(consumer).await
    }

    /// Detaches a consumer by id, returning its handle.
    pub async fn detach(&self, id: &str) -> Result<ConsumerRef, DispatchError> {
        self.registry.detach(id).await
    }

    /// Returns the number of attached consumers.
    pub async fn consumer_count(&self) -> usize {
        self.registry.len().await
    }

    /// Spawns the dispatch worker.
    ///
    /// Returns the sender the queue-reader loop feeds (one message at a
    /// time, in dequeue order) and the worker's join handle. The worker
    /// exits when the sender side closes or the token fires; an in-flight
    /// message finishes its pass first.
    pub fn spawn(
        &self,
        inbox_capacity: usize,
        token: CancellationToken,
    ) -> (mpsc::Sender<Message>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(inbox_capacity.max(1));
        let engine = DispatchEngine::new(
            Arc::clone(&self.config),
            Arc::clone(&self.registry),
            Arc::clone(&self.queue),
            self.bus.clone(),
        );
        let handle = tokio::spawn(engine.run(rx, token));
        (tx, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumers::{Consumer, LinkConsumer};
    use crate::queue::InMemoryQueue;
    use bytes::Bytes;
    use std::time::Duration;

    #[tokio::test]
    async fn test_spawned_worker_dispatches_to_attached_consumer() {
        let bus = Bus::new(64);
        let queue = Arc::new(InMemoryQueue::new());
        let sub = Subscription::new(
            SubscriptionConfig::unfiltered("orders"),
            queue as Arc<dyn MessageQueue>,
            bus,
        );

        let (link, mut link_rx) = LinkConsumer::new("link-1", 4);
        sub.attach(link.clone()).await.unwrap();
        assert_eq!(sub.consumer_count().await, 1);

        let token = CancellationToken::new();
        let (tx, worker) = sub.spawn(8, token.clone());

        tx.send(Message::new(42, Bytes::new())).await.unwrap();

        // The consumer's inbox receives the accepted message.
        let delivered = tokio::time::timeout(Duration::from_secs(1), link_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(delivered.seq(), 42);
        assert_eq!(link.received_count(), 1);

        token.cancel();
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_detach_returns_handle() {
        let bus = Bus::new(16);
        let queue = Arc::new(InMemoryQueue::new());
        let sub = Subscription::new(
            SubscriptionConfig::unfiltered("orders"),
            queue as Arc<dyn MessageQueue>,
            bus,
        );
        let (link, _rx) = LinkConsumer::new("link-1", 1);
        sub.attach(link).await.unwrap();

        let handle = sub.detach("link-1").await.unwrap();
        assert_eq!(handle.id(), "link-1");
        assert_eq!(sub.consumer_count().await, 0);
    }
}
