//! # Consumer registry: attach/detach map with snapshot reads.
//!
//! The registry is mutated by the link-lifecycle control path and read by
//! the dispatch path. Dispatch never iterates the map directly: it takes a
//! point-in-time [`snapshot`](ConsumerRegistry::snapshot) so attach/detach
//! can proceed concurrently with a multi-candidate offer loop.
//!
//! ## Rules
//! - Consumer ids are unique; attaching a duplicate id is rejected.
//! - Removal timing is not the delivery gate — the drain flag is. A consumer
//!   detaching mid-selection stops receiving work the moment its flag is
//!   set, even while still present in a snapshot.
//! - Attach/detach publish `ConsumerAttached` / `ConsumerDetached` events.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::DispatchError;
use crate::events::{Bus, Event, EventKind};

use super::consumer::ConsumerRef;

/// Registry of consumers attached to one subscription.
pub struct ConsumerRegistry {
    consumers: RwLock<HashMap<Arc<str>, ConsumerRef>>,
    subscription: Arc<str>,
    bus: Bus,
}

impl ConsumerRegistry {
    /// Creates an empty registry for the named subscription.
    pub fn new(subscription: Arc<str>, bus: Bus) -> Arc<Self> {
        Arc::new(Self {
            consumers: RwLock::new(HashMap::new()),
            subscription,
            bus,
        })
    }

    /// Attaches a consumer.
    ///
    /// Fails with [`DispatchError::ConsumerExists`] when the id is taken;
    /// the registry is left unchanged in that case.
    pub async fn attach(&self, consumer: ConsumerRef) -> Result<(), DispatchError> {
        let id: Arc<str> = consumer.id().into();
        {
            let mut consumers = self.consumers.write().await;
            if consumers.contains_key(&id) {
                return Err(DispatchError::ConsumerExists { id: id.to_string() });
            }
            consumers.insert(Arc::clone(&id), consumer);
        }
        self.bus.publish(
            Event::new(EventKind::ConsumerAttached)
                .with_subscription(Arc::clone(&self.subscription))
                .with_consumer(id),
        );
        Ok(())
    }

    /// Detaches a consumer by id, returning its handle.
    ///
    /// Fails with [`DispatchError::ConsumerNotFound`] when no such consumer
    /// is attached.
    pub async fn detach(&self, id: &str) -> Result<ConsumerRef, DispatchError> {
        let removed = {
            let mut consumers = self.consumers.write().await;
            consumers.remove(id)
        };
        match removed {
            Some(consumer) => {
                self.bus.publish(
                    Event::new(EventKind::ConsumerDetached)
                        .with_subscription(Arc::clone(&self.subscription))
                        .with_consumer(id.to_string()),
                );
                Ok(consumer)
            }
            None => Err(DispatchError::ConsumerNotFound { id: id.to_string() }),
        }
    }

    /// Returns a point-in-time view of all attached consumers.
    ///
    /// The snapshot holds `Arc` handles only; the map lock is released
    /// before the caller starts offering messages.
    pub async fn snapshot(&self) -> Vec<ConsumerRef> {
        let consumers = self.consumers.read().await;
        consumers.values().cloned().collect()
    }

    /// Returns the number of attached consumers.
    pub async fn len(&self) -> usize {
        self.consumers.read().await.len()
    }

    /// Returns true if no consumer is attached.
    pub async fn is_empty(&self) -> bool {
        self.consumers.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumers::LinkConsumer;

    fn registry() -> Arc<ConsumerRegistry> {
        ConsumerRegistry::new("orders".into(), Bus::new(16))
    }

    #[tokio::test]
    async fn test_attach_then_snapshot() {
        let reg = registry();
        let (a, _rx_a) = LinkConsumer::new("a", 1);
        let (b, _rx_b) = LinkConsumer::new("b", 1);
        reg.attach(a).await.unwrap();
        reg.attach(b).await.unwrap();

        let snap = reg.snapshot().await;
        assert_eq!(snap.len(), 2);
        assert_eq!(reg.len().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_attach_rejected_and_registry_unchanged() {
        let reg = registry();
        let (a1, _rx1) = LinkConsumer::new("a", 1);
        let (a2, _rx2) = LinkConsumer::new("a", 1);
        reg.attach(a1).await.unwrap();

        let err = reg.attach(a2).await.unwrap_err();
        assert_eq!(err.as_label(), "consumer_exists");
        assert_eq!(reg.len().await, 1);
    }

    #[tokio::test]
    async fn test_detach_unknown_id() {
        let reg = registry();
        // `unwrap_err` needs the Ok side to be Debug, which `dyn Consumer`
        // is not; destructure instead.
        let err = match reg.detach("ghost").await {
            Ok(_) => panic!("detach of an unknown id must fail"),
            Err(err) => err,
        };
        assert_eq!(err.as_label(), "consumer_not_found");
    }

    #[tokio::test]
    async fn test_attach_detach_publish_events() {
        let bus = Bus::new(16);
        let reg = ConsumerRegistry::new("orders".into(), bus.clone());
        let mut rx = bus.subscribe();

        let (a, _rx_a) = LinkConsumer::new("a", 1);
        reg.attach(a).await.unwrap();
        reg.detach("a").await.unwrap();

        let attached = rx.recv().await.unwrap();
        assert_eq!(attached.kind, EventKind::ConsumerAttached);
        assert_eq!(attached.consumer.as_deref(), Some("a"));
        assert_eq!(attached.subscription.as_deref(), Some("orders"));

        let detached = rx.recv().await.unwrap();
        assert_eq!(detached.kind, EventKind::ConsumerDetached);
    }

    #[tokio::test]
    async fn test_snapshot_is_point_in_time() {
        let reg = registry();
        let (a, _rx_a) = LinkConsumer::new("a", 1);
        reg.attach(a).await.unwrap();

        let snap = reg.snapshot().await;
        reg.detach("a").await.unwrap();

        // The snapshot still holds the handle taken before detach.
        assert_eq!(snap.len(), 1);
        assert!(reg.is_empty().await);
    }
}
