//! # Fan-out of dispatch events to observer lanes.
//!
//! One lane per observer: a bounded queue plus a worker task that feeds the
//! observer one event at a time. [`SubscriberSet::emit`] never waits. A full
//! lane drops the event for that observer only and moves the lane's drop
//! counter instead, so observer lag is visible through
//! [`SubscriberSet::dropped`] without ever backpressuring dispatch.
//!
//! Observer panics are caught by the lane worker; the lane loses that one
//! event and keeps draining.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::Event;

use super::Subscribe;

/// One observer's bounded queue and drop accounting.
struct Lane {
    name: &'static str,
    feed: mpsc::Sender<Arc<Event>>,
    dropped: AtomicU64,
}

/// Fan-out over the registered observers.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    // Keeps the lane workers tied to the set's lifetime.
    #[allow(dead_code)]
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Builds a lane and a worker task for every observer.
    #[must_use]
    pub fn new(observers: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut lanes = Vec::with_capacity(observers.len());
        let mut workers = Vec::with_capacity(observers.len());

        for observer in observers {
            let (feed, rx) = mpsc::channel(observer.lane_capacity().max(1));
            lanes.push(Lane {
                name: observer.name(),
                feed,
                dropped: AtomicU64::new(0),
            });
            workers.push(Self::drain_lane(observer, rx));
        }

        Self { lanes, workers }
    }

    fn drain_lane(
        observer: Arc<dyn Subscribe>,
        mut feed: mpsc::Receiver<Arc<Event>>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = feed.recv().await {
                let call = AssertUnwindSafe(observer.on_event(&event)).catch_unwind();
                if call.await.is_err() {
                    eprintln!(
                        "subflow: observer `{}` panicked on event {}; lane continues",
                        observer.name(),
                        event.seq
                    );
                }
            }
        })
    }

    /// Returns the number of registered observers.
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Returns true if no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Per-observer count of events dropped on a full or closed lane.
    pub fn dropped(&self) -> Vec<(&'static str, u64)> {
        self.lanes
            .iter()
            .map(|lane| (lane.name, lane.dropped.load(Ordering::Relaxed)))
            .collect()
    }

    /// Hands one event to every lane without waiting.
    ///
    /// A lane that cannot take the event (full, or its worker is gone)
    /// drops it and is counted; other lanes are unaffected.
    pub fn emit(&self, event: &Event) {
        let shared = Arc::new(event.clone());
        for lane in &self.lanes {
            if lane.feed.try_send(Arc::clone(&shared)).is_err() {
                let total = lane.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                eprintln!(
                    "subflow: observer `{}` lane full, event {} dropped ({total} total)",
                    lane.name, shared.seq
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct Counting {
        seen: AtomicUsize,
    }

    #[async_trait]
    impl Subscribe for Counting {
        async fn on_event(&self, _event: &Event) {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    struct Panicking;

    #[async_trait]
    impl Subscribe for Panicking {
        async fn on_event(&self, _event: &Event) {
            panic!("boom");
        }

        fn name(&self) -> &'static str {
            "panicking"
        }
    }

    /// Never finishes an event, so its lane backs up immediately.
    struct Stuck;

    #[async_trait]
    impl Subscribe for Stuck {
        async fn on_event(&self, _event: &Event) {
            futures::future::pending::<()>().await;
        }

        fn name(&self) -> &'static str {
            "stuck"
        }

        fn lane_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn test_emit_reaches_every_observer() {
        let a = Arc::new(Counting {
            seen: AtomicUsize::new(0),
        });
        let b = Arc::new(Counting {
            seen: AtomicUsize::new(0),
        });
        let set = SubscriberSet::new(vec![a.clone() as _, b.clone() as _]);

        for _ in 0..3 {
            set.emit(&Event::new(EventKind::ShutdownRequested));
        }

        // Lane workers drain asynchronously.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(a.seen.load(Ordering::SeqCst), 3);
        assert_eq!(b.seen.load(Ordering::SeqCst), 3);
        assert_eq!(set.dropped(), vec![("counting", 0), ("counting", 0)]);
    }

    #[tokio::test]
    async fn test_panicking_observer_is_isolated() {
        let healthy = Arc::new(Counting {
            seen: AtomicUsize::new(0),
        });
        let set = SubscriberSet::new(vec![Arc::new(Panicking) as _, healthy.clone() as _]);

        set.emit(&Event::new(EventKind::ShutdownRequested));
        set.emit(&Event::new(EventKind::ShutdownRequested));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(healthy.seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_full_lane_drops_and_counts() {
        let set = SubscriberSet::new(vec![Arc::new(Stuck) as _]);

        // On the current-thread scheduler the lane worker has not run yet,
        // so the capacity-1 lane holds the first event and the rest drop.
        for _ in 0..3 {
            set.emit(&Event::new(EventKind::ShutdownRequested));
        }

        assert_eq!(set.dropped(), vec![("stuck", 2)]);
    }
}
