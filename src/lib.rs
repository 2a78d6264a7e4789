//! # subflow
//!
//! **Subflow** is the subscription-level dispatch engine of a topic-based
//! message broker: correlation filtering, fair consumer selection,
//! redelivery tracking and dead-lettering, as a reusable building block for
//! broker frontends and emulators.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                      Topic::publish(msg)
//!                ┌────────────┴────────────┐
//!                ▼                         ▼
//!      ┌──────────────────┐     ┌──────────────────┐
//!      │ Subscription A   │     │ Subscription B   │
//!      │ (filters, maxDC) │     │ (filters, maxDC) │
//!      └───────┬──────────┘     └───────┬──────────┘
//!              ▼ inbox (bounded)        ▼
//!      ┌──────────────────┐     ┌──────────────────┐
//!      │ DispatchEngine   │     │ DispatchEngine   │
//!      │  (worker task)   │     │  (worker task)   │
//!      └───────┬──────────┘     └──────────────────┘
//!              │ per message:
//!              ├─► filters::matches?  ─ no ─► drop (filtered out)
//!              ├─► registry snapshot → fair candidate order
//!              ├─► offer to each candidate until one accepts
//!              └─► none accepted:
//!                    ├─► count >= max → queue.try_dead_letter
//!                    └─► always       → queue.try_re_enqueue (count+1)
//!
//!  every branch ── publish(Event) ──► Bus ──► SubscriberSet ──► observers
//! ```
//!
//! ### Per-message lifecycle
//! ```text
//! Enqueued ─► [filter] ─► Dropped (no match, terminal)
//!                      ─► Offered ─► Delivered (terminal)
//!                                 ─► Undelivered ─► {DeadLettered?} + Re-enqueued ─► Enqueued
//! ```
//!
//! ## Guarantees
//! | Concern            | Behavior                                                          |
//! |--------------------|-------------------------------------------------------------------|
//! | **Filtering**      | Empty set matches all; non-system filters AND together; system filters are inert. |
//! | **Fairness**       | Lowest received count is offered first; draining consumers are excluded; ties are deterministic. |
//! | **Delivery**       | At most one consumer accepts per pass; messages are processed one at a time per subscription. |
//! | **Redelivery**     | Delivery count is monotonic; at the threshold the message is dead-lettered, and re-enqueue is attempted regardless. |
//! | **Failure policy** | Queue refusals are events, never errors; the dispatch loop survives any single message's outcome. |
//! | **Shutdown**       | Workers observe cancellation between messages; in-flight messages finish their pass. |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use bytes::Bytes;
//! use subflow::{
//!     Config, CorrelationFilter, InMemoryQueue, LinkConsumer, Message, SubscriptionConfig,
//!     Topic,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut topic = Topic::new("orders", Config::default(), Vec::new());
//!
//!     let queue = Arc::new(InMemoryQueue::new());
//!     let sub = topic.add_subscription(
//!         SubscriptionConfig::new(
//!             "eu-orders",
//!             vec![CorrelationFilter::new("region", "eu")],
//!             5,
//!         ),
//!         queue,
//!     );
//!
//!     let (link, mut inbox) = LinkConsumer::new("worker-1", 16);
//!     sub.attach(link).await?;
//!
//!     topic
//!         .publish(Message::new(1, Bytes::from_static(b"order")).with_property("region", "eu"))
//!         .await;
//!
//!     let delivered = inbox.recv().await.expect("delivery");
//!     assert_eq!(delivered.seq(), 1);
//!
//!     topic.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod consumers;
mod dispatch;
mod error;
mod events;
mod message;
mod queue;
mod subscribers;

pub mod filters;

// ---- Public re-exports ----

pub use config::{Config, SubscriptionConfig};
pub use consumers::{select_candidates, Consumer, ConsumerRef, ConsumerRegistry, LinkConsumer};
pub use dispatch::{DispatchEngine, Subscription, Topic};
pub use error::{DispatchError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use filters::CorrelationFilter;
pub use message::Message;
pub use queue::{InMemoryQueue, MessageQueue};
pub use subscribers::{Subscribe, SubscriberSet, DEFAULT_LANE_CAPACITY};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
