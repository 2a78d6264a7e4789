//! Dispatch events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to structured events emitted by the dispatch engine,
//! the consumer registry, the outcome handler, and the topic runtime.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `DispatchEngine`, `ConsumerRegistry`, `outcome`
//!   handling, `Topic` shutdown.
//! - **Consumers**: the topic's subscriber listener (fans out to
//!   `SubscriberSet`) and any direct `Bus::subscribe` receiver in tests.
//!
//! Every branch a message can take — filtered out, delivered, exhausted,
//! dead-letter attempt, re-enqueue attempt — produces exactly one event
//! keyed by the message's sequence id and the subscription name, so a
//! message's path is reconstructible post-hoc from the event stream alone.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
