//! # Observer contract for the dispatch event stream.
//!
//! Anything that wants to watch dispatch decisions (log pipelines, metric
//! counters, audit sinks) implements [`Subscribe`] and is registered with
//! the topic at construction time. The runtime gives each observer its own
//! lane: a bounded queue drained by a dedicated task, so a slow observer
//! can fall behind without stalling dispatch or its peers.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use subflow::{Event, EventKind, Subscribe};
//!
//! struct DeadLetterAlert;
//!
//! #[async_trait]
//! impl Subscribe for DeadLetterAlert {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::DeadLetterFailed | EventKind::ReEnqueueFailed) {
//!             // page someone, bump a counter, ...
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "dead-letter-alert" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Lane capacity for observers that do not override
/// [`Subscribe::lane_capacity`].
pub const DEFAULT_LANE_CAPACITY: usize = 256;

/// Observer of the dispatch event stream.
///
/// Implementations must not block the executor and should swallow their own
/// errors; an observer that panics has its panic caught by the lane worker
/// and loses only that one event.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event from this observer's lane, in publish order.
    async fn on_event(&self, event: &Event);

    /// Short stable name, used in lag and panic reports.
    fn name(&self) -> &'static str;

    /// Capacity of this observer's lane.
    ///
    /// When the lane is full, new events are dropped for this observer and
    /// counted; the fan-out set exposes the per-lane totals. Clamped to a
    /// minimum of 1.
    fn lane_capacity(&self) -> usize {
        DEFAULT_LANE_CAPACITY
    }
}
