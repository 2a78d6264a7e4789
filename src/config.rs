//! # Runtime and subscription configuration.
//!
//! Two configuration layers:
//! 1. [`Config`] — global runtime knobs (bus capacity, worker inbox depth,
//!    shutdown grace) used when wiring a [`Topic`](crate::Topic).
//! 2. [`SubscriptionConfig`] — immutable per-subscription settings: name,
//!    correlation filter set, maximum delivery count.
//!
//! ## Sentinel values
//! - `bus_capacity` and `inflight_capacity` are clamped to a minimum of 1.
//! - `grace = 0s` → shutdown does not wait; stuck workers are reported
//!   immediately.

use std::sync::Arc;
use std::time::Duration;

use crate::filters::CorrelationFilter;

/// Global configuration for the dispatch runtime.
///
/// ## Field semantics
/// - `grace`: maximum wait for subscription workers to stop on shutdown
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by `Bus`)
/// - `inflight_capacity`: bounded inbox depth between the queue-reader side
///   and each subscription's dispatch worker
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for graceful shutdown before reporting stuck workers.
    ///
    /// When shutdown is requested:
    /// - Workers are cancelled via `CancellationToken`; each finishes its
    ///   in-flight message first.
    /// - The topic waits up to `grace` for workers to exit.
    /// - On timeout it returns `RuntimeError::GraceExceeded`.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events will
    /// receive `Lagged` and skip older items. Minimum value is 1.
    pub bus_capacity: usize,

    /// Capacity of each subscription worker's message inbox.
    ///
    /// Bounds how far the queue-reader side can run ahead of dispatch.
    /// Minimum value is 1.
    pub inflight_capacity: usize,
}

impl Config {
    /// Returns the bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the inbox capacity clamped to a minimum of 1.
    #[inline]
    pub fn inflight_capacity_clamped(&self) -> usize {
        self.inflight_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 30s`
    /// - `bus_capacity = 1024`
    /// - `inflight_capacity = 64`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(30),
            bus_capacity: 1024,
            inflight_capacity: 64,
        }
    }
}

/// Immutable configuration of one subscription.
///
/// Shared by reference: the dispatch engine, the registry, and the topic all
/// hold the same `Arc<SubscriptionConfig>`.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Display name, used in events only — never in dispatch logic.
    pub name: Arc<str>,

    /// Ordered correlation filter set.
    ///
    /// Empty → every message matches. Non-empty → all non-system filters
    /// must match (logical AND).
    pub filters: Vec<CorrelationFilter>,

    /// Delivery-count threshold at which an undeliverable message is moved
    /// to the dead-letter channel.
    pub max_delivery_count: u32,
}

impl SubscriptionConfig {
    /// Creates a subscription configuration.
    pub fn new(
        name: impl Into<Arc<str>>,
        filters: Vec<CorrelationFilter>,
        max_delivery_count: u32,
    ) -> Self {
        Self {
            name: name.into(),
            filters,
            max_delivery_count,
        }
    }

    /// Creates a configuration with no filters and the default threshold.
    pub fn unfiltered(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, Vec::new(), Self::DEFAULT_MAX_DELIVERY_COUNT)
    }

    /// Default maximum delivery count, mirroring common broker defaults.
    pub const DEFAULT_MAX_DELIVERY_COUNT: u32 = 10;
}
