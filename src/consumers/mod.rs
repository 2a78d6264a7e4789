//! Consumers: the delivery targets of a subscription.
//!
//! ## Contents
//! - [`Consumer`] — object-safe capability trait the dispatch engine calls
//!   (`try_deliver`, `received_count`, `is_draining`)
//! - [`LinkConsumer`] — shipped implementation over a bounded channel whose
//!   free capacity acts as the credit window
//! - [`ConsumerRegistry`] — attach/detach map, mutated by the link
//!   lifecycle, read by dispatch through point-in-time snapshots
//! - [`select_candidates`] — fair ordering of active consumers
//!
//! ## Quick wiring
//! ```text
//! link lifecycle ──► ConsumerRegistry::attach / detach
//!                                 │
//! DispatchEngine ──► snapshot() ──┴──► select_candidates() ──► offer loop
//! ```
//!
//! The drain flag is the authoritative delivery gate: a consumer that began
//! draining is never offered work even while it is still present in the map.

mod consumer;
mod registry;
mod selector;

pub use consumer::{Consumer, ConsumerRef, LinkConsumer};
pub use registry::ConsumerRegistry;
pub use selector::select_candidates;
