//! Dispatch core: per-subscription delivery orchestration.
//!
//! Internal modules:
//! - [`engine`]: the per-message dispatch algorithm and the worker loop
//!   (filter → fair candidates → offer loop → outcome);
//! - [`outcome`]: dead-letter threshold check and unconditional re-enqueue
//!   for messages no consumer accepted;
//! - [`subscription`]: wires config, registry, queue handle and bus into a
//!   spawnable dispatch worker;
//! - [`topic`]: fans published messages out to subscriptions and drives
//!   graceful shutdown.
//!
//! ## System wiring
//! ```text
//! Topic::publish(msg)
//!    ├──► Subscription "alpha" inbox ──► DispatchEngine::run (worker task)
//!    └──► Subscription "beta"  inbox ──► DispatchEngine::run (worker task)
//!
//! per message:
//!   filters::matches? ── no ──► Event(MessageFiltered), done
//!        │ yes
//!   registry.snapshot() ──► select_candidates() ──► try_deliver each
//!        │                                             │ first accept
//!        │                                             ▼
//!        │                                     Event(MessageDelivered)
//!        ▼ none accepted
//!   outcome::handle_undelivered
//!        ├─ count >= max ──► queue.try_dead_letter   (reported either way)
//!        └─ always ────────► queue.try_re_enqueue    (count bumped first)
//! ```

mod engine;
mod outcome;
mod subscription;
mod topic;

pub use engine::DispatchEngine;
pub use subscription::Subscription;
pub use topic::Topic;
