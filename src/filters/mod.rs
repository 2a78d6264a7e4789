//! Correlation filtering.
//!
//! A subscription owns an ordered set of [`CorrelationFilter`] rules. The
//! dispatch engine asks [`matches`] whether an incoming message passes that
//! set before any consumer is considered.
//!
//! ## Rules
//! - Empty filter set → every message passes.
//! - Filters flagged **system** are reserved for broker-internal properties
//!   and are skipped, never treated as a blocking mismatch.
//! - All remaining filters must match (logical AND); evaluation
//!   short-circuits on the first miss.
//! - Evaluation is a pure predicate: a filtered-out message is dropped from
//!   this subscription's delivery path with no side effect.

mod correlation;

pub use correlation::{matches, CorrelationFilter};
