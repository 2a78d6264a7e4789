//! Observers of the dispatch event stream.
//!
//! The topic tails its event bus and hands every event to a
//! [`SubscriberSet`], which fans it out across one lane per registered
//! [`Subscribe`] implementation. Lanes are bounded and drained by dedicated
//! worker tasks, giving three properties the dispatch path relies on:
//!
//! - publishing an event never waits on an observer;
//! - a lagging observer loses its own events (counted per lane), nobody
//!   else's;
//! - a panicking observer is contained to its lane worker.
//!
//! [`LogWriter`] (behind the `logging` feature) is a ready-made observer
//! that prints each event as one line.

mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscriber::{Subscribe, DEFAULT_LANE_CAPACITY};

#[cfg(feature = "logging")]
pub use log::LogWriter;
