//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and the demos.
//!
//! ## Output format
//! ```text
//! [filtered] sub=orders msg=12
//! [offer] sub=orders msg=12 consumer=link-1 accepted=false
//! [delivered] sub=orders msg=12 consumer=link-2
//! [exhausted] sub=orders msg=12 count=1
//! [max-delivery] sub=orders msg=12 count=2
//! [re-enqueued] sub=orders msg=12 count=2
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Not intended for production use —
/// implement a custom [`Subscribe`] for structured logging or metrics.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let sub = e.subscription.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::MessageFiltered => {
                println!("[filtered] sub={sub} msg={:?}", e.message_seq);
            }
            EventKind::DeliveryAttempted => {
                println!(
                    "[offer] sub={sub} msg={:?} consumer={:?} accepted={:?}",
                    e.message_seq, e.consumer, e.accepted
                );
            }
            EventKind::MessageDelivered => {
                println!(
                    "[delivered] sub={sub} msg={:?} consumer={:?}",
                    e.message_seq, e.consumer
                );
            }
            EventKind::DeliveryExhausted => {
                println!(
                    "[exhausted] sub={sub} msg={:?} count={:?}",
                    e.message_seq, e.delivery_count
                );
            }
            EventKind::MaxDeliveryReached => {
                println!(
                    "[max-delivery] sub={sub} msg={:?} count={:?}",
                    e.message_seq, e.delivery_count
                );
            }
            EventKind::DeadLettered => {
                println!("[dead-lettered] sub={sub} msg={:?}", e.message_seq);
            }
            EventKind::DeadLetterFailed => {
                println!("[dead-letter-failed] sub={sub} msg={:?}", e.message_seq);
            }
            EventKind::ReEnqueued => {
                println!(
                    "[re-enqueued] sub={sub} msg={:?} count={:?}",
                    e.message_seq, e.delivery_count
                );
            }
            EventKind::ReEnqueueFailed => {
                println!(
                    "[re-enqueue-failed] sub={sub} msg={:?} count={:?}",
                    e.message_seq, e.delivery_count
                );
            }
            EventKind::MessageReturned => {
                println!(
                    "[returned] sub={sub} msg={:?} count={:?}",
                    e.message_seq, e.delivery_count
                );
            }
            EventKind::ConsumerAttached => {
                println!("[attached] sub={sub} consumer={:?}", e.consumer);
            }
            EventKind::ConsumerDetached => {
                println!("[detached] sub={sub} consumer={:?}", e.consumer);
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::AllStoppedWithinGrace => {
                println!("[all-stopped-within-grace]");
            }
            EventKind::GraceExceeded => {
                println!("[grace-exceeded]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
