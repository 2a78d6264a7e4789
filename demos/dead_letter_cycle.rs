//! # Dead-Letter Cycle Example
//!
//! Drives a message through the redelivery cycle by hand: a subscription
//! with no consumers, max_delivery_count = 2, and a queue-reader loop that
//! pumps re-enqueued messages back into the dispatch worker until the
//! threshold trips and the message lands in the dead-letter store.
//!
//! ## Run
//! ```bash
//! cargo run --example dead_letter_cycle --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use subflow::{Config, InMemoryQueue, LogWriter, Message, SubscriptionConfig, Topic};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut topic = Topic::new(
        "billing",
        Config::default(),
        vec![Arc::new(LogWriter) as _],
    );

    let queue = Arc::new(InMemoryQueue::new());
    let sub = topic.add_subscription(
        SubscriptionConfig::new("invoices", Vec::new(), 2),
        Arc::clone(&queue) as _,
    );
    println!("subscription {:?} has no consumers; every pass exhausts", sub.name());

    topic.publish(Message::new(1, Bytes::from_static(b"invoice"))).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Queue-reader loop: feed re-enqueued messages back until the message
    // has been dead-lettered and the pending side stays quiet.
    for _pass in 0..4 {
        while let Some(msg) = queue.pop_pending() {
            println!(
                "pumping msg {} back (delivery_count={})",
                msg.seq(),
                msg.delivery_count()
            );
            topic.publish(msg).await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        if queue.dead_letter_len() > 0 {
            break;
        }
    }

    println!();
    println!("dead-letter store:");
    for msg in queue.dead_letters() {
        println!(
            " └─► msg {} after {} delivery attempts",
            msg.seq(),
            msg.delivery_count()
        );
    }

    topic.shutdown().await?;
    Ok(())
}
