//! # Basic Dispatch Example
//!
//! Publishes a handful of messages to a topic with two subscriptions:
//! one filtered to a region, one unfiltered. Two consumers share the
//! unfiltered subscription so the fair selector's balancing is visible
//! in the log output.
//!
//! ## Run
//! ```bash
//! cargo run --example basic_dispatch --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use subflow::{
    Config, Consumer, CorrelationFilter, InMemoryQueue, LinkConsumer, LogWriter, Message,
    SubscriptionConfig, Topic,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut topic = Topic::new(
        "orders",
        Config::default(),
        vec![Arc::new(LogWriter) as _],
    );

    let eu_orders = topic.add_subscription(
        SubscriptionConfig::new("eu-orders", vec![CorrelationFilter::new("region", "eu")], 5),
        Arc::new(InMemoryQueue::new()),
    );
    let all_orders = topic.add_subscription(
        SubscriptionConfig::unfiltered("all-orders"),
        Arc::new(InMemoryQueue::new()),
    );

    let (eu_link, mut eu_inbox) = LinkConsumer::new("eu-worker", 16);
    eu_orders.attach(eu_link.clone()).await?;

    let (fast, mut fast_inbox) = LinkConsumer::new("fast-worker", 16);
    let (slow, mut slow_inbox) = LinkConsumer::new("slow-worker", 16);
    all_orders.attach(fast.clone()).await?;
    all_orders.attach(slow.clone()).await?;

    for seq in 1..=6u64 {
        let region = if seq % 2 == 0 { "eu" } else { "us" };
        topic
            .publish(Message::new(seq, Bytes::from_static(b"order")).with_property("region", region))
            .await;
    }

    // Let the workers drain their inboxes.
    tokio::time::sleep(Duration::from_millis(100)).await;

    while let Ok(msg) = eu_inbox.try_recv() {
        println!("eu-worker got msg {}", msg.seq());
    }
    while let Ok(msg) = fast_inbox.try_recv() {
        println!("fast-worker got msg {}", msg.seq());
    }
    while let Ok(msg) = slow_inbox.try_recv() {
        println!("slow-worker got msg {}", msg.seq());
    }

    println!();
    println!("received counts:");
    println!(" ├─► eu-worker:   {}", eu_link.received_count());
    println!(" ├─► fast-worker: {}", fast.received_count());
    println!(" └─► slow-worker: {}", slow.received_count());

    topic.shutdown().await?;
    Ok(())
}
