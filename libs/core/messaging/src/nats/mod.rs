//! NATS JetStream backend.
//!
//! Every queue is a file-backed work-queue stream whose single subject is the queue name.
//! Consumers are durable pull consumers with explicit acknowledgment, so a message stays
//! pending until the worker acks or terminates it. Messages left unacknowledged by a crashed
//! worker are redelivered after `ack_wait`, up to `max_deliver` times.

mod consumer;
mod error;
pub mod metrics;
mod producer;
mod stream;
mod worker;

pub use consumer::{NatsConsumer, NatsMessage};
pub use error::NatsError;
pub use metrics::{init_metrics, QueueMetrics};
pub use producer::NatsProducer;
pub use stream::ensure_stream;
pub use worker::QueueWorker;

use async_nats::jetstream::Context;
use tracing::info;

/// Connect to NATS and open a JetStream context.
pub async fn connect(url: &str) -> Result<(async_nats::Client, Context), NatsError> {
    info!(url = %url, "Connecting to NATS");
    let client = async_nats::connect(url).await?;
    let jetstream = async_nats::jetstream::new(client.clone());
    info!("Connected to NATS JetStream");
    Ok((client, jetstream))
}
