//! Durable pull consumer for one queue.

use super::stream::ensure_stream;
use super::NatsError;
use crate::{Disposition, QueueConfig};
use async_nats::jetstream::consumer::pull::Config as PullConfig;
use async_nats::jetstream::consumer::{AckPolicy, Consumer};
use async_nats::jetstream::{AckKind, Context};
use futures::StreamExt;
use tracing::{info, warn};

pub struct NatsConsumer {
    consumer: Consumer<PullConfig>,
    config: QueueConfig,
}

impl NatsConsumer {
    /// Provision the queue's stream and durable consumer, creating whatever is missing.
    pub async fn bind(jetstream: &Context, config: QueueConfig) -> Result<Self, NatsError> {
        let stream = ensure_stream(jetstream, &config.stream_name, &config.queue).await?;

        let consumer = stream
            .get_or_create_consumer(
                &config.durable_name,
                PullConfig {
                    durable_name: Some(config.durable_name.clone()),
                    ack_policy: AckPolicy::Explicit,
                    ack_wait: config.ack_wait,
                    max_deliver: config.max_deliver,
                    filter_subject: config.queue.clone(),
                    ..Default::default()
                },
            )
            .await
            .map_err(NatsError::from_jetstream_error)?;

        info!(
            queue = %config.queue,
            consumer = %config.durable_name,
            "Bound durable consumer"
        );

        Ok(Self { consumer, config })
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Pull up to `batch_size` messages, waiting at most `fetch_timeout`.
    pub async fn fetch(&self) -> Result<Vec<NatsMessage>, NatsError> {
        let mut batch = self
            .consumer
            .fetch()
            .max_messages(self.config.batch_size)
            .expires(self.config.fetch_timeout)
            .messages()
            .await
            .map_err(NatsError::from_jetstream_error)?;

        let mut messages = Vec::new();
        while let Some(next) = batch.next().await {
            match next {
                Ok(message) => messages.push(NatsMessage::new(message)),
                Err(e) => warn!(queue = %self.config.queue, error = %e, "Error receiving message"),
            }
        }

        Ok(messages)
    }
}

/// A message pulled from a queue, pending acknowledgment.
pub struct NatsMessage {
    message: async_nats::jetstream::Message,
    pub sequence: u64,
    pub delivery_count: i64,
}

impl NatsMessage {
    fn new(message: async_nats::jetstream::Message) -> Self {
        let (sequence, delivery_count) = match message.info() {
            Ok(info) => (info.stream_sequence, info.delivered),
            Err(e) => {
                warn!(error = %e, "Failed to read message info");
                (0, 1)
            }
        };
        Self {
            message,
            sequence,
            delivery_count,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.message.payload
    }

    pub fn is_redelivery(&self) -> bool {
        self.delivery_count > 1
    }

    pub async fn ack(&self) -> Result<(), NatsError> {
        self.message.ack().await.map_err(NatsError::consumer_error)
    }

    /// Restart the `ack_wait` timer for a message that is about to be handled.
    pub async fn in_progress(&self) -> Result<(), NatsError> {
        self.message
            .ack_with(AckKind::Progress)
            .await
            .map_err(NatsError::consumer_error)
    }

    /// Reject and ask for redelivery.
    pub async fn nak(&self) -> Result<(), NatsError> {
        self.message
            .ack_with(AckKind::Nak(None))
            .await
            .map_err(NatsError::consumer_error)
    }

    /// Reject without redelivery.
    pub async fn term(&self) -> Result<(), NatsError> {
        self.message
            .ack_with(AckKind::Term)
            .await
            .map_err(NatsError::consumer_error)
    }

    pub async fn settle(&self, disposition: Disposition) -> Result<(), NatsError> {
        match disposition {
            Disposition::Ack => self.ack().await,
            Disposition::Term => self.term().await,
            Disposition::Nak => self.nak().await,
        }
    }
}
