//! Per-queue worker loop.

use super::consumer::{NatsConsumer, NatsMessage};
use super::metrics::QueueMetrics;
use super::NatsError;
use crate::{dispatch, MessageHandler, QueueConfig};
use async_nats::jetstream::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Consumes one queue, handing messages to `H` strictly one at a time.
///
/// Run one worker per queue on its own task; a slow or failing queue never holds up another.
pub struct QueueWorker<H: MessageHandler> {
    consumer: NatsConsumer,
    handler: Arc<H>,
    metrics: QueueMetrics,
}

impl<H: MessageHandler> QueueWorker<H> {
    pub async fn new(
        jetstream: &Context,
        handler: Arc<H>,
        config: QueueConfig,
    ) -> Result<Self, NatsError> {
        let metrics = QueueMetrics::new(&config.queue, handler.name());
        let consumer = NatsConsumer::bind(jetstream, config).await?;

        Ok(Self {
            consumer,
            handler,
            metrics,
        })
    }

    pub fn queue(&self) -> &str {
        &self.consumer.config().queue
    }

    /// Run until `shutdown_rx` flips to `true`.
    ///
    /// Only the fetch is interrupted by shutdown; a message already being handled runs to
    /// completion and is settled before the loop exits.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> Result<(), NatsError> {
        info!(
            queue = %self.queue(),
            handler = self.handler.name(),
            "Starting queue worker"
        );

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            let batch = tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                batch = self.consumer.fetch() => batch,
            };

            match batch {
                Ok(messages) => {
                    for message in messages {
                        self.process_message(message).await;
                    }
                }
                Err(e) => {
                    error!(queue = %self.queue(), error = %e, "Failed to fetch messages");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }

        info!(queue = %self.queue(), "Queue worker stopped");
        Ok(())
    }

    async fn process_message(&self, message: NatsMessage) {
        self.metrics.message_received();

        if message.is_redelivery() {
            warn!(
                queue = %self.queue(),
                sequence = message.sequence,
                delivery_count = message.delivery_count,
                "Handling redelivered message"
            );
        }

        if let Err(e) = message.in_progress().await {
            warn!(
                queue = %self.queue(),
                sequence = message.sequence,
                error = %e,
                "Failed to extend ack deadline"
            );
        }

        let start = Instant::now();
        let disposition = dispatch(
            self.handler.as_ref(),
            message.payload(),
            self.consumer.config().requeue_transient,
        )
        .await;

        if let Err(e) = message.settle(disposition).await {
            error!(
                queue = %self.queue(),
                sequence = message.sequence,
                %disposition,
                error = %e,
                "Failed to settle message"
            );
        }

        self.metrics.message_settled(disposition, start.elapsed());
        debug!(
            queue = %self.queue(),
            sequence = message.sequence,
            %disposition,
            "Message settled"
        );
    }
}
