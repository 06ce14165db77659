//! Persistent publisher for one queue.

use super::stream::ensure_stream;
use super::NatsError;
use async_nats::jetstream::Context;
use serde::Serialize;
use tracing::debug;

#[derive(Clone)]
pub struct NatsProducer {
    jetstream: Context,
    stream_name: String,
    queue: String,
}

impl NatsProducer {
    pub fn new(jetstream: Context, stream_name: impl Into<String>, queue: impl Into<String>) -> Self {
        Self {
            jetstream,
            stream_name: stream_name.into(),
            queue: queue.into(),
        }
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    pub async fn ensure_stream(&self) -> Result<(), NatsError> {
        ensure_stream(&self.jetstream, &self.stream_name, &self.queue).await?;
        Ok(())
    }

    /// Publish `value` as JSON and wait for the stream to persist it.
    ///
    /// Returns the stream sequence assigned to the message.
    pub async fn publish_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<u64, NatsError> {
        let payload = serde_json::to_vec(value)?;

        let ack = self
            .jetstream
            .publish(self.queue.clone(), payload.into())
            .await
            .map_err(NatsError::publish_error)?
            .await
            .map_err(NatsError::publish_error)?;

        debug!(
            stream = %self.stream_name,
            queue = %self.queue,
            sequence = ack.sequence,
            "Published message"
        );

        Ok(ack.sequence)
    }
}
