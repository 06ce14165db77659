use super::NatsError;
use async_nats::jetstream::stream::{Config as StreamConfig, RetentionPolicy, StorageType};
use async_nats::jetstream::Context;
use tracing::debug;

/// Create the stream backing `queue` if it does not exist yet.
///
/// Streams are file-backed so queued messages survive a broker restart.
pub async fn ensure_stream(
    jetstream: &Context,
    stream_name: &str,
    queue: &str,
) -> Result<async_nats::jetstream::stream::Stream, NatsError> {
    let stream = jetstream
        .get_or_create_stream(StreamConfig {
            name: stream_name.to_string(),
            subjects: vec![queue.to_string()],
            storage: StorageType::File,
            retention: RetentionPolicy::WorkQueue,
            ..Default::default()
        })
        .await
        .map_err(NatsError::from_jetstream_error)?;

    debug!(stream = %stream_name, queue = %queue, "Stream ready");
    Ok(stream)
}
