//! Queue definitions and consumer settings.

use std::time::Duration;

/// Compile-time description of a durable queue.
///
/// The queue name doubles as the subject publishers use.
///
/// ```rust,ignore
/// struct EmailQueue;
///
/// impl QueueDef for EmailQueue {
///     const QUEUE: &'static str = "email-notifications";
///     const STREAM_NAME: &'static str = "EMAIL_NOTIFICATIONS";
///     const DURABLE_NAME: &'static str = "email-notifications-consumer";
/// }
/// ```
pub trait QueueDef {
    /// Queue name, published to as a subject
    const QUEUE: &'static str;

    /// Backing stream name
    const STREAM_NAME: &'static str;

    /// Durable consumer name shared by every worker instance
    const DURABLE_NAME: &'static str;
}

/// Runtime settings for one queue consumer.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub queue: String,
    pub stream_name: String,
    pub durable_name: String,

    /// Messages pulled per fetch; still handled one at a time.
    ///
    /// Every message in a batch is delivered at fetch time, so handling the whole batch has to
    /// fit inside `ack_wait` or the tail of the batch is redelivered while still queued locally.
    pub batch_size: usize,

    /// How long a fetch waits for messages
    pub fetch_timeout: Duration,

    /// Redelivery timer for messages left unacknowledged (crashed consumer)
    pub ack_wait: Duration,

    /// Upper bound on deliveries of a single message
    pub max_deliver: i64,

    /// Nak transient failures instead of terminating them
    pub requeue_transient: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue: "default".to_string(),
            stream_name: "DEFAULT".to_string(),
            durable_name: "default-consumer".to_string(),
            batch_size: 1,
            fetch_timeout: Duration::from_secs(5),
            ack_wait: Duration::from_secs(30),
            max_deliver: 3,
            requeue_transient: false,
        }
    }
}

impl QueueConfig {
    pub fn from_def<D: QueueDef>() -> Self {
        Self {
            queue: D::QUEUE.to_string(),
            stream_name: D::STREAM_NAME.to_string(),
            durable_name: D::DURABLE_NAME.to_string(),
            ..Default::default()
        }
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_ack_wait(mut self, ack_wait: Duration) -> Self {
        self.ack_wait = ack_wait;
        self
    }

    pub fn with_max_deliver(mut self, max_deliver: i64) -> Self {
        self.max_deliver = max_deliver;
        self
    }

    pub fn with_requeue_transient(mut self, requeue: bool) -> Self {
        self.requeue_transient = requeue;
        self
    }
}
