//! Prometheus metrics for queue workers.

use crate::Disposition;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

#[derive(Clone)]
pub struct QueueMetrics {
    queue: String,
    handler: String,
}

impl QueueMetrics {
    pub fn new(queue: &str, handler: &str) -> Self {
        Self {
            queue: queue.to_string(),
            handler: handler.to_string(),
        }
    }

    pub fn message_received(&self) {
        counter!(
            "queue_messages_received_total",
            "queue" => self.queue.clone(),
            "handler" => self.handler.clone()
        )
        .increment(1);
    }

    pub fn message_settled(&self, disposition: Disposition, duration: Duration) {
        counter!(
            "queue_messages_settled_total",
            "queue" => self.queue.clone(),
            "handler" => self.handler.clone(),
            "disposition" => disposition.to_string()
        )
        .increment(1);

        histogram!(
            "queue_message_duration_seconds",
            "queue" => self.queue.clone(),
            "handler" => self.handler.clone()
        )
        .record(duration.as_secs_f64());
    }
}

/// Install the global Prometheus recorder.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}
