//! Socket event publication
//!
//! Events go to the durable `socket-notification-events` queue, where the socket gateway
//! picks them up and pushes them to connected clients.

use async_trait::async_trait;
use messaging::nats::NatsProducer;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::models::SocketEvent;

pub const SOCKET_QUEUE: &str = "socket-notification-events";
pub const SOCKET_STREAM: &str = "SOCKET_NOTIFICATION_EVENTS";

#[async_trait]
pub trait SocketEventPublisher: Send + Sync {
    /// `true` once the event is persisted on the queue. Never fails.
    async fn publish(&self, event: &SocketEvent) -> bool;
}

/// JetStream-backed publisher; `None` producer means the broker was unavailable at startup
pub struct NatsSocketPublisher {
    producer: Option<NatsProducer>,
}

impl NatsSocketPublisher {
    pub fn new(producer: NatsProducer) -> Self {
        Self {
            producer: Some(producer),
        }
    }

    pub fn disconnected() -> Self {
        Self { producer: None }
    }
}

#[async_trait]
impl SocketEventPublisher for NatsSocketPublisher {
    async fn publish(&self, event: &SocketEvent) -> bool {
        let Some(producer) = &self.producer else {
            warn!(
                user_id = %event.user_id,
                event_type = %event.event_type,
                "Socket channel unavailable, event dropped"
            );
            return false;
        };

        match producer.publish_json(event).await {
            Ok(sequence) => {
                debug!(
                    user_id = %event.user_id,
                    event_type = %event.event_type,
                    sequence,
                    "Socket event published"
                );
                true
            }
            Err(e) => {
                error!(
                    user_id = %event.user_id,
                    event_type = %event.event_type,
                    error = %e,
                    "Failed to publish socket event"
                );
                false
            }
        }
    }
}

/// Keeps published events in memory
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<SocketEvent>>,
    unavailable: AtomicBool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn events(&self) -> Vec<SocketEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl SocketEventPublisher for RecordingPublisher {
    async fn publish(&self, event: &SocketEvent) -> bool {
        if self.unavailable.load(Ordering::SeqCst) {
            return false;
        }
        self.events.lock().await.push(event.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SocketEventType;

    fn event() -> SocketEvent {
        SocketEvent {
            user_id: "u1".into(),
            notification: None,
            unread_count: 2,
            event_type: SocketEventType::NotificationUpdated,
        }
    }

    #[tokio::test]
    async fn test_disconnected_publisher_reports_failure() {
        assert!(!NatsSocketPublisher::disconnected().publish(&event()).await);
    }

    #[tokio::test]
    async fn test_recording_publisher() {
        let publisher = RecordingPublisher::new();
        assert!(publisher.publish(&event()).await);

        publisher.set_unavailable(true);
        assert!(!publisher.publish(&event()).await);
        assert_eq!(publisher.events().await.len(), 1);
    }
}
