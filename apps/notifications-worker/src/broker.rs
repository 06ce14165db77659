//! NATS wiring for the worker.
//!
//! The broker is optional at startup. Without it the worker serves the REST API, drops socket
//! events and consumes nothing.

use crate::config::BrokerConfig;
use crate::handlers::{
    EmailNotificationHandler, EmailQueue, NotificationEventHandler, NotificationQueue,
    TransactionEventHandler, TransactionQueue,
};
use async_nats::jetstream::Context;
use domain_notifications::{
    NatsSocketPublisher, NotificationRepository, NotificationService, SOCKET_QUEUE, SOCKET_STREAM,
    SocketEventPublisher,
};
use email::EmailDispatchService;
use messaging::nats::{NatsError, NatsProducer, QueueWorker};
use messaging::{MessageHandler, QueueConfig};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, warn};

pub type Workers = JoinSet<Result<(), NatsError>>;

/// Open a JetStream context, or `None` when the broker is unreachable.
pub async fn connect(url: &str) -> Option<Context> {
    match messaging::nats::connect(url).await {
        Ok((_client, jetstream)) => Some(jetstream),
        Err(e) => {
            error!(
                url = %url,
                error = %e,
                "NATS unavailable: queue consumers disabled and socket events dropped. \
                 Check NATS_URL and that the server runs with JetStream enabled (nats-server -js)"
            );
            None
        }
    }
}

/// Socket publisher backed by `jetstream`, or a disconnected one that drops every event.
pub async fn socket_publisher(jetstream: Option<&Context>) -> Arc<dyn SocketEventPublisher> {
    let Some(jetstream) = jetstream else {
        return Arc::new(NatsSocketPublisher::disconnected());
    };

    let producer = NatsProducer::new(jetstream.clone(), SOCKET_STREAM, SOCKET_QUEUE);
    let stream_ready = producer.ensure_stream().await;
    match stream_ready {
        Ok(()) => Arc::new(NatsSocketPublisher::new(producer)),
        Err(e) => {
            warn!(error = %e, "Socket event stream unavailable, events will be dropped");
            Arc::new(NatsSocketPublisher::disconnected())
        }
    }
}

/// Start one worker per queue. A queue whose consumer cannot be bound is skipped.
pub async fn spawn_consumers<R>(
    jetstream: Option<&Context>,
    broker: &BrokerConfig,
    notifications: &NotificationService<R>,
    email: &Arc<EmailDispatchService>,
    shutdown_rx: &watch::Receiver<bool>,
) -> Workers
where
    R: NotificationRepository + 'static,
{
    let mut workers = JoinSet::new();
    let Some(jetstream) = jetstream else {
        return workers;
    };

    spawn_worker(
        &mut workers,
        jetstream,
        EmailNotificationHandler::new(email.clone()),
        broker.queue::<EmailQueue>(),
        shutdown_rx.clone(),
    )
    .await;
    spawn_worker(
        &mut workers,
        jetstream,
        TransactionEventHandler::new(notifications.clone(), email.clone()),
        broker.queue::<TransactionQueue>(),
        shutdown_rx.clone(),
    )
    .await;
    spawn_worker(
        &mut workers,
        jetstream,
        NotificationEventHandler::new(notifications.clone()),
        broker.queue::<NotificationQueue>(),
        shutdown_rx.clone(),
    )
    .await;

    workers
}

async fn spawn_worker<H>(
    workers: &mut Workers,
    jetstream: &Context,
    handler: H,
    queue: QueueConfig,
    shutdown_rx: watch::Receiver<bool>,
) where
    H: MessageHandler + 'static,
{
    let name = queue.queue.clone();
    match QueueWorker::new(jetstream, Arc::new(handler), queue).await {
        Ok(worker) => {
            workers.spawn(async move { worker.run(shutdown_rx).await });
        }
        Err(e) => error!(queue = %name, error = %e, "Failed to bind consumer, queue disabled"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::Fixture;
    use domain_notifications::{
        CreateNotification, InMemoryNotificationRepository, SocketEvent, SocketEventType,
    };

    const UNREACHABLE: &str = "nats://127.0.0.1:1";

    #[tokio::test]
    async fn test_unreachable_broker_yields_no_context() {
        assert!(connect(UNREACHABLE).await.is_none());
    }

    #[tokio::test]
    async fn test_without_broker_nothing_is_consumed() {
        let fixture = Fixture::new().await;
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let workers = spawn_consumers(
            None,
            &BrokerConfig::default(),
            &fixture.notifications,
            &fixture.email,
            &shutdown_rx,
        )
        .await;

        assert!(workers.is_empty());
    }

    #[tokio::test]
    async fn test_without_broker_notifications_are_still_stored() {
        let publisher = socket_publisher(None).await;
        let event = SocketEvent {
            user_id: "user-1".to_string(),
            notification: None,
            unread_count: 0,
            event_type: SocketEventType::NotificationUpdated,
        };
        assert!(!publisher.publish(&event).await);

        let repository = Arc::new(InMemoryNotificationRepository::new());
        let service = NotificationService::from_shared(repository.clone(), publisher);
        let input = CreateNotification {
            user_id: "user-1".to_string(),
            title: "Welcome".to_string(),
            message: "Hello".to_string(),
            ..Default::default()
        };

        service.create_notification(input).await.unwrap();
        assert_eq!(repository.len().await, 1);
    }
}
