use async_trait::async_trait;
use domain_notifications::{CreateNotification, NotificationRepository, NotificationService};
use messaging::{MessageHandler, ProcessingError};
use tracing::{error, info, instrument};

/// Stores notifications published directly by other services.
///
/// Store failures are logged and the message is still acknowledged.
pub struct NotificationEventHandler<R: NotificationRepository> {
    notifications: NotificationService<R>,
}

impl<R: NotificationRepository> NotificationEventHandler<R> {
    pub fn new(notifications: NotificationService<R>) -> Self {
        Self { notifications }
    }
}

#[async_trait]
impl<R: NotificationRepository + 'static> MessageHandler for NotificationEventHandler<R> {
    type Message = CreateNotification;

    fn name(&self) -> &'static str {
        "notification-events"
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    async fn handle(&self, input: CreateNotification) -> Result<(), ProcessingError> {
        match self.notifications.create_notification(input).await {
            Ok(notification) => {
                info!(notification_id = %notification.id, "Notification event stored")
            }
            Err(e) => error!(error = %e, "Failed to store notification event"),
        }
        Ok(())
    }
}
