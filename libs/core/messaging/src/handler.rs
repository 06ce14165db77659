//! Handler trait for inbound queue messages.

use crate::error::{Disposition, ProcessingError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

/// Handles one decoded message from a queue.
///
/// Return `Ok(())` once the message has been fully dealt with, including cases the handler
/// chose to drop. Return a [`ProcessingError`] to let its category pick the broker action.
///
/// ```rust,ignore
/// #[async_trait]
/// impl MessageHandler for CustomNotificationHandler {
///     type Message = NotificationEvent;
///
///     fn name(&self) -> &'static str {
///         "notification-events"
///     }
///
///     async fn handle(&self, event: NotificationEvent) -> Result<(), ProcessingError> {
///         self.service.create_notification(event.into()).await
///             .map_err(|e| ProcessingError::transient_with_source("create failed", e))?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait MessageHandler: Send + Sync {
    type Message: DeserializeOwned + Send;

    /// Used in logs and metric labels
    fn name(&self) -> &'static str;

    async fn handle(&self, message: Self::Message) -> Result<(), ProcessingError>;
}

/// Decode `payload` and run it through `handler`.
pub async fn process_payload<H>(handler: &H, payload: &[u8]) -> Result<(), ProcessingError>
where
    H: MessageHandler + ?Sized,
{
    let message = serde_json::from_slice::<H::Message>(payload)?;
    handler.handle(message).await
}

/// Decode, handle, and decide what the broker should do with the message.
pub async fn dispatch<H>(handler: &H, payload: &[u8], requeue_transient: bool) -> Disposition
where
    H: MessageHandler + ?Sized,
{
    match process_payload(handler, payload).await {
        Ok(()) => {
            debug!(handler = handler.name(), "Message handled");
            Disposition::Ack
        }
        Err(e) => {
            let category = e.category();
            let disposition = category.disposition(requeue_transient);
            match disposition {
                Disposition::Ack => {
                    warn!(handler = handler.name(), error = %e, "Dropping malformed message")
                }
                _ => error!(
                    handler = handler.name(),
                    error = %e,
                    %category,
                    %disposition,
                    "Message handling failed"
                ),
            }
            disposition
        }
    }
}
