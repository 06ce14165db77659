//! Inbound queue handlers
//!
//! | queue                 | handler                      |
//! |-----------------------|------------------------------|
//! | `email-notifications` | [`EmailNotificationHandler`] |
//! | `transaction-events`  | [`TransactionEventHandler`]  |
//! | `notification-events` | [`NotificationEventHandler`] |

mod email;
mod notification;
mod transaction;

pub use email::{EmailNotificationHandler, EmailRequest};
pub use notification::NotificationEventHandler;
pub use transaction::{TransactionEvent, TransactionEventHandler, TransactionEventPayload};

use messaging::QueueDef;

pub struct EmailQueue;

impl QueueDef for EmailQueue {
    const QUEUE: &'static str = "email-notifications";
    const STREAM_NAME: &'static str = "EMAIL_NOTIFICATIONS";
    const DURABLE_NAME: &'static str = "email-notifications-worker";
}

pub struct TransactionQueue;

impl QueueDef for TransactionQueue {
    const QUEUE: &'static str = "transaction-events";
    const STREAM_NAME: &'static str = "TRANSACTION_EVENTS";
    const DURABLE_NAME: &'static str = "transaction-events-worker";
}

pub struct NotificationQueue;

impl QueueDef for NotificationQueue {
    const QUEUE: &'static str = "notification-events";
    const STREAM_NAME: &'static str = "NOTIFICATION_EVENTS";
    const DURABLE_NAME: &'static str = "notification-events-worker";
}
