use async_trait::async_trait;
use domain_notifications::{
    NotificationError, NotificationRepository, NotificationService, TransactionNotification,
};
use email::{EmailDispatchService, TransactionEmailData};
use messaging::{MessageHandler, ProcessingError};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Transaction event as published upstream.
///
/// Producers disagree on field names, so every alias is accepted here and resolved by
/// [`TransactionEvent::try_from`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEventPayload {
    pub transaction_id: Option<String>,
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub email: Option<String>,
    pub transaction_type: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub amount: Option<Value>,
    pub currency: Option<String>,
    pub tx_hash: Option<String>,
    pub transaction_hash: Option<String>,
    pub reason: Option<String>,
    pub rejection_reason: Option<String>,
    pub timestamp: Option<Value>,
    pub created_at: Option<Value>,
}

/// Normalized transaction event
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionEvent {
    pub transaction_id: String,
    pub user_id: String,
    pub user_email: Option<String>,
    pub transaction_type: String,
    pub status: String,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub tx_hash: Option<String>,
    pub reason: Option<String>,
    pub timestamp: Option<String>,
}

impl TryFrom<TransactionEventPayload> for TransactionEvent {
    type Error = ProcessingError;

    fn try_from(raw: TransactionEventPayload) -> Result<Self, Self::Error> {
        let transaction_id = first(raw.transaction_id, raw.id)
            .ok_or_else(|| ProcessingError::malformed("transaction event without id"))?;
        let user_id = non_empty(raw.user_id)
            .ok_or_else(|| ProcessingError::malformed("transaction event without userId"))?;
        let transaction_type = first(raw.transaction_type, raw.kind)
            .ok_or_else(|| ProcessingError::malformed("transaction event without type"))?;
        let status = non_empty(raw.status)
            .ok_or_else(|| ProcessingError::malformed("transaction event without status"))?;

        Ok(Self {
            transaction_id,
            user_id,
            user_email: first(raw.user_email, raw.email),
            transaction_type,
            status,
            amount: raw.amount.as_ref().and_then(scalar),
            currency: non_empty(raw.currency),
            tx_hash: first(raw.tx_hash, raw.transaction_hash),
            reason: first(raw.reason, raw.rejection_reason),
            timestamp: raw
                .timestamp
                .as_ref()
                .and_then(scalar)
                .or_else(|| raw.created_at.as_ref().and_then(scalar)),
        })
    }
}

impl TransactionEvent {
    fn email_data(&self) -> TransactionEmailData {
        TransactionEmailData {
            transaction_id: self.transaction_id.clone(),
            transaction_type: self.transaction_type.clone(),
            amount: self.amount.clone().unwrap_or_default(),
            currency: self.currency.clone(),
            status: self.status.clone(),
            tx_hash: self.tx_hash.clone(),
            reason: self.reason.clone(),
            timestamp: self.timestamp.clone(),
        }
    }

    fn notification(&self) -> TransactionNotification {
        TransactionNotification {
            transaction_id: self.transaction_id.clone(),
            transaction_type: self.transaction_type.clone(),
            transaction_status: self.status.clone(),
            amount: self.amount.clone(),
            currency: self.currency.clone(),
            tx_hash: self.tx_hash.clone(),
            reason: self.reason.clone(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn first(preferred: Option<String>, alias: Option<String>) -> Option<String> {
    non_empty(preferred).or_else(|| non_empty(alias))
}

/// Strings pass through, numbers keep their JSON spelling
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Sends the status email and records an in-app notification for each transaction event.
pub struct TransactionEventHandler<R: NotificationRepository> {
    notifications: NotificationService<R>,
    email: Arc<EmailDispatchService>,
}

impl<R: NotificationRepository> TransactionEventHandler<R> {
    pub fn new(notifications: NotificationService<R>, email: Arc<EmailDispatchService>) -> Self {
        Self {
            notifications,
            email,
        }
    }

    async fn send_status_email(&self, event: &TransactionEvent, user_email: &str) {
        let data = event.email_data();
        let user_id = Some(event.user_id.as_str());

        let sent = match event.status.to_lowercase().as_str() {
            "pending" => {
                self.email
                    .send_transaction_pending_email(&data, user_email, user_id)
                    .await
            }
            "confirmed" | "approved" => {
                self.email
                    .send_transaction_confirmed_email(&data, user_email, user_id)
                    .await
            }
            "rejected" | "failed" => {
                self.email
                    .send_transaction_rejected_email(&data, user_email, user_id)
                    .await
            }
            other => {
                warn!(status = other, "No email for transaction status");
                return;
            }
        };

        if !sent {
            warn!("Transaction email not delivered");
        }
    }
}

#[async_trait]
impl<R: NotificationRepository + 'static> MessageHandler for TransactionEventHandler<R> {
    type Message = TransactionEventPayload;

    fn name(&self) -> &'static str {
        "transaction-events"
    }

    #[instrument(skip(self, payload))]
    async fn handle(&self, payload: TransactionEventPayload) -> Result<(), ProcessingError> {
        let event = TransactionEvent::try_from(payload)?;

        let Some(user_email) = event.user_email.clone() else {
            warn!(
                transaction_id = %event.transaction_id,
                "Transaction event without user email, skipping"
            );
            return Ok(());
        };

        self.send_status_email(&event, &user_email).await;

        let notification = self
            .notifications
            .create_transaction_notification(&event.user_id, &event.notification())
            .await
            .map_err(|e| match e {
                NotificationError::Validation(_) => ProcessingError::malformed(e.to_string()),
                _ => ProcessingError::transient_with_source(
                    "failed to store transaction notification",
                    e,
                ),
            })?;

        info!(
            transaction_id = %event.transaction_id,
            notification_id = %notification.id,
            status = %event.status,
            "Transaction event processed"
        );
        Ok(())
    }
}
