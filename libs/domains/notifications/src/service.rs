//! Notification Service - business logic layer
//!
//! Every mutation is followed by a socket event carrying the user's fresh unread count.
//! Publication runs after the store call returns and its outcome never reaches the caller.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{NotificationError, NotificationResult};
use crate::models::{
    CreateNotification, Notification, NotificationFilter, NotificationPage, NotificationPriority,
    NotificationType, SocketEvent, SocketEventType, TransactionNotification,
};
use crate::publisher::SocketEventPublisher;
use crate::repository::NotificationRepository;

pub struct NotificationService<R: NotificationRepository> {
    repository: Arc<R>,
    publisher: Arc<dyn SocketEventPublisher>,
}

impl<R: NotificationRepository> NotificationService<R> {
    pub fn new(repository: R, publisher: Arc<dyn SocketEventPublisher>) -> Self {
        Self::from_shared(Arc::new(repository), publisher)
    }

    pub fn from_shared(repository: Arc<R>, publisher: Arc<dyn SocketEventPublisher>) -> Self {
        Self {
            repository,
            publisher,
        }
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create_notification(
        &self,
        input: CreateNotification,
    ) -> NotificationResult<Notification> {
        input
            .validate()
            .map_err(|e| NotificationError::Validation(e.to_string()))?;

        let notification = self.repository.create(input).await?;
        tracing::info!(notification_id = %notification.id, "Notification created");

        self.publish(
            &notification.user_id,
            Some(notification.clone()),
            SocketEventType::NotificationCreated,
        )
        .await;
        Ok(notification)
    }

    /// One page of the user's notifications plus the unfiltered unread count
    #[instrument(skip(self))]
    pub async fn get_notifications(
        &self,
        filter: NotificationFilter,
    ) -> NotificationResult<NotificationPage> {
        let items = self.repository.find(&filter).await?;
        let total = self.repository.count(&filter).await?;
        let unread_count = self.repository.count_unread(&filter.user_id).await?;

        Ok(NotificationPage {
            items,
            total,
            unread_count,
            limit: filter.limit,
            offset: filter.offset,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_notification_by_id(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> NotificationResult<Option<Notification>> {
        self.repository.get_by_id(id, user_id).await
    }

    #[instrument(skip(self))]
    pub async fn mark_as_read(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> NotificationResult<Option<Notification>> {
        let updated = self.repository.mark_read(id, user_id).await?;
        if let Some(notification) = &updated {
            self.publish(
                user_id,
                Some(notification.clone()),
                SocketEventType::NotificationUpdated,
            )
            .await;
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn mark_all_as_read(&self, user_id: &str) -> NotificationResult<u64> {
        let count = self.repository.mark_all_read(user_id).await?;
        if count > 0 {
            self.publish(user_id, None, SocketEventType::NotificationUpdated)
                .await;
        }
        Ok(count)
    }

    /// Archive without notifying connected clients
    #[instrument(skip(self))]
    pub async fn archive_notification(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> NotificationResult<Option<Notification>> {
        self.repository.archive(id, user_id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_notification(&self, id: Uuid, user_id: &str) -> NotificationResult<bool> {
        let deleted = self.repository.delete(id, user_id).await?;
        if deleted {
            self.publish(
                user_id,
                Some(Notification::deleted(id, user_id)),
                SocketEventType::NotificationDeleted,
            )
            .await;
        }
        Ok(deleted)
    }

    /// Unread count, or 0 when the store can not answer
    #[instrument(skip(self))]
    pub async fn get_unread_count(&self, user_id: &str) -> u64 {
        match self.repository.count_unread(user_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "Failed to count unread notifications");
                0
            }
        }
    }

    #[instrument(skip(self, transaction), fields(transaction_id = %transaction.transaction_id))]
    pub async fn create_transaction_notification(
        &self,
        user_id: &str,
        transaction: &TransactionNotification,
    ) -> NotificationResult<Notification> {
        let (title, message, priority) = transaction_content(transaction);

        self.create_notification(CreateNotification {
            user_id: user_id.to_string(),
            title,
            message,
            notification_type: Some(NotificationType::Transaction),
            priority: Some(priority),
            metadata: Some(transaction_metadata(transaction)),
        })
        .await
    }

    async fn publish(
        &self,
        user_id: &str,
        notification: Option<Notification>,
        event_type: SocketEventType,
    ) {
        let event = SocketEvent {
            user_id: user_id.to_string(),
            notification,
            unread_count: self.get_unread_count(user_id).await,
            event_type,
        };

        if !self.publisher.publish(&event).await {
            warn!(%user_id, %event_type, "Socket event not delivered");
        }
    }
}

impl<R: NotificationRepository> Clone for NotificationService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            publisher: Arc::clone(&self.publisher),
        }
    }
}

/// Title, message and priority for a transaction status
fn transaction_content(tx: &TransactionNotification) -> (String, String, NotificationPriority) {
    let kind = tx.transaction_type.to_lowercase();
    let status = tx.transaction_status.to_lowercase();

    let (title, mut message, priority) = match status.as_str() {
        "pending" => (
            "Transaction Pending",
            format!("Your {kind} transaction is pending confirmation."),
            NotificationPriority::Medium,
        ),
        "confirmed" | "completed" => (
            "Transaction Confirmed",
            format!("Your {kind} transaction has been confirmed."),
            NotificationPriority::Low,
        ),
        "rejected" | "failed" => (
            "Transaction Rejected",
            tx.reason
                .clone()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| format!("Your {kind} transaction was rejected.")),
            NotificationPriority::High,
        ),
        _ => (
            "Transaction Update",
            format!("Your {kind} transaction status has been updated to {status}."),
            NotificationPriority::Medium,
        ),
    };

    if let (Some(amount), Some(currency)) = (&tx.amount, &tx.currency) {
        message.push_str(&format!(" Amount: {amount} {currency}"));
    }

    (title.to_string(), message, priority)
}

fn transaction_metadata(tx: &TransactionNotification) -> Map<String, Value> {
    let mut metadata = match serde_json::to_value(tx) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    metadata.insert(
        "actionUrl".into(),
        Value::String(format!("/transactions/{}", tx.transaction_id)),
    );
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryNotificationRepository;
    use crate::models::NotificationStatus;
    use crate::publisher::RecordingPublisher;
    use crate::repository::MockNotificationRepository;

    fn service() -> (
        NotificationService<InMemoryNotificationRepository>,
        Arc<InMemoryNotificationRepository>,
        Arc<RecordingPublisher>,
    ) {
        let repo = Arc::new(InMemoryNotificationRepository::new());
        let publisher = Arc::new(RecordingPublisher::new());
        let service = NotificationService::from_shared(repo.clone(), publisher.clone());
        (service, repo, publisher)
    }

    fn input(user_id: &str, title: &str) -> CreateNotification {
        CreateNotification {
            user_id: user_id.into(),
            title: title.into(),
            message: "body".into(),
            ..Default::default()
        }
    }

    fn transaction(status: &str) -> TransactionNotification {
        TransactionNotification {
            transaction_id: "tx-9".into(),
            transaction_type: "Deposit".into(),
            transaction_status: status.into(),
            amount: Some("100".into()),
            currency: Some("USDC".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_publishes_with_unread_count() {
        let (service, _, publisher) = service();

        let created = service.create_notification(input("u1", "Hi")).await.unwrap();
        assert_eq!(created.status, NotificationStatus::Unread);
        assert!(created.read_at.is_none());

        let events = publisher.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, SocketEventType::NotificationCreated);
        assert_eq!(events[0].unread_count, 1);
        assert_eq!(events[0].notification.as_ref().unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let (service, repo, publisher) = service();
        let err = service.create_notification(input("u1", "")).await.unwrap_err();

        assert!(matches!(err, NotificationError::Validation(_)));
        assert_eq!(repo.len().await, 0);
        assert!(publisher.events().await.is_empty());
    }

    #[tokio::test]
    async fn test_mark_as_read_is_idempotent() {
        let (service, _, publisher) = service();
        let created = service.create_notification(input("u1", "Hi")).await.unwrap();

        let first = service.mark_as_read(created.id, "u1").await.unwrap().unwrap();
        let second = service.mark_as_read(created.id, "u1").await.unwrap().unwrap();

        assert_eq!(first.status, NotificationStatus::Read);
        assert_eq!(second.status, NotificationStatus::Read);
        assert!(second.read_at.unwrap() >= first.read_at.unwrap());
        assert_eq!(service.get_unread_count("u1").await, 0);

        let events = publisher.events().await;
        assert_eq!(events.len(), 3);
        assert_eq!(events[2].event_type, SocketEventType::NotificationUpdated);
        assert_eq!(events[2].unread_count, 0);
    }

    #[tokio::test]
    async fn test_other_users_can_not_touch_notification() {
        let (service, _, _) = service();
        let created = service.create_notification(input("u1", "Hi")).await.unwrap();

        assert!(service.get_notification_by_id(created.id, "u2").await.unwrap().is_none());
        assert!(service.mark_as_read(created.id, "u2").await.unwrap().is_none());
        assert!(service.archive_notification(created.id, "u2").await.unwrap().is_none());
        assert!(!service.delete_notification(created.id, "u2").await.unwrap());
        assert_eq!(service.get_unread_count("u1").await, 1);
    }

    #[tokio::test]
    async fn test_mark_all_as_read() {
        let (service, _, publisher) = service();
        service.create_notification(input("u1", "a")).await.unwrap();
        service.create_notification(input("u1", "b")).await.unwrap();
        service.create_notification(input("u2", "c")).await.unwrap();

        assert_eq!(service.mark_all_as_read("u1").await.unwrap(), 2);
        assert_eq!(service.get_unread_count("u1").await, 0);
        assert_eq!(service.get_unread_count("u2").await, 1);

        let last = publisher.events().await.pop().unwrap();
        assert!(last.notification.is_none());
        assert_eq!(last.user_id, "u1");

        // nothing left to flip, so no event
        assert_eq!(service.mark_all_as_read("u1").await.unwrap(), 0);
        assert_eq!(publisher.events().await.len(), 4);
    }

    #[tokio::test]
    async fn test_archive_keeps_read_at_and_publishes_nothing() {
        let (service, _, publisher) = service();
        let created = service.create_notification(input("u1", "Hi")).await.unwrap();
        let read = service.mark_as_read(created.id, "u1").await.unwrap().unwrap();
        let before = publisher.events().await.len();

        let archived = service
            .archive_notification(created.id, "u1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(archived.status, NotificationStatus::Archived);
        assert_eq!(archived.read_at, read.read_at);
        assert_eq!(publisher.events().await.len(), before);
    }

    #[tokio::test]
    async fn test_delete_publishes_minimal_snapshot() {
        let (service, _, publisher) = service();
        let created = service.create_notification(input("u1", "Hi")).await.unwrap();

        assert!(service.delete_notification(created.id, "u1").await.unwrap());
        assert!(service.get_notification_by_id(created.id, "u1").await.unwrap().is_none());

        let last = publisher.events().await.pop().unwrap();
        assert_eq!(last.event_type, SocketEventType::NotificationDeleted);
        assert_eq!(last.unread_count, 0);
        let snapshot = last.notification.unwrap();
        assert_eq!(snapshot.id, created.id);
        assert!(snapshot.title.is_empty());
    }

    #[tokio::test]
    async fn test_listing_is_newest_first_with_global_unread_count() {
        let (service, repo, _) = service();
        let base = chrono::Utc::now();
        for (i, title) in ["oldest", "middle", "newest"].iter().enumerate() {
            let mut n = Notification::new(input("u1", title));
            n.created_at = base + chrono::Duration::seconds(i as i64);
            repo.insert(n).await;
        }
        let mut read = Notification::new(input("u1", "read"));
        read.status = NotificationStatus::Read;
        read.created_at = base - chrono::Duration::seconds(10);
        repo.insert(read).await;

        let page = service
            .get_notifications(NotificationFilter::for_user("u1").paginate(2, 0))
            .await
            .unwrap();
        let titles: Vec<_> = page.items.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["newest", "middle"]);
        assert_eq!(page.total, 4);
        assert_eq!(page.unread_count, 3);

        let filtered = service
            .get_notifications(
                NotificationFilter::for_user("u1").with_status(NotificationStatus::Read),
            )
            .await
            .unwrap();
        assert_eq!(filtered.total, 1);
        assert_eq!(filtered.unread_count, 3);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_fail_mutation() {
        let (service, _, publisher) = service();
        publisher.set_unavailable(true);

        let created = service.create_notification(input("u1", "Hi")).await.unwrap();
        assert!(service.delete_notification(created.id, "u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_unread_count_is_zero_on_store_error() {
        let (service, repo, _) = service();
        service.create_notification(input("u1", "Hi")).await.unwrap();
        repo.set_unavailable(true);
        assert_eq!(service.get_unread_count("u1").await, 0);
    }

    #[tokio::test]
    async fn test_store_error_propagates_from_create() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_create()
            .returning(|_| Err(NotificationError::Database("connection reset".into())));
        let publisher = Arc::new(RecordingPublisher::new());
        let service = NotificationService::new(repo, publisher.clone());

        let err = service.create_notification(input("u1", "Hi")).await.unwrap_err();
        assert!(matches!(err, NotificationError::Database(_)));
        assert!(publisher.events().await.is_empty());
    }

    #[tokio::test]
    async fn test_transaction_notification_table() {
        let (service, _, _) = service();

        let confirmed = service
            .create_transaction_notification("u1", &transaction("completed"))
            .await
            .unwrap();
        assert_eq!(confirmed.title, "Transaction Confirmed");
        assert_eq!(confirmed.priority, NotificationPriority::Low);
        assert_eq!(confirmed.notification_type, NotificationType::Transaction);
        assert_eq!(
            confirmed.message,
            "Your deposit transaction has been confirmed. Amount: 100 USDC"
        );
        assert_eq!(confirmed.metadata["actionUrl"], "/transactions/tx-9");
        assert_eq!(confirmed.metadata["transactionStatus"], "completed");

        let mut rejected_tx = transaction("failed");
        rejected_tx.reason = Some("Insufficient balance".into());
        rejected_tx.currency = None;
        let rejected = service
            .create_transaction_notification("u1", &rejected_tx)
            .await
            .unwrap();
        assert_eq!(rejected.priority, NotificationPriority::High);
        assert_eq!(rejected.message, "Insufficient balance");

        let pending = service
            .create_transaction_notification("u1", &transaction("pending"))
            .await
            .unwrap();
        assert_eq!(pending.priority, NotificationPriority::Medium);

        let other = service
            .create_transaction_notification("u1", &transaction("processing"))
            .await
            .unwrap();
        assert_eq!(other.title, "Transaction Update");
        assert_eq!(other.priority, NotificationPriority::Medium);
    }

    #[tokio::test]
    async fn test_long_text_is_stored_whole() {
        let (service, repo, _) = service();

        let mut rejected_tx = transaction("rejected");
        rejected_tx.reason = Some("x".repeat(1995));
        let rejected = service
            .create_transaction_notification("u1", &rejected_tx)
            .await
            .unwrap();
        assert_eq!(rejected.message.len(), 1995 + " Amount: 100 USDC".len());

        let mut long = input("u1", &"t".repeat(500));
        long.message = "m".repeat(10_000);
        service.create_notification(long).await.unwrap();
        assert_eq!(repo.len().await, 2);
    }
}
