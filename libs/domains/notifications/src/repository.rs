use async_trait::async_trait;
use uuid::Uuid;

use crate::error::NotificationResult;
use crate::models::{CreateNotification, Notification, NotificationFilter};

/// Notification persistence. Every lookup and mutation is scoped to the owning user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, input: CreateNotification) -> NotificationResult<Notification>;

    /// Newest first, honoring `limit` and `offset`
    async fn find(&self, filter: &NotificationFilter) -> NotificationResult<Vec<Notification>>;

    /// Matches for the filter, ignoring `limit` and `offset`
    async fn count(&self, filter: &NotificationFilter) -> NotificationResult<u64>;

    async fn get_by_id(&self, id: Uuid, user_id: &str) -> NotificationResult<Option<Notification>>;

    /// Set `read` and stamp `readAt`; `None` when no such notification belongs to the user
    async fn mark_read(&self, id: Uuid, user_id: &str) -> NotificationResult<Option<Notification>>;

    /// Flip every unread notification of the user to `read`. Returns how many changed.
    async fn mark_all_read(&self, user_id: &str) -> NotificationResult<u64>;

    /// Set `archived`, leaving `readAt` as is
    async fn archive(&self, id: Uuid, user_id: &str) -> NotificationResult<Option<Notification>>;

    async fn delete(&self, id: Uuid, user_id: &str) -> NotificationResult<bool>;

    async fn count_unread(&self, user_id: &str) -> NotificationResult<u64>;
}
