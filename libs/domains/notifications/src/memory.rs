//! Process-local NotificationRepository for tests and broker-less local runs

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{NotificationError, NotificationResult};
use crate::models::{CreateNotification, Notification, NotificationFilter, NotificationStatus};
use crate::repository::NotificationRepository;

#[derive(Default)]
pub struct InMemoryNotificationRepository {
    notifications: RwLock<HashMap<Uuid, Notification>>,
    fail: AtomicBool,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with a database error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.fail.store(unavailable, Ordering::SeqCst);
    }

    /// Store a notification as is, timestamps included
    pub async fn insert(&self, notification: Notification) {
        self.notifications
            .write()
            .await
            .insert(notification.id, notification);
    }

    pub async fn len(&self) -> usize {
        self.notifications.read().await.len()
    }

    fn check(&self) -> NotificationResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotificationError::Database("store unavailable".into()));
        }
        Ok(())
    }

    async fn update_owned(
        &self,
        id: Uuid,
        user_id: &str,
        apply: impl FnOnce(&mut Notification),
    ) -> NotificationResult<Option<Notification>> {
        self.check()?;
        let mut notifications = self.notifications.write().await;
        Ok(notifications
            .get_mut(&id)
            .filter(|n| n.user_id == user_id)
            .map(|n| {
                apply(n);
                n.updated_at = Utc::now();
                n.clone()
            }))
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn create(&self, input: CreateNotification) -> NotificationResult<Notification> {
        self.check()?;
        let notification = Notification::new(input);
        self.insert(notification.clone()).await;
        Ok(notification)
    }

    async fn find(&self, filter: &NotificationFilter) -> NotificationResult<Vec<Notification>> {
        self.check()?;
        let notifications = self.notifications.read().await;
        let mut matching: Vec<Notification> = notifications
            .values()
            .filter(|n| filter.matches(n))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(matching
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, filter: &NotificationFilter) -> NotificationResult<u64> {
        self.check()?;
        let notifications = self.notifications.read().await;
        Ok(notifications.values().filter(|n| filter.matches(n)).count() as u64)
    }

    async fn get_by_id(&self, id: Uuid, user_id: &str) -> NotificationResult<Option<Notification>> {
        self.check()?;
        let notifications = self.notifications.read().await;
        Ok(notifications
            .get(&id)
            .filter(|n| n.user_id == user_id)
            .cloned())
    }

    async fn mark_read(&self, id: Uuid, user_id: &str) -> NotificationResult<Option<Notification>> {
        self.update_owned(id, user_id, |n| {
            n.status = NotificationStatus::Read;
            n.read_at = Some(Utc::now());
        })
        .await
    }

    async fn mark_all_read(&self, user_id: &str) -> NotificationResult<u64> {
        self.check()?;
        let now = Utc::now();
        let mut notifications = self.notifications.write().await;
        let mut changed = 0;
        for n in notifications
            .values_mut()
            .filter(|n| n.user_id == user_id && n.status == NotificationStatus::Unread)
        {
            n.status = NotificationStatus::Read;
            n.read_at = Some(now);
            n.updated_at = now;
            changed += 1;
        }
        Ok(changed)
    }

    async fn archive(&self, id: Uuid, user_id: &str) -> NotificationResult<Option<Notification>> {
        self.update_owned(id, user_id, |n| n.status = NotificationStatus::Archived)
            .await
    }

    async fn delete(&self, id: Uuid, user_id: &str) -> NotificationResult<bool> {
        self.check()?;
        let mut notifications = self.notifications.write().await;
        if notifications.get(&id).is_some_and(|n| n.user_id == user_id) {
            notifications.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn count_unread(&self, user_id: &str) -> NotificationResult<u64> {
        self.check()?;
        let notifications = self.notifications.read().await;
        Ok(notifications
            .values()
            .filter(|n| n.user_id == user_id && n.status == NotificationStatus::Unread)
            .count() as u64)
    }
}
