//! MongoDB implementation of NotificationRepository

use async_trait::async_trait;
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::{FindOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::NotificationResult;
use crate::models::{
    CreateNotification, Notification, NotificationFilter, NotificationStatus, timestamp,
};
use crate::repository::NotificationRepository;

pub const COLLECTION: &str = "notifications";

pub struct MongoNotificationRepository {
    collection: Collection<Notification>,
}

impl MongoNotificationRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<Notification>(collection_name),
        }
    }

    pub fn collection(&self) -> &Collection<Notification> {
        &self.collection
    }

    /// Indexes backing the per-user listing and the unread count
    #[instrument(skip(self))]
    pub async fn init_indexes(&self) -> NotificationResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "userId": 1, "createdAt": -1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "userId": 1, "status": 1 })
                .build(),
        ];
        self.collection.create_indexes(indexes).await?;
        Ok(())
    }

    fn build_filter(filter: &NotificationFilter) -> Document {
        let mut doc = doc! { "userId": &filter.user_id };

        if let Some(status) = filter.status {
            doc.insert("status", status.to_string());
        }
        if let Some(notification_type) = filter.notification_type {
            doc.insert("type", notification_type.to_string());
        }
        if let Some(priority) = filter.priority {
            doc.insert("priority", priority.to_string());
        }

        doc
    }

    fn owned(id: Uuid, user_id: &str) -> Document {
        doc! { "_id": id.to_string(), "userId": user_id }
    }

    async fn set_status(
        &self,
        id: Uuid,
        user_id: &str,
        mut fields: Document,
    ) -> NotificationResult<Option<Notification>> {
        fields.insert("updatedAt", timestamp::format(&Utc::now()));

        let updated = self
            .collection
            .find_one_and_update(Self::owned(id, user_id), doc! { "$set": fields })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }
}

#[async_trait]
impl NotificationRepository for MongoNotificationRepository {
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    async fn create(&self, input: CreateNotification) -> NotificationResult<Notification> {
        let notification = Notification::new(input);
        self.collection.insert_one(&notification).await?;

        tracing::debug!(notification_id = %notification.id, "Notification stored");
        Ok(notification)
    }

    #[instrument(skip(self))]
    async fn find(&self, filter: &NotificationFilter) -> NotificationResult<Vec<Notification>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .limit(filter.limit)
            .skip(filter.offset)
            .build();

        let cursor = self
            .collection
            .find(Self::build_filter(filter))
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: &NotificationFilter) -> NotificationResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::build_filter(filter))
            .await?)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid, user_id: &str) -> NotificationResult<Option<Notification>> {
        Ok(self.collection.find_one(Self::owned(id, user_id)).await?)
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, id: Uuid, user_id: &str) -> NotificationResult<Option<Notification>> {
        let now = timestamp::format(&Utc::now());
        self.set_status(
            id,
            user_id,
            doc! { "status": NotificationStatus::Read.to_string(), "readAt": now },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn mark_all_read(&self, user_id: &str) -> NotificationResult<u64> {
        let now = timestamp::format(&Utc::now());
        let result = self
            .collection
            .update_many(
                doc! { "userId": user_id, "status": NotificationStatus::Unread.to_string() },
                doc! { "$set": {
                    "status": NotificationStatus::Read.to_string(),
                    "readAt": &now,
                    "updatedAt": &now,
                } },
            )
            .await?;
        Ok(result.modified_count)
    }

    #[instrument(skip(self))]
    async fn archive(&self, id: Uuid, user_id: &str) -> NotificationResult<Option<Notification>> {
        self.set_status(
            id,
            user_id,
            doc! { "status": NotificationStatus::Archived.to_string() },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid, user_id: &str) -> NotificationResult<bool> {
        let result = self.collection.delete_one(Self::owned(id, user_id)).await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn count_unread(&self, user_id: &str) -> NotificationResult<u64> {
        Ok(self
            .collection
            .count_documents(
                doc! { "userId": user_id, "status": NotificationStatus::Unread.to_string() },
            )
            .await?)
    }
}
