use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{doc, to_bson, Bson, Document},
    options::ReturnDocument,
    Collection, Database, IndexModel,
};
use tracing::instrument;
use uuid::Uuid;

use super::DeliveryRepository;
use crate::error::{EmailError, EmailResult};
use crate::models::{EmailDelivery, NewDelivery};

pub const COLLECTION: &str = "email_deliveries";

pub struct MongoDeliveryRepository {
    collection: Collection<EmailDelivery>,
}

impl MongoDeliveryRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<EmailDelivery>(COLLECTION),
        }
    }

    pub fn collection(&self) -> &Collection<EmailDelivery> {
        &self.collection
    }

    /// Lookup index for a user's delivery history
    pub async fn init_indexes(&self) -> EmailResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "userId": 1, "createdAt": -1 })
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": id.to_string() }
    }

    fn now() -> Bson {
        to_bson(&Utc::now()).unwrap_or(Bson::Null)
    }
}

#[async_trait]
impl DeliveryRepository for MongoDeliveryRepository {
    #[instrument(skip(self, input), fields(user_id = %input.user_id, template = %input.template_name))]
    async fn create(&self, input: NewDelivery) -> EmailResult<EmailDelivery> {
        let record = EmailDelivery::new(input);
        self.collection.insert_one(&record).await?;
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> EmailResult<Option<EmailDelivery>> {
        Ok(self.collection.find_one(Self::id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn set_sent(&self, id: Uuid, sent: bool) -> EmailResult<()> {
        let result = self
            .collection
            .update_one(
                Self::id_filter(id),
                doc! { "$set": { "isSent": sent, "updatedAt": Self::now() } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(EmailError::DeliveryNotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn record_failure(&self, id: Uuid, max_retry: u32) -> EmailResult<EmailDelivery> {
        // Pipeline update so the cap is applied atomically on the server
        let update = vec![doc! {
            "$set": {
                "isSent": false,
                "retry": {
                    "$min": [
                        { "$add": [ { "$ifNull": ["$retry", 0_i64] }, 1_i64 ] },
                        i64::from(max_retry),
                    ]
                },
                "updatedAt": Self::now(),
            }
        }];

        self.collection
            .find_one_and_update(Self::id_filter(id), update)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(EmailError::DeliveryNotFound(id))
    }
}
