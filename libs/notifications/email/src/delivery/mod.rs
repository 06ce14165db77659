//! Delivery records: one document per templated send, tracking `isSent` and a capped retry count

mod memory;
mod mongodb;

pub use self::memory::InMemoryDeliveryRepository;
pub use self::mongodb::MongoDeliveryRepository;

use crate::error::EmailResult;
use crate::models::{EmailDelivery, NewDelivery};
use async_trait::async_trait;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveryRepository: Send + Sync {
    /// Insert a fresh record (`isSent = false`, `retry = 0`)
    async fn create(&self, input: NewDelivery) -> EmailResult<EmailDelivery>;

    async fn find_by_id(&self, id: Uuid) -> EmailResult<Option<EmailDelivery>>;

    /// Set `isSent` without touching the retry counter
    async fn set_sent(&self, id: Uuid, sent: bool) -> EmailResult<()>;

    /// Mark unsent and bump `retry`, never past `max_retry`. Returns the updated record.
    async fn record_failure(&self, id: Uuid, max_retry: u32) -> EmailResult<EmailDelivery>;
}
