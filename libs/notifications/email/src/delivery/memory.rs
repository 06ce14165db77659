use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::DeliveryRepository;
use crate::error::{EmailError, EmailResult};
use crate::models::{EmailDelivery, NewDelivery};

/// Process-local delivery store, used by tests and when no database is configured
#[derive(Default)]
pub struct InMemoryDeliveryRepository {
    records: RwLock<HashMap<Uuid, EmailDelivery>>,
}

impl InMemoryDeliveryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<EmailDelivery> {
        let mut records: Vec<_> = self.records.read().await.values().cloned().collect();
        records.sort_by_key(|r| r.created_at);
        records
    }
}

#[async_trait]
impl DeliveryRepository for InMemoryDeliveryRepository {
    async fn create(&self, input: NewDelivery) -> EmailResult<EmailDelivery> {
        let record = EmailDelivery::new(input);
        self.records.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> EmailResult<Option<EmailDelivery>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn set_sent(&self, id: Uuid, sent: bool) -> EmailResult<()> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(EmailError::DeliveryNotFound(id))?;
        record.is_sent = sent;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn record_failure(&self, id: Uuid, max_retry: u32) -> EmailResult<EmailDelivery> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(EmailError::DeliveryNotFound(id))?;
        record.is_sent = false;
        record.retry = (record.retry + 1).min(max_retry);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmailProviderKind;
    use serde_json::Map;

    fn input() -> NewDelivery {
        NewDelivery {
            user_id: "user-1".into(),
            template_name: "transaction-confirmed".into(),
            template_variables: Map::new(),
            email_provider: EmailProviderKind::Sendgrid,
        }
    }

    #[tokio::test]
    async fn test_retry_is_capped() {
        let repo = InMemoryDeliveryRepository::new();
        let record = repo.create(input()).await.unwrap();

        for _ in 0..5 {
            repo.record_failure(record.id, 3).await.unwrap();
        }

        let stored = repo.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(stored.retry, 3);
        assert!(!stored.is_sent);
    }

    #[tokio::test]
    async fn test_set_sent_keeps_retry() {
        let repo = InMemoryDeliveryRepository::new();
        let record = repo.create(input()).await.unwrap();
        repo.record_failure(record.id, 3).await.unwrap();
        repo.set_sent(record.id, true).await.unwrap();

        let stored = repo.find_by_id(record.id).await.unwrap().unwrap();
        assert!(stored.is_sent);
        assert_eq!(stored.retry, 1);
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let repo = InMemoryDeliveryRepository::new();
        let err = repo.set_sent(Uuid::now_v7(), true).await.unwrap_err();
        assert!(matches!(err, EmailError::DeliveryNotFound(_)));
    }
}
