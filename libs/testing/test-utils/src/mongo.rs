//! MongoDB test infrastructure

use mongodb::{Client, Database};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::mongo::Mongo;
use uuid::Uuid;

/// Throwaway MongoDB server; removed when dropped.
///
/// Every call to [`TestMongo::database`] hands out a fresh, uniquely named database so tests
/// sharing a container do not see each other's documents.
pub struct TestMongo {
    #[allow(dead_code)]
    container: ContainerAsync<Mongo>,
    client: Client,
    pub connection_string: String,
}

impl TestMongo {
    pub async fn new() -> Self {
        let container = Mongo::default()
            .with_tag("7")
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let host_port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");

        let connection_string = format!("mongodb://127.0.0.1:{host_port}");

        let client = Client::with_uri_str(&connection_string)
            .await
            .expect("Failed to connect to MongoDB");

        tracing::info!(port = host_port, "Test MongoDB ready");

        Self {
            container,
            client,
            connection_string,
        }
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }

    pub fn database(&self) -> Database {
        self.client
            .database(&format!("test_{}", Uuid::new_v4().simple()))
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_mongo_ping() {
        let mongo = TestMongo::new().await;
        let db = mongo.database();
        db.run_command(doc! { "ping": 1 }).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_databases_are_isolated() {
        let mongo = TestMongo::new().await;
        assert_ne!(mongo.database().name(), mongo.database().name());
    }
}
