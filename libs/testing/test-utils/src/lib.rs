//! Shared test infrastructure for the notification crates
//!
//! - `TestMongo`: MongoDB container with per-test databases (feature: "mongo", default)
//! - `TestNats`: NATS container with JetStream enabled (feature: "nats")
//! - `TestDataBuilder`: deterministic ids and addresses derived from the test name
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true, features = ["mongo", "nats"] }
//! ```
//!
//! ```rust,ignore
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! #[tokio::test]
//! #[ignore = "requires docker"]
//! async fn stores_notification() {
//!     let mongo = TestMongo::new().await;
//!     let db = mongo.database();
//!     let data = TestDataBuilder::from_test_name("stores_notification");
//!     let user_id = data.user_id();
//! }
//! ```

use uuid::Uuid;

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "nats")]
mod nats;

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;

#[cfg(feature = "nats")]
pub use nats::TestNats;

/// Deterministic test data seeded from the test name
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Opaque user id, as the upstream services send it
    pub fn user_id(&self) -> String {
        format!("user-{:016x}", self.seed)
    }

    pub fn email(&self) -> String {
        format!("user-{:016x}@example.com", self.seed)
    }

    /// Transaction id; `n` distinguishes several transactions in one test
    pub fn transaction_id(&self, n: u32) -> String {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..12].copy_from_slice(&n.to_le_bytes());
        Uuid::from_bytes(uuid_bytes).to_string()
    }
}
