//! Worker configuration, composed from the shared config components

use core_config::{ConfigError, Environment, FromEnv, env_or_default, env_parse_or, server::ServerConfig};
use database::mongodb::MongoConfig;
use email::EmailConfig;
use messaging::{QueueConfig, QueueDef};
use std::time::Duration;

pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

/// Broker connection and consumer settings shared by every queue
#[derive(Clone, Debug)]
pub struct BrokerConfig {
    pub url: String,
    pub ack_wait: Duration,
    pub max_deliver: i64,
    pub batch_size: usize,
    pub requeue_transient: bool,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_NATS_URL.to_string(),
            ack_wait: Duration::from_secs(30),
            max_deliver: 3,
            batch_size: 1,
            requeue_transient: false,
        }
    }
}

impl FromEnv for BrokerConfig {
    /// Reads `NATS_URL`, `NATS_ACK_WAIT_SECS`, `NATS_MAX_DELIVER`, `NATS_BATCH_SIZE` and
    /// `NATS_REQUEUE_TRANSIENT`
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            url: env_or_default("NATS_URL", &defaults.url),
            ack_wait: Duration::from_secs(env_parse_or(
                "NATS_ACK_WAIT_SECS",
                defaults.ack_wait.as_secs(),
            )?),
            max_deliver: env_parse_or("NATS_MAX_DELIVER", defaults.max_deliver)?,
            batch_size: env_parse_or("NATS_BATCH_SIZE", defaults.batch_size)?,
            requeue_transient: env_parse_or("NATS_REQUEUE_TRANSIENT", defaults.requeue_transient)?,
        })
    }
}

impl BrokerConfig {
    /// Consumer settings for queue `D`
    pub fn queue<D: QueueDef>(&self) -> QueueConfig {
        QueueConfig::from_def::<D>()
            .with_batch_size(self.batch_size)
            .with_ack_wait(self.ack_wait)
            .with_max_deliver(self.max_deliver)
            .with_requeue_transient(self.requeue_transient)
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub mongodb: MongoConfig,
    pub broker: BrokerConfig,
    pub email: EmailConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let mut mongodb = MongoConfig::from_env()?;
        if mongodb.app_name.is_none() {
            mongodb = mongodb.with_app_name(env!("CARGO_PKG_NAME"));
        }

        Ok(Self {
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            mongodb,
            broker: BrokerConfig::from_env()?,
            email: EmailConfig::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::TransactionQueue;

    const VARS: [&str; 5] = [
        "NATS_URL",
        "NATS_ACK_WAIT_SECS",
        "NATS_MAX_DELIVER",
        "NATS_BATCH_SIZE",
        "NATS_REQUEUE_TRANSIENT",
    ];

    #[test]
    fn test_broker_defaults() {
        temp_env::with_vars(VARS.map(|key| (key, None::<&str>)), || {
            let config = BrokerConfig::from_env().unwrap();
            assert_eq!(config.url, DEFAULT_NATS_URL);
            assert_eq!(config.ack_wait, Duration::from_secs(30));
            assert_eq!(config.max_deliver, 3);
            assert_eq!(config.batch_size, 1);
            assert!(!config.requeue_transient);
        });
    }

    #[test]
    fn test_broker_overrides_reach_queue_config() {
        temp_env::with_vars(
            [
                ("NATS_URL", Some("nats://broker:4222")),
                ("NATS_ACK_WAIT_SECS", Some("5")),
                ("NATS_MAX_DELIVER", Some("1")),
                ("NATS_BATCH_SIZE", Some("4")),
                ("NATS_REQUEUE_TRANSIENT", Some("true")),
            ],
            || {
                let queue = BrokerConfig::from_env().unwrap().queue::<TransactionQueue>();
                assert_eq!(queue.queue, "transaction-events");
                assert_eq!(queue.ack_wait, Duration::from_secs(5));
                assert_eq!(queue.max_deliver, 1);
                assert_eq!(queue.batch_size, 4);
                assert!(queue.requeue_transient);
            },
        );
    }

    #[test]
    fn test_invalid_number_is_reported() {
        temp_env::with_var("NATS_MAX_DELIVER", Some("many"), || {
            let err = BrokerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("NATS_MAX_DELIVER"));
        });
    }
}
