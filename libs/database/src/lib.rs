//! MongoDB connectivity shared by the notification services.
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::common::RetryConfig;
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//!
//! let config = MongoConfig::from_env()?;
//! let client = connect_from_config_with_retry(&config, Some(RetryConfig::new().with_max_retries(5))).await?;
//! let db = client.database(config.database());
//! ```
//!
//! # Features
//!
//! - `config` - `core_config::FromEnv` for [`mongodb::MongoConfig`]

pub mod common;
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
