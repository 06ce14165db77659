//! Notifications Domain
//!
//! In-app notifications stored in MongoDB, with a socket event published after every
//! mutation except archive.
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /notifications REST endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐      ┌──────────────────────┐
//! │   Service   │ ───▶ │ SocketEventPublisher │ ─▶ socket-notification-events
//! └──────┬──────┘      └──────────────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← trait + MongoDB / in-memory implementations
//! └─────────────┘
//! ```
//!
//! ```rust,no_run
//! use domain_notifications::{
//!     handlers, MongoNotificationRepository, NotificationService, RecordingPublisher,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = mongodb::Client::with_uri_str("mongodb://localhost:27017").await?;
//! let repository = MongoNotificationRepository::new(&client.database("notifications"));
//! repository.init_indexes().await?;
//!
//! let service = NotificationService::new(repository, Arc::new(RecordingPublisher::new()));
//! let router = axum::Router::new().nest("/notifications", handlers::router(service));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod publisher;
pub mod repository;
pub mod service;

pub use error::{ErrorResponse, NotificationError, NotificationResult};
pub use handlers::ApiDoc;
pub use memory::InMemoryNotificationRepository;
pub use models::{
    CreateNotification, Notification, NotificationFilter, NotificationPage, NotificationPriority,
    NotificationStatus, NotificationType, SocketEvent, SocketEventType, TransactionNotification,
};
pub use self::mongodb::MongoNotificationRepository;
pub use publisher::{
    NatsSocketPublisher, RecordingPublisher, SOCKET_QUEUE, SOCKET_STREAM, SocketEventPublisher,
};
pub use repository::NotificationRepository;
pub use service::NotificationService;
