//! Templated email dispatch with delivery bookkeeping.
//!
//! ## Components
//!
//! - **Provider adapter**: [`ProviderAdapter`] picks SendGrid or Mailgun SMTP from
//!   [`EmailConfig`] and builds the shared [`MailTransport`]
//! - **Templates**: Handlebars-based [`TemplateEngine`] with the transaction emails and the
//!   fallback snippets used for ad-hoc requests
//! - **Delivery records**: [`DeliveryRepository`] keeps one audit record per templated send
//! - **Dispatch**: [`EmailDispatchService`] ties them together and never fails a caller
//!
//! ```ignore
//! use core_config::FromEnv;
//! use email::{EmailConfig, EmailDispatchService, EmailMessage, MongoDeliveryRepository, ProviderAdapter, TemplateEngine};
//!
//! let adapter = ProviderAdapter::new(EmailConfig::from_env()?);
//! let deliveries = Arc::new(MongoDeliveryRepository::new(&db));
//! let dispatch = EmailDispatchService::initialize(adapter, Arc::new(TemplateEngine::new()?), deliveries).await;
//!
//! if !dispatch.send_email(EmailMessage::new("user@example.com", "Hello", "<p>Hi</p>")).await {
//!     tracing::warn!("email not delivered");
//! }
//! ```

pub mod config;
pub mod delivery;
pub mod error;
pub mod models;
pub mod provider;
pub mod service;
pub mod templates;

pub use config::EmailConfig;
pub use delivery::{DeliveryRepository, InMemoryDeliveryRepository, MongoDeliveryRepository};
pub use error::{EmailError, EmailResult};
pub use models::{
    EmailDelivery, EmailMessage, EmailProviderKind, NewDelivery, OutgoingEmail,
    TransactionEmailData, TransactionEmailKind,
};
pub use provider::{MailTransport, MockMailTransport, ProviderAdapter, SendResult, SmtpMailTransport};
pub use service::{DispatchSettings, EmailDispatchService};
pub use templates::{RenderedEmail, TemplateEngine};
