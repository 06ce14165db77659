//! Email dispatch with delivery bookkeeping
//!
//! The service never returns an error to its caller. Every outcome is reported as a boolean
//! and logged, so a broken provider can not take down the queue consumers.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::delivery::DeliveryRepository;
use crate::models::{
    EmailMessage, EmailProviderKind, OutgoingEmail, TransactionEmailData, TransactionEmailKind,
};
use crate::provider::{MailTransport, ProviderAdapter};
use crate::templates::TemplateEngine;

/// Values the dispatcher needs from the provider configuration
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub provider: EmailProviderKind,
    pub from: String,
    pub max_retry: u32,
}

impl DispatchSettings {
    pub fn from_adapter(adapter: &ProviderAdapter) -> Self {
        Self {
            provider: adapter.provider(),
            from: adapter.from_address(),
            max_retry: adapter.config().max_retry,
        }
    }
}

pub struct EmailDispatchService {
    transport: Option<Arc<dyn MailTransport>>,
    settings: DispatchSettings,
    enabled: bool,
    templates: Arc<TemplateEngine>,
    deliveries: Arc<dyn DeliveryRepository>,
}

impl EmailDispatchService {
    /// Build the transport for the configured provider and verify it once.
    ///
    /// Missing credentials or a failed connection check leave the service disabled; startup
    /// continues either way.
    pub async fn initialize(
        adapter: ProviderAdapter,
        templates: Arc<TemplateEngine>,
        deliveries: Arc<dyn DeliveryRepository>,
    ) -> Self {
        let settings = DispatchSettings::from_adapter(&adapter);
        let (transport, _) = adapter.create_transport();

        let service = Self::from_transport(transport, settings, templates, deliveries).await;
        if !service.enabled {
            warn!(
                provider = %service.settings.provider,
                hint = adapter.troubleshooting_hint(),
                "Email dispatch disabled"
            );
        }
        service
    }

    /// Same as [`initialize`](Self::initialize) with an already-built transport
    pub async fn from_transport(
        transport: Option<Arc<dyn MailTransport>>,
        settings: DispatchSettings,
        templates: Arc<TemplateEngine>,
        deliveries: Arc<dyn DeliveryRepository>,
    ) -> Self {
        let enabled = match &transport {
            Some(transport) => match transport.verify().await {
                Ok(()) => {
                    info!(provider = %settings.provider, from = %settings.from, "Email transport verified");
                    true
                }
                Err(e) => {
                    error!(provider = %settings.provider, error = %e, "Email transport verification failed");
                    false
                }
            },
            None => false,
        };

        Self {
            transport,
            settings,
            enabled,
            templates,
            deliveries,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.enabled && self.transport.is_some()
    }

    pub fn provider(&self) -> EmailProviderKind {
        self.settings.provider
    }

    pub fn templates(&self) -> &TemplateEngine {
        &self.templates
    }

    /// Send one message. Returns `true` only when the provider accepted it.
    ///
    /// Messages carrying a user id and template name get a delivery record; record
    /// bookkeeping failures are logged and do not change the result.
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    pub async fn send_email(&self, message: EmailMessage) -> bool {
        let delivery_id = self.start_delivery(&message).await;

        let transport = match (&self.transport, self.enabled) {
            (Some(transport), true) => transport,
            _ => {
                warn!("Email transport not ready, message dropped");
                if let Some(id) = delivery_id {
                    self.mark_sent(id, false).await;
                }
                return false;
            }
        };

        let outgoing = OutgoingEmail {
            from: self.settings.from.clone(),
            to: message.to,
            subject: message.subject,
            html: message.html,
        };

        match transport.send(&outgoing).await {
            Ok(result) => {
                info!(message_id = ?result.message_id, "Email sent");
                if let Some(id) = delivery_id {
                    self.mark_sent(id, true).await;
                }
                true
            }
            Err(e) => {
                error!(error = %e, "Email send failed");
                if let Some(id) = delivery_id {
                    self.mark_failed(id).await;
                }
                false
            }
        }
    }

    pub async fn send_transaction_pending_email(
        &self,
        data: &TransactionEmailData,
        user_email: &str,
        user_id: Option<&str>,
    ) -> bool {
        self.send_transaction_email(TransactionEmailKind::Pending, data, user_email, user_id)
            .await
    }

    pub async fn send_transaction_confirmed_email(
        &self,
        data: &TransactionEmailData,
        user_email: &str,
        user_id: Option<&str>,
    ) -> bool {
        self.send_transaction_email(TransactionEmailKind::Confirmed, data, user_email, user_id)
            .await
    }

    pub async fn send_transaction_rejected_email(
        &self,
        data: &TransactionEmailData,
        user_email: &str,
        user_id: Option<&str>,
    ) -> bool {
        self.send_transaction_email(TransactionEmailKind::Rejected, data, user_email, user_id)
            .await
    }

    #[instrument(skip(self, data, user_email), fields(transaction_id = %data.transaction_id))]
    async fn send_transaction_email(
        &self,
        kind: TransactionEmailKind,
        data: &TransactionEmailData,
        user_email: &str,
        user_id: Option<&str>,
    ) -> bool {
        if !self.is_ready() {
            debug!(%kind, "Email transport not ready, skipping transaction email");
            return false;
        }

        let rendered = match self.templates.render_transaction(kind, data) {
            Ok(rendered) => rendered,
            Err(e) => {
                error!(%kind, error = %e, "Failed to render transaction email");
                return false;
            }
        };

        let mut message = EmailMessage::new(user_email, rendered.subject, rendered.html);
        if let Some(user_id) = user_id {
            message = message
                .with_user(user_id)
                .with_template(kind.template_name(), data.to_variables());
        }

        self.send_email(message).await
    }

    async fn start_delivery(&self, message: &EmailMessage) -> Option<Uuid> {
        let input = message.delivery(self.settings.provider)?;
        match self.deliveries.create(input).await {
            Ok(record) => Some(record.id),
            Err(e) => {
                warn!(error = %e, "Failed to create delivery record");
                None
            }
        }
    }

    async fn mark_sent(&self, id: Uuid, sent: bool) {
        if let Err(e) = self.deliveries.set_sent(id, sent).await {
            warn!(delivery_id = %id, error = %e, "Failed to update delivery record");
        }
    }

    async fn mark_failed(&self, id: Uuid) {
        match self.deliveries.record_failure(id, self.settings.max_retry).await {
            Ok(record) => debug!(delivery_id = %id, retry = record.retry, "Delivery failure recorded"),
            Err(e) => warn!(delivery_id = %id, error = %e, "Failed to update delivery record"),
        }
    }
}
