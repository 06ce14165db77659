//! Outbound mail transports and provider selection

pub mod mock;
pub mod smtp;

pub use mock::MockMailTransport;
pub use smtp::{SmtpMailTransport, SmtpSecurity, SmtpSettings};

use crate::config::EmailConfig;
use crate::error::EmailError;
use crate::models::{EmailProviderKind, OutgoingEmail};
use async_trait::async_trait;
use eyre::Result;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const SENDGRID_HOST: &str = "smtp.sendgrid.net";
pub const SENDGRID_PORT: u16 = 587;
pub const SENDGRID_DEFAULT_FROM: &str = "noreply@sendgrid.net";

/// Result of handing a message to the provider
#[derive(Debug, Clone)]
pub struct SendResult {
    /// Provider-assigned id, when the server reports one
    pub message_id: Option<String>,
}

/// Capability shared by every provider once configured
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<SendResult>;

    /// Open a connection and complete the handshake without sending anything
    async fn verify(&self) -> Result<()>;
}

/// Resolves the configured provider into SMTP settings and a transport.
#[derive(Clone, Debug)]
pub struct ProviderAdapter {
    config: EmailConfig,
}

impl ProviderAdapter {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn provider(&self) -> EmailProviderKind {
        self.config.provider
    }

    pub fn config(&self) -> &EmailConfig {
        &self.config
    }

    /// Connection parameters for the selected provider, or the names of the missing
    /// credential variables.
    pub fn smtp_settings(&self) -> Result<SmtpSettings, EmailError> {
        let config = &self.config;
        match config.provider {
            EmailProviderKind::Sendgrid => match &config.sendgrid_api_key {
                Some(api_key) => Ok(SmtpSettings {
                    host: SENDGRID_HOST.to_string(),
                    port: SENDGRID_PORT,
                    security: SmtpSecurity::StartTls,
                    username: config.sendgrid_user.clone(),
                    password: api_key.clone(),
                    timeout: config.timeout,
                }),
                None => Err(EmailError::MissingCredentials {
                    provider: config.provider,
                    fields: vec!["SENDGRID_API_KEY"],
                }),
            },
            EmailProviderKind::Mailgun => match (&config.mailgun_user, &config.mailgun_password) {
                (Some(user), Some(password)) => Ok(SmtpSettings {
                    host: config.mailgun_host.clone(),
                    port: config.mailgun_port,
                    security: SmtpSecurity::for_port(config.mailgun_port),
                    username: user.clone(),
                    password: password.clone(),
                    timeout: config.timeout,
                }),
                (user, password) => {
                    let mut fields = Vec::new();
                    if user.is_none() {
                        fields.push("MAILGUN_USER");
                    }
                    if password.is_none() {
                        fields.push("MAILGUN_PASSWORD");
                    }
                    Err(EmailError::MissingCredentials {
                        provider: config.provider,
                        fields,
                    })
                }
            },
        }
    }

    /// Build the transport for the selected provider.
    ///
    /// Missing credentials or an unusable host yield `None`; callers treat email as disabled.
    pub fn create_transport(&self) -> (Option<Arc<dyn MailTransport>>, EmailProviderKind) {
        let provider = self.provider();

        let settings = match self.smtp_settings() {
            Ok(settings) => settings,
            Err(EmailError::MissingCredentials { fields, .. }) => {
                warn!(
                    %provider,
                    missing = ?fields,
                    "Email credentials not configured, email dispatch disabled"
                );
                return (None, provider);
            }
            Err(e) => {
                error!(%provider, error = %e, "Invalid email configuration");
                return (None, provider);
            }
        };

        match SmtpMailTransport::new(&settings) {
            Ok(transport) => {
                info!(
                    %provider,
                    host = %settings.host,
                    port = settings.port,
                    security = ?settings.security,
                    "Email transport created"
                );
                (Some(Arc::new(transport)), provider)
            }
            Err(e) => {
                error!(%provider, error = %e, "Failed to create email transport");
                (None, provider)
            }
        }
    }

    /// Sender address: `EMAIL_FROM`, else the provider default.
    pub fn from_address(&self) -> String {
        if let Some(from) = &self.config.from {
            return from.clone();
        }
        match self.config.provider {
            EmailProviderKind::Sendgrid => SENDGRID_DEFAULT_FROM.to_string(),
            EmailProviderKind::Mailgun => self
                .config
                .mailgun_user
                .clone()
                .unwrap_or_else(|| format!("postmaster@{}", self.config.mailgun_host)),
        }
    }

    /// Operator hint logged when the startup connection check fails
    pub fn troubleshooting_hint(&self) -> &'static str {
        match self.config.provider {
            EmailProviderKind::Sendgrid => {
                "Check that SENDGRID_API_KEY is a valid key with Mail Send permission and that \
                 SENDGRID_USER is 'apikey'; outbound port 587 must be open"
            }
            EmailProviderKind::Mailgun => {
                "Check the MAILGUN_USER / MAILGUN_PASSWORD SMTP credentials for the sending \
                 domain and that MAILGUN_HOST:MAILGUN_PORT is reachable (465 uses implicit TLS, \
                 other ports STARTTLS)"
            }
        }
    }
}
