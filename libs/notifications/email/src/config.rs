use crate::models::EmailProviderKind;
use core_config::{env_optional, env_or_default, env_parse_or, ConfigError, FromEnv};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Bound on SMTP connect, greeting, and socket operations
pub const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on the delivery record retry counter
pub const DEFAULT_MAX_RETRY: u32 = 3;

/// Email settings. Credentials stay optional so a half-configured deployment starts with
/// email disabled instead of failing.
#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub provider: EmailProviderKind,
    pub sendgrid_api_key: Option<String>,
    pub sendgrid_user: String,
    pub mailgun_user: Option<String>,
    pub mailgun_password: Option<String>,
    pub mailgun_host: String,
    pub mailgun_port: u16,
    /// Explicit sender address, overriding the provider default
    pub from: Option<String>,
    pub max_retry: u32,
    pub timeout: Duration,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: EmailProviderKind::default(),
            sendgrid_api_key: None,
            sendgrid_user: "apikey".to_string(),
            mailgun_user: None,
            mailgun_password: None,
            mailgun_host: "smtp.mailgun.org".to_string(),
            mailgun_port: 587,
            from: None,
            max_retry: DEFAULT_MAX_RETRY,
            timeout: SMTP_TIMEOUT,
        }
    }
}

impl FromEnv for EmailConfig {
    /// Reads `EMAIL_PROVIDER`, `SENDGRID_API_KEY`, `SENDGRID_USER`, `MAILGUN_USER`,
    /// `MAILGUN_PASSWORD`, `MAILGUN_HOST`, `MAILGUN_PORT`, `EMAIL_FROM` and `EMAIL_MAX_RETRY`.
    ///
    /// An unknown provider name falls back to SendGrid.
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let provider = match env_optional("EMAIL_PROVIDER") {
            Some(raw) => EmailProviderKind::from_str(raw.trim()).unwrap_or_else(|_| {
                warn!(value = %raw, "Unknown EMAIL_PROVIDER, using sendgrid");
                EmailProviderKind::Sendgrid
            }),
            None => EmailProviderKind::default(),
        };

        Ok(Self {
            provider,
            sendgrid_api_key: env_optional("SENDGRID_API_KEY"),
            sendgrid_user: env_or_default("SENDGRID_USER", &defaults.sendgrid_user),
            mailgun_user: env_optional("MAILGUN_USER"),
            mailgun_password: env_optional("MAILGUN_PASSWORD"),
            mailgun_host: env_or_default("MAILGUN_HOST", &defaults.mailgun_host),
            mailgun_port: env_parse_or("MAILGUN_PORT", defaults.mailgun_port)?,
            from: env_optional("EMAIL_FROM"),
            max_retry: env_parse_or("EMAIL_MAX_RETRY", defaults.max_retry)?,
            timeout: defaults.timeout,
        })
    }
}
