//! SMTP transport using lettre

use super::{MailTransport, SendResult};
use crate::error::EmailError;
use crate::models::OutgoingEmail;
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{authentication::Credentials, response::Response},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::fmt;
use std::time::Duration;

/// How the SMTP session is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// TLS from the first byte (port 465)
    ImplicitTls,
    /// Plain connection upgraded with STARTTLS
    StartTls,
}

impl SmtpSecurity {
    pub fn for_port(port: u16) -> Self {
        if port == 465 {
            SmtpSecurity::ImplicitTls
        } else {
            SmtpSecurity::StartTls
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub security: SmtpSecurity,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("security", &self.security)
            .field("username", &self.username)
            .field("password", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    pub fn new(settings: &SmtpSettings) -> Result<Self, EmailError> {
        let builder = match settings.security {
            SmtpSecurity::ImplicitTls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host),
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            }
        }
        .map_err(|e| EmailError::Transport(e.to_string()))?;

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(settings.timeout))
            .build();

        Ok(Self { transport })
    }
}

/// Single-part HTML message
pub(crate) fn build_message(email: &OutgoingEmail) -> Result<Message> {
    let from: Mailbox = email.from.parse().wrap_err("Invalid from address")?;
    let to: Mailbox = email.to.parse().wrap_err("Invalid recipient address")?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(&email.subject)
        .header(ContentType::TEXT_HTML)
        .body(email.html.clone())
        .wrap_err("Failed to build message")
}

/// First line of the server's reply, which carries the queue id
fn message_id(response: &Response) -> Option<String> {
    response.message().next().map(str::to_string)
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<SendResult> {
        let message = build_message(email)?;

        let response = self
            .transport
            .send(message)
            .await
            .wrap_err("SMTP send failed")?;

        Ok(SendResult {
            message_id: message_id(&response),
        })
    }

    async fn verify(&self) -> Result<()> {
        let accepted = self
            .transport
            .test_connection()
            .await
            .wrap_err("SMTP connection check failed")?;

        if accepted {
            Ok(())
        } else {
            Err(eyre!("SMTP server did not accept the connection"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            from: "noreply@example.com".into(),
            to: to.into(),
            subject: "Deposit Confirmed".into(),
            html: "<p>done</p>".into(),
        }
    }

    #[test]
    fn test_security_for_port() {
        assert_eq!(SmtpSecurity::for_port(465), SmtpSecurity::ImplicitTls);
        assert_eq!(SmtpSecurity::for_port(587), SmtpSecurity::StartTls);
        assert_eq!(SmtpSecurity::for_port(2525), SmtpSecurity::StartTls);
    }

    #[test]
    fn test_build_message() {
        let message = build_message(&email("user@example.com")).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("Subject: Deposit Confirmed"));
        assert!(formatted.contains("text/html"));
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        let err = build_message(&email("not an address")).unwrap_err();
        assert!(err.to_string().contains("recipient"));
    }

    #[test]
    fn test_message_id_from_reply() {
        use lettre::transport::smtp::response::{Category, Code, Detail, Severity};

        let code = Code::new(Severity::PositiveCompletion, Category::MailSystem, Detail::Zero);
        let queued = Response::new(code, vec!["2.0.0 Ok: queued as 4F2A1".into()]);
        assert_eq!(message_id(&queued).as_deref(), Some("2.0.0 Ok: queued as 4F2A1"));

        let empty = Response::new(code, Vec::new());
        assert_eq!(message_id(&empty), None);
    }

    #[test]
    fn test_debug_hides_password() {
        let settings = SmtpSettings {
            host: "smtp.sendgrid.net".into(),
            port: 587,
            security: SmtpSecurity::StartTls,
            username: "apikey".into(),
            password: "SG.secret".into(),
            timeout: Duration::from_secs(10),
        };
        assert!(!format!("{settings:?}").contains("SG.secret"));
    }
}
