use async_trait::async_trait;
use email::{EmailDispatchService, EmailMessage};
use messaging::{MessageHandler, ProcessingError};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Ad-hoc email request. Without `html`, the body comes from the named fallback template.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub to: String,
    pub subject: String,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    /// Enables the delivery record together with `template`
    #[serde(default)]
    pub user_id: Option<String>,
}

pub struct EmailNotificationHandler {
    email: Arc<EmailDispatchService>,
}

impl EmailNotificationHandler {
    pub fn new(email: Arc<EmailDispatchService>) -> Self {
        Self { email }
    }

    fn body(&self, request: &EmailRequest) -> Result<String, ProcessingError> {
        if let Some(html) = request.html.as_ref().filter(|html| !html.trim().is_empty()) {
            return Ok(html.clone());
        }

        let data = request.data.clone().unwrap_or_else(|| Value::Object(Map::new()));
        self.email
            .templates()
            .render_fallback(request.template.as_deref().unwrap_or_default(), &data)
            .map_err(|e| ProcessingError::permanent_with_source("failed to render email body", e))
    }
}

#[async_trait]
impl MessageHandler for EmailNotificationHandler {
    type Message = EmailRequest;

    fn name(&self) -> &'static str {
        "email-notifications"
    }

    #[instrument(skip(self, request), fields(to = %request.to, template = ?request.template))]
    async fn handle(&self, request: EmailRequest) -> Result<(), ProcessingError> {
        if request.to.trim().is_empty() {
            return Err(ProcessingError::malformed("email request without recipient"));
        }

        let html = self.body(&request)?;
        let mut message = EmailMessage::new(request.to, request.subject, html);
        if let (Some(user_id), Some(template)) = (request.user_id, request.template) {
            let variables = match request.data {
                Some(Value::Object(map)) => map,
                _ => Map::new(),
            };
            message = message.with_user(user_id).with_template(template, variables);
        }

        if self.email.send_email(message).await {
            info!("Email request delivered");
        } else {
            warn!("Email request not delivered");
        }
        Ok(())
    }
}
