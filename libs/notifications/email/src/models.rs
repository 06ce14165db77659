use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Supported SMTP providers
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EmailProviderKind {
    #[default]
    Sendgrid,
    Mailgun,
}

/// A send request as seen by the dispatch service.
///
/// `user_id` plus `template_name` turn on delivery bookkeeping for the request.
#[derive(Debug, Clone, Default)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub user_id: Option<String>,
    pub template_name: Option<String>,
    pub template_variables: Map<String, Value>,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_template(mut self, name: impl Into<String>, variables: Map<String, Value>) -> Self {
        self.template_name = Some(name.into());
        self.template_variables = variables;
        self
    }

    /// Delivery record input, when the request is tracked
    pub fn delivery(&self, provider: EmailProviderKind) -> Option<NewDelivery> {
        match (&self.user_id, &self.template_name) {
            (Some(user_id), Some(template_name)) => Some(NewDelivery {
                user_id: user_id.clone(),
                template_name: template_name.clone(),
                template_variables: self.template_variables.clone(),
                email_provider: provider,
            }),
            _ => None,
        }
    }
}

/// Fully addressed message handed to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Audit record for one logical templated send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDelivery {
    #[serde(rename = "_id", alias = "id", with = "id_string")]
    pub id: Uuid,
    pub user_id: String,
    pub template_name: String,
    #[serde(default)]
    pub template_variables: Map<String, Value>,
    pub email_provider: EmailProviderKind,
    #[serde(default)]
    pub is_sent: bool,
    #[serde(default)]
    pub retry: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stores the record id as a hyphenated string for every serializer
mod id_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(id: &Uuid, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&id.hyphenated())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Uuid::parse_str(&raw).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDelivery {
    pub user_id: String,
    pub template_name: String,
    pub template_variables: Map<String, Value>,
    pub email_provider: EmailProviderKind,
}

impl EmailDelivery {
    pub fn new(input: NewDelivery) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            template_name: input.template_name,
            template_variables: input.template_variables,
            email_provider: input.email_provider,
            is_sent: false,
            retry: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Lifecycle stage a transaction email reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TransactionEmailKind {
    #[strum(serialize = "pending")]
    Pending,
    #[strum(serialize = "confirmed")]
    Confirmed,
    #[strum(serialize = "rejected")]
    Rejected,
}

impl TransactionEmailKind {
    /// Tag stored on the delivery record
    pub fn template_name(&self) -> &'static str {
        match self {
            TransactionEmailKind::Pending => "transaction-pending",
            TransactionEmailKind::Confirmed => "transaction-confirmed",
            TransactionEmailKind::Rejected => "transaction-rejected",
        }
    }
}

/// Variables for the transaction email templates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEmailData {
    pub transaction_id: String,
    pub transaction_type: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TransactionEmailData {
    /// Template variables as a JSON object
    pub fn to_variables(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}
