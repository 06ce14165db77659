use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationType {
    Transaction,
    System,
    Security,
    Account,
    Wallet,
    #[default]
    Other,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationStatus {
    #[default]
    Unread,
    Read,
    Archived,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// In-app notification stored in MongoDB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id", alias = "id", with = "uuid_string")]
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub notification_type: NotificationType,
    #[serde(default)]
    pub status: NotificationStatus,
    #[serde(default)]
    pub priority: NotificationPriority,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub metadata: Map<String, Value>,
    /// Set on every transition to `read`; archiving keeps it
    #[serde(default, with = "timestamp::option")]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(input: CreateNotification) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            title: input.title,
            message: input.message,
            notification_type: input.notification_type.unwrap_or_default(),
            status: NotificationStatus::Unread,
            priority: input.priority.unwrap_or_default(),
            metadata: input.metadata.unwrap_or_default(),
            read_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Id-only stand-in published after a hard delete
    pub fn deleted(id: Uuid, user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id: user_id.into(),
            title: String::new(),
            message: String::new(),
            notification_type: NotificationType::default(),
            status: NotificationStatus::default(),
            priority: NotificationPriority::default(),
            metadata: Map::new(),
            read_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Create request, from REST or the `notification-events` queue
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotification {
    #[validate(length(min = 1))]
    pub user_id: String,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub message: String,
    #[serde(rename = "type", default)]
    pub notification_type: Option<NotificationType>,
    #[serde(default)]
    pub priority: Option<NotificationPriority>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Map<String, Value>>,
}

/// Listing criteria; every field but `user_id` narrows the result
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationFilter {
    pub user_id: String,
    pub status: Option<NotificationStatus>,
    pub notification_type: Option<NotificationType>,
    pub priority: Option<NotificationPriority>,
    pub limit: i64,
    pub offset: u64,
}

pub const DEFAULT_LIMIT: i64 = 50;

impl NotificationFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            status: None,
            notification_type: None,
            priority: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    pub fn with_status(mut self, status: NotificationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_type(mut self, notification_type: NotificationType) -> Self {
        self.notification_type = Some(notification_type);
        self
    }

    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn paginate(mut self, limit: i64, offset: u64) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    pub fn matches(&self, notification: &Notification) -> bool {
        notification.user_id == self.user_id
            && self.status.is_none_or(|s| notification.status == s)
            && self
                .notification_type
                .is_none_or(|t| notification.notification_type == t)
            && self.priority.is_none_or(|p| notification.priority == p)
    }
}

/// One page of a user's notifications
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPage {
    pub items: Vec<Notification>,
    /// Matches for the filter, ignoring limit/offset
    pub total: u64,
    /// Unread notifications of the user, ignoring the filter
    pub unread_count: u64,
    pub limit: i64,
    pub offset: u64,
}

/// `?userId=&status=&type=&priority=&limit=&offset=`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Owner of the notifications
    pub user_id: Option<String>,
    pub status: Option<NotificationStatus>,
    #[serde(rename = "type")]
    pub notification_type: Option<NotificationType>,
    pub priority: Option<NotificationPriority>,
    pub limit: Option<i64>,
    pub offset: Option<u64>,
}

/// `?userId=`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

/// Transaction fields used to build a transaction notification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionNotification {
    pub transaction_id: String,
    pub transaction_type: String,
    pub transaction_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SocketEventType {
    NotificationCreated,
    NotificationUpdated,
    NotificationDeleted,
}

/// Message placed on `socket-notification-events`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketEvent {
    pub user_id: String,
    /// `None` for bulk updates
    pub notification: Option<Notification>,
    pub unread_count: u64,
    pub event_type: SocketEventType,
}

/// Ids are stored as hyphenated strings whatever the serializer prefers, so filters built
/// with `id.to_string()` match what was inserted.
pub mod uuid_string {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(id: &Uuid, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&id.hyphenated())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Uuid::parse_str(&raw).map_err(D::Error::custom)
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix.
///
/// Fixed width, so stored values sort chronologically as strings.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_str(&format(value)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<DateTime<Utc>>::deserialize(deserializer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn input() -> CreateNotification {
        CreateNotification {
            user_id: "user-1".into(),
            title: "Welcome".into(),
            message: "Hello".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_notification_defaults() {
        let n = Notification::new(input());
        assert_eq!(n.status, NotificationStatus::Unread);
        assert_eq!(n.notification_type, NotificationType::Other);
        assert_eq!(n.priority, NotificationPriority::Medium);
        assert!(n.read_at.is_none());
        assert!(n.metadata.is_empty());
    }

    #[test]
    fn test_wire_shape() {
        let n = Notification::new(input());
        let json = serde_json::to_value(&n).unwrap();

        assert_eq!(json["_id"], n.id.to_string());
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["type"], "other");
        assert_eq!(json["status"], "unread");
        assert!(json["readAt"].is_null());
        assert!(json["createdAt"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_timestamps_are_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(timestamp::format(&whole), "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_accepts_id_alias() {
        let n = Notification::new(input());
        let mut json = serde_json::to_value(&n).unwrap();
        let id = json.as_object_mut().unwrap().remove("_id").unwrap();
        json["id"] = id;

        let parsed: Notification = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.id, n.id);
    }

    #[test]
    fn test_create_validation() {
        assert!(input().validate().is_ok());
        let empty = CreateNotification {
            title: String::new(),
            ..input()
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_filter_matches() {
        let mut n = Notification::new(input());
        n.notification_type = NotificationType::Security;

        assert!(NotificationFilter::for_user("user-1").matches(&n));
        assert!(!NotificationFilter::for_user("user-2").matches(&n));
        assert!(
            NotificationFilter::for_user("user-1")
                .with_type(NotificationType::Security)
                .with_status(NotificationStatus::Unread)
                .matches(&n)
        );
        assert!(
            !NotificationFilter::for_user("user-1")
                .with_priority(NotificationPriority::Urgent)
                .matches(&n)
        );
    }

    #[test]
    fn test_socket_event_shape() {
        let event = SocketEvent {
            user_id: "user-1".into(),
            notification: None,
            unread_count: 0,
            event_type: SocketEventType::NotificationUpdated,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["eventType"], "NOTIFICATION_UPDATED");
        assert!(json["notification"].is_null());
        assert_eq!(json["unreadCount"], 0);
    }
}
