use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::normalize::{first_bool, first_datetime, first_str};

/// In-app notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub site_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Precedence: id `id`, `_id`, `notification_id`; title `title`,
    /// `subject`; message `message`, `body`, `text`; read `read`, `is_read`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let id = first_str(value, &["id", "_id", "notification_id"])?;
        let message = first_str(value, &["message", "body", "text"]).unwrap_or_default();
        Some(Self {
            id,
            title: first_str(value, &["title", "subject"]).unwrap_or_else(|| message.clone()),
            message,
            read: first_bool(value, &["read", "is_read"]).unwrap_or(false),
            site_id: first_str(value, &["site_id", "siteId"]),
            created_at: first_datetime(value, &["created_at", "createdAt", "timestamp"]),
        })
    }
}

/// Payload for pushing a notification to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotification {
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    /// Empty means everyone the sender may reach
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<String>,
}

impl PushNotification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            site_id: None,
            recipients: Vec::new(),
        }
    }

    pub fn for_site(mut self, site_id: impl Into<String>) -> Self {
        self.site_id = Some(site_id.into());
        self
    }

    pub fn to(mut self, email: impl Into<String>) -> Self {
        self.recipients.push(email.into());
        self
    }
}
