use std::sync::Arc;

use http::Method;
use serde_json::Value;
use tracing::debug;

use super::parse_list;
use crate::ServiceError;
use crate::http::{ApiClient, RequestBody, segment};
use crate::models::{Notification, PushNotification};

const NOTIFICATIONS_PATH: &str = "/notifications/";
const PUSH_PATH: &str = "/notifications/push";

pub struct NotificationService {
    client: Arc<ApiClient>,
}

impl NotificationService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Notification>, ServiceError> {
        let value: Value = self
            .client
            .get_json(NOTIFICATIONS_PATH, &[], "fetch notifications")
            .await?;
        Ok(parse_list(
            &value,
            &["notifications"],
            Notification::from_json,
            "notification",
        ))
    }

    /// Number of unread notifications
    pub async fn unread_count(&self) -> Result<usize, ServiceError> {
        Ok(self.list().await?.iter().filter(|n| !n.read).count())
    }

    pub async fn push(&self, notification: &PushNotification) -> Result<(), ServiceError> {
        let body = serde_json::to_value(notification)
            .map_err(|e| ServiceError::InvalidRequest(e.to_string()))?;
        self.client
            .send(Method::POST, PUSH_PATH, &[], RequestBody::Json(body), "send notification")
            .await?;
        debug!("Pushed notification {:?}", notification.title);
        Ok(())
    }

    pub async fn mark_read(&self, id: &str) -> Result<(), ServiceError> {
        let path = format!("/notifications/{}/mark_read", segment(id));
        self.client
            .send(Method::POST, &path, &[], RequestBody::Empty, "mark notification read")
            .await?;
        Ok(())
    }
}
