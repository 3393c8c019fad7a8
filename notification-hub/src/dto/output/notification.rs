use crate::{dto::Priority, repository};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub priority: Priority,
    pub link: Option<String>,
    pub read: bool,
    pub deleted: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<repository::Notification> for Notification {
    fn from(notification: repository::Notification) -> Self {
        Self {
            id: notification.id.to_hex(),
            user_id: notification.user_id,
            title: notification.title,
            message: notification.message,
            notification_type: notification.notification_type,
            priority: notification.priority,
            link: notification.link,
            read: notification.read,
            deleted: notification.deleted,
            created_at: notification.created_at,
        }
    }
}
