use crate::{dto::Priority, repository::dto::NewNotification};
use bson::DateTime;
use serde::Serialize;

#[derive(Serialize)]
pub struct NotificationInsertEntity {
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub priority: Priority,
    pub link: Option<String>,
    pub read: bool,
    pub deleted: bool,
    pub created_at: DateTime,

    // Must be absent rather than null, the unique index on it is sparse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl From<&NewNotification> for NotificationInsertEntity {
    fn from(notification: &NewNotification) -> Self {
        Self {
            user_id: notification.user_id.clone(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            notification_type: notification.notification_type.clone(),
            priority: notification.priority,
            link: notification.link.clone(),
            read: false,
            deleted: false,
            created_at: DateTime::from(notification.created_at),
            idempotency_key: notification.idempotency_key.clone(),
        }
    }
}
