use super::NewNotification;
use crate::{dto::Priority, repository::entity::NotificationFindEntity};
use bson::oid::ObjectId;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: ObjectId,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub priority: Priority,
    pub link: Option<String>,
    pub read: bool,
    pub deleted: bool,
    pub idempotency_key: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Notification {
    pub fn inserted(id: ObjectId, notification: NewNotification) -> Self {
        Self {
            id,
            user_id: notification.user_id,
            title: notification.title,
            message: notification.message,
            notification_type: notification.notification_type,
            priority: notification.priority,
            link: notification.link,
            read: false,
            deleted: false,
            idempotency_key: notification.idempotency_key,
            created_at: notification.created_at,
        }
    }
}

impl From<NotificationFindEntity> for Notification {
    fn from(entity: NotificationFindEntity) -> Self {
        Self {
            id: entity._id,
            user_id: entity.user_id,
            title: entity.title,
            message: entity.message,
            notification_type: entity.notification_type,
            priority: entity.priority,
            link: entity.link,
            read: entity.read,
            deleted: entity.deleted,
            idempotency_key: entity.idempotency_key,
            created_at: entity.created_at.into(),
        }
    }
}
