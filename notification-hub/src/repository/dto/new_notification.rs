use crate::dto::Priority;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub priority: Priority,
    pub link: Option<String>,
    pub idempotency_key: Option<String>,
    pub created_at: OffsetDateTime,
}
