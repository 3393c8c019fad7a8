use crate::dto::Priority;
use bson::{oid::ObjectId, DateTime};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct NotificationFindEntity {
    pub _id: ObjectId,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub priority: Priority,
    #[serde(default)]
    pub link: Option<String>,
    pub read: bool,
    pub deleted: bool,
    pub created_at: DateTime,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}
