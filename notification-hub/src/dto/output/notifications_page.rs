use super::Notification;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsPage {
    pub data: Vec<Notification>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}
