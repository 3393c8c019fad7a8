use crate::{
    dto::{input, output},
    error::Error,
};
use axum::async_trait;
use bson::oid::ObjectId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationsService: Send + Sync {
    ///
    /// Validate and save new notification, then publish it
    /// to the live connections of its user.
    ///
    /// When notification with the same idempotency_key was already saved
    /// that notification is returned and nothing is published.
    ///
    /// ### Errors
    /// - [Error::Validation] when
    ///     - userId, title, message or type is missing or blank
    ///     - priority is not one of HIGH, MEDIUM, LOW
    /// - [Error::Database] when notification couldn't be saved.
    ///   Nothing is published in that case
    ///
    async fn create_and_broadcast_notification(
        &self,
        request: input::NotificationRequest,
    ) -> Result<output::Notification, Error>;

    ///
    /// Find page of user's notifications that are not deleted, newest first
    ///
    /// ### Errors
    /// - [Error::Validation] when
    ///     - user_id is blank
    ///     - page is 0
    ///     - limit is 0 or exceeds maximum
    ///
    async fn find_notifications(
        &self,
        user_id: String,
        pagination: input::Pagination,
    ) -> Result<output::NotificationsPage, Error>;

    ///
    /// Find notification. Deleted notifications are found too.
    ///
    /// ### Errors
    /// - [Error::NotificationNotExist] when notification with id does not exist
    ///
    async fn find_notification(&self, id: ObjectId) -> Result<output::Notification, Error>;

    ///
    /// ### Errors
    /// - [Error::NotificationNotExist] when notification with id does not exist
    ///
    async fn mark_notification_read(&self, id: ObjectId) -> Result<output::Notification, Error>;

    ///
    /// Soft delete notification. It stays in the database
    /// but is no longer listed.
    ///
    /// ### Errors
    /// - [Error::NotificationNotExist] when notification with id does not exist
    ///
    async fn delete_notification(
        &self,
        id: ObjectId,
    ) -> Result<output::DeletedNotification, Error>;
}
