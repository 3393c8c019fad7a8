use super::{
    dto::{NewNotification, Notification},
    error::Error,
};
use crate::dto::input;
use axum::async_trait;
use bson::oid::ObjectId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationsRepository: Send + Sync {
    ///
    /// Inserts new notification with `read` and `deleted` set to false
    ///
    /// ### Errors
    /// - [Error::InsertUniqueViolation]
    /// when notification with the same idempotency_key already exists
    ///
    async fn insert(&self, notification: NewNotification) -> Result<Notification, Error>;

    ///
    /// Finds notification by id. Deleted notifications are found too
    ///
    async fn find(&self, id: ObjectId) -> Result<Option<Notification>, Error>;

    async fn find_by_idempotency_key(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<Notification>, Error>;

    ///
    /// Finds notifications of the user that are not deleted.
    /// Notifications are sorted descending by creation date.
    ///
    async fn find_many(
        &self,
        user_id: &str,
        pagination: input::Pagination,
    ) -> Result<Vec<Notification>, Error>;

    ///
    /// Counts notifications of the user that are not deleted
    ///
    async fn count(&self, user_id: &str) -> Result<u64, Error>;

    ///
    /// Sets `read` to true and returns updated notification.
    /// Returns None when notification does not exist
    ///
    async fn mark_read(&self, id: ObjectId) -> Result<Option<Notification>, Error>;

    ///
    /// Sets `deleted` to true. Deleting already deleted notification is not an error
    ///
    /// ### Errors
    /// - [Error::NoDocumentUpdated] when notification does not exist
    ///
    async fn soft_delete(&self, id: ObjectId) -> Result<(), Error>;
}
