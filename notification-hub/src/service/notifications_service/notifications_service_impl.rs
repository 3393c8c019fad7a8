use super::NotificationsService;
use crate::{
    dto::{input, output, Priority},
    error::Error,
    repository::{self, NewNotification, NotificationsRepository},
    service::broadcast_service::BroadcastService,
};
use axum::async_trait;
use bson::oid::ObjectId;
use std::{str::FromStr, sync::Arc};
use time::OffsetDateTime;

pub struct NotificationsServiceImpl {
    repository: Arc<dyn NotificationsRepository>,
    broadcast_service: Arc<dyn BroadcastService>,
}

impl NotificationsServiceImpl {
    pub fn new(
        repository: Arc<dyn NotificationsRepository>,
        broadcast_service: Arc<dyn BroadcastService>,
    ) -> Self {
        Self {
            repository,
            broadcast_service,
        }
    }

    fn validate_notification_request(
        request: input::NotificationRequest,
    ) -> Result<NewNotification, Error> {
        let user_id = Self::required(request.user_id, "userId is required")?;
        let title = Self::required(request.title, "title is required")?;
        let message = Self::required(request.message, "message is required")?;
        let notification_type = Self::required(request.notification_type, "type is required")?;
        let priority = match Self::optional(request.priority) {
            Some(priority) => Priority::from_str(&priority)
                .map_err(|_| Error::Validation("priority must be one of HIGH, MEDIUM, LOW"))?,
            None => Priority::default(),
        };

        let created_at = Self::ceil_to_millisecond(OffsetDateTime::now_utc());

        Ok(NewNotification {
            user_id,
            title,
            message,
            notification_type,
            priority,
            link: Self::optional(request.link),
            idempotency_key: Self::optional(request.idempotency_key),
            created_at,
        })
    }

    /// Mongo keeps datetime in milliseconds, rounding up keeps it not earlier than now
    fn ceil_to_millisecond(time: OffsetDateTime) -> OffsetDateTime {
        let sub_millisecond = time.nanosecond() % 1_000_000;
        if sub_millisecond == 0 {
            return time;
        }

        time + time::Duration::nanoseconds(i64::from(1_000_000 - sub_millisecond))
    }

    fn validate_pagination(user_id: &str, pagination: &input::Pagination) -> Result<(), Error> {
        if user_id.trim().is_empty() {
            return Err(Error::Validation("userId is required"));
        }
        if pagination.page == 0 {
            return Err(Error::Validation("page starts at 1"));
        }
        if pagination.limit == 0 || pagination.limit > input::MAX_PAGE_LIMIT {
            return Err(Error::Validation("limit must be between 1 and 100"));
        }
        // Database can't skip more than i64::MAX documents
        if i64::try_from(pagination.skip()).is_err() {
            return Err(Error::Validation("page is too large"));
        }

        Ok(())
    }

    fn required(value: Option<String>, message: &'static str) -> Result<String, Error> {
        Self::optional(value).ok_or(Error::Validation(message))
    }

    /// Blank values are treated as absent
    fn optional(value: Option<String>) -> Option<String> {
        value
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    async fn find_already_created(
        &self,
        user_id: &str,
        idempotency_key: Option<String>,
    ) -> Result<output::Notification, Error> {
        // _id can't collide, so the violated index is the idempotency_key one
        let Some(idempotency_key) = idempotency_key else {
            return Err(Error::Database(repository::Error::InsertUniqueViolation));
        };

        let notification = self
            .repository
            .find_by_idempotency_key(&idempotency_key)
            .await?
            .ok_or(Error::Database(repository::Error::InsertUniqueViolation))?;

        if notification.user_id != user_id {
            return Err(Error::Validation("idempotencyKey already used by another user"));
        }

        tracing::info!(
            id = %notification.id,
            idempotency_key,
            "notification already created"
        );

        Ok(notification.into())
    }
}

#[async_trait]
impl NotificationsService for NotificationsServiceImpl {
    async fn create_and_broadcast_notification(
        &self,
        request: input::NotificationRequest,
    ) -> Result<output::Notification, Error> {
        tracing::info!("creating notification");
        tracing::trace!(?request);

        let new_notification = Self::validate_notification_request(request)?;
        let user_id = new_notification.user_id.clone();
        let idempotency_key = new_notification.idempotency_key.clone();

        let notification = match self.repository.insert(new_notification).await {
            Ok(notification) => notification,
            Err(repository::Error::InsertUniqueViolation) => {
                return self.find_already_created(&user_id, idempotency_key).await;
            }
            Err(err) => return Err(Error::Database(err)),
        };
        tracing::info!(id = %notification.id, "created notification");

        let notification = Arc::new(output::Notification::from(notification));
        self.broadcast_service.publish(Arc::clone(&notification)).await;

        Ok(Arc::unwrap_or_clone(notification))
    }

    async fn find_notifications(
        &self,
        user_id: String,
        pagination: input::Pagination,
    ) -> Result<output::NotificationsPage, Error> {
        tracing::info!("finding notifications");
        tracing::trace!(?pagination);

        Self::validate_pagination(&user_id, &pagination)?;

        let (notifications, total) = tokio::try_join!(
            self.repository.find_many(&user_id, pagination),
            self.repository.count(&user_id),
        )?;
        tracing::info!(count = notifications.len(), total, "found notifications");

        let data = notifications
            .into_iter()
            .map(output::Notification::from)
            .collect();

        Ok(output::NotificationsPage {
            data,
            page: pagination.page,
            limit: pagination.limit,
            total,
        })
    }

    async fn find_notification(&self, id: ObjectId) -> Result<output::Notification, Error> {
        tracing::info!(%id, "finding notification");

        let notification = self
            .repository
            .find(id)
            .await?
            .ok_or(Error::NotificationNotExist)?;

        tracing::info!(%id, "found notification");

        Ok(notification.into())
    }

    async fn mark_notification_read(&self, id: ObjectId) -> Result<output::Notification, Error> {
        tracing::info!(%id, "marking notification read");

        let notification = self
            .repository
            .mark_read(id)
            .await?
            .ok_or(Error::NotificationNotExist)?;

        tracing::info!(%id, "marked notification read");

        Ok(notification.into())
    }

    async fn delete_notification(
        &self,
        id: ObjectId,
    ) -> Result<output::DeletedNotification, Error> {
        tracing::info!(%id, "deleting notification");

        self.repository
            .soft_delete(id)
            .await
            .map_err(|err| match err {
                repository::Error::NoDocumentUpdated => Error::NotificationNotExist,
                err => Error::Database(err),
            })?;

        tracing::info!(%id, "deleted notification");

        Ok(output::DeletedNotification {
            id: id.to_hex(),
            deleted: true,
        })
    }
}
