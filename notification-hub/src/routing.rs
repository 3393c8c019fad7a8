use crate::{
    application::{ApplicationMiddleware, ApplicationState},
    dto::{input, output},
    error::Error,
    service::{
        broadcast_service::{BroadcastService, StreamFrame},
        ingestion::IngestionStatus,
        notifications_service::NotificationsService,
    },
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::sse::{Event, Sse},
    routing::{get, patch, post},
    Json, Router,
};
use bson::oid::ObjectId;
use futures::{Stream, StreamExt};
use std::sync::Arc;

pub fn routing(application_middleware: &ApplicationMiddleware) -> Router<ApplicationState> {
    Router::new()
        .route("/notifications/send", post(send_notification))
        .route("/notifications/stream", get(stream_notifications))
        .route("/notifications", get(find_notifications))
        .route(
            "/notifications/:id",
            get(find_notification).delete(delete_notification),
        )
        .route("/notifications/:id/read", patch(mark_notification_read))
        .route("/health", get(health))
        .layer(application_middleware.body_limit.clone())
}

async fn send_notification(
    State(notifications_service): State<Arc<dyn NotificationsService>>,
    request: Result<Json<input::NotificationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<output::Notification>), Error> {
    let Json(request) = request.map_err(body_error)?;

    let notification = notifications_service
        .create_and_broadcast_notification(request)
        .await?;

    Ok((StatusCode::CREATED, Json(notification)))
}

async fn stream_notifications(
    State(broadcast_service): State<Arc<dyn BroadcastService>>,
    subscriber: Result<Query<input::Subscriber>, QueryRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, Error> {
    let user_id = subscriber_id(subscriber)?;

    let subscription = broadcast_service.attach(user_id).await;

    // Dropping the response drops the receiver, which ends the connection task
    Ok(Sse::new(subscription.frames.map(StreamFrame::into_event)))
}

async fn find_notifications(
    State(notifications_service): State<Arc<dyn NotificationsService>>,
    subscriber: Result<Query<input::Subscriber>, QueryRejection>,
    pagination: Result<Query<input::Pagination>, QueryRejection>,
) -> Result<Json<output::NotificationsPage>, Error> {
    let user_id = subscriber_id(subscriber)?;
    let Query(pagination) = pagination
        .map_err(|_| Error::Validation("page and limit must be positive integers"))?;

    let page = notifications_service
        .find_notifications(user_id, pagination)
        .await?;

    Ok(Json(page))
}

async fn find_notification(
    State(notifications_service): State<Arc<dyn NotificationsService>>,
    Path(id): Path<String>,
) -> Result<Json<output::Notification>, Error> {
    let id = parse_id(&id)?;

    let notification = notifications_service.find_notification(id).await?;

    Ok(Json(notification))
}

async fn mark_notification_read(
    State(notifications_service): State<Arc<dyn NotificationsService>>,
    Path(id): Path<String>,
) -> Result<Json<output::Notification>, Error> {
    let id = parse_id(&id)?;

    let notification = notifications_service.mark_notification_read(id).await?;

    Ok(Json(notification))
}

async fn delete_notification(
    State(notifications_service): State<Arc<dyn NotificationsService>>,
    Path(id): Path<String>,
) -> Result<Json<output::DeletedNotification>, Error> {
    let id = parse_id(&id)?;

    let deleted = notifications_service.delete_notification(id).await?;

    Ok(Json(deleted))
}

async fn health(State(ingestion_status): State<IngestionStatus>) -> Json<output::Health> {
    Json(output::Health {
        status: "ok".to_string(),
        transports: ingestion_status.snapshot(),
    })
}

/// Malformed id can't match any notification
fn parse_id(id: &str) -> Result<ObjectId, Error> {
    ObjectId::parse_str(id).map_err(|_| Error::NotificationNotExist)
}

fn subscriber_id(
    subscriber: Result<Query<input::Subscriber>, QueryRejection>,
) -> Result<String, Error> {
    let Query(subscriber) = subscriber.map_err(|_| Error::Validation("userId is required"))?;

    let user_id = subscriber.user_id.trim();
    if user_id.is_empty() {
        return Err(Error::Validation("userId is required"));
    }

    Ok(user_id.to_string())
}

fn body_error(rejection: JsonRejection) -> Error {
    match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => Error::PayloadTooLarge,
        _ => Error::InvalidBody(rejection.body_text()),
    }
}
