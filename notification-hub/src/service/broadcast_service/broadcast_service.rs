use super::dto::{ConnectionId, Subscription};
use crate::dto::output;
use axum::async_trait;
use std::sync::Arc;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BroadcastService: Send + Sync {
    ///
    /// Register new connection of the user.
    /// Notifications published before attaching are never delivered to it.
    ///
    async fn attach(&self, user_id: String) -> Subscription;

    ///
    /// Remove connection and end its stream of frames.
    /// Detaching connection that is already gone does nothing.
    ///
    async fn detach(&self, user_id: &str, connection_id: ConnectionId);

    ///
    /// Queue notification to every connection of `notification.user_id`.
    ///
    /// Connections that can't accept it immediately are detached.
    /// Failures are never reported to the caller.
    ///
    async fn publish(&self, notification: Arc<output::Notification>);

    ///
    /// Detach every connection
    ///
    async fn close_all(&self);
}
