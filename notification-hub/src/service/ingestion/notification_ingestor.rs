use super::{
    dto::{Acknowledgment, DeliveryOutcome},
    AcknowledgmentStrategy,
};
use crate::{dto::input, error::Error, service::notifications_service::NotificationsService};
use std::sync::Arc;

///
/// Turns raw broker message into a notification
/// and decides how the message is acknowledged
///
pub struct NotificationIngestor<Strategy> {
    notifications_service: Arc<dyn NotificationsService>,
    strategy: Strategy,
}

impl<Strategy> NotificationIngestor<Strategy>
where
    Strategy: AcknowledgmentStrategy,
{
    pub fn new(notifications_service: Arc<dyn NotificationsService>, strategy: Strategy) -> Self {
        Self {
            notifications_service,
            strategy,
        }
    }

    pub async fn ingest(&self, payload: &[u8], redelivered: bool) -> Acknowledgment {
        let outcome = self.process(payload).await;
        let acknowledgment = self.strategy.acknowledgment(outcome, redelivered);
        tracing::debug!(?outcome, ?acknowledgment, redelivered, "message ingested");

        acknowledgment
    }

    async fn process(&self, payload: &[u8]) -> DeliveryOutcome {
        let request = match serde_json::from_slice::<input::NotificationRequest>(payload) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(%err, "malformed message");
                return DeliveryOutcome::Malformed;
            }
        };

        match self
            .notifications_service
            .create_and_broadcast_notification(request)
            .await
        {
            Ok(notification) => {
                tracing::info!(id = notification.id, "message processed");
                DeliveryOutcome::Processed
            }
            Err(err @ (Error::Validation(_) | Error::InvalidBody(_))) => {
                tracing::warn!(%err, "invalid message");
                DeliveryOutcome::Invalid
            }
            Err(err) => {
                tracing::warn!(%err, "failed to process message");
                DeliveryOutcome::PersistenceFailed
            }
        }
    }
}
