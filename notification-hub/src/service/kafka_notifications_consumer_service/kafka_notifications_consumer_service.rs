use crate::service::{
    ingestion::{
        Acknowledgment, AtMostOnce, IngestionStatus, NotificationIngestor, Transport,
        TransportStatus,
    },
    notifications_service::NotificationsService,
};
use axum::async_trait;
use kafka_client::{
    KafkaConsumer, KafkaConsumerConfig, KafkaConsumerMessageCallback, KafkaMessage, OffsetAction,
};
use std::sync::Arc;
use tokio::{sync::Notify, task::JoinHandle};

///
/// Consumes notifications from the topic.
///
/// Connecting happens in background with bounded retry.
/// When retries run out the service stays down and reports failure.
///
pub struct KafkaNotificationsConsumerService {
    task_handle: JoinHandle<Option<KafkaConsumer>>,
    close_notify: Arc<Notify>,
    ingestion_status: IngestionStatus,
}

impl KafkaNotificationsConsumerService {
    pub fn new(
        config: KafkaConsumerConfig,
        notifications_service: Arc<dyn NotificationsService>,
        ingestion_status: IngestionStatus,
    ) -> Self {
        ingestion_status.set(Transport::Kafka, TransportStatus::Connecting);

        let ingestor = NotificationIngestor::new(notifications_service, AtMostOnce);
        let callback = MessageCallback { ingestor };
        let close_notify = Arc::new(Notify::new());
        let stop = Arc::clone(&close_notify);
        let status = ingestion_status.clone();
        let task_handle =
            tokio::spawn(async move { supervise(config, callback, status, stop).await });

        Self {
            task_handle,
            close_notify,
            ingestion_status,
        }
    }

    ///
    /// Stop connecting or, when already consuming,
    /// finish current message and commit offsets.
    ///
    #[tracing::instrument(name = "Kafka Notifications Consumer", skip_all)]
    pub async fn close(self) {
        self.close_notify.notify_one();

        match self.task_handle.await {
            Ok(Some(kafka_consumer)) => kafka_consumer.close().await,
            Ok(None) => tracing::info!("no consumer to close"),
            Err(err) => tracing::error!(%err, "supervisor task failed"),
        }

        self.ingestion_status.set(Transport::Kafka, TransportStatus::Stopped);
    }
}

#[tracing::instrument(
    name = "Kafka Notifications Consumer",
    skip_all,
    fields(topic = %config.topic)
)]
async fn supervise(
    config: KafkaConsumerConfig,
    callback: MessageCallback,
    ingestion_status: IngestionStatus,
    stop: Arc<Notify>,
) -> Option<KafkaConsumer> {
    tokio::select! {
        biased;

        _ = stop.notified() => None,
        result = KafkaConsumer::new(config, callback) => match result {
            Ok(kafka_consumer) => {
                ingestion_status.set(Transport::Kafka, TransportStatus::Consuming);
                Some(kafka_consumer)
            }
            Err(err) => {
                tracing::error!(%err, "failed to start consumer, giving up");
                ingestion_status.set(Transport::Kafka, TransportStatus::Failed);
                None
            }
        }
    }
}

struct MessageCallback {
    ingestor: NotificationIngestor<AtMostOnce>,
}

#[async_trait]
impl KafkaConsumerMessageCallback for MessageCallback {
    #[tracing::instrument(
        name = "Kafka Notifications Consumer",
        skip_all,
        fields(partition = message.partition, offset = message.offset)
    )]
    async fn execute(&self, message: KafkaMessage) -> OffsetAction {
        tracing::info!("processing message");

        // Missing payload ends as malformed message
        let payload = message.payload.unwrap_or_default();
        let acknowledgment = self.ingestor.ingest(&payload, false).await;

        offset_action(acknowledgment)
    }
}

/// Rejected message is dropped, so only requeue leaves the offset behind
fn offset_action(acknowledgment: Acknowledgment) -> OffsetAction {
    match acknowledgment {
        Acknowledgment::Ack | Acknowledgment::Reject => OffsetAction::Store,
        Acknowledgment::Requeue => OffsetAction::Skip,
    }
}
