use super::RabbitmqNotificationsConsumerServiceConfig;
use crate::service::{
    ingestion::{
        Acknowledgment, AtLeastOnce, IngestionStatus, NotificationIngestor, Transport,
        TransportStatus,
    },
    notifications_service::NotificationsService,
};
use amqprs::{
    channel::{BasicConsumeArguments, QueueDeclareArguments},
    connection::OpenConnectionArguments,
};
use axum::async_trait;
use rabbitmq_client::{
    retry, ConsumeError, Delivery, RabbitmqConnection, RabbitmqConnectionConfig,
    RabbitmqConsumer, RabbitmqConsumerDeliveryCallback, RabbitmqConsumerStatus,
    RabbitmqConsumerStatusChangeCallback,
};
use std::sync::Arc;
use tokio::{sync::Notify, task::JoinHandle};

const PREFETCH_COUNT: u16 = 1;

///
/// Consumes notifications from the durable queue.
///
/// Startup runs in background and is retried until it succeeds,
/// so broker being unavailable never blocks the application.
///
pub struct RabbitmqNotificationsConsumerService {
    task_handle: JoinHandle<Option<Running>>,
    close_notify: Arc<Notify>,
    ingestion_status: IngestionStatus,
}

struct Running {
    rabbitmq_connection: RabbitmqConnection,
    rabbitmq_consumer: RabbitmqConsumer,
}

impl RabbitmqNotificationsConsumerService {
    pub fn new(
        config: RabbitmqNotificationsConsumerServiceConfig,
        notifications_service: Arc<dyn NotificationsService>,
        ingestion_status: IngestionStatus,
    ) -> Self {
        ingestion_status.set(Transport::Rabbitmq, TransportStatus::Connecting);

        let ingestor = Arc::new(NotificationIngestor::new(notifications_service, AtLeastOnce));
        let close_notify = Arc::new(Notify::new());
        let stop = Arc::clone(&close_notify);
        let status = ingestion_status.clone();
        let task_handle =
            tokio::spawn(async move { supervise(config, ingestor, status, stop).await });

        Self {
            task_handle,
            close_notify,
            ingestion_status,
        }
    }

    ///
    /// Stop startup attempts or, when already consuming,
    /// close consumer and then the connection.
    ///
    #[tracing::instrument(name = "RabbitMQ Notifications Consumer", skip_all)]
    pub async fn close(self) {
        self.close_notify.notify_one();

        match self.task_handle.await {
            Ok(Some(running)) => {
                running.rabbitmq_consumer.close().await;

                tracing::info!("closing connection");
                running.rabbitmq_connection.close().await;
            }
            Ok(None) => tracing::info!("closed before consumer started"),
            Err(err) => tracing::error!(%err, "supervisor task failed"),
        }

        self.ingestion_status.set(Transport::Rabbitmq, TransportStatus::Stopped);
    }
}

#[tracing::instrument(
    name = "RabbitMQ Notifications Consumer",
    skip_all,
    fields(queue = %config.queue)
)]
async fn supervise(
    config: RabbitmqNotificationsConsumerServiceConfig,
    ingestor: Arc<NotificationIngestor<AtLeastOnce>>,
    ingestion_status: IngestionStatus,
    stop: Arc<Notify>,
) -> Option<Running> {
    let startup = retry(
        config.retry_interval,
        |attempt| tracing::info!(attempt, "starting consumer"),
        |attempt, err: anyhow::Error| tracing::warn!(attempt, %err, "failed to start consumer"),
        || start(&config, Arc::clone(&ingestor), ingestion_status.clone()),
    );

    tokio::select! {
        biased;

        _ = stop.notified() => None,
        running = startup => {
            tracing::info!("consumer started");
            Some(running)
        }
    }
}

async fn start(
    config: &RabbitmqNotificationsConsumerServiceConfig,
    ingestor: Arc<NotificationIngestor<AtLeastOnce>>,
    ingestion_status: IngestionStatus,
) -> anyhow::Result<Running> {
    let open_connection_args =
        OpenConnectionArguments::try_from(config.connection_string.as_str())?;
    let connection_config = RabbitmqConnectionConfig {
        retry_interval: config.retry_interval,
    };
    let rabbitmq_connection =
        RabbitmqConnection::new(connection_config, open_connection_args).await?;

    let queue_declare_args = QueueDeclareArguments::new(&config.queue)
        .durable(true)
        .finish();
    let basic_consume_args = BasicConsumeArguments::new(&config.queue, "")
        .manual_ack(true)
        .finish();
    let consumer_result = RabbitmqConsumer::new(
        rabbitmq_connection.clone(),
        None,
        queue_declare_args,
        Vec::new(),
        basic_consume_args,
        PREFETCH_COUNT,
        DeliveryCallback { ingestor },
        StatusCallback { ingestion_status },
    )
    .await;

    match consumer_result {
        Ok(rabbitmq_consumer) => Ok(Running {
            rabbitmq_connection,
            rabbitmq_consumer,
        }),
        Err(err) => {
            // Clone passed to the consumer is already dropped
            rabbitmq_connection.close().await;
            Err(err)
        }
    }
}

struct DeliveryCallback {
    ingestor: Arc<NotificationIngestor<AtLeastOnce>>,
}

#[async_trait]
impl RabbitmqConsumerDeliveryCallback for DeliveryCallback {
    #[tracing::instrument(
        name = "RabbitMQ Notifications Consumer",
        skip_all,
        fields(delivery_tag = delivery.delivery_tag)
    )]
    async fn execute(&self, delivery: Delivery) -> Result<(), ConsumeError> {
        tracing::info!("processing message");

        let acknowledgment = self
            .ingestor
            .ingest(&delivery.content, delivery.redelivered)
            .await;

        match acknowledgment {
            Acknowledgment::Ack => Ok(()),
            Acknowledgment::Reject => Err(ConsumeError::new(false)),
            Acknowledgment::Requeue => Err(ConsumeError::new(true)),
        }
    }
}

struct StatusCallback {
    ingestion_status: IngestionStatus,
}

#[async_trait]
impl RabbitmqConsumerStatusChangeCallback for StatusCallback {
    async fn execute(&self, status: RabbitmqConsumerStatus) {
        let status = match status {
            RabbitmqConsumerStatus::Consuming => TransportStatus::Consuming,
            RabbitmqConsumerStatus::Recovering => TransportStatus::Recovering,
        };

        self.ingestion_status.set(Transport::Rabbitmq, status);
    }
}
