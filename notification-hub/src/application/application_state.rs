use super::ApplicationEnv;
use crate::{
    repository::NotificationsRepositoryImpl,
    service::{
        broadcast_service::{BroadcastService, BroadcastServiceConfig, BroadcastServiceImpl},
        ingestion::IngestionStatus,
        kafka_notifications_consumer_service::KafkaNotificationsConsumerService,
        notifications_service::{NotificationsService, NotificationsServiceImpl},
        rabbitmq_notifications_consumer_service::{
            RabbitmqNotificationsConsumerService, RabbitmqNotificationsConsumerServiceConfig,
        },
    },
};
use axum::extract::FromRef;
use kafka_client::{KafkaConsumerConfig, RetryPolicy};
use mongodb::{options::ClientOptions, Client};
use std::{sync::Arc, time::Duration};

const KAFKA_METADATA_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, FromRef)]
pub struct ApplicationState {
    pub notifications_service: Arc<dyn NotificationsService>,
    pub broadcast_service: Arc<dyn BroadcastService>,
    pub ingestion_status: IngestionStatus,
}

pub struct ApplicationStateToClose {
    pub db_client: Client,
    pub broadcast_service: Arc<dyn BroadcastService>,
    pub rabbitmq_notifications_consumer_service: RabbitmqNotificationsConsumerService,
    pub kafka_notifications_consumer_service: KafkaNotificationsConsumerService,
}

///
/// Connects to the database and starts consumers.
/// Consumers connect to brokers in background,
/// so brokers being down doesn't prevent startup.
///
/// ### Errors
/// - database is unreachable or indexes can't be created
///
pub async fn create_state(
    env: &ApplicationEnv,
) -> anyhow::Result<(ApplicationState, ApplicationStateToClose)> {
    tracing::info!("connecting to database");
    let db_client_options = ClientOptions::parse(&env.db_connection_string).await?;
    let db_client = Client::with_options(db_client_options)?;
    let db = db_client.database(&env.db_name);

    tracing::info!("creating repositories");
    let notifications_repository = NotificationsRepositoryImpl::new(db).await?;
    let notifications_repository = Arc::new(notifications_repository);

    tracing::info!("creating services");
    let config = BroadcastServiceConfig {
        heartbeat_interval: env.stream_heartbeat_interval,
        silence_timeout: env.stream_silence_timeout,
        buffer_size: env.stream_buffer_size,
    };
    let broadcast_service = BroadcastServiceImpl::new(config);
    let broadcast_service: Arc<dyn BroadcastService> = Arc::new(broadcast_service);

    let notifications_service =
        NotificationsServiceImpl::new(notifications_repository, broadcast_service.clone());
    let notifications_service: Arc<dyn NotificationsService> = Arc::new(notifications_service);

    let ingestion_status = IngestionStatus::new();

    tracing::info!("starting consumers");
    let config = RabbitmqNotificationsConsumerServiceConfig {
        connection_string: env.rabbitmq_connection_string.clone(),
        queue: env.rabbitmq_queue_name.clone(),
        retry_interval: env.rabbitmq_retry_interval,
    };
    let rabbitmq_notifications_consumer_service = RabbitmqNotificationsConsumerService::new(
        config,
        notifications_service.clone(),
        ingestion_status.clone(),
    );

    let config = KafkaConsumerConfig {
        brokers: env.kafka_brokers.clone(),
        topic: env.kafka_topic.clone(),
        group_id: env.kafka_group_id.clone(),
        client_id: env.kafka_client_id.clone(),
        retry_policy: RetryPolicy {
            max_count: env.kafka_retry_max_count,
            initial_interval: env.kafka_retry_initial_interval,
        },
        metadata_timeout: KAFKA_METADATA_TIMEOUT,
    };
    let kafka_notifications_consumer_service = KafkaNotificationsConsumerService::new(
        config,
        notifications_service.clone(),
        ingestion_status.clone(),
    );

    Ok((
        ApplicationState {
            notifications_service,
            broadcast_service: broadcast_service.clone(),
            ingestion_status,
        },
        ApplicationStateToClose {
            db_client,
            broadcast_service,
            rabbitmq_notifications_consumer_service,
            kafka_notifications_consumer_service,
        },
    ))
}
