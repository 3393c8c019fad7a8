pub mod broadcast_service;
pub mod ingestion;
pub mod kafka_notifications_consumer_service;
pub mod notifications_service;
pub mod rabbitmq_notifications_consumer_service;
