mod kafka_notifications_consumer_service;

pub use kafka_notifications_consumer_service::*;
