mod rabbitmq_notifications_consumer_service_config;

pub use rabbitmq_notifications_consumer_service_config::*;
