mod dto;
mod rabbitmq_notifications_consumer_service;

pub use dto::*;
pub use rabbitmq_notifications_consumer_service::*;
