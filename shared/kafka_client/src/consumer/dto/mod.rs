mod kafka_consumer_config;
mod kafka_message;

pub use kafka_consumer_config::*;
pub use kafka_message::*;
