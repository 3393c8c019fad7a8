//!
//! Module with tools that allow to consume messages from a Kafka topic
//!

pub mod callback;

mod client_context;
mod dto;
mod kafka_consumer;

pub use dto::{KafkaConsumerConfig, KafkaMessage};
pub use kafka_consumer::*;
