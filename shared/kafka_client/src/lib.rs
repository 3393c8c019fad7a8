pub mod consumer;
pub mod error;
mod retry;

pub use consumer::{
    callback::{KafkaConsumerMessageCallback, OffsetAction},
    KafkaConsumer, KafkaConsumerConfig, KafkaMessage,
};
pub use error::Error;
pub use retry::{retry_bounded, RetryPolicy};
