use crate::retry::RetryPolicy;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct KafkaConsumerConfig {
    /// Comma separated list of `host:port`
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
    pub client_id: String,

    pub retry_policy: RetryPolicy,

    /// Time limit of a single metadata request used to verify the connection
    pub metadata_timeout: Duration,
}
