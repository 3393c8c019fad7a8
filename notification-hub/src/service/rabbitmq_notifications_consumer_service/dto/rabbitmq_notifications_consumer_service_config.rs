use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RabbitmqNotificationsConsumerServiceConfig {
    /// amqp URI, validated when env is parsed
    pub connection_string: String,

    /// Durable queue, declared when missing
    pub queue: String,

    /// Interval between startup attempts and between reconnects
    pub retry_interval: Duration,
}
