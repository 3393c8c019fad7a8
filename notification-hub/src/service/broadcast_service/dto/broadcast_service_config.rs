use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BroadcastServiceConfig {
    /// Idle time after which heartbeat frame is written
    pub heartbeat_interval: Duration,

    /// Maximum time a single write may wait for the peer
    pub silence_timeout: Duration,

    /// Number of notifications queued per connection before it is considered slow
    pub buffer_size: usize,
}
