use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RabbitmqConnectionConfig {
    ///
    /// Fixed delay between attempts to recreate a broken connection
    ///
    pub retry_interval: Duration,
}
