use rdkafka::{
    client::ClientContext,
    config::RDKafkaLogLevel,
    consumer::ConsumerContext,
    error::{KafkaError, KafkaResult},
    TopicPartitionList,
};

///
/// Routes librdkafka logs and errors into tracing
///
pub struct KafkaClientContext;

impl ClientContext for KafkaClientContext {
    fn log(&self, level: RDKafkaLogLevel, fac: &str, log_message: &str) {
        match level {
            RDKafkaLogLevel::Emerg
            | RDKafkaLogLevel::Alert
            | RDKafkaLogLevel::Critical
            | RDKafkaLogLevel::Error => tracing::error!(fac, "{log_message}"),
            RDKafkaLogLevel::Warning => tracing::warn!(fac, "{log_message}"),
            RDKafkaLogLevel::Notice | RDKafkaLogLevel::Info => {
                tracing::info!(fac, "{log_message}")
            }
            RDKafkaLogLevel::Debug => tracing::debug!(fac, "{log_message}"),
        }
    }

    fn error(&self, error: KafkaError, reason: &str) {
        tracing::warn!(%error, reason, "client error");
    }
}

impl ConsumerContext for KafkaClientContext {
    fn commit_callback(&self, result: KafkaResult<()>, _offsets: &TopicPartitionList) {
        match result {
            Ok(()) => tracing::trace!("offsets committed"),
            Err(err) => tracing::debug!(%err, "offsets commit failed"),
        }
    }
}
