use rdkafka::error::KafkaError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid consumer configuration: {0}")]
    Config(#[source] KafkaError),

    #[error("failed to subscribe: {0}")]
    Subscribe(#[source] KafkaError),

    #[error("failed to fetch metadata: {0}")]
    Metadata(#[source] KafkaError),

    #[error("metadata task failed: {0}")]
    MetadataTask(#[from] tokio::task::JoinError),
}
