use crate::consumer::dto::KafkaMessage;
use async_trait::async_trait;

///
/// What the consumer does with the offset of a processed message.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetAction {
    /// Offset is stored and committed with the next automatic commit
    Store,
    /// Offset is not stored. Offsets stored for later messages of
    /// the same partition still move the committed position past it.
    Skip,
}

///
/// Callback executed for every consumed message.
///
/// Messages are handled one at a time in partition order.
/// Returned action decides whether the offset of the message is stored for commit.
///
#[async_trait]
pub trait KafkaConsumerMessageCallback {
    async fn execute(&self, message: KafkaMessage) -> OffsetAction;
}
