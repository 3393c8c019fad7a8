use rdkafka::{message::OwnedMessage, Message};

///
/// Message detached from the consumer
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<Vec<u8>>,
    pub payload: Option<Vec<u8>>,
}

impl From<OwnedMessage> for KafkaMessage {
    fn from(message: OwnedMessage) -> Self {
        Self {
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
            key: message.key().map(|key| key.to_vec()),
            payload: message.payload().map(|payload| payload.to_vec()),
        }
    }
}
