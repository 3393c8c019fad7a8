use amqprs::AmqpDeliveryTag;

///
/// Single message received from the queue
///
#[derive(Debug, Clone)]
pub struct Delivery {
    pub delivery_tag: AmqpDeliveryTag,

    /// Set by the broker when the message was delivered before and not acknowledged
    pub redelivered: bool,

    pub content: Vec<u8>,
}
