use crate::consumer::{dto::Delivery, error::ConsumeError};
use async_trait::async_trait;

///
/// Callback executed whenever delivery is received.
///
/// Deliveries are processed one at a time. Ack is sent when the callback
/// returns `Ok`, otherwise Nack is sent with requeue taken from [ConsumeError].
///
#[async_trait]
pub trait RabbitmqConsumerDeliveryCallback {
    async fn execute(&self, delivery: Delivery) -> Result<(), ConsumeError>;
}
