pub mod connection;
pub mod consumer;
mod retry;

pub use connection::{RabbitmqConnection, RabbitmqConnectionConfig};
pub use consumer::{
    callback::{RabbitmqConsumerDeliveryCallback, RabbitmqConsumerStatusChangeCallback},
    error::ConsumeError,
    Delivery, RabbitmqConsumer, RabbitmqConsumerStatus,
};
pub use retry::retry;
