mod delivery;
mod rabbitmq_consumer_status;

pub use delivery::*;
pub use rabbitmq_consumer_status::*;
