//!
//! Module with user programmable callbacks
//!

mod kafka_consumer_message_callback;

pub use kafka_consumer_message_callback::*;
