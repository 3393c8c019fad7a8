//!
//! Transport independent part of consuming notifications from the brokers
//!

mod acknowledgment_strategy;
mod dto;
mod ingestion_status;
mod notification_ingestor;

pub use acknowledgment_strategy::*;
pub use dto::*;
pub use ingestion_status::*;
pub use notification_ingestor::*;
