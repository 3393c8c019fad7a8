use crate::service::ingestion::TransportStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub transports: TransportsHealth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportsHealth {
    pub kafka: TransportStatus,
    pub rabbitmq: TransportStatus,
}
