use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransportStatus {
    #[default]
    Connecting,
    Consuming,
    Recovering,

    /// Gave up connecting, stays down until restart
    Failed,
    Stopped,
}
