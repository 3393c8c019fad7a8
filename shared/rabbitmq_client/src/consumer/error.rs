use std::fmt::Display;

///
/// Returned by the delivery callback when a message wasn't processed.
/// The message is negatively acknowledged, `requeue` decides whether
/// the broker should deliver it again.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumeError {
    pub requeue: bool,
}

impl ConsumeError {
    pub fn new(requeue: bool) -> Self {
        Self { requeue }
    }
}

impl Display for ConsumeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "consume failed (requeue: {})", self.requeue)
    }
}

impl std::error::Error for ConsumeError {}
