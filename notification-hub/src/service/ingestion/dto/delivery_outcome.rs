#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Processed,

    /// Payload is not a notification JSON
    Malformed,

    /// Notification failed validation
    Invalid,

    /// Notification couldn't be saved
    PersistenceFailed,
}
