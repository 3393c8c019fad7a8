///
/// What the broker is told about a processed message
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgment {
    Ack,

    /// Dropped or dead-lettered, never delivered again
    Reject,

    /// Delivered again later
    Requeue,
}
