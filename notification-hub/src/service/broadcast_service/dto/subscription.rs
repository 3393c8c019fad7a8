use super::{ConnectionId, StreamFrame};
use futures::channel::mpsc;

///
/// Attached subscriber connection.
/// Stream of frames ends when connection is detached.
///
pub struct Subscription {
    pub connection_id: ConnectionId,
    pub frames: mpsc::Receiver<StreamFrame>,
}
