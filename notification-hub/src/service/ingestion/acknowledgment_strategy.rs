use super::dto::{Acknowledgment, DeliveryOutcome};

pub trait AcknowledgmentStrategy: Send + Sync {
    fn acknowledgment(&self, outcome: DeliveryOutcome, redelivered: bool) -> Acknowledgment;
}

///
/// Every message is acknowledged, failed ones are lost
///
#[derive(Debug, Clone, Copy, Default)]
pub struct AtMostOnce;

impl AcknowledgmentStrategy for AtMostOnce {
    fn acknowledgment(&self, _outcome: DeliveryOutcome, _redelivered: bool) -> Acknowledgment {
        Acknowledgment::Ack
    }
}

///
/// Messages that failed to be saved are delivered once more.
/// Messages that can never succeed are rejected immediately.
///
#[derive(Debug, Clone, Copy, Default)]
pub struct AtLeastOnce;

impl AcknowledgmentStrategy for AtLeastOnce {
    fn acknowledgment(&self, outcome: DeliveryOutcome, redelivered: bool) -> Acknowledgment {
        match outcome {
            DeliveryOutcome::Processed => Acknowledgment::Ack,
            DeliveryOutcome::Malformed | DeliveryOutcome::Invalid => Acknowledgment::Reject,
            DeliveryOutcome::PersistenceFailed => match redelivered {
                true => Acknowledgment::Reject,
                false => Acknowledgment::Requeue,
            },
        }
    }
}
