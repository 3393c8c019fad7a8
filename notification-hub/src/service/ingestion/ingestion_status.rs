use super::dto::TransportStatus;
use crate::dto::output;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Transport {
    Kafka,
    Rabbitmq,
}

///
/// Latest status reported by every transport adapter
///
#[derive(Clone)]
pub struct IngestionStatus {
    kafka: Arc<watch::Sender<TransportStatus>>,
    rabbitmq: Arc<watch::Sender<TransportStatus>>,
}

impl IngestionStatus {
    pub fn new() -> Self {
        let (kafka, _) = watch::channel(TransportStatus::default());
        let (rabbitmq, _) = watch::channel(TransportStatus::default());

        Self {
            kafka: Arc::new(kafka),
            rabbitmq: Arc::new(rabbitmq),
        }
    }

    pub fn set(&self, transport: Transport, status: TransportStatus) {
        let previous = self.sender(transport).send_replace(status);
        if previous != status {
            tracing::info!(%transport, %status, "transport status changed");
        }
    }

    pub fn get(&self, transport: Transport) -> TransportStatus {
        *self.sender(transport).borrow()
    }

    pub fn subscribe(&self, transport: Transport) -> watch::Receiver<TransportStatus> {
        self.sender(transport).subscribe()
    }

    pub fn snapshot(&self) -> output::TransportsHealth {
        output::TransportsHealth {
            kafka: self.get(Transport::Kafka),
            rabbitmq: self.get(Transport::Rabbitmq),
        }
    }

    fn sender(&self, transport: Transport) -> &watch::Sender<TransportStatus> {
        match transport {
            Transport::Kafka => &self.kafka,
            Transport::Rabbitmq => &self.rabbitmq,
        }
    }
}

impl Default for IngestionStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new_both_connecting() {
        let status = IngestionStatus::new();

        assert_eq!(
            status.snapshot(),
            output::TransportsHealth {
                kafka: TransportStatus::Connecting,
                rabbitmq: TransportStatus::Connecting,
            }
        );
    }

    #[test]
    fn set_visible_through_clones() {
        let status = IngestionStatus::new();
        let clone = status.clone();

        clone.set(Transport::Rabbitmq, TransportStatus::Consuming);
        clone.set(Transport::Kafka, TransportStatus::Failed);

        assert_eq!(status.get(Transport::Rabbitmq), TransportStatus::Consuming);
        assert_eq!(status.get(Transport::Kafka), TransportStatus::Failed);
    }

    #[tokio::test]
    async fn subscribe_observes_changes() {
        let status = IngestionStatus::new();
        let mut rx = status.subscribe(Transport::Kafka);

        status.set(Transport::Kafka, TransportStatus::Consuming);

        let observed = rx
            .wait_for(|status| *status == TransportStatus::Consuming)
            .await
            .map(|status| *status);
        assert_eq!(observed.ok(), Some(TransportStatus::Consuming));
    }
}
