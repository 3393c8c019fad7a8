use super::{
    callback::{KafkaConsumerMessageCallback, OffsetAction},
    client_context::KafkaClientContext,
    dto::{KafkaConsumerConfig, KafkaMessage},
};
use crate::{error::Error, retry::retry_bounded};
use rdkafka::{
    consumer::{CommitMode, Consumer, StreamConsumer},
    error::KafkaError,
    ClientConfig, Message,
};
use std::{sync::Arc, time::Duration};
use tokio::{sync::Notify, task::JoinHandle};

type InnerConsumer = StreamConsumer<KafkaClientContext>;

///
/// Topic consumer that processes messages sequentially.
///
/// Offsets are stored when the callback asks for it and committed automatically.
///
pub struct KafkaConsumer {
    task_handle: JoinHandle<()>,
    close_notify: Arc<Notify>,
}

impl KafkaConsumer {
    ///
    /// Create consumer, subscribe to the topic and verify that brokers are reachable.
    /// Verification is retried according to the retry policy of `config`.
    ///
    /// ### Errors
    /// - configuration is rejected by the client
    /// - subscription fails
    /// - metadata can't be fetched within the retry policy
    ///
    #[tracing::instrument(
        name = "Kafka Consumer",
        target = "kafka_client::consumer",
        skip_all,
        fields(topic = %config.topic)
    )]
    pub async fn new<MessageCallback>(
        config: KafkaConsumerConfig,
        message_callback: MessageCallback,
    ) -> Result<Self, Error>
    where
        MessageCallback: KafkaConsumerMessageCallback + Send + Sync + 'static,
    {
        tracing::info!("starting consumer");

        let consumer: InnerConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("client.id", &config.client_id)
            .set("enable.auto.commit", "true")
            .set("enable.auto.offset.store", "false")
            .set("auto.offset.reset", "latest")
            .create_with_context(KafkaClientContext)
            .map_err(Error::Config)?;
        let consumer = Arc::new(consumer);

        consumer
            .subscribe(&[config.topic.as_str()])
            .map_err(Error::Subscribe)?;

        retry_bounded(
            config.retry_policy,
            |attempt| tracing::info!(attempt, "connecting"),
            |attempt, err| tracing::warn!(attempt, %err, "failed to connect"),
            || {
                verify_connection(
                    Arc::clone(&consumer),
                    config.topic.clone(),
                    config.metadata_timeout,
                )
            },
        )
        .await?;

        tracing::info!("consuming");

        let close_notify = Arc::new(Notify::new());
        let stop = Arc::clone(&close_notify);
        let task_handle = tokio::spawn(async move {
            consume_loop(consumer, message_callback, stop).await;
        });

        Ok(Self {
            task_handle,
            close_notify,
        })
    }

    ///
    /// Stop consuming after the message being processed and commit stored offsets.
    ///
    #[tracing::instrument(name = "Kafka Consumer", target = "kafka_client::consumer", skip_all)]
    pub async fn close(self) {
        tracing::info!("closing consumer");

        self.close_notify.notify_one();
        if let Err(err) = self.task_handle.await {
            tracing::error!(%err, "consumer task failed");
        }

        tracing::info!("consumer closed");
    }
}

async fn verify_connection(
    consumer: Arc<InnerConsumer>,
    topic: String,
    timeout: Duration,
) -> Result<(), Error> {
    let metadata = tokio::task::spawn_blocking(move || {
        consumer.fetch_metadata(Some(&topic), timeout)
    })
    .await?
    .map_err(Error::Metadata)?;

    for topic in metadata.topics() {
        if let Some(err) = topic.error() {
            tracing::warn!(topic = topic.name(), ?err, "topic metadata reports error");
        }
    }

    Ok(())
}

#[tracing::instrument(name = "Kafka Consumer", target = "kafka_client::consumer", skip_all)]
async fn consume_loop<MessageCallback>(
    consumer: Arc<InnerConsumer>,
    message_callback: MessageCallback,
    stop: Arc<Notify>,
) where
    MessageCallback: KafkaConsumerMessageCallback,
{
    tracing::info!("consume loop started");

    loop {
        let message = tokio::select! {
            biased;
            _ = stop.notified() => break,
            result = consumer.recv() => match result {
                Ok(message) => message.detach(),
                Err(err) => {
                    tracing::warn!(%err, "failed to receive message");
                    continue;
                }
            },
        };

        let topic = message.topic().to_string();
        let partition = message.partition();
        let offset = message.offset();
        tracing::debug!(partition, offset, "received message");

        let action = message_callback.execute(KafkaMessage::from(message)).await;
        let stored = apply_offset_action(&*consumer, action, &topic, partition, offset);
        if let Err(err) = stored {
            tracing::warn!(partition, offset, %err, "failed to store offset");
        }
    }

    // Commit and consumer drop both block on the network
    let commit_result = tokio::task::spawn_blocking(move || {
        let result = consumer.commit_consumer_state(CommitMode::Sync);
        drop(consumer);
        result
    })
    .await;

    match commit_result {
        Ok(Ok(())) => tracing::info!("offsets committed"),
        Ok(Err(err)) => tracing::debug!(%err, "nothing committed on close"),
        Err(err) => tracing::error!(%err, "commit task failed"),
    }

    tracing::info!("consume loop finished");
}

///
/// Returns whether the offset was stored.
///
/// ### Errors
/// - client rejects the offset
///
fn apply_offset_action<C>(
    consumer: &C,
    action: OffsetAction,
    topic: &str,
    partition: i32,
    offset: i64,
) -> Result<bool, KafkaError>
where
    C: Consumer<KafkaClientContext>,
{
    match action {
        OffsetAction::Store => {
            consumer.store_offset(topic, partition, offset + 1)?;
            Ok(true)
        }
        OffsetAction::Skip => {
            tracing::debug!(partition, offset, "offset not stored");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rdkafka::consumer::BaseConsumer;

    #[test]
    fn skip_offset_not_stored() {
        let consumer = create_consumer();

        let result = apply_offset_action(&consumer, OffsetAction::Skip, "topic", 0, 41);

        assert!(matches!(result, Ok(false)));
    }

    #[test]
    fn store_offset_passed_to_client() {
        let consumer = create_consumer();

        let result = apply_offset_action(&consumer, OffsetAction::Store, "topic", 0, 41);

        // partition is not assigned, client may refuse the offset
        assert!(!matches!(result, Ok(false)));
    }

    fn create_consumer() -> BaseConsumer<KafkaClientContext> {
        ClientConfig::new()
            // nothing listens on port 1
            .set("bootstrap.servers", "127.0.0.1:1")
            .set("group.id", "kafka-client-test")
            .set("enable.auto.offset.store", "false")
            .create_with_context(KafkaClientContext)
            .unwrap()
    }
}
