use super::{
    async_consumer::AsyncConsumer,
    callback::{RabbitmqConsumerDeliveryCallback, RabbitmqConsumerStatusChangeCallback},
    channel_callback::ChannelCallback,
    dto::RabbitmqConsumerStatus,
};
use crate::{connection::RabbitmqConnection, retry::retry};
use amqprs::{
    channel::{
        BasicCancelArguments, BasicConsumeArguments, BasicQosArguments, Channel,
        ExchangeDeclareArguments, QueueBindArguments, QueueDeclareArguments,
    },
    connection::Connection,
};
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, Notify};

///
/// Everything that has to be declared on a fresh channel before consuming
///
pub struct ConsumerTopology {
    pub exchange_declare_args: Option<ExchangeDeclareArguments>,
    pub queue_declare_args: QueueDeclareArguments,
    pub queue_bind_args: Vec<QueueBindArguments>,
    pub basic_qos_args: BasicQosArguments,
    pub basic_consume_args: BasicConsumeArguments,
}

impl ConsumerTopology {
    ///
    /// Declare topology and start consuming.
    /// Returns consumer tag assigned by the broker.
    ///
    pub async fn apply<DeliveryCallback>(
        &self,
        channel: &Channel,
        consumer: AsyncConsumer<DeliveryCallback>,
    ) -> anyhow::Result<String>
    where
        DeliveryCallback: RabbitmqConsumerDeliveryCallback + Send + Sync + 'static,
    {
        if let Some(exchange_declare_args) = &self.exchange_declare_args {
            channel
                .exchange_declare(exchange_declare_args.clone())
                .await
                .context("failed to declare exchange")?;
        }

        channel
            .queue_declare(self.queue_declare_args.clone())
            .await
            .context("failed to declare queue")?;

        for queue_bind_args in &self.queue_bind_args {
            channel
                .queue_bind(queue_bind_args.clone())
                .await
                .context("failed to bind queue")?;
        }

        channel
            .basic_qos(self.basic_qos_args.clone())
            .await
            .context("failed to set prefetch")?;

        let consumer_tag = channel
            .basic_consume(consumer, self.basic_consume_args.clone())
            .await
            .context("failed to consume")?;

        Ok(consumer_tag)
    }
}

pub struct StateMachine<DeliveryCallback, StatusCallback> {
    rabbitmq_connection: RabbitmqConnection,

    connection: Option<Connection>,
    connection_rx: watch::Receiver<Option<Connection>>,

    channel: Channel,
    consumer_tag: String,
    topology: ConsumerTopology,
    consumer: AsyncConsumer<DeliveryCallback>,
    in_flight: Arc<Mutex<()>>,

    consumer_cancelled: Arc<Notify>,
    status_callback: StatusCallback,

    state: State,
}

enum State {
    Consuming,
    WaitingForConnection,
    ReopeningChannel,
    RestoringConsumer,
}

impl<DeliveryCallback, StatusCallback> StateMachine<DeliveryCallback, StatusCallback>
where
    DeliveryCallback: RabbitmqConsumerDeliveryCallback + Send + Sync + 'static,
    StatusCallback: RabbitmqConsumerStatusChangeCallback + Send + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rabbitmq_connection: RabbitmqConnection,
        connection: Connection,
        connection_rx: watch::Receiver<Option<Connection>>,
        channel: Channel,
        consumer_tag: String,
        topology: ConsumerTopology,
        consumer: AsyncConsumer<DeliveryCallback>,
        in_flight: Arc<Mutex<()>>,
        consumer_cancelled: Arc<Notify>,
        status_callback: StatusCallback,
    ) -> Self {
        Self {
            rabbitmq_connection,
            connection: Some(connection),
            connection_rx,
            channel,
            consumer_tag,
            topology,
            consumer,
            in_flight,
            consumer_cancelled,
            status_callback,
            state: State::Consuming,
        }
    }

    ///
    /// Loop that keeps consumer alive until `stop` is notified.
    ///
    #[tracing::instrument(
        name = "RabbitMQ Consumer",
        target = "rabbitmq_client::consumer",
        skip_all
    )]
    pub async fn run(mut self, stop: Arc<Notify>) {
        tracing::info!("state machine started");

        tokio::select! {
            biased;

            _ = stop.notified() => {}

            _ = async { loop {
                match self.state {
                    State::Consuming => self.consuming_state().await,
                    State::WaitingForConnection => self.waiting_for_connection_state().await,
                    State::ReopeningChannel => self.reopening_channel_state().await,
                    State::RestoringConsumer => self.restoring_consumer_state().await,
                }
            }} => {}
        }

        self.shutdown().await;

        tracing::info!("state machine finished");
    }

    async fn shutdown(self) {
        let args = BasicCancelArguments::new(&self.consumer_tag);
        match self.channel.basic_cancel(args).await {
            Ok(_) => tracing::info!("consumer cancelled"),
            Err(err) => tracing::warn!(%err, "cancelling consumer failed"),
        }

        // Delivery being processed must be acknowledged before channel goes away
        let _in_flight = self.in_flight.lock().await;

        match self.channel.close().await {
            Ok(()) => tracing::info!("channel closed"),
            Err(err) => tracing::warn!(%err, "closing channel failed"),
        }
    }

    async fn consuming_state(&mut self) {
        tracing::info!("state: Consuming");
        self.status_callback
            .execute(RabbitmqConsumerStatus::Consuming)
            .await;

        tokio::select! {
            biased;

            _ = self.connection_rx.changed() => {
                tracing::warn!("connection changed");
                self.state = State::WaitingForConnection;
            }
            _ = self.consumer_cancelled.notified() => {
                tracing::warn!("consumer cancelled by broker");
                self.state = State::RestoringConsumer;
            }
        }

        self.status_callback
            .execute(RabbitmqConsumerStatus::Recovering)
            .await;
    }

    async fn waiting_for_connection_state(&mut self) {
        tracing::info!("state: WaitingForConnection");
        loop {
            self.connection = self.connection_rx.borrow_and_update().clone();
            if self.connection.is_some() {
                break;
            }

            if self.connection_rx.changed().await.is_err() {
                // Connection task is gone, there is nothing to wait for
                tracing::error!("connection task finished");
                std::future::pending::<()>().await;
            }
        }

        self.state = State::ReopeningChannel;
    }

    async fn reopening_channel_state(&mut self) {
        tracing::info!("state: ReopeningChannel");
        if let Err(err) = self.channel.clone().close().await {
            tracing::debug!(%err, "failed to close old channel");
        }

        let Some(connection) = self.connection.clone() else {
            self.state = State::WaitingForConnection;
            return;
        };
        let retry_interval = self.rabbitmq_connection.config().retry_interval;

        tokio::select! {
            biased;

            _ = self.connection_rx.changed() => {
                tracing::warn!("connection changed");
                self.state = State::WaitingForConnection;
            }

            (channel, consumer_cancelled) = async {
                let channel = retry(
                    retry_interval,
                    |attempt| tracing::info!(attempt, "reopening channel"),
                    |attempt, err: amqprs::error::Error| {
                        tracing::warn!(attempt, %err, "failed to reopen channel")
                    },
                    || connection.open_channel(None),
                )
                .await;

                let consumer_cancelled = Arc::new(Notify::new());
                retry(
                    retry_interval,
                    |attempt| tracing::debug!(attempt, "registering channel callback"),
                    |attempt, err: amqprs::error::Error| {
                        tracing::warn!(attempt, %err, "failed to register channel callback")
                    },
                    || channel.register_callback(ChannelCallback::new(Arc::clone(&consumer_cancelled))),
                )
                .await;

                (channel, consumer_cancelled)
            } => {
                self.channel = channel;
                self.consumer_cancelled = consumer_cancelled;
                self.state = State::RestoringConsumer;
            }
        }
    }

    async fn restoring_consumer_state(&mut self) {
        tracing::info!("state: RestoringConsumer");

        tokio::select! {
            biased;

            _ = self.connection_rx.changed() => {
                tracing::warn!("connection changed");
                self.state = State::WaitingForConnection;
            }

            result = self.topology.apply(&self.channel, self.consumer.clone()) => {
                match result {
                    Ok(consumer_tag) => {
                        tracing::info!(%consumer_tag, "consumer restored");
                        self.consumer_tag = consumer_tag;
                        self.state = State::Consuming;
                    }
                    Err(err) => {
                        tracing::warn!(%err, "failed to restore consumer");
                        tokio::time::sleep(self.rabbitmq_connection.config().retry_interval).await;
                        self.state = State::ReopeningChannel;
                    }
                }
            }
        }
    }
}
