use super::{
    async_consumer::AsyncConsumer,
    callback::{RabbitmqConsumerDeliveryCallback, RabbitmqConsumerStatusChangeCallback},
    channel_callback::ChannelCallback,
    state_machine::{ConsumerTopology, StateMachine},
};
use crate::connection::RabbitmqConnection;
use amqprs::channel::{
    BasicConsumeArguments, BasicQosArguments, ExchangeDeclareArguments, QueueBindArguments,
    QueueDeclareArguments,
};
use std::sync::Arc;
use tokio::{
    sync::{Mutex, Notify},
    task::JoinHandle,
};

///
/// Queue consumer that survives connection failures and broker side cancels.
///
/// Exchange declaration is optional. Without it the queue is consumed
/// through the default exchange and `queue_bind_args` should be empty.
///
pub struct RabbitmqConsumer {
    task_handle: JoinHandle<()>,
    close_notify: Arc<Notify>,
}

impl RabbitmqConsumer {
    ///
    /// Declare topology, start consuming and spawn the task that keeps consumer alive.
    ///
    /// ### Errors
    /// Returns an error when connection is currently unavailable
    /// or when any step of the first setup fails
    ///
    #[tracing::instrument(
        name = "RabbitMQ Consumer",
        target = "rabbitmq_client::consumer",
        skip_all
    )]
    #[allow(clippy::too_many_arguments)]
    pub async fn new<DeliveryCallback, StatusCallback>(
        rabbitmq_connection: RabbitmqConnection,
        mut exchange_declare_args: Option<ExchangeDeclareArguments>,
        mut queue_declare_args: QueueDeclareArguments,
        mut queue_bind_args: Vec<QueueBindArguments>,
        mut basic_consume_args: BasicConsumeArguments,
        prefetch_count: u16,
        delivery_callback: DeliveryCallback,
        status_callback: StatusCallback,
    ) -> anyhow::Result<Self>
    where
        DeliveryCallback: RabbitmqConsumerDeliveryCallback + Send + Sync + 'static,
        StatusCallback: RabbitmqConsumerStatusChangeCallback + Send + 'static,
    {
        tracing::info!("starting consumer");

        let mut connection_rx = rabbitmq_connection.connection();
        let Some(connection) = connection_rx.borrow_and_update().clone() else {
            anyhow::bail!("connection unavailable");
        };

        let channel = connection.open_channel(None).await?;
        let consumer_cancelled = Arc::new(Notify::new());
        channel
            .register_callback(ChannelCallback::new(Arc::clone(&consumer_cancelled)))
            .await?;

        if let Some(args) = exchange_declare_args.as_mut() {
            args.no_wait = false;
        }
        queue_declare_args.no_wait(false);
        for args in queue_bind_args.iter_mut() {
            args.no_wait = false;
        }
        basic_consume_args.no_ack = false;
        basic_consume_args.no_wait = false;

        let topology = ConsumerTopology {
            exchange_declare_args,
            queue_declare_args,
            queue_bind_args,
            basic_qos_args: BasicQosArguments::new(0, prefetch_count, false),
            basic_consume_args,
        };

        let in_flight = Arc::new(Mutex::new(()));
        let consumer = AsyncConsumer::new(Arc::new(delivery_callback), Arc::clone(&in_flight));
        let consumer_tag = topology.apply(&channel, consumer.clone()).await?;
        tracing::info!(%consumer_tag, "consuming");

        let state_machine = StateMachine::new(
            rabbitmq_connection,
            connection,
            connection_rx,
            channel,
            consumer_tag,
            topology,
            consumer,
            in_flight,
            consumer_cancelled,
            status_callback,
        );

        let close_notify = Arc::new(Notify::new());
        let stop = Arc::clone(&close_notify);
        let task_handle = tokio::spawn(async move {
            state_machine.run(stop).await;
        });

        Ok(Self {
            task_handle,
            close_notify,
        })
    }

    ///
    /// Cancel consumer, wait for the delivery that is being processed
    /// and close the channel.
    ///
    #[tracing::instrument(
        name = "RabbitMQ Consumer",
        target = "rabbitmq_client::consumer",
        skip_all
    )]
    pub async fn close(self) {
        tracing::info!("closing consumer");

        self.close_notify.notify_one();
        if let Err(err) = self.task_handle.await {
            tracing::error!(%err, "consumer task failed");
        }

        tracing::info!("consumer closed");
    }
}
