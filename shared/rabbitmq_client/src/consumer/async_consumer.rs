use super::{callback::RabbitmqConsumerDeliveryCallback, dto::Delivery, error::ConsumeError};
use amqprs::{
    channel::{BasicAckArguments, BasicNackArguments, Channel},
    BasicProperties, Deliver,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

///
/// Consumer that runs the delivery callback inline.
/// Next delivery isn't handled until the previous one is acknowledged.
///
pub struct AsyncConsumer<DeliveryCallback> {
    delivery_callback: Arc<DeliveryCallback>,

    /// Held while a delivery is processed, closing consumer waits for it
    in_flight: Arc<Mutex<()>>,
}

impl<DeliveryCallback> AsyncConsumer<DeliveryCallback> {
    pub fn new(delivery_callback: Arc<DeliveryCallback>, in_flight: Arc<Mutex<()>>) -> Self {
        Self {
            delivery_callback,
            in_flight,
        }
    }
}

impl<DeliveryCallback> Clone for AsyncConsumer<DeliveryCallback> {
    fn clone(&self) -> Self {
        Self {
            delivery_callback: Arc::clone(&self.delivery_callback),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

#[async_trait]
impl<DeliveryCallback> amqprs::consumer::AsyncConsumer for AsyncConsumer<DeliveryCallback>
where
    DeliveryCallback: RabbitmqConsumerDeliveryCallback + Send + Sync + 'static,
{
    #[tracing::instrument(
        name = "RabbitMQ Consumer",
        target = "rabbitmq_client::consumer",
        skip_all,
        fields(delivery_tag = deliver.delivery_tag())
    )]
    async fn consume(
        &mut self,
        channel: &Channel,
        deliver: Deliver,
        _basic_properties: BasicProperties,
        content: Vec<u8>,
    ) {
        let _in_flight = self.in_flight.lock().await;

        let delivery_tag = deliver.delivery_tag();
        let redelivered = deliver.redelivered();
        tracing::debug!(redelivered, "received delivery");

        let delivery = Delivery {
            delivery_tag,
            redelivered,
            content,
        };

        match self.delivery_callback.execute(delivery).await {
            Ok(()) => {
                let args = BasicAckArguments::new(delivery_tag, false);
                match channel.basic_ack(args).await {
                    Ok(()) => tracing::trace!("ack sent"),
                    Err(err) => tracing::warn!(%err, "failed to send ack"),
                }
            }
            Err(ConsumeError { requeue }) => {
                let args = BasicNackArguments::new(delivery_tag, false, requeue);
                match channel.basic_nack(args).await {
                    Ok(()) => tracing::trace!(requeue, "nack sent"),
                    Err(err) => tracing::warn!(requeue, %err, "failed to send nack"),
                }
            }
        }
    }
}
