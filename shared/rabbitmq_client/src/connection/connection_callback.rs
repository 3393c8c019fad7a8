use amqprs::{connection::Connection, Close};
use async_trait::async_trait;

///
/// Connection callback only reports broker events.
/// Recovery is driven by the state machine listening for io failures.
///
#[derive(Clone, Default)]
pub struct ConnectionCallback;

#[async_trait]
impl amqprs::callbacks::ConnectionCallback for ConnectionCallback {
    #[tracing::instrument(
        name = "RabbitMQ Connection Callback",
        target = "rabbitmq_client::connection_callback",
        skip_all
    )]
    async fn close(
        &mut self,
        _connection: &Connection,
        close: Close,
    ) -> Result<(), amqprs::error::Error> {
        tracing::warn!(
            code = close.reply_code(),
            text = close.reply_text(),
            "received close",
        );

        Ok(())
    }

    #[tracing::instrument(
        name = "RabbitMQ Connection Callback",
        target = "rabbitmq_client::connection_callback",
        skip_all
    )]
    async fn blocked(&mut self, _connection: &Connection, reason: String) {
        // Consumers keep working while the broker blocks publishers
        tracing::warn!(reason, "received blocked");
    }

    #[tracing::instrument(
        name = "RabbitMQ Connection Callback",
        target = "rabbitmq_client::connection_callback",
        skip_all
    )]
    async fn unblocked(&mut self, _connection: &Connection) {
        tracing::info!("received unblocked");
    }
}
