use super::{
    connection_callback::ConnectionCallback, dto::RabbitmqConnectionConfig,
    state_machine::StateMachine,
};
use amqprs::connection::{Connection, OpenConnectionArguments};
use std::sync::Arc;
use tokio::{
    sync::{watch, Notify},
    task::JoinHandle,
};

///
/// RabbitMQ connection kept alive by a background task.
/// Whenever an io failure is detected the task reopens the connection
/// and publishes it through [Self::connection].
///
/// While the connection is being recreated the watched value is `None`.
///
#[derive(Clone)]
pub struct RabbitmqConnection {
    inner: Arc<RabbitmqConnectionInner>,
}

struct RabbitmqConnectionInner {
    config: RabbitmqConnectionConfig,
    connection_rx: watch::Receiver<Option<Connection>>,
    keep_alive_handle: JoinHandle<()>,
    close_notify: Arc<Notify>,
}

impl RabbitmqConnection {
    ///
    /// Open connection and start the keep alive task.
    ///
    /// ### Errors
    /// Returns an error when the first connection can't be opened
    /// or when the callback can't be registered
    ///
    #[tracing::instrument(
        name = "RabbitMQ Connection",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    pub async fn new(
        config: RabbitmqConnectionConfig,
        open_connection_args: OpenConnectionArguments,
    ) -> Result<Self, amqprs::error::Error> {
        tracing::info!("opening connection");
        let connection = Connection::open(&open_connection_args).await?;
        connection.register_callback(ConnectionCallback).await?;

        let close_notify = Arc::new(Notify::new());
        let (connection_tx, connection_rx) = watch::channel(Some(connection.clone()));
        let state_machine = StateMachine::new(
            config.clone(),
            connection,
            connection_tx,
            open_connection_args,
        );

        let stop = Arc::clone(&close_notify);
        let keep_alive_handle = tokio::spawn(async move {
            state_machine.run(stop).await;
        });

        tracing::info!("connection opened");

        Ok(Self {
            inner: Arc::new(RabbitmqConnectionInner {
                config,
                connection_rx,
                keep_alive_handle,
                close_notify,
            }),
        })
    }

    ///
    /// Close underlying connection and the task that recreates it.
    /// Every clone (including the ones held by consumers) must be dropped first.
    ///
    #[tracing::instrument(
        name = "RabbitMQ Connection",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    pub async fn close(self) {
        let Ok(inner) = Arc::try_unwrap(self.inner) else {
            tracing::error!("closing connection when connection clones exist is forbidden");
            return;
        };

        inner.close_notify.notify_one();
        if let Err(err) = inner.keep_alive_handle.await {
            tracing::error!(%err, "keep alive task failed");
        }
    }

    pub fn config(&self) -> &RabbitmqConnectionConfig {
        &self.inner.config
    }

    pub fn connection(&self) -> watch::Receiver<Option<Connection>> {
        self.inner.connection_rx.clone()
    }
}
