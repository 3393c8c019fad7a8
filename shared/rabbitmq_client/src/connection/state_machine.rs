use super::{connection_callback::ConnectionCallback, dto::RabbitmqConnectionConfig};
use crate::retry::retry;
use amqprs::connection::{Connection, OpenConnectionArguments};
use std::sync::Arc;
use tokio::sync::{watch, Notify};

pub struct StateMachine {
    config: RabbitmqConnectionConfig,
    connection: Connection,
    connection_tx: watch::Sender<Option<Connection>>,
    open_connection_args: OpenConnectionArguments,
    state: State,
}

enum State {
    Connected,
    Dropping,
    Reopening,
    RegisteringCallback,
}

impl StateMachine {
    pub fn new(
        config: RabbitmqConnectionConfig,
        connection: Connection,
        connection_tx: watch::Sender<Option<Connection>>,
        open_connection_args: OpenConnectionArguments,
    ) -> Self {
        Self {
            config,
            connection,
            connection_tx,
            open_connection_args,
            state: State::Connected,
        }
    }

    ///
    /// Loop that keeps the connection alive until `stop` is notified.
    ///
    #[tracing::instrument(
        name = "RabbitMQ Connection",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    pub async fn run(mut self, stop: Arc<Notify>) {
        tracing::info!("state machine started");

        tokio::select! {
            biased;
            _ = stop.notified() => {
                self.connection_tx.send_replace(None);
                match self.connection.clone().close().await {
                    Ok(()) => tracing::info!("connection closed"),
                    Err(err) => tracing::warn!(%err, "closing connection failed"),
                }
            }
            _ = async { loop {
                match self.state {
                    State::Connected => self.connected_state().await,
                    State::Dropping => self.dropping_state().await,
                    State::Reopening => self.reopening_state().await,
                    State::RegisteringCallback => self.registering_callback_state().await,
                }
            }} => {}
        }

        tracing::info!("state machine finished");
    }

    async fn connected_state(&mut self) {
        tracing::info!("state: Connected");
        self.connection.listen_network_io_failure().await;
        tracing::warn!("connection failure");

        self.state = State::Dropping;
    }

    async fn dropping_state(&mut self) {
        tracing::info!("state: Dropping");
        self.connection_tx.send_replace(None);

        if let Err(err) = self.connection.clone().close().await {
            tracing::debug!(%err, "failed to close broken connection");
        }

        self.state = State::Reopening;
    }

    async fn reopening_state(&mut self) {
        tracing::info!("state: Reopening");
        self.connection = retry(
            self.config.retry_interval,
            |attempt| tracing::info!(attempt, "reopening connection"),
            |attempt, err: amqprs::error::Error| {
                tracing::warn!(attempt, %err, "failed to reopen connection")
            },
            || Connection::open(&self.open_connection_args),
        )
        .await;

        // Connection is published only after callback is registered
        self.state = State::RegisteringCallback;
    }

    async fn registering_callback_state(&mut self) {
        tracing::info!("state: RegisteringCallback");
        let connection = self.connection.clone();

        tokio::select! {
            _ = connection.listen_network_io_failure() => {
                tracing::warn!("connection failed while registering callback");
                self.state = State::Dropping;
            }
            _ = retry(
                self.config.retry_interval,
                |attempt| tracing::debug!(attempt, "registering callback"),
                |attempt, err: amqprs::error::Error| {
                    tracing::warn!(attempt, %err, "failed to register callback")
                },
                || self.connection.register_callback(ConnectionCallback),
            ) => {
                tracing::info!("connection reopened");
                self.connection_tx.send_replace(Some(self.connection.clone()));
                self.state = State::Connected;
            }
        }
    }
}
