use super::{
    connection_registry::ConnectionRegistry,
    dto::{BroadcastServiceConfig, ConnectionId, StreamFrame},
    error::Error,
};
use crate::dto::output;
use anyhow::anyhow;
use futures::{Sink, SinkExt};
use std::{fmt::Display, sync::Arc};
use time::OffsetDateTime;
use tokio::{
    sync::{mpsc, Notify},
    time::{sleep_until, timeout, Instant},
};

pub struct StreamConnection<FrameSink> {
    config: Arc<BroadcastServiceConfig>,

    user_id: String,
    connection_id: ConnectionId,

    registry: ConnectionRegistry,
    close_notify: Arc<Notify>,
    messages_rx: mpsc::Receiver<Arc<output::Notification>>,
    frames_tx: FrameSink,

    heartbeat_time: Instant,
    last_heartbeat: Instant,
}

impl<FrameSink, SinkError> StreamConnection<FrameSink>
where
    FrameSink: Sink<StreamFrame, Error = SinkError> + Unpin,
    SinkError: Display,
{
    pub fn new(
        config: Arc<BroadcastServiceConfig>,
        user_id: String,
        connection_id: ConnectionId,
        registry: ConnectionRegistry,
        close_notify: Arc<Notify>,
        messages_rx: mpsc::Receiver<Arc<output::Notification>>,
        frames_tx: FrameSink,
    ) -> Self {
        let now = Instant::now();
        let heartbeat_time = now + config.heartbeat_interval;

        Self {
            config,
            user_id,
            connection_id,
            registry,
            close_notify,
            messages_rx,
            frames_tx,
            heartbeat_time,
            last_heartbeat: now,
        }
    }

    #[tracing::instrument(
        name = "Stream",
        skip_all,
        fields(
            user_id = %self.user_id,
            connection_id = %self.connection_id,
        )
    )]
    pub async fn run(mut self) {
        match self.try_run().await {
            Ok(()) => (),
            Err(Error::Close(message)) => {
                tracing::info!("closing connection: {message}");
            }
            Err(Error::Anyhow(err)) => {
                tracing::warn!("{err}");
            }
        }

        // No-op when connection was already detached
        self.registry.remove(&self.user_id, self.connection_id).await;

        tracing::info!(idle = ?self.last_heartbeat.elapsed(), "closing stream");
        match self.frames_tx.close().await {
            Ok(()) => tracing::info!("stream closed"),
            Err(err) => tracing::debug!(%err, "failed to close stream"),
        }
    }

    async fn try_run(&mut self) -> Result<(), Error> {
        loop {
            tokio::select! {
                biased;

                _ = self.close_notify.notified() => {
                    return Err(Error::Close("detached"));
                }

                _ = sleep_until(self.heartbeat_time) => {
                    self.process_heartbeat().await?;
                }

                message = self.messages_rx.recv() => {
                    self.process_message(message).await?;
                }
            }
        }
    }

    async fn process_heartbeat(&mut self) -> Result<(), Error> {
        self.write(StreamFrame::Heartbeat(OffsetDateTime::now_utc())).await?;
        tracing::trace!("heartbeat sent");

        Ok(())
    }

    async fn process_message(
        &mut self,
        message: Option<Arc<output::Notification>>,
    ) -> Result<(), Error> {
        let Some(notification) = message else {
            return Err(Error::Close("messages channel closed"));
        };

        let id = notification.id.clone();
        tracing::info!(id, "sending notification");
        self.write(StreamFrame::Notification(notification)).await?;
        tracing::info!(id, "sent notification");

        Ok(())
    }

    ///
    /// Writes frame and defers next heartbeat.
    ///
    /// ### Errors
    /// - connection was detached while waiting for the peer
    /// - peer is gone
    /// - peer did not accept the frame within silence timeout
    ///
    async fn write(&mut self, frame: StreamFrame) -> Result<(), Error> {
        let send = timeout(self.config.silence_timeout, self.frames_tx.send(frame));

        tokio::select! {
            biased;

            _ = self.close_notify.notified() => {
                return Err(Error::Close("detached while writing"));
            }

            result = send => {
                result
                    .map_err(|_| anyhow!("peer unresponsive: write timed out"))?
                    .map_err(|err| anyhow!("write failed: {err}"))?;
            }
        }

        self.last_heartbeat = Instant::now();
        self.heartbeat_time = self.last_heartbeat + self.config.heartbeat_interval;

        Ok(())
    }
}
