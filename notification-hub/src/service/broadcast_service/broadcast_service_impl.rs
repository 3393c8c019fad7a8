use super::{
    connection_registry::{ConnectionHandle, ConnectionRegistry},
    dto::{BroadcastServiceConfig, ConnectionId, Subscription},
    stream_connection::StreamConnection,
    BroadcastService,
};
use crate::dto::output;
use axum::async_trait;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    Notify,
};

pub struct BroadcastServiceImpl {
    config: Arc<BroadcastServiceConfig>,
    registry: ConnectionRegistry,
    next_connection_id: AtomicU64,
}

impl BroadcastServiceImpl {
    pub fn new(config: BroadcastServiceConfig) -> Self {
        Self {
            config: Arc::new(config),
            registry: ConnectionRegistry::default(),
            next_connection_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl BroadcastService for BroadcastServiceImpl {
    async fn attach(&self, user_id: String) -> Subscription {
        let connection_id = ConnectionId(self.next_connection_id.fetch_add(1, Ordering::Relaxed));

        // tokio channel can't have 0 capacity
        let (messages_tx, messages_rx) = mpsc::channel(self.config.buffer_size.max(1));
        let (frames_tx, frames_rx) = futures::channel::mpsc::channel(0);
        let close_notify = Arc::new(Notify::new());

        let handle = ConnectionHandle {
            messages_tx,
            close_notify: Arc::clone(&close_notify),
        };
        self.registry
            .insert(user_id.clone(), connection_id, handle)
            .await;
        tracing::info!(user_id, %connection_id, "attached connection");

        let connection = StreamConnection::new(
            Arc::clone(&self.config),
            user_id,
            connection_id,
            self.registry.clone(),
            close_notify,
            messages_rx,
            frames_tx,
        );
        tokio::spawn(connection.run());

        Subscription {
            connection_id,
            frames: frames_rx,
        }
    }

    async fn detach(&self, user_id: &str, connection_id: ConnectionId) {
        match self.registry.remove(user_id, connection_id).await {
            Some(handle) => {
                handle.close();
                tracing::info!(user_id, %connection_id, "detached connection");
            }
            None => tracing::debug!(user_id, %connection_id, "connection already detached"),
        }
    }

    async fn publish(&self, notification: Arc<output::Notification>) {
        let user_id = notification.user_id.as_str();
        let senders = self.registry.senders(user_id).await;
        tracing::debug!(
            id = notification.id,
            user_id,
            connections = senders.len(),
            "publishing notification"
        );

        let mut slow_connections = Vec::new();
        for (connection_id, messages_tx) in senders {
            match messages_tx.try_send(Arc::clone(&notification)) {
                Ok(()) => (),
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(user_id, %connection_id, "connection too slow");
                    slow_connections.push(connection_id);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(user_id, %connection_id, "connection already closed");
                    slow_connections.push(connection_id);
                }
            }
        }

        for connection_id in slow_connections {
            self.detach(user_id, connection_id).await;
        }
    }

    async fn close_all(&self) {
        let handles = self.registry.take_all().await;
        tracing::info!(count = handles.len(), "closing all connections");

        handles.into_iter().for_each(ConnectionHandle::close);
    }
}
