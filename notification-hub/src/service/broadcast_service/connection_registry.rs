use super::dto::ConnectionId;
use crate::dto::output;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, Notify, RwLock};

pub struct ConnectionHandle {
    pub messages_tx: mpsc::Sender<Arc<output::Notification>>,
    pub close_notify: Arc<Notify>,
}

impl ConnectionHandle {
    ///
    /// Wake connection task so it finishes.
    /// Dropping the handle afterwards closes its queue.
    ///
    pub fn close(self) {
        self.close_notify.notify_one();
    }
}

///
/// Live connections grouped by user
///
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<RwLock<HashMap<String, HashMap<ConnectionId, ConnectionHandle>>>>,
}

impl ConnectionRegistry {
    pub async fn insert(
        &self,
        user_id: String,
        connection_id: ConnectionId,
        handle: ConnectionHandle,
    ) {
        let mut connections = self.connections.write().await;
        connections
            .entry(user_id)
            .or_default()
            .insert(connection_id, handle);
    }

    ///
    /// Removes connection. Users left without connections are removed too.
    ///
    pub async fn remove(
        &self,
        user_id: &str,
        connection_id: ConnectionId,
    ) -> Option<ConnectionHandle> {
        let mut connections = self.connections.write().await;

        let user_connections = connections.get_mut(user_id)?;
        let handle = user_connections.remove(&connection_id);
        if user_connections.is_empty() {
            connections.remove(user_id);
        }

        handle
    }

    pub async fn senders(
        &self,
        user_id: &str,
    ) -> Vec<(ConnectionId, mpsc::Sender<Arc<output::Notification>>)> {
        let connections = self.connections.read().await;

        connections
            .get(user_id)
            .map(|user_connections| {
                user_connections
                    .iter()
                    .map(|(connection_id, handle)| (*connection_id, handle.messages_tx.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn take_all(&self) -> Vec<ConnectionHandle> {
        let mut connections = self.connections.write().await;

        connections
            .drain()
            .flat_map(|(_, user_connections)| user_connections.into_values())
            .collect()
    }

    pub async fn count(&self, user_id: &str) -> usize {
        let connections = self.connections.read().await;

        connections.get(user_id).map(HashMap::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn create_handle() -> (ConnectionHandle, mpsc::Receiver<Arc<output::Notification>>) {
        let (messages_tx, messages_rx) = mpsc::channel(1);
        let handle = ConnectionHandle {
            messages_tx,
            close_notify: Arc::new(Notify::new()),
        };

        (handle, messages_rx)
    }

    #[tokio::test]
    async fn remove_last_connection_removes_user() {
        let registry = ConnectionRegistry::default();
        let (handle, _rx) = create_handle();
        registry.insert("u1".to_string(), ConnectionId(1), handle).await;

        let removed = registry.remove("u1", ConnectionId(1)).await;

        assert!(removed.is_some());
        assert_eq!(registry.count("u1").await, 0);
        assert!(registry.connections.read().await.is_empty());
    }

    #[tokio::test]
    async fn remove_twice_second_returns_none() {
        let registry = ConnectionRegistry::default();
        let (handle, _rx) = create_handle();
        registry.insert("u1".to_string(), ConnectionId(1), handle).await;

        let first = registry.remove("u1", ConnectionId(1)).await;
        let second = registry.remove("u1", ConnectionId(1)).await;

        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn senders_only_of_requested_user() {
        let registry = ConnectionRegistry::default();
        let (handle_1, _rx_1) = create_handle();
        let (handle_2, _rx_2) = create_handle();
        let (handle_3, _rx_3) = create_handle();
        registry.insert("u1".to_string(), ConnectionId(1), handle_1).await;
        registry.insert("u1".to_string(), ConnectionId(2), handle_2).await;
        registry.insert("u2".to_string(), ConnectionId(3), handle_3).await;

        let mut ids = registry
            .senders("u1")
            .await
            .into_iter()
            .map(|(connection_id, _)| connection_id)
            .collect::<Vec<_>>();
        ids.sort();

        assert_eq!(ids, vec![ConnectionId(1), ConnectionId(2)]);
        assert!(registry.senders("u3").await.is_empty());
    }

    #[tokio::test]
    async fn take_all_empties_registry() {
        let registry = ConnectionRegistry::default();
        let (handle_1, _rx_1) = create_handle();
        let (handle_2, _rx_2) = create_handle();
        registry.insert("u1".to_string(), ConnectionId(1), handle_1).await;
        registry.insert("u2".to_string(), ConnectionId(2), handle_2).await;

        let taken = registry.take_all().await;

        assert_eq!(taken.len(), 2);
        assert_eq!(registry.count("u1").await, 0);
        assert_eq!(registry.count("u2").await, 0);
    }
}
