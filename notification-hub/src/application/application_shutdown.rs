use super::ApplicationStateToClose;

///
/// Consumers are stopped before the database connection,
/// so no message is processed without a database.
///
pub async fn close(state: ApplicationStateToClose) {
    tracing::info!("closing remaining stream connections");
    state.broadcast_service.close_all().await;

    tracing::info!("closing rabbitmq notifications consumer");
    state.rabbitmq_notifications_consumer_service.close().await;

    tracing::info!("closing kafka notifications consumer");
    state.kafka_notifications_consumer_service.close().await;

    tracing::info!("closing connection with database");
    state.db_client.shutdown().await;
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("starting shutdown");
}
