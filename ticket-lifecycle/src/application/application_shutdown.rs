use super::ApplicationState;
use std::sync::Arc;

pub async fn close(state: ApplicationState) {
    tracing::info!("closing consumers");
    tokio::join!(
        state.seat_released_consumer_service.close(),
        state.payment_approved_consumer_service.close(),
        state.payment_confirmed_consumer_service.close(),
        state.payment_rejected_consumer_service.close(),
    );

    tracing::info!("closing ticket events producer");
    match Arc::try_unwrap(state.ticket_events_producer_service) {
        Ok(ticket_events_producer_service) => {
            ticket_events_producer_service.close().await;
        }
        Err(_) => tracing::warn!("ticket events producer still in use, closing it with connection"),
    }

    tracing::info!("closing rabbitmq connection");
    state.rabbitmq_connection.close().await;

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
