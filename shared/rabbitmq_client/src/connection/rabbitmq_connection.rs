use super::RabbitmqConnectionConfig;
use crate::retry::retry;
use amqprs::{
    callbacks::ConnectionCallback,
    connection::{Connection, OpenConnectionArguments},
    Close,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

///
/// RabbitMQ connection shared by consumers and producers.
///
/// The connection is not recreated after a network failure
/// or after the server closes it.
/// Owner is expected to watch [Self::failed] and shut the process down
/// so unacknowledged deliveries return to their queues.
///
#[derive(Clone)]
pub struct RabbitmqConnection {
    inner: Arc<RabbitmqConnectionInner>,
}

struct RabbitmqConnectionInner {
    config: RabbitmqConnectionConfig,
    connection: Connection,
    connection_blocked_rx: watch::Receiver<bool>,
    closed_by_server_rx: watch::Receiver<bool>,
}

impl RabbitmqConnection {
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
        let connection = retry(
            config.retry_interval,
            config.max_open_attempts,
            "open connection",
            || async { Connection::open(&open_connection_args).await },
        )
        .await?;

        tracing::info!("registering callback");
        let (server_events, blocked_rx, closed_by_server_rx) = ServerEvents::new();
        connection.register_callback(server_events).await?;

        tracing::info!("connection opened");

        Ok(Self {
            inner: Arc::new(RabbitmqConnectionInner {
                config,
                connection,
                connection_blocked_rx: blocked_rx,
                closed_by_server_rx,
            }),
        })
    }

    ///
    /// Closes underlying connection.
    ///
    /// It is forbidden to close the connection while clones still exist,
    /// because consumers and producers would be left without a connection.
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

        match inner.connection.close().await {
            Ok(()) => tracing::info!("connection closed"),
            Err(err) => tracing::warn!(%err, "closing connection failed"),
        }
    }

    ///
    /// Completes when the connection suffers a network failure
    /// or gets closed by the server.
    ///
    pub async fn failed(&self) {
        let mut closed_by_server_rx = self.inner.closed_by_server_rx.clone();

        tokio::select! {
            _ = self.inner.connection.listen_network_io_failure() => {
                tracing::error!("connection failure");
            }
            _ = wait_closed_by_server(&mut closed_by_server_rx) => {
                tracing::error!("connection closed by server");
            }
        }
    }

    pub fn config(&self) -> &RabbitmqConnectionConfig {
        &self.inner.config
    }

    pub fn connection(&self) -> &Connection {
        &self.inner.connection
    }

    pub fn connection_blocked(&self) -> watch::Receiver<bool> {
        self.inner.connection_blocked_rx.clone()
    }
}

///
/// Completes when the server closed the connection
/// or when the connection dropped its callback
///
async fn wait_closed_by_server(closed_by_server_rx: &mut watch::Receiver<bool>) {
    let _ = closed_by_server_rx.wait_for(|closed| *closed).await;
}

///
/// Publishes connection events received from the server
///
struct ServerEvents {
    blocked_tx: watch::Sender<bool>,
    closed_by_server_tx: watch::Sender<bool>,
}

impl ServerEvents {
    fn new() -> (Self, watch::Receiver<bool>, watch::Receiver<bool>) {
        let (blocked_tx, blocked_rx) = watch::channel(false);
        let (closed_by_server_tx, closed_by_server_rx) = watch::channel(false);

        let server_events = Self {
            blocked_tx,
            closed_by_server_tx,
        };

        (server_events, blocked_rx, closed_by_server_rx)
    }

    fn mark_closed_by_server(&self, code: u16, text: &str) {
        tracing::error!(code, text, "server closed connection");

        self.closed_by_server_tx.send_replace(true);
    }

    fn mark_blocked(&self, reason: &str) {
        tracing::warn!(reason, "publishing blocked by server");

        self.blocked_tx.send_replace(true);
    }

    fn mark_unblocked(&self) {
        tracing::info!("publishing unblocked by server");

        self.blocked_tx.send_replace(false);
    }
}

#[async_trait]
impl ConnectionCallback for ServerEvents {
    #[tracing::instrument(
        name = "RabbitMQ Connection Events",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    async fn close(
        &mut self,
        _connection: &Connection,
        close: Close,
    ) -> Result<(), amqprs::error::Error> {
        self.mark_closed_by_server(close.reply_code(), close.reply_text());

        Ok(())
    }

    #[tracing::instrument(
        name = "RabbitMQ Connection Events",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    async fn blocked(&mut self, _connection: &Connection, reason: String) {
        self.mark_blocked(&reason);
    }

    #[tracing::instrument(
        name = "RabbitMQ Connection Events",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    async fn unblocked(&mut self, _connection: &Connection) {
        self.mark_unblocked();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn server_close_completes_wait() {
        let (server_events, _blocked_rx, mut closed_by_server_rx) = ServerEvents::new();

        server_events.mark_closed_by_server(320, "CONNECTION_FORCED");

        let result = timeout(
            Duration::from_millis(100),
            wait_closed_by_server(&mut closed_by_server_rx),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn wait_pending_while_connection_open() {
        let (server_events, _blocked_rx, mut closed_by_server_rx) = ServerEvents::new();

        server_events.mark_blocked("low on memory");

        let result = timeout(
            Duration::from_millis(100),
            wait_closed_by_server(&mut closed_by_server_rx),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn dropped_callback_completes_wait() {
        let (server_events, _blocked_rx, mut closed_by_server_rx) = ServerEvents::new();

        drop(server_events);

        let result = timeout(
            Duration::from_millis(100),
            wait_closed_by_server(&mut closed_by_server_rx),
        )
        .await;
        assert!(result.is_ok());
    }

    #[test]
    fn blocked_state_follows_server() {
        let (server_events, blocked_rx, _closed_by_server_rx) = ServerEvents::new();

        server_events.mark_blocked("low on memory");
        assert!(*blocked_rx.borrow());

        server_events.mark_unblocked();
        assert!(!*blocked_rx.borrow());
    }
}
