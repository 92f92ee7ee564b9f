use super::{
    channel_callback::ChannelCallback, dto::PublisherConfirm, pending_confirms::PendingConfirms,
    PublishError, RabbitmqProducerConfig,
};
use crate::connection::RabbitmqConnection;
use amqprs::{
    channel::{BasicPublishArguments, Channel, ConfirmSelectArguments, ExchangeDeclareArguments},
    BasicProperties,
};
use tokio::{
    sync::{watch, Mutex},
    time::timeout,
};

///
/// Producer publishing to a single exchange with publisher confirms enabled.
///
/// [Self::publish] returns only after the server confirmed the message,
/// so a caller that got `Ok` knows the message is owned by the broker.
///
pub struct RabbitmqProducer {
    config: RabbitmqProducerConfig,
    exchange: String,

    publish_state: Mutex<PublishState>,
    pending_confirms: PendingConfirms,

    flow_rx: watch::Receiver<bool>,
    blocked_rx: watch::Receiver<bool>,
}

struct PublishState {
    channel: Channel,

    // server numbers published messages starting from 1
    last_delivery_tag: u64,
}

impl RabbitmqProducer {
    #[tracing::instrument(
        name = "RabbitMQ Producer",
        target = "rabbitmq_client::producer",
        skip_all
    )]
    pub async fn new(
        rabbitmq_connection: &RabbitmqConnection,
        config: RabbitmqProducerConfig,
        exchange_declare_args: ExchangeDeclareArguments,
    ) -> anyhow::Result<Self> {
        tracing::info!("starting producer");

        tracing::info!("opening channel");
        let channel = rabbitmq_connection.connection().open_channel(None).await?;

        tracing::info!("registering channel callback");
        let pending_confirms = PendingConfirms::default();
        let (flow_tx, flow_rx) = watch::channel(true);
        let channel_callback = ChannelCallback::new(pending_confirms.clone(), flow_tx);
        channel.register_callback(channel_callback).await?;

        tracing::info!("declaring exchange");
        let exchange = exchange_declare_args.exchange.clone();
        channel.exchange_declare(exchange_declare_args).await?;

        tracing::info!("enabling publisher confirms");
        let args = ConfirmSelectArguments::new(false);
        channel.confirm_select(args).await?;

        tracing::info!(exchange, "producer started");

        Ok(Self {
            config,
            exchange,
            publish_state: Mutex::new(PublishState {
                channel,
                last_delivery_tag: 0,
            }),
            pending_confirms,
            flow_rx,
            blocked_rx: rabbitmq_connection.connection_blocked(),
        })
    }

    #[tracing::instrument(
        name = "RabbitMQ Producer",
        target = "rabbitmq_client::producer",
        skip_all
    )]
    pub async fn close(self) {
        tracing::info!("closing producer");

        self.pending_confirms.fail_all();

        let publish_state = self.publish_state.into_inner();
        if let Err(err) = publish_state.channel.close().await {
            tracing::warn!(%err, "closing channel failed");
        }

        tracing::info!("producer closed");
    }

    ///
    /// Publishes message and waits for publisher confirm.
    ///
    /// ### Errors
    /// - [PublishError::Blocked] when publishing is not allowed for longer than confirm timeout
    /// - [PublishError::Publish] when basic.publish fails
    /// - [PublishError::Nacked] when server rejects the message
    /// - [PublishError::ConfirmTimeout] when confirm does not arrive in time
    /// - [PublishError::ChannelClosed] when channel closes before confirm arrives
    ///
    pub async fn publish(
        &self,
        routing_key: &str,
        basic_properties: BasicProperties,
        content: Vec<u8>,
    ) -> Result<(), PublishError> {
        timeout(self.config.confirm_timeout, self.wait_until_publishing_allowed())
            .await
            .map_err(|_| PublishError::Blocked)?;

        let confirm_rx = {
            let mut publish_state = self.publish_state.lock().await;

            let delivery_tag = publish_state.last_delivery_tag + 1;
            let confirm_rx = self.pending_confirms.register(delivery_tag);

            let args = BasicPublishArguments::new(&self.exchange, routing_key);
            if let Err(err) = publish_state
                .channel
                .basic_publish(basic_properties, content, args)
                .await
            {
                self.pending_confirms.remove(delivery_tag);
                return Err(PublishError::Publish(err));
            }

            publish_state.last_delivery_tag = delivery_tag;
            tracing::debug!(delivery_tag, routing_key, "message published");

            confirm_rx
        };

        match timeout(self.config.confirm_timeout, confirm_rx).await {
            Ok(Ok(PublisherConfirm::Ack)) => Ok(()),
            Ok(Ok(PublisherConfirm::Nack)) => Err(PublishError::Nacked),
            Ok(Err(_)) => Err(PublishError::ChannelClosed),
            Err(_) => Err(PublishError::ConfirmTimeout),
        }
    }

    async fn wait_until_publishing_allowed(&self) {
        let mut flow_rx = self.flow_rx.clone();
        let mut blocked_rx = self.blocked_rx.clone();

        loop {
            let flow = *flow_rx.borrow_and_update();
            let blocked = *blocked_rx.borrow_and_update();
            if flow && !blocked {
                return;
            }

            tracing::debug!(flow, blocked, "waiting until publishing is allowed");
            tokio::select! {
                result = flow_rx.changed() => {
                    if result.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                result = blocked_rx.changed() => {
                    if result.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
            }
        }
    }
}
