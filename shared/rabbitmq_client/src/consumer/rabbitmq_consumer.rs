use super::{
    async_consumer::AsyncConsumer, channel_callback::ChannelCallback, CancellationSource,
    RabbitmqConsumerConfig, RabbitmqConsumerDeliveryCallback,
};
use crate::connection::RabbitmqConnection;
use amqprs::channel::{
    BasicCancelArguments, BasicConsumeArguments, BasicQosArguments, Channel,
    ExchangeDeclareArguments, QueueBindArguments, QueueDeclareArguments,
};
use std::sync::Arc;
use tokio::sync::watch;

///
/// Consumer bound to a single queue.
///
/// Deliveries are acknowledged manually after the delivery callback finishes.
/// Closing the consumer cancels deliveries that are still being processed,
/// so their callbacks can return and get them requeued.
///
pub struct RabbitmqConsumer {
    channel: Channel,
    consumer_tag: String,

    cancellation_source: CancellationSource,
    server_cancelled_rx: watch::Receiver<bool>,
}

impl RabbitmqConsumer {
    #[tracing::instrument(
        name = "RabbitMQ Consumer",
        target = "rabbitmq_client::consumer",
        skip_all
    )]
    pub async fn new<DeliveryCallback>(
        rabbitmq_connection: &RabbitmqConnection,
        config: RabbitmqConsumerConfig,
        exchange_declare_args: ExchangeDeclareArguments,
        mut queue_declare_args: QueueDeclareArguments,
        queue_bind_args: Vec<QueueBindArguments>,
        mut basic_consume_args: BasicConsumeArguments,
        delivery_callback: DeliveryCallback,
    ) -> anyhow::Result<Self>
    where
        DeliveryCallback: RabbitmqConsumerDeliveryCallback + Send + Sync + 'static,
    {
        tracing::info!("starting consumer");

        tracing::info!("opening channel");
        let channel = rabbitmq_connection.connection().open_channel(None).await?;

        tracing::info!("registering channel callback");
        let (server_cancelled_tx, server_cancelled_rx) = watch::channel(false);
        channel
            .register_callback(ChannelCallback::new(server_cancelled_tx))
            .await?;

        tracing::info!(prefetch_count = config.prefetch_count, "setting qos");
        let args = BasicQosArguments::new(0, config.prefetch_count, false);
        channel.basic_qos(args).await?;

        tracing::info!("declaring exchange");
        channel.exchange_declare(exchange_declare_args).await?;

        tracing::info!("declaring queue");
        queue_declare_args.no_wait(false);
        channel.queue_declare(queue_declare_args).await?;

        tracing::info!("binding queue");
        for mut queue_bind_args in queue_bind_args {
            queue_bind_args.no_wait = false;
            channel.queue_bind(queue_bind_args).await?;
        }

        tracing::info!("consuming");
        let cancellation_source = CancellationSource::new();
        let consumer = AsyncConsumer::new(
            channel.clone(),
            Arc::new(delivery_callback),
            cancellation_source.cancellation(),
        );
        basic_consume_args.no_ack = false;
        basic_consume_args.no_wait = false;
        let consumer_tag = channel.basic_consume(consumer, basic_consume_args).await?;

        tracing::info!(consumer_tag, "consumer started");

        Ok(Self {
            channel,
            consumer_tag,
            cancellation_source,
            server_cancelled_rx,
        })
    }

    ///
    /// Completes when the server cancels the consumer or closes its channel.
    ///
    pub async fn cancelled_by_server(&self) {
        let mut server_cancelled_rx = self.server_cancelled_rx.clone();
        if server_cancelled_rx
            .wait_for(|cancelled| *cancelled)
            .await
            .is_err()
        {
            std::future::pending::<()>().await;
        }
    }

    #[tracing::instrument(
        name = "RabbitMQ Consumer",
        target = "rabbitmq_client::consumer",
        skip_all,
        fields(consumer_tag = self.consumer_tag)
    )]
    pub async fn close(self) {
        tracing::info!("closing consumer");

        let args = BasicCancelArguments::new(&self.consumer_tag);
        if let Err(err) = self.channel.basic_cancel(args).await {
            tracing::warn!(%err, "failed to cancel consumer");
        }

        self.cancellation_source.cancel();

        if let Err(err) = self.channel.close().await {
            tracing::warn!(%err, "closing channel failed");
        }

        tracing::info!("consumer closed");
    }
}
