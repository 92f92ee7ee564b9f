use amqprs::{
    callbacks::ChannelCallback as AmqprsChannelCallback, channel::Channel, Ack, BasicProperties,
    Cancel, CloseChannel, Nack, Return,
};
use async_trait::async_trait;
use tokio::sync::watch;

pub struct ChannelCallback {
    server_cancelled_tx: watch::Sender<bool>,
}

impl ChannelCallback {
    pub fn new(server_cancelled_tx: watch::Sender<bool>) -> Self {
        Self {
            server_cancelled_tx,
        }
    }
}

#[async_trait]
impl AmqprsChannelCallback for ChannelCallback {
    #[tracing::instrument(
        name = "RabbitMQ Consumer Callback",
        target = "rabbitmq_client::consumer_callback",
        skip_all
    )]
    async fn close(
        &mut self,
        _channel: &Channel,
        close: CloseChannel,
    ) -> Result<(), amqprs::error::Error> {
        tracing::error!(
            code = close.reply_code(),
            text = close.reply_text(),
            "received close",
        );

        self.server_cancelled_tx.send_replace(true);

        Ok(())
    }

    #[tracing::instrument(
        name = "RabbitMQ Consumer Callback",
        target = "rabbitmq_client::consumer_callback",
        skip_all
    )]
    async fn cancel(
        &mut self,
        _channel: &Channel,
        _cancel: Cancel,
    ) -> Result<(), amqprs::error::Error> {
        tracing::error!("received cancel");

        self.server_cancelled_tx.send_replace(true);

        Ok(())
    }

    async fn flow(
        &mut self,
        _channel: &Channel,
        active: bool,
    ) -> Result<bool, amqprs::error::Error> {
        // consumer channels never publish
        Ok(active)
    }

    async fn publish_ack(&mut self, _channel: &Channel, _ack: Ack) {}

    async fn publish_nack(&mut self, _channel: &Channel, _nack: Nack) {}

    async fn publish_return(
        &mut self,
        _channel: &Channel,
        _ret: Return,
        _basic_properties: BasicProperties,
        _content: Vec<u8>,
    ) {
    }
}
