use super::{dto::PublisherConfirm, pending_confirms::PendingConfirms};
use amqprs::{channel::Channel, Ack, BasicProperties, Cancel, CloseChannel, Nack, Return};
use async_trait::async_trait;
use tokio::sync::watch;

#[derive(Clone)]
pub struct ChannelCallback {
    pending_confirms: PendingConfirms,
    flow_tx: watch::Sender<bool>,
}

impl ChannelCallback {
    pub fn new(pending_confirms: PendingConfirms, flow_tx: watch::Sender<bool>) -> Self {
        Self {
            pending_confirms,
            flow_tx,
        }
    }
}

#[async_trait]
impl amqprs::callbacks::ChannelCallback for ChannelCallback {
    #[tracing::instrument(
        name = "RabbitMQ Producer Callback",
        target = "rabbitmq_client::producer_callback",
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

        self.pending_confirms.fail_all();

        Ok(())
    }

    async fn cancel(
        &mut self,
        _channel: &Channel,
        _cancel: Cancel,
    ) -> Result<(), amqprs::error::Error> {
        Ok(())
    }

    #[tracing::instrument(
        name = "RabbitMQ Producer Callback",
        target = "rabbitmq_client::producer_callback",
        skip_all
    )]
    async fn flow(
        &mut self,
        _channel: &Channel,
        active: bool,
    ) -> Result<bool, amqprs::error::Error> {
        tracing::debug!(flow = active, "received flow");

        self.flow_tx.send_replace(active);

        Ok(active)
    }

    #[tracing::instrument(
        name = "RabbitMQ Producer Callback",
        target = "rabbitmq_client::producer_callback",
        skip_all
    )]
    async fn publish_ack(&mut self, _channel: &Channel, ack: Ack) {
        tracing::trace!(
            delivery_tag = ack.delivery_tag(),
            multiple = ack.mutiple(),
            "received ack"
        );

        self.pending_confirms
            .resolve(ack.delivery_tag(), ack.mutiple(), PublisherConfirm::Ack);
    }

    #[tracing::instrument(
        name = "RabbitMQ Producer Callback",
        target = "rabbitmq_client::producer_callback",
        skip_all
    )]
    async fn publish_nack(&mut self, _channel: &Channel, nack: Nack) {
        tracing::warn!(
            delivery_tag = nack.delivery_tag(),
            multiple = nack.multiple(),
            "received nack"
        );

        self.pending_confirms
            .resolve(nack.delivery_tag(), nack.multiple(), PublisherConfirm::Nack);
    }

    async fn publish_return(
        &mut self,
        _channel: &Channel,
        _ret: Return,
        _basic_properties: BasicProperties,
        _content: Vec<u8>,
    ) {
    }
}
