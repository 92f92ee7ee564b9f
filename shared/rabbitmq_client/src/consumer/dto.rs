use super::DeliveryCancellation;
use amqprs::AmqpDeliveryTag;

#[derive(Debug, Clone, Copy)]
pub struct RabbitmqConsumerConfig {
    /// Max number of unacknowledged deliveries processed at once
    pub prefetch_count: u16,
}

pub struct Delivery {
    pub delivery_tag: AmqpDeliveryTag,
    pub redelivered: bool,
    pub content: Vec<u8>,
    pub cancellation: DeliveryCancellation,
}

pub enum DeliveryResponse {
    Ack {
        delivery_tag: AmqpDeliveryTag,
    },

    Nack {
        delivery_tag: AmqpDeliveryTag,
        requeue: bool,
    },
}
