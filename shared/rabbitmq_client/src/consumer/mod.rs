//!
//! Module with tools that allow to consume messages from RabbitMQ queues
//!

mod async_consumer;
mod callback;
mod cancellation;
mod channel_callback;
mod dto;
mod error;
mod rabbitmq_consumer;

pub use callback::RabbitmqConsumerDeliveryCallback;
pub use cancellation::{CancellationSource, DeliveryCancellation};
pub use dto::{Delivery, RabbitmqConsumerConfig};
pub use error::ConsumeError;
pub use rabbitmq_consumer::RabbitmqConsumer;
