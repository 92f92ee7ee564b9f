//!
//! Module with tools that allow to publish messages to RabbitMQ exchanges
//!

mod channel_callback;
mod dto;
mod error;
mod pending_confirms;
mod rabbitmq_producer;

pub use dto::RabbitmqProducerConfig;
pub use error::PublishError;
pub use rabbitmq_producer::RabbitmqProducer;
