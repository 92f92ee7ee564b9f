//!
//! Module that allows to establish connection with RabbitMQ server.
//!

mod dto;
mod rabbitmq_connection;

pub use dto::RabbitmqConnectionConfig;
pub use rabbitmq_connection::RabbitmqConnection;
