//!
//! Module with all dtos exchanged with other services through RabbitMQ
//!

pub mod input;
pub mod output;
pub mod protobuf;
