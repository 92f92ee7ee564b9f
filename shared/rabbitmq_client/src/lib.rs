//!
//! Thin layer over amqprs used by the ticket lifecycle service.
//!
//! - [connection] opens and watches the broker connection
//! - [consumer] consumes deliveries, each in its own task, with cancellation support
//! - [producer] publishes messages and waits for publisher confirms
//!

pub mod connection;
pub mod consumer;
pub mod producer;

mod retry;
