mod payment_approved_consumer_service;
mod ticket_paid_aggregation;

pub use payment_approved_consumer_service::*;
