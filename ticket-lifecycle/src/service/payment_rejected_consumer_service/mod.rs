mod payment_rejected_consumer_service;

pub use payment_rejected_consumer_service::*;
