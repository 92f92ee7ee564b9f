mod payment_confirmed_consumer_service;

pub use payment_confirmed_consumer_service::*;
