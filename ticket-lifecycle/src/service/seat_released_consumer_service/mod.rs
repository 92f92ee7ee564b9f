mod seat_released_consumer_service;

pub use seat_released_consumer_service::*;
