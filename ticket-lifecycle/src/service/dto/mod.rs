mod consumer_service_config;

pub use consumer_service_config::ConsumerServiceConfig;
