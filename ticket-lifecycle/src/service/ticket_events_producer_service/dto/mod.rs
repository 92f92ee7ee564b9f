mod ticket_events_producer_service_config;

pub use ticket_events_producer_service_config::TicketEventsProducerServiceConfig;
