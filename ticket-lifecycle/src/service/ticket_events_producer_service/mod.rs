mod dto;
mod ticket_events_producer_service;
mod ticket_events_producer_service_impl;

pub use dto::TicketEventsProducerServiceConfig;
pub use ticket_events_producer_service::*;
pub use ticket_events_producer_service_impl::*;
