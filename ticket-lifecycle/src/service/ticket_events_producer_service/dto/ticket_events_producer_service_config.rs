use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TicketEventsProducerServiceConfig {
    pub exchange: String,
    pub confirm_timeout: Duration,
}
