use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RabbitmqProducerConfig {
    /// How long [super::RabbitmqProducer::publish] waits for the publisher confirm
    pub confirm_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherConfirm {
    Ack,
    Nack,
}
