#[derive(Debug, Clone)]
pub struct ConsumerServiceConfig {
    /// Exchange the source service publishes to
    pub exchange: String,

    /// Durable queue owned by this service
    pub queue: String,

    pub prefetch_count: u16,
}
